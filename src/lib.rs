pub mod active;
pub mod combo;
pub mod csv;
pub mod document;
pub mod error;
pub mod ime;
pub mod localize;
pub mod normalize;
pub mod notation;
pub mod search;
pub mod store;
pub mod upstream;

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod pipeline;

pub use document::{CharacterDocument, MoveRecord};
pub use error::{Error, Result};
pub use localize::Lang;
pub use normalize::Category;
pub use notation::DisplayMode;

// Bindings for the web UI
#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::document::CharacterDocument;
    use crate::localize::Lang;
    use crate::normalize::normalize_category;
    use crate::notation::DisplayMode;
    use crate::search::{SearchOptions, search};

    fn display_mode(numeric: bool) -> DisplayMode {
        if numeric { DisplayMode::Numeric } else { DisplayMode::Directional }
    }

    #[wasm_bindgen(js_name = formatInput)]
    pub fn js_format_input(raw: String, numeric: bool) -> String {
        crate::notation::format_input(&raw, display_mode(numeric))
    }

    #[wasm_bindgen(js_name = formatActiveFrames)]
    pub fn js_format_active_frames(frames: Vec<f64>) -> String {
        crate::active::format_active_frames(&frames)
    }

    #[wasm_bindgen(js_name = glyphsToDigits)]
    pub fn js_glyphs_to_digits(text: String) -> String {
        crate::notation::glyphs_to_digits(&text)
    }

    #[wasm_bindgen(js_name = renderFighterText)]
    pub fn js_render_fighter_text(raw: String) -> String {
        crate::ime::render_fighter_text(&raw)
    }

    /// `doc` is a character document object; returns the matching moves, or
    /// an empty array if `doc` cannot be read.
    #[wasm_bindgen(js_name = searchMoves)]
    pub fn js_search_moves(
        doc: JsValue,
        query: String,
        lang: String,
        category: Option<String>,
        max_results: Option<usize>,
    ) -> JsValue {
        let doc: CharacterDocument = serde_wasm_bindgen::from_value(doc).unwrap_or_default();
        let mut opts = SearchOptions {
            lang: lang.parse().unwrap_or(Lang::Zh),
            category: category
                .filter(|c| !c.trim().is_empty() && c != "all")
                .map(|c| normalize_category(Some(&c))),
            ..Default::default()
        };
        if let Some(max) = max_results {
            opts.max_results = max;
        }
        let results = search(&doc.moves, &query, &opts);
        serde_wasm_bindgen::to_value(&results).unwrap_or(JsValue::NULL)
    }
}

// Re-export for wasm32 target
#[cfg(target_arch = "wasm32")]
pub use wasm::*;

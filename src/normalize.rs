//! Mapping of free-form source vocabulary onto the canonical one.
//!
//! Nothing here fails: unknown input falls back to `common`, or passes
//! through unchanged.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Normal,
    TargetCombo,
    Special,
    Super,
    Throw,
    Common,
}

impl Category {
    /// Display order of the frame-data sections.
    pub const ALL: [Category; 6] = [
        Category::Normal,
        Category::TargetCombo,
        Category::Special,
        Category::Super,
        Category::Throw,
        Category::Common,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Normal => "normal",
            Category::TargetCombo => "targetcombo",
            Category::Special => "special",
            Category::Super => "super",
            Category::Throw => "throw",
            Category::Common => "common",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys are compared lowercased with spaces, `_` and `-` removed.
const CATEGORY_ALIASES: &[(&str, Category)] = &[
    ("normal", Category::Normal),
    ("normals", Category::Normal),
    ("普通技", Category::Normal),
    ("targetcombo", Category::TargetCombo),
    ("targetcombos", Category::TargetCombo),
    ("target", Category::TargetCombo),
    ("目标连段", Category::TargetCombo),
    ("special", Category::Special),
    ("specials", Category::Special),
    ("必杀技", Category::Special),
    ("super", Category::Super),
    ("supers", Category::Super),
    ("superart", Category::Super),
    ("superarts", Category::Super),
    ("超必杀", Category::Super),
    ("throw", Category::Throw),
    ("throws", Category::Throw),
    ("投技", Category::Throw),
    ("common", Category::Common),
    ("通用", Category::Common),
];

fn category_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn normalize_category(raw: Option<&str>) -> Category {
    let key = category_key(raw.unwrap_or_default());
    CATEGORY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, category)| *category)
        .unwrap_or(Category::Common)
}

/// Lowercased source header spellings and the field each one means.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("id", "id"),
    ("category", "category"),
    ("catagory", "category"),
    ("input", "input"),
    ("inputdisplay", "inputDisplay"),
    ("input display", "inputDisplay"),
    ("hittype", "hitType"),
    ("hit type", "hitType"),
    ("nameen", "nameEN"),
    ("name en", "nameEN"),
    ("name_en", "nameEN"),
    ("move name", "nameEN"),
    ("movename", "nameEN"),
    ("move_name", "nameEN"),
    ("namecn", "nameCN"),
    ("name cn", "nameCN"),
    ("name_cn", "nameCN"),
    ("move name cn", "nameCN"),
    ("move_name_cn", "nameCN"),
    ("startup", "startup"),
    ("start-up", "startup"),
    ("frame start-up", "startup"),
    ("frame start up", "startup"),
    ("active", "active"),
    ("recovery", "recovery"),
    ("onhit", "onHit"),
    ("on hit", "onHit"),
    ("on-hit", "onHit"),
    ("recovery hit", "onHit"),
    ("onblock", "onBlock"),
    ("on block", "onBlock"),
    ("on-block", "onBlock"),
    ("block", "onBlock"),
    ("damage", "damage"),
    ("superart", "superArt"),
    ("super art gauge increase", "superArt"),
    ("driveonhit", "driveOnHit"),
    ("drive gauge increase hit", "driveOnHit"),
    ("driveonblock", "driveOnBlock"),
    ("drive gauge decrease block", "driveOnBlock"),
    ("driveonpunishcounter", "driveOnPunishCounter"),
    ("driveonpunishconter", "driveOnPunishCounter"),
    ("driveonpunish counter", "driveOnPunishCounter"),
    ("punish counter", "driveOnPunishCounter"),
    ("cancel", "cancel"),
    ("comboscaling", "comboScaling"),
    ("combo scaling", "comboScaling"),
    ("properties", "Properties"),
    ("miscellaneous", "Miscellaneous"),
    ("notescn", "notesCN"),
    ("notes_cn", "notesCN"),
    ("notesen", "notesEN"),
    ("notes_en", "notesEN"),
];

/// Strips a BOM and surrounding whitespace, then resolves known aliases.
/// Unknown headers keep their trimmed spelling.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    let key = trimmed.to_lowercase();
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Renames repeated names to `name_2`, `name_3`, ... in order of
/// appearance. Empty names are left alone.
pub fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            if name.is_empty() {
                return name;
            }
            let mut n = counts.get(&name).copied().unwrap_or(0) + 1;
            let mut candidate = if n == 1 { name.clone() } else { format!("{}_{}", name, n) };
            while used.contains(&candidate) {
                n += 1;
                candidate = format!("{}_{}", name, n);
            }
            counts.insert(name, n);
            used.insert(candidate.clone());
            candidate
        })
        .collect()
}

/// Splits a cancel cell on `,`, `/`, `+` and whitespace.
pub fn cancel_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| matches!(c, ',' | '/' | '+') || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}

const OTHER_CANCEL: &str = "Other";
const CANCEL_DETAIL_LIMIT: usize = 3;

fn expand_cancel_token(token: &str) -> Vec<&str> {
    match token.to_uppercase().as_str() {
        "C" => vec!["Special", "Drive", "Super"],
        "SA" | "SA1" | "SA2" | "SA3" => vec!["Super"],
        "J" => vec!["Jump"],
        "*" => vec![OTHER_CANCEL],
        _ => vec![token],
    }
}

/// Expands shorthand cancel tokens, dedupes them in first-seen order, and
/// appends up to three `details` when the route includes `Other`.
pub fn normalize_cancel<S: AsRef<str>>(tokens: &[S], details: &[String]) -> String {
    let mut routes: Vec<&str> = vec![];
    for token in tokens.iter().map(|t| t.as_ref().trim()).filter(|t| !t.is_empty()) {
        for route in expand_cancel_token(token) {
            if !routes.contains(&route) {
                routes.push(route);
            }
        }
    }
    if routes.is_empty() {
        return "-".to_string();
    }
    let mut out = routes.join(", ");
    if routes.contains(&OTHER_CANCEL) && !details.is_empty() {
        let shown = &details[..details.len().min(CANCEL_DETAIL_LIMIT)];
        out.push_str(" (");
        out.push_str(&shown.join(", "));
        if details.len() > CANCEL_DETAIL_LIMIT {
            out.push_str(", …");
        }
        out.push(')');
    }
    out
}

pub fn normalize_cancel_text(text: &str, details: &[String]) -> String {
    normalize_cancel(&cancel_tokens(text), details)
}

pub fn is_throw_type(move_type: &str) -> bool {
    matches!(
        move_type.trim().to_lowercase().as_str(),
        "throw"
            | "commandthrow"
            | "command_throw"
            | "command throw"
            | "command-throw"
            | "commandtrow"
    )
}

const BLOCK_TYPES: &[(&str, &str)] = &[
    ("high", "High"),
    ("low", "Low"),
    ("mid", "Overhead"),
    ("midHigh", "Overhead"),
    ("overhead", "Overhead"),
];

/// Throws are always `Throw`; otherwise the block type is looked up, exact
/// spelling first and then ignoring case. Unknown block types pass through.
pub fn map_hit_type(move_type: &str, block_type: Option<&str>) -> String {
    if is_throw_type(move_type) {
        return "Throw".to_string();
    }
    let block = block_type.unwrap_or_default().trim();
    if block.is_empty() {
        return "-".to_string();
    }
    BLOCK_TYPES
        .iter()
        .find(|(k, _)| *k == block)
        .or_else(|| BLOCK_TYPES.iter().find(|(k, _)| k.eq_ignore_ascii_case(block)))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| block.to_string())
}

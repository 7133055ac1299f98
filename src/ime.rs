//! Live rendering of free-form notes typed in "fighter" mode.
//!
//! Direction digits always become arrows. Button codes are only uppercased
//! when they follow a direction or a `>`, so ordinary words like `help` or
//! `hpk` in prose are left alone.

use crate::notation::{digit_to_glyph, is_direction_digit};

/// Button codes eligible in note text, longest first. Bare `p`/`k` are too
/// common in prose to take part.
const NOTE_BUTTONS: [&str; 10] = ["ppp", "kkk", "pp", "kk", "lp", "mp", "hp", "lk", "mk", "hk"];

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ",.+-/\\()[]{}<:;".contains(c)
}

/// Walks left from `start` over separators and reports whether the first
/// meaningful character is a direction digit or `>`.
fn has_trigger_context(chars: &[char], start: usize) -> bool {
    chars[..start]
        .iter()
        .rev()
        .find(|&&c| c == '>' || !is_separator(c))
        .is_some_and(|&c| c == '>' || is_direction_digit(c))
}

fn match_note_button(chars: &[char], i: usize) -> Option<&'static str> {
    NOTE_BUTTONS.into_iter().find(|code| {
        let n = code.chars().count();
        i + n <= chars.len()
            && chars[i..i + n]
                .iter()
                .zip(code.chars())
                .all(|(a, b)| a.to_ascii_lowercase() == b)
    })
}

pub fn render_fighter_text(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if let Some(glyph) = digit_to_glyph(c) {
            out.push(glyph);
            i += 1;
            continue;
        }
        match match_note_button(&chars, i) {
            Some(code) if has_trigger_context(&chars, i) => {
                out.push_str(&code.to_uppercase());
                i += code.len();
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Switch between raw text and fighter rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FighterMode {
    #[default]
    Normal,
    Fighter,
}

pub fn render_note(raw: &str, mode: FighterMode) -> String {
    match mode {
        FighterMode::Normal => raw.to_string(),
        FighterMode::Fighter => render_fighter_text(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_after_directions() {
        assert_eq!(render_fighter_text("2lp 2lp 5mp"), "↓LP ↓LP •MP");
        assert_eq!(render_fighter_text("236 hp"), "↓↘→ HP");
        assert_eq!(render_fighter_text("5lp > mp"), "•LP > MP");
    }

    #[test]
    fn chain_marker_triggers_after_any_text() {
        assert_eq!(render_fighter_text("abc > mp"), "abc > MP");
        assert_eq!(render_fighter_text("abc>mp"), "abc>MP");
        assert_eq!(render_fighter_text("abc, mp"), "abc, mp");
        assert_eq!(render_fighter_text("> (hk)"), "> (HK)");
    }

    #[test]
    fn prose_is_untouched() {
        assert_eq!(render_fighter_text("help me"), "help me");
        assert_eq!(render_fighter_text("mp"), "mp");
        assert_eq!(render_fighter_text("jump hp"), "jump hp");
    }

    #[test]
    fn longest_code_wins() {
        assert_eq!(render_fighter_text("2ppp"), "↓PPP");
        assert_eq!(render_fighter_text("6kk"), "→KK");
    }

    #[test]
    fn normal_mode_is_identity() {
        assert_eq!(render_note("2lp", FighterMode::Normal), "2lp");
        assert_eq!(render_note("2lp", FighterMode::Fighter), "↓LP");
    }
}

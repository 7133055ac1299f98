//! Stored combo command sequences.
//!
//! A combo's command is either legacy free text or a tagged JSON list of
//! segments, one per move in the sequence.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::notation::{Button, digits_to_glyphs};

pub const SEGMENTS_TAG: &str = "@@seq:";

/// One step of a stored combo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdSeg {
    pub input: String,
    pub name: String,
    pub note: String,
}

impl CmdSeg {
    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.name.is_empty() && self.note.is_empty()
    }
}

/// Uppercases button codes standing alone between non-letters, e.g. `2lp`
/// or `lp+lk`, but not the `lp` inside `help`.
fn uppercase_buttons(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut run = String::new();
    let flush = |run: &mut String, out: &mut String| {
        match Button::from_code(run) {
            Some(button) => out.push_str(button.label()),
            None => out.push_str(run),
        }
        run.clear();
    };
    for c in s.chars() {
        if c.is_ascii_alphabetic() {
            run.push(c);
            continue;
        }
        flush(&mut run, &mut out);
        out.push(c);
    }
    flush(&mut run, &mut out);
    out
}

fn sanitize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical stored form: uppercase buttons, arrow directions, no control
/// characters, single spaces.
pub fn canonicalize_command(s: &str) -> String {
    sanitize(&digits_to_glyphs(&uppercase_buttons(s)))
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// `None` when the text is not a tagged segment list or its JSON is broken.
pub fn decode_segments(raw: &str) -> Option<Vec<CmdSeg>> {
    let json = raw.trim().strip_prefix(SEGMENTS_TAG)?;
    let items: Vec<Value> = match serde_json::from_str(json) {
        Ok(items) => items,
        Err(e) => {
            debug!("Ignoring malformed combo segments: {}", e);
            return None;
        }
    };
    Some(
        items
            .iter()
            .map(|item| CmdSeg {
                input: text_field(item, "input"),
                name: text_field(item, "name"),
                note: text_field(item, "note"),
            })
            .filter(|seg| !seg.is_empty())
            .collect(),
    )
}

pub fn encode_segments(segments: &[CmdSeg]) -> String {
    let normalized: Vec<CmdSeg> = segments
        .iter()
        .map(|seg| CmdSeg {
            input: canonicalize_command(&seg.input),
            name: seg.name.trim().to_string(),
            note: seg.note.trim().to_string(),
        })
        .collect();
    let json = serde_json::to_string(&normalized).unwrap_or_else(|_| "[]".to_string());
    format!("{}{}", SEGMENTS_TAG, json)
}

/// Legacy commands become a single segment holding the raw text.
pub fn segments_from_command(raw: &str) -> Vec<CmdSeg> {
    if let Some(segments) = decode_segments(raw) {
        return segments;
    }
    let legacy = raw.trim();
    if legacy.is_empty() {
        return vec![];
    }
    vec![CmdSeg {
        input: legacy.to_string(),
        ..Default::default()
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_commands() {
        assert_eq!(canonicalize_command("2lp  2lp\t236hp"), "↓LP ↓LP ↓↘→HP");
        assert_eq!(canonicalize_command("5mp xx 214 kk"), "•MP xx ↓↙← KK");
        assert_eq!(canonicalize_command("help\u{7}"), "help");
        assert_eq!(canonicalize_command("lp+lk"), "LP+LK");
    }

    #[test]
    fn encode_then_decode() {
        let segments = vec![
            CmdSeg { input: "2mk".into(), name: " Crouching MK ".into(), note: String::new() },
            CmdSeg { input: "236hp".into(), name: "Hadoken".into(), note: "cancel".into() },
        ];
        let encoded = encode_segments(&segments);
        assert!(encoded.starts_with(SEGMENTS_TAG));
        let decoded = decode_segments(&encoded).unwrap();
        assert_eq!(decoded[0].input, "↓MK");
        assert_eq!(decoded[0].name, "Crouching MK");
        assert_eq!(decoded[1].input, "↓↘→HP");
    }

    #[test]
    fn decode_rejects_untagged_and_broken() {
        assert_eq!(decode_segments("2mk > 236hp"), None);
        assert_eq!(decode_segments("@@seq:{oops"), None);
        assert_eq!(decode_segments("@@seq:{}"), None);
    }

    #[test]
    fn decode_drops_empty_segments() {
        let decoded = decode_segments(r#"@@seq:[{"input":""},{"name":"x","note":3}]"#).unwrap();
        assert_eq!(decoded, vec![CmdSeg { name: "x".into(), ..Default::default() }]);
    }

    #[test]
    fn legacy_commands() {
        assert_eq!(
            segments_from_command(" 2mk xx 236hp "),
            vec![CmdSeg { input: "2mk xx 236hp".into(), ..Default::default() }]
        );
        assert!(segments_from_command("  ").is_empty());
    }
}

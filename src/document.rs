use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::localize::Lang;
use crate::normalize::{Category, dedupe_names, normalize_category};

/// Column set of the CSV round-trip export, also the field order of moves
/// produced from upstream data.
pub const CANONICAL_COLUMNS: [&str; 18] = [
    "id",
    "category",
    "nameEN",
    "nameCN",
    "input",
    "inputDisplay",
    "hitType",
    "startup",
    "active",
    "recovery",
    "onBlock",
    "onHit",
    "damage",
    "superArt",
    "driveOnHit",
    "driveOnBlock",
    "driveOnPunishCounter",
    "cancel",
];

/// Placeholder for a missing or unparseable frame value.
pub const MISSING: &str = "-";

/// One move, as an ordered map of column name to display-ready text.
/// Columns the pipeline does not know about are carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MoveRecord(IndexMap<String, String>);

impl MoveRecord {
    pub fn new() -> MoveRecord {
        MoveRecord::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn id(&self) -> &str {
        self.get("id").unwrap_or_default()
    }

    pub fn input(&self) -> &str {
        self.get("input").unwrap_or_default()
    }

    /// Legacy plural spellings are folded into the canonical buckets.
    pub fn category(&self) -> Category {
        normalize_category(self.get("category"))
    }

    pub fn name(&self, lang: Lang) -> &str {
        let key = match lang {
            Lang::Zh => "nameCN",
            Lang::En => "nameEN",
        };
        self.get(key).unwrap_or_default()
    }

    pub fn alt_name(&self, lang: Lang) -> &str {
        self.name(lang.other())
    }
}

impl FromIterator<(String, String)> for MoveRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> MoveRecord {
        MoveRecord(iter.into_iter().collect())
    }
}

fn cell_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

// Older documents may hold numbers or nulls; everything is stored as text.
impl<'de> Deserialize<'de> for MoveRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<MoveRecord, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(k, v)| cell_text(v).map(|s| (k, s)))
            .collect())
    }
}

/// Gives repeated move ids a `_2`, `_3`, ... suffix. Empty ids are kept.
pub fn ensure_unique_ids(moves: &mut [MoveRecord]) {
    let ids: Vec<String> = moves.iter().map(|m| m.id().to_string()).collect();
    let unique = dedupe_names(ids.clone());
    for ((m, old), new) in moves.iter_mut().zip(ids).zip(unique) {
        if old != new {
            warn!("Duplicate move id {} renamed to {}", old, new);
            m.set("id", new);
        }
    }
}

/// The per-character frame-data document read by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDocument {
    #[serde(rename = "characterId", default)]
    pub character_id: String,
    #[serde(rename = "displayNameCN", default)]
    pub display_name_cn: String,
    #[serde(rename = "displayNameEN", default)]
    pub display_name_en: String,
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(rename = "nameCNMap", default)]
    pub name_cn_map: IndexMap<String, String>,
    #[serde(default)]
    pub moves: Vec<MoveRecord>,
}

impl CharacterDocument {
    /// Corrupt or foreign JSON gives `None`; callers treat that as "no
    /// previous document".
    pub fn from_json(text: &str) -> Option<CharacterDocument> {
        match serde_json::from_str(text) {
            Ok(doc) => Some(doc),
            Err(e) => {
                debug!("Ignoring unreadable frame-data document: {}", e);
                None
            }
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn find_move(&self, id: &str) -> Option<&MoveRecord> {
        self.moves.iter().find(|m| m.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> MoveRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn record_accessors() {
        let m = record(&[
            ("id", "st_lp"),
            ("nameCN", "站轻拳"),
            ("nameEN", "Standing LP"),
            ("category", "normals"),
        ]);
        assert_eq!(m.id(), "st_lp");
        assert_eq!(m.input(), "");
        assert_eq!(m.category(), Category::Normal);
        assert_eq!(m.name(Lang::Zh), "站轻拳");
        assert_eq!(m.alt_name(Lang::Zh), "Standing LP");
    }

    #[test]
    fn unique_ids() {
        let mut moves = vec![
            record(&[("id", "st_lp")]),
            record(&[("id", "st_lp")]),
            record(&[("id", "")]),
            record(&[("id", "")]),
        ];
        ensure_unique_ids(&mut moves);
        let ids: Vec<&str> = moves.iter().map(MoveRecord::id).collect();
        assert_eq!(ids, vec!["st_lp", "st_lp_2", "", ""]);
    }

    #[test]
    fn legacy_values_become_text() {
        let doc = CharacterDocument::from_json(
            r#"{"characterId":"ryu","moves":[{"id":"st_lp","startup":4,"input":null,"extra":true}]}"#,
        )
        .unwrap();
        let m = &doc.moves[0];
        assert_eq!(m.get("startup"), Some("4"));
        assert_eq!(m.get("input"), None);
        assert_eq!(m.get("extra"), Some("true"));
        assert!(doc.name_cn_map.is_empty());
        assert_eq!(doc.display_name_cn, "");
    }

    #[test]
    fn corrupt_json_is_none() {
        assert_eq!(CharacterDocument::from_json("{ not json"), None);
        assert_eq!(CharacterDocument::from_json("[1, 2]"), None);
    }

    #[test]
    fn json_keeps_field_names_and_order() {
        let doc = CharacterDocument {
            character_id: "ken".into(),
            moves: vec![record(&[("id", "cr_mk"), ("category", "normal")])],
            ..Default::default()
        };
        let json = doc.to_json_pretty().unwrap();
        let first = json.find("\"characterId\"").unwrap();
        let second = json.find("\"displayNameCN\"").unwrap();
        assert!(first < second);
        assert!(json.contains("\"nameCNMap\": {}"));
        assert!(json.find("\"id\"").unwrap() < json.find("\"category\"").unwrap());
        assert_eq!(CharacterDocument::from_json(&json), Some(doc));
    }
}

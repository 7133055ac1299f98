//! Adapter for the third-party per-character TOML move data.
//!
//! The upstream schema is not ours, so every field is optional and read
//! through [`pick_string`]. Only [`find_move_array`] knows where the move list
//! lives.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, warn};
use toml::{Table, Value};

use crate::active::{ActiveFrames, format_active, format_number};
use crate::document::{
    CANONICAL_COLUMNS, CharacterDocument, MISSING, MoveRecord, ensure_unique_ids,
};
use crate::normalize::{Category, cancel_tokens, map_hit_type, normalize_cancel};
use crate::notation::{Limb, Stance, Strength, parse_simple_normal};

const SLUG_MAX_LEN: usize = 80;

const JAPANESE_NAME_KEYS: [&str; 6] = [
    "name_ja",
    "nameJa",
    "nameJA",
    "nameJP",
    "jpName",
    "japaneseName",
];

pub fn parse_upstream(text: &str) -> Result<Table, toml::de::Error> {
    toml::from_str(text)
}

fn tables(value: &Value) -> Option<Vec<&Table>> {
    value.as_array().map(|items| items.iter().filter_map(Value::as_table).collect())
}

/// Locates the move list: `moves`, then `move`, then the first top-level
/// array whose first element is a table. Empty if none matches.
pub fn find_move_array(data: &Table) -> Vec<&Table> {
    for key in ["moves", "move"] {
        if let Some(moves) = data.get(key).and_then(tables) {
            return moves;
        }
    }
    let fallback = data.iter().find(|(_, value)| {
        value
            .as_array()
            .and_then(|items| items.first())
            .is_some_and(Value::is_table)
    });
    match fallback {
        Some((key, value)) => {
            debug!("Reading moves from top-level key {}", key);
            tables(value).unwrap_or_default()
        }
        None => {
            warn!("No move list found in upstream data");
            vec![]
        }
    }
}

/// Lowercase, drop parenthesized text, collapse everything else that is not
/// `a-z0-9` into `_`, trim underscores, cap the length.
pub fn slugify(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut without_parens = String::with_capacity(lower.len());
    let mut rest = lower.as_str();
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                without_parens.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    without_parens.push_str(rest);

    let mut slug = String::with_capacity(without_parens.len());
    for c in without_parens.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let mut slug = slug.trim_matches('_').to_string();
    slug.truncate(SLUG_MAX_LEN);
    slug
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(format_number(*f)),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            Some(parts.join(","))
        }
        Value::Table(_) => None,
    }
}

/// Trimmed text of a field, or `"-"` when it is absent or blank. Zero is a
/// value like any other.
pub fn pick_string(value: Option<&Value>) -> String {
    value
        .and_then(scalar_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| MISSING.to_string())
}

fn text_field(m: &Table, key: &str) -> Option<String> {
    m.get(key)
        .and_then(scalar_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn move_type(m: &Table) -> String {
    text_field(m, "type")
        .or_else(|| text_field(m, "moveType"))
        .unwrap_or_default()
        .to_lowercase()
}

fn is_followup_type(t: &str) -> bool {
    matches!(t, "followup" | "follow_up" | "follow-up")
}

fn is_command_throw_type(t: &str) -> bool {
    matches!(t, "commandthrow" | "command_throw" | "command throw" | "commandtrow")
}

/// Follow-ups and command throws are filed with the specials. Anything
/// unrecognized, plain throws included, is a normal.
pub fn category_for_type(move_type: &str) -> Category {
    let t = move_type.trim().to_lowercase();
    match t.as_str() {
        "targetcombo" | "target_combo" | "target combo" => Category::TargetCombo,
        "special" => Category::Special,
        t if is_followup_type(t) || is_command_throw_type(t) => Category::Special,
        "super" | "sa" | "super1" | "sa1" | "super2" | "sa2" | "super3" | "sa3" => Category::Super,
        _ => Category::Normal,
    }
}

/// Fixed mnemonic id for single-direction normals such as `5lp` or `j.hp`.
fn id_from_simple_input(input: &str) -> Option<String> {
    let normal = parse_simple_normal(input)?;
    let prefix = match normal.stance {
        Stance::Jump => "j".to_string(),
        Stance::Direction('5') => "st".to_string(),
        Stance::Direction('2') => "cr".to_string(),
        Stance::Direction('6') => "f".to_string(),
        Stance::Direction('4') => "b".to_string(),
        Stance::Direction(d) => format!("n{}", d),
    };
    Some(format!("{}_{}", prefix, normal.button.code()))
}

pub fn move_id(m: &Table) -> String {
    if let Some(id) = text_field(m, "input").and_then(|input| id_from_simple_input(&input)) {
        return id;
    }
    if let Some(slug) = text_field(m, "slug") {
        return slugify(&slug);
    }
    let name = text_field(m, "name").unwrap_or_else(|| "move".to_string());
    format!("{}_{}", category_for_type(&move_type(m)), slugify(&name))
}

/// Name-derived id the older importer gave a move, prefixed with a plural
/// bucket such as `specials_`. `None` when the id comes from input or slug.
fn legacy_move_id(m: &Table) -> Option<String> {
    let from_input = text_field(m, "input").and_then(|input| id_from_simple_input(&input));
    if from_input.is_some() || text_field(m, "slug").is_some() {
        return None;
    }
    let t = move_type(m);
    let prefix = match t.trim() {
        "targetcombo" | "target_combo" | "target combo" => "targetCombos",
        "special" => "specials",
        t if is_followup_type(t) || is_command_throw_type(t) => "specials",
        "super1" | "sa1" | "super2" | "sa2" | "super3" | "sa3" => "supers",
        _ => "normals",
    };
    let name = text_field(m, "name").unwrap_or_else(|| "move".to_string());
    Some(format!("{}_{}", prefix, slugify(&name)))
}

/// Generic Chinese name for standing, crouching and jumping normals with a
/// single strength+limb button. Nothing else gets one.
pub fn auto_cn_name(input: &str) -> Option<String> {
    let normal = parse_simple_normal(input)?;
    let position = match normal.stance {
        Stance::Direction('5') => '站',
        Stance::Direction('2') => '下',
        Stance::Jump => '跳',
        Stance::Direction(_) => return None,
    };
    let (strength, limb) = normal.button.strength_limb()?;
    let strength = match strength {
        Strength::Light => '轻',
        Strength::Medium => '中',
        Strength::Heavy => '重',
    };
    let limb = match limb {
        Limb::Punch => '拳',
        Limb::Kick => '脚',
    };
    Some([position, strength, limb].iter().collect())
}

fn japanese_name(m: &Table) -> Option<String> {
    JAPANESE_NAME_KEYS.iter().find_map(|key| text_field(m, key))
}

fn active_frames(value: Option<&Value>) -> Option<ActiveFrames> {
    let frames = match value? {
        Value::Integer(i) => ActiveFrames::Number(*i as f64),
        Value::Float(f) => ActiveFrames::Number(*f),
        Value::String(s) => ActiveFrames::Text(s.clone()),
        Value::Array(items) => ActiveFrames::List(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Integer(i) => Some(*i as f64),
                    Value::Float(f) => Some(*f),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                })
                .collect(),
        ),
        other => ActiveFrames::Text(scalar_text(other)?),
    };
    Some(frames)
}

fn cancel_cell(m: &Table) -> String {
    let tokens: Vec<String> = match m.get("cancel") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(value) => scalar_text(value)
            .map(|text| cancel_tokens(&text).into_iter().map(String::from).collect())
            .unwrap_or_default(),
        None => vec![],
    };
    let details: Vec<String> = match m.get("cancelsInto") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        _ => vec![],
    };
    normalize_cancel(&tokens, &details)
}

fn sub_field<'a>(m: &'a Table, table: &str, key: &str) -> Option<&'a Value> {
    m.get(table)?.as_table()?.get(key)
}

fn convert_move(
    m: &Table,
    name_cn_map: &IndexMap<String, String>,
    slug_to_input: &HashMap<String, String>,
) -> MoveRecord {
    let id = move_id(m);
    let kind = move_type(m);
    let input = text_field(m, "input").unwrap_or_default();

    let name_cn = name_cn_map
        .get(&id)
        .cloned()
        .or_else(|| auto_cn_name(&input))
        .or_else(|| japanese_name(m))
        .unwrap_or_default();

    let parent_input = is_followup_type(&kind)
        .then(|| m.get("parents")?.as_array()?.first().and_then(scalar_text))
        .flatten()
        .and_then(|parent| slug_to_input.get(parent.trim()));
    let input_display = match parent_input {
        Some(parent) if !input.is_empty() => format!("{}>{}", parent, input),
        _ => String::new(),
    };

    let mut row = MoveRecord::new();
    for column in CANONICAL_COLUMNS {
        let value = match column {
            "id" => id.clone(),
            "category" => category_for_type(&kind).to_string(),
            "nameEN" => text_field(m, "name").unwrap_or_else(|| id.clone()),
            "nameCN" => name_cn.clone(),
            "input" => input.clone(),
            "inputDisplay" => input_display.clone(),
            "hitType" => map_hit_type(&kind, text_field(m, "blockType").as_deref()),
            "active" => format_active(active_frames(m.get("active")).as_ref()),
            "onHit" => pick_string(sub_field(m, "frameAdvantage", "hit")),
            "onBlock" => pick_string(sub_field(m, "frameAdvantage", "block")),
            "driveOnHit" => pick_string(sub_field(m, "driveGauge", "onHit")),
            "driveOnBlock" => pick_string(sub_field(m, "driveGauge", "onBlock")),
            "driveOnPunishCounter" => pick_string(sub_field(m, "driveGauge", "onPunishCounter")),
            "cancel" => cancel_cell(m),
            // startup, recovery, damage, superArt
            other => pick_string(m.get(other)),
        };
        row.set(column, value);
    }
    row
}

fn title_case(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts one character's upstream data into a document, carrying over
/// the curated names and display names of `existing`.
pub fn import_upstream(
    character_id: &str,
    data: &Table,
    existing: Option<&CharacterDocument>,
    last_updated: &str,
) -> CharacterDocument {
    let upstream_moves = find_move_array(data);

    // Follow-ups may name a parent listed after them.
    let slug_to_input: HashMap<String, String> = upstream_moves
        .iter()
        .filter_map(|m| Some((text_field(m, "slug")?, text_field(m, "input")?)))
        .collect();

    let mut name_cn_map = existing.map(|doc| doc.name_cn_map.clone()).unwrap_or_default();
    for m in &upstream_moves {
        let id = move_id(m);
        if name_cn_map.contains_key(&id) {
            continue;
        }
        let curated = legacy_move_id(m).and_then(|legacy| name_cn_map.get(&legacy).cloned());
        if let Some(name) = curated {
            debug!("Carrying curated name of a legacy id over to {}", id);
            name_cn_map.insert(id, name);
        }
    }
    let mut moves: Vec<MoveRecord> = upstream_moves
        .iter()
        .map(|m| convert_move(m, &name_cn_map, &slug_to_input))
        .collect();
    ensure_unique_ids(&mut moves);

    let display_name_en = existing
        .map(|doc| doc.display_name_en.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| title_case(character_id));

    CharacterDocument {
        character_id: character_id.to_string(),
        display_name_cn: existing.map(|doc| doc.display_name_cn.clone()).unwrap_or_default(),
        display_name_en,
        last_updated: last_updated.to_string(),
        columns: CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
        name_cn_map,
        moves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RYU: &str = r#"
[[moves]]
name = "Standing Light Punch"
input = "5LP"
type = "normal"
startup = 4
active = [4, 6]
recovery = 7
blockType = "high"
cancel = "C"
damage = 300
superArt = 0

[moves.frameAdvantage]
hit = 4
block = -1

[moves.driveGauge]
onHit = 250
onBlock = 500
onPunishCounter = 2000

[[moves]]
name = "Tatsumaki Senpukyaku Follow-up"
slug = "tatsu_follow"
input = "kk"
type = "followup"
parents = ["tatsu"]

[[moves]]
name = "Tatsumaki Senpukyaku"
slug = "tatsu"
input = "214k"
type = "special"
name_ja = "竜巻旋風脚"
blockType = "midHigh"
cancel = ["SA", "*"]
cancelsInto = ["a", "b", "c", "d"]

[[moves]]
name = "Shoulder Throw"
input = "lplk"
type = "throw"
blockType = "high"

[[moves]]
name = "Standing Light Punch"
input = "5lp"
"#;

    fn import(existing: Option<&CharacterDocument>) -> CharacterDocument {
        import_upstream("ryu", &parse_upstream(RYU).unwrap(), existing, "2024-06-01")
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Hadoken (Heavy)!!"), "hadoken");
        assert_eq!(slugify("  Shin Shoryuken  "), "shin_shoryuken");
        assert_eq!(slugify("Jōdan Sokutō-geri"), "j_dan_sokut_geri");
        assert_eq!(slugify(&"a".repeat(100)).len(), 80);
    }

    #[test]
    fn ids_from_simple_inputs() {
        let table = |input: &str| -> Table {
            toml::from_str(&format!("input = {:?}", input)).unwrap()
        };
        assert_eq!(move_id(&table("5lp")), "st_lp");
        assert_eq!(move_id(&table("2MK")), "cr_mk");
        assert_eq!(move_id(&table("j.hp")), "j_hp");
        assert_eq!(move_id(&table("J>HK")), "j_hk");
        assert_eq!(move_id(&table("6hp")), "f_hp");
        assert_eq!(move_id(&table("4hk")), "b_hk");
        assert_eq!(move_id(&table("3hk")), "n3_hk");
        assert_eq!(move_id(&table("236p")), "normal_move");
    }

    #[test]
    fn generic_names_only_for_basic_normals() {
        assert_eq!(auto_cn_name("5lp").as_deref(), Some("站轻拳"));
        assert_eq!(auto_cn_name("2MK").as_deref(), Some("下中脚"));
        assert_eq!(auto_cn_name("j.hk").as_deref(), Some("跳重脚"));
        assert_eq!(auto_cn_name("6hp"), None);
        assert_eq!(auto_cn_name("5pp"), None);
        assert_eq!(auto_cn_name("236lp"), None);
        assert_eq!(auto_cn_name("5lp+lk"), None);
    }

    #[test]
    fn categories() {
        assert_eq!(category_for_type("Target_Combo"), Category::TargetCombo);
        assert_eq!(category_for_type("followup"), Category::Special);
        assert_eq!(category_for_type("command_throw"), Category::Special);
        assert_eq!(category_for_type("sa2"), Category::Super);
        assert_eq!(category_for_type("throw"), Category::Normal);
        assert_eq!(category_for_type("Command Throw"), Category::Special);
        assert_eq!(category_for_type("unique"), Category::Normal);
        assert_eq!(category_for_type(""), Category::Normal);
    }

    #[test]
    fn picking_values() {
        let text = "zero = 0\nblank = \"  \"\nf = 1.5\nsub = { a = 1 }";
        let t: Table = toml::from_str(text).unwrap();
        assert_eq!(pick_string(t.get("zero")), "0");
        assert_eq!(pick_string(t.get("blank")), "-");
        assert_eq!(pick_string(t.get("f")), "1.5");
        assert_eq!(pick_string(t.get("sub")), "-");
        assert_eq!(pick_string(None), "-");
    }

    #[test]
    fn move_array_lookup() {
        let t: Table = toml::from_str("[[move]]\nname = \"a\"").unwrap();
        assert_eq!(find_move_array(&t).len(), 1);
        let text = "tags = [\"x\"]\n[[attacks]]\nname = \"a\"\n[[attacks]]\nname = \"b\"";
        let t: Table = toml::from_str(text).unwrap();
        assert_eq!(find_move_array(&t).len(), 2);
        let t: Table = toml::from_str("tags = [\"x\"]").unwrap();
        assert!(find_move_array(&t).is_empty());
    }

    #[test]
    fn full_conversion() {
        let doc = import(None);
        assert_eq!(doc.character_id, "ryu");
        assert_eq!(doc.display_name_en, "Ryu");
        assert_eq!(doc.display_name_cn, "");
        assert_eq!(doc.columns, CANONICAL_COLUMNS.to_vec());

        let jab = &doc.moves[0];
        assert_eq!(jab.keys().collect::<Vec<_>>(), CANONICAL_COLUMNS.to_vec());
        assert_eq!(jab.id(), "st_lp");
        assert_eq!(jab.get("category"), Some("normal"));
        assert_eq!(jab.get("nameCN"), Some("站轻拳"));
        assert_eq!(jab.get("startup"), Some("4"));
        assert_eq!(jab.get("active"), Some("3"));
        assert_eq!(jab.get("onHit"), Some("4"));
        assert_eq!(jab.get("onBlock"), Some("-1"));
        assert_eq!(jab.get("driveOnPunishCounter"), Some("2000"));
        assert_eq!(jab.get("superArt"), Some("0"));
        assert_eq!(jab.get("hitType"), Some("High"));
        assert_eq!(jab.get("cancel"), Some("Special, Drive, Super"));
        assert_eq!(jab.get("inputDisplay"), Some(""));

        let follow = &doc.moves[1];
        assert_eq!(follow.id(), "tatsu_follow");
        assert_eq!(follow.get("category"), Some("special"));
        assert_eq!(follow.get("inputDisplay"), Some("214k>kk"));
        assert_eq!(follow.get("nameCN"), Some(""));
        assert_eq!(follow.get("onHit"), Some("-"));
        assert_eq!(follow.get("active"), Some("-"));

        let tatsu = &doc.moves[2];
        assert_eq!(tatsu.get("nameCN"), Some("竜巻旋風脚"));
        assert_eq!(tatsu.get("hitType"), Some("Overhead"));
        assert_eq!(tatsu.get("cancel"), Some("Super, Other (a, b, c, …)"));

        let throw = &doc.moves[3];
        assert_eq!(throw.id(), "normal_shoulder_throw");
        assert_eq!(throw.get("category"), Some("normal"));
        assert_eq!(throw.get("hitType"), Some("Throw"));

        assert_eq!(doc.moves[4].id(), "st_lp_2");
        assert_eq!(doc.moves[4].get("category"), Some("normal"));
    }

    #[test]
    fn reimport_keeps_curation() {
        let mut existing = CharacterDocument {
            display_name_cn: "隆".into(),
            display_name_en: "RYU".into(),
            ..Default::default()
        };
        existing.name_cn_map.insert("st_lp".into(), "小拳".into());
        existing.name_cn_map.insert("tatsu".into(), "龙卷旋风脚".into());

        let doc = import(Some(&existing));
        assert_eq!(doc.name_cn_map, existing.name_cn_map);
        assert_eq!(doc.display_name_cn, "隆");
        assert_eq!(doc.display_name_en, "RYU");
        assert_eq!(doc.find_move("st_lp").unwrap().get("nameCN"), Some("小拳"));
        assert_eq!(doc.find_move("tatsu").unwrap().get("nameCN"), Some("龙卷旋风脚"));
    }

    #[test]
    fn legacy_ids_keep_curated_names() {
        let table = |text: &str| -> Table { toml::from_str(text).unwrap() };
        let throw = table("name = \"Shoulder Throw\"\ninput = \"lplk\"\ntype = \"throw\"");
        assert_eq!(legacy_move_id(&throw).as_deref(), Some("normals_shoulder_throw"));
        let grab = table("name = \"Grab (Air)\"\ntype = \"command_throw\"");
        assert_eq!(move_id(&grab), "special_grab");
        assert_eq!(legacy_move_id(&grab).as_deref(), Some("specials_grab"));
        let super_art = table("name = \"x\"\ntype = \"sa2\"");
        assert_eq!(legacy_move_id(&super_art).as_deref(), Some("supers_x"));
        assert_eq!(legacy_move_id(&table("input = \"5lp\"")), None);
        assert_eq!(legacy_move_id(&table("slug = \"tatsu\"")), None);

        let mut existing = CharacterDocument::default();
        existing.name_cn_map.insert("normals_shoulder_throw".into(), "过肩摔".into());
        let doc = import(Some(&existing));
        assert_eq!(doc.find_move("normal_shoulder_throw").unwrap().get("nameCN"), Some("过肩摔"));
        assert_eq!(doc.name_cn_map.get("normal_shoulder_throw").map(String::as_str), Some("过肩摔"));
        assert!(doc.name_cn_map.contains_key("normals_shoulder_throw"));
    }
}

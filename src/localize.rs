//! zh/en rendering of frame-data cells for the table view.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::{MISSING, MoveRecord};
use crate::notation::{DisplayMode, format_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    pub fn other(self) -> Lang {
        match self {
            Lang::Zh => Lang::En,
            Lang::En => Lang::Zh,
        }
    }

    fn pick(self, zh: &'static str, en: &'static str) -> &'static str {
        match self {
            Lang::Zh => zh,
            Lang::En => en,
        }
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Lang, String> {
        match s.trim().to_lowercase().as_str() {
            "zh" | "cn" => Ok(Lang::Zh),
            "en" => Ok(Lang::En),
            other => Err(format!("unknown language {}", other)),
        }
    }
}

/// (key, zh, en)
const HIT_TYPES: &[(&str, &str, &str)] = &[
    ("High", "上段", "High"),
    ("Mid", "中段", "Mid"),
    ("Low", "下段", "Low"),
    ("Throw", "投技", "Throw"),
    ("Projectile", "飞道", "Projectile"),
    ("Overhead", "中段", "Overhead"),
    ("MidHigh", "中段", "Overhead"),
    ("Strike", "打击", "Strike"),
];

const CANCEL_ROUTES: &[(&str, &str)] = &[
    ("Chain", "TC取消"),
    ("Special", "必杀取消"),
    ("Super", "超必杀取消"),
    ("Drive", "绿冲取消"),
    ("Jump", "跳跃取消"),
    ("Other", "其他取消"),
];

const PROPERTY_WORDS: &[(&str, &str, &str)] = &[
    ("High", "上段", "High"),
    ("Mid", "中段", "Mid"),
    ("Low", "下段", "Low"),
    ("Throw", "投技", "Throw"),
    ("Projectile", "波动", "Projectile"),
    ("Mid-air", "空中", "Mid-air"),
    ("Midair", "空中", "Mid-air"),
];

const MIDAIR_PROJECTILE_ZH: &str = "空中波动";

fn is_blank(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == MISSING
}

/// Case-insensitive, so `midHigh` and `MIDHIGH` both read as overhead.
pub fn translate_hit_type(value: &str, lang: Lang) -> String {
    if is_blank(value) {
        return MISSING.to_string();
    }
    let key = value.trim();
    HIT_TYPES
        .iter()
        .find(|(k, _, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, zh, en)| lang.pick(*zh, *en).to_string())
        .unwrap_or_else(|| value.to_string())
}

pub fn translate_cancel(value: &str, lang: Lang) -> String {
    if is_blank(value) {
        return MISSING.to_string();
    }
    if lang == Lang::En {
        return value.to_string();
    }
    value
        .split(|c| matches!(c, ',' | '/' | '+' | '＋'))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            CANCEL_ROUTES
                .iter()
                .find(|(k, _)| *k == part)
                .map(|(_, zh)| *zh)
                .unwrap_or(part)
        })
        .collect::<Vec<_>>()
        .join("，")
}

/// Letter runs (hyphens allowed between letters) become their own tokens;
/// every other character is a token of its own.
fn tokenize_keep_symbols(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut tokens = vec![];
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_alphabetic() {
            tokens.push(chars[i].to_string());
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() {
            let joins_words = chars[j] == '-'
                && chars[j - 1].is_ascii_alphabetic()
                && chars.get(j + 1).is_some_and(char::is_ascii_alphabetic);
            if !(chars[j].is_ascii_alphabetic() || joins_words) {
                break;
            }
            j += 1;
        }
        tokens.push(chars[i..j].iter().collect());
        i = j;
    }
    tokens
}

/// `HighLow` style words made only of hit levels.
fn translate_level_chain(word: &str, lang: Lang) -> Option<String> {
    let mut rest = word;
    let mut parts = vec![];
    while !rest.is_empty() {
        let level = ["High", "Mid", "Low", "Throw"]
            .into_iter()
            .find(|level| rest.starts_with(level))?;
        parts.push(level);
        rest = &rest[level.len()..];
    }
    if parts.len() < 2 {
        return None;
    }
    if lang == Lang::En {
        return Some(word.to_string());
    }
    let zh: Vec<&str> = parts
        .iter()
        .map(|p| {
            PROPERTY_WORDS
                .iter()
                .find(|(k, _, _)| k == p)
                .map(|(_, zh, _)| *zh)
                .unwrap_or(*p)
        })
        .collect();
    Some(zh.join(">"))
}

pub fn translate_properties(value: &str, lang: Lang) -> String {
    if is_blank(value) {
        return MISSING.to_string();
    }
    let raw = value.trim();
    if lang == Lang::Zh {
        let lower = raw.to_lowercase();
        if (lower.contains("mid-air") || lower.contains("midair")) && lower.contains("projectile") {
            return MIDAIR_PROJECTILE_ZH.to_string();
        }
    }
    tokenize_keep_symbols(raw)
        .into_iter()
        .map(|token| {
            if !token.starts_with(|c: char| c.is_ascii_alphabetic()) {
                return token;
            }
            if let Some(chain) = translate_level_chain(&token, lang) {
                return chain;
            }
            PROPERTY_WORDS
                .iter()
                .find(|(k, _, _)| *k == token)
                .map(|(_, zh, en)| lang.pick(*zh, *en).to_string())
                .unwrap_or(token)
        })
        .collect()
}

pub const NAME_COLUMN: &str = "__name";
pub const NOTES_COLUMN: &str = "__notes";

/// Table columns: the name first, then document order with both name
/// columns and both notes columns folded into one each.
pub fn display_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    let mut out = vec![NAME_COLUMN.to_string()];
    let mut has_notes = false;
    for column in columns.iter().map(AsRef::as_ref) {
        match column {
            "" | "nameEN" | "nameCN" | NAME_COLUMN => {}
            "notesEN" | "notesCN" | NOTES_COLUMN => {
                if !has_notes {
                    out.push(NOTES_COLUMN.to_string());
                    has_notes = true;
                }
            }
            other => out.push(other.to_string()),
        }
    }
    out
}

const COLUMN_LABELS: &[(&str, &str, &str)] = &[
    ("id", "ID", "ID"),
    ("category", "类别", "Category"),
    (NAME_COLUMN, "名称", "Name"),
    ("input", "指令", "Input"),
    ("hitType", "判定", "Hit Type"),
    ("startup", "发动", "Startup"),
    ("active", "打击", "Active"),
    ("recovery", "收招", "Recovery"),
    ("onHit", "打中", "On Hit"),
    ("onBlock", "打防", "On Block"),
    ("damage", "伤害", "Damage"),
    ("comboScaling", "补正", "Combo Scaling"),
    ("driveOnHit", "斗气(中)", "DG On Hit"),
    ("driveOnBlock", "斗气(防)", "DG On Block"),
    ("driveOnPunishCounter", "斗气(确反)", "DG Punish"),
    ("superArt", "能量回收", "SA Gain"),
    ("cancel", "取消", "Cancel"),
    ("Properties", "属性", "Properties"),
    ("properties", "属性", "Properties"),
    ("Miscellaneous", "杂项", "Misc"),
    ("misc", "杂项", "Misc"),
    (NOTES_COLUMN, "备注", "Notes"),
];

pub fn column_label(column: &str, lang: Lang) -> String {
    COLUMN_LABELS
        .iter()
        .find(|(k, _, _)| *k == column)
        .map(|(_, zh, en)| lang.pick(*zh, *en).to_string())
        .unwrap_or_else(|| column.to_string())
}

pub fn cell_value(m: &MoveRecord, column: &str, lang: Lang, mode: DisplayMode) -> String {
    let text = |key: &str| match m.get(key).map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    };
    match column {
        NAME_COLUMN => text(lang.pick("nameCN", "nameEN")),
        NOTES_COLUMN => text(lang.pick("notesCN", "notesEN")),
        "input" => format_input(m.input(), mode),
        "hitType" => translate_hit_type(&text("hitType"), lang),
        "cancel" => translate_cancel(&text("cancel"), lang),
        "Properties" | "properties" => translate_properties(&text(column), lang),
        other => text(other),
    }
}

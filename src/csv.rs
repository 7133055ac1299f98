//! Hand-edited CSV frame data: parsing, import into a character document,
//! and the round-trip export.

use indexmap::IndexMap;
use log::debug;
use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, rest},
    sequence::{preceded, separated_pair},
};

use crate::document::{CANONICAL_COLUMNS, CharacterDocument, MoveRecord, ensure_unique_ids};
use crate::error::{Error, Result};
use crate::normalize::{dedupe_names, normalize_category, normalize_header};
use crate::upstream::auto_cn_name;

pub const META_MARKER: &str = "#SF6APP_META";
const META_NOTE: &str = "#(You can edit CSV freely. Lines starting with # are ignored on import.)";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    /// `#key=value` lines found before the header.
    pub meta: IndexMap<String, String>,
    pub header: Vec<String>,
    /// Cells aligned with `header`; short rows are padded with "".
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Comment(String),
    Cells(Vec<String>),
}

/// Splits text into records. Quoted fields may hold commas, newlines and
/// `""` escapes; a `#` at the start of a record makes it a comment line.
fn split_lines(text: &str) -> Vec<Line> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let chars: Vec<char> = text.chars().collect();
    let mut lines = vec![];
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '#' {
            let end = chars[i..].iter().position(|&c| c == '\n').map_or(chars.len(), |n| i + n);
            lines.push(Line::Comment(chars[i..end].iter().collect()));
            i = end + 1;
            continue;
        }
        let mut cells = vec![];
        let mut cur = String::new();
        let mut in_quotes = false;
        while i < chars.len() {
            let c = chars[i];
            i += 1;
            if in_quotes {
                match c {
                    '"' if chars.get(i) == Some(&'"') => {
                        cur.push('"');
                        i += 1;
                    }
                    '"' => in_quotes = false,
                    _ => cur.push(c),
                }
                continue;
            }
            match c {
                ',' => cells.push(std::mem::take(&mut cur)),
                '"' => in_quotes = true,
                '\n' => break,
                _ => cur.push(c),
            }
        }
        cells.push(cur);
        lines.push(Line::Cells(cells));
    }
    lines
}

fn parser_meta(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        char('#'),
        separated_pair(
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
            char('='),
            rest,
        ),
    )
    .parse(input)
}

fn parse_meta_line(line: &str) -> Option<(String, String)> {
    all_consuming(parser_meta)
        .parse(line)
        .ok()
        .map(|(_, (k, v))| (k.to_string(), v.to_string()))
}

fn is_blank_row(cells: &[String]) -> bool {
    cells.len() == 1 && cells[0].trim().is_empty()
}

/// Never fails; text without a header row yields an empty `header`.
pub fn parse_csv(text: &str) -> CsvTable {
    let mut table = CsvTable::default();
    let mut has_header = false;
    for line in split_lines(text) {
        match line {
            Line::Comment(comment) if !has_header => {
                if let Some((k, v)) = parse_meta_line(&comment) {
                    table.meta.insert(k, v);
                }
            }
            Line::Comment(_) => {}
            Line::Cells(cells) if is_blank_row(&cells) => {}
            Line::Cells(cells) if !has_header => {
                table.header = cells;
                has_header = true;
            }
            Line::Cells(mut cells) => {
                cells.resize(table.header.len(), String::new());
                table.rows.push(cells);
            }
        }
    }
    table
}

/// Names the upstream import derives by itself: the generic normal names,
/// and an unchanged name the existing document never curated.
fn is_derived_name(m: &MoveRecord, name: &str, existing: Option<&CharacterDocument>) -> bool {
    if auto_cn_name(m.get("input").unwrap_or_default()).as_deref() == Some(name) {
        return true;
    }
    existing.is_some_and(|doc| {
        !doc.name_cn_map.contains_key(m.id())
            && doc.find_move(m.id()).and_then(|old| old.get("nameCN")) == Some(name)
    })
}

/// Builds a character document from CSV text, keeping every column.
///
/// Names and curation carry over from `existing`: `characterId` and the
/// display names prefer the CSV's metadata lines, then the existing
/// document, then `character_id` (or empty). Curated Chinese move names in
/// the existing `nameCNMap` survive unless the CSV gives a new one; derived
/// names are not added to the map.
pub fn import_csv(
    character_id: &str,
    text: &str,
    existing: Option<&CharacterDocument>,
    last_updated: &str,
) -> Result<CharacterDocument> {
    let CsvTable { meta, header, rows } = parse_csv(text);
    if header.is_empty() {
        return Err(Error::Headerless(character_id.to_string()));
    }
    let columns = dedupe_names(header.iter().map(|h| normalize_header(h)).collect());
    debug!("CSV columns for {}: {:?}", character_id, columns);

    let mut moves: Vec<MoveRecord> = rows
        .iter()
        .map(|row| {
            let mut m: MoveRecord = columns
                .iter()
                .zip(row)
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, cell)| (key.clone(), cell.trim().to_string()))
                .collect();
            if m.contains_key("category") {
                m.set("category", normalize_category(m.get("category")).as_str());
            }
            m
        })
        .collect();
    ensure_unique_ids(&mut moves);

    let mut name_cn_map = existing.map(|doc| doc.name_cn_map.clone()).unwrap_or_default();
    for m in &moves {
        let (id, name) = (m.id(), m.get("nameCN").unwrap_or_default());
        if id.is_empty() || name.is_empty() {
            continue;
        }
        if name_cn_map.contains_key(id) || !is_derived_name(m, name, existing) {
            name_cn_map.insert(id.to_string(), name.to_string());
        }
    }
    for m in &mut moves {
        if m.get("nameCN") == Some("") {
            if let Some(curated) = name_cn_map.get(m.id()).cloned() {
                m.set("nameCN", curated);
            }
        }
    }

    let resolved_id = meta
        .get("characterId")
        .filter(|v| !v.is_empty())
        .cloned()
        .or_else(|| {
            existing
                .map(|doc| doc.character_id.clone())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| character_id.to_string());
    let display_name = |key: &str, stored: fn(&CharacterDocument) -> &String| {
        meta.get(key)
            .cloned()
            .or_else(|| existing.map(|doc| stored(doc).clone()))
            .unwrap_or_default()
    };

    Ok(CharacterDocument {
        character_id: resolved_id,
        display_name_cn: display_name("displayNameCN", |doc| &doc.display_name_cn),
        display_name_en: display_name("displayNameEN", |doc| &doc.display_name_en),
        last_updated: last_updated.to_string(),
        columns: columns.into_iter().filter(|c| !c.is_empty()).collect(),
        name_cn_map,
        moves,
    })
}

pub fn csv_escape(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) || value.starts_with('#') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header plus one line per move over the fixed export columns.
pub fn to_csv(moves: &[MoveRecord]) -> String {
    let mut lines = vec![CANONICAL_COLUMNS.join(",")];
    for m in moves {
        let cells: Vec<String> = CANONICAL_COLUMNS
            .iter()
            .map(|k| csv_escape(m.get(k).unwrap_or_default()))
            .collect();
        lines.push(cells.join(","));
    }
    lines.join("\n") + "\n"
}

/// The round-trip CSV: metadata preamble, a blank line, then the table.
pub fn export_csv(doc: &CharacterDocument) -> String {
    let preamble = [
        META_MARKER.to_string(),
        format!("#characterId={}", doc.character_id),
        format!("#displayNameCN={}", doc.display_name_cn),
        format!("#displayNameEN={}", doc.display_name_en),
        META_NOTE.to_string(),
        String::new(),
    ]
    .join("\n");
    format!("{}\n{}", preamble, to_csv(&doc.moves))
}

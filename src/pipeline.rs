//! File-level import and export jobs for one character or a batch.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::config::Paths;
use crate::csv::{export_csv, import_csv};
use crate::document::CharacterDocument;
use crate::error::{Error, Result};
use crate::upstream::{import_upstream, parse_upstream};

/// UTC date stamped into `lastUpdated`.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// A missing or corrupt document reads as no previous document.
pub fn read_existing(path: &Path) -> Option<CharacterDocument> {
    let text = fs::read_to_string(path).ok()?;
    let doc = CharacterDocument::from_json(&text);
    if doc.is_none() {
        warn!("Ignoring corrupt document {}", path.display());
    }
    doc
}

/// Replaces `path` only once `contents` is fully on disk next to it.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| Error::io(file.path(), e))?;
    file.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::MissingSource(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn write_document(path: &Path, doc: &CharacterDocument) -> Result<()> {
    let json = doc.to_json_pretty()?;
    write_atomic(path, &json)
}

pub fn import_csv_character(paths: &Paths, id: &str, today: &str) -> Result<CharacterDocument> {
    let source = paths.csv_source(id);
    let text = read_source(&source)?;
    let out = paths.document(id);
    let existing = read_existing(&out);
    let doc = import_csv(id, &text, existing.as_ref(), today)?;
    write_document(&out, &doc)?;
    info!("Imported {}: {} moves from {}", id, doc.moves.len(), source.display());
    Ok(doc)
}

pub fn import_upstream_character(
    paths: &Paths,
    id: &str,
    today: &str,
) -> Result<CharacterDocument> {
    let source = paths.upstream_source(id);
    let text = read_source(&source)?;
    let data = parse_upstream(&text).map_err(|e| Error::Toml {
        path: source.clone(),
        source: e,
    })?;
    let out = paths.document(id);
    let existing = read_existing(&out);
    let doc = import_upstream(id, &data, existing.as_ref(), today);
    write_document(&out, &doc)?;
    info!("Imported {}: {} moves from {}", id, doc.moves.len(), source.display());
    Ok(doc)
}

/// Unlike imports, a corrupt document here is an error.
pub fn export_csv_character(paths: &Paths, id: &str) -> Result<()> {
    let source = paths.document(id);
    let text = read_source(&source)?;
    let doc: CharacterDocument = serde_json::from_str(&text)?;
    let out = paths.export(id);
    write_atomic(&out, &export_csv(&doc))?;
    info!("Exported {}: {} moves to {}", id, doc.moves.len(), out.display());
    Ok(())
}

/// Sorted file stems of the `*.<ext>` files in `dir`.
pub fn list_ids(dir: &Path, ext: &str) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(Error::MissingDir(dir.to_path_buf()));
    }
    let mut ids: Vec<String> = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext)))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
        .collect();
    ids.sort();
    Ok(ids)
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs `op` for every id in parallel. One character failing does not stop
/// the others; results keep the order of `ids`.
pub fn run_batch<F>(ids: &[String], op: F) -> BatchSummary
where
    F: Fn(&str) -> Result<()> + Sync,
{
    let results: Vec<(String, Result<()>)> = ids
        .par_iter()
        .map(|id| (id.clone(), op(id)))
        .collect();
    let mut summary = BatchSummary::default();
    for (id, result) in results {
        match result {
            Ok(()) => summary.succeeded.push(id),
            Err(e) => {
                warn!("{} failed: {}", id, e);
                summary.failed.push((id, e));
            }
        }
    }
    summary
}

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::{info, warn};

use crate::document::{CharacterDocument, MoveRecord};
use crate::error::{Error, Result};
use crate::search::{SearchOptions, search};

/// Read side of the generated documents, keyed by character id.
#[derive(Debug, Clone, Default)]
pub struct FrameDataStore {
    documents: IndexMap<String, CharacterDocument>,
}

impl FrameDataStore {
    pub fn from_documents(documents: IndexMap<String, CharacterDocument>) -> FrameDataStore {
        FrameDataStore { documents }
    }

    /// Loads every `*.json` document in `dir`, keyed by file stem. Unreadable
    /// documents are skipped.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<FrameDataStore> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::MissingDir(dir.to_path_buf()));
        }
        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(|e| Error::io(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut documents = IndexMap::new();
        for path in paths {
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            match CharacterDocument::from_json(&text) {
                Some(doc) => {
                    documents.insert(id.to_string(), doc);
                }
                None => warn!("Skipping unreadable document {}", path.display()),
            }
        }
        info!("Loaded {} frame-data documents from {}", documents.len(), dir.display());
        Ok(FrameDataStore { documents })
    }

    pub fn insert(&mut self, id: impl Into<String>, doc: CharacterDocument) {
        self.documents.insert(id.into(), doc);
    }

    pub fn get(&self, id: &str) -> Option<&CharacterDocument> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Moves of a character; empty for an unknown id.
    pub fn moves(&self, id: &str) -> &[MoveRecord] {
        self.get(id).map(|doc| doc.moves.as_slice()).unwrap_or_default()
    }

    pub fn search(&self, id: &str, query: &str, opts: &SearchOptions) -> Vec<&MoveRecord> {
        search(self.moves(id), query, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localize::Lang;

    fn doc(id: &str, moves: &[(&str, &str)]) -> CharacterDocument {
        CharacterDocument {
            character_id: id.to_string(),
            moves: moves
                .iter()
                .map(|(move_id, name)| {
                    [("id", *move_id), ("nameEN", *name)]
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn lookup_and_search() {
        let mut store = FrameDataStore::default();
        store.insert("ryu", doc("ryu", &[("hadoken", "Hadoken"), ("st_lp", "Jab")]));
        assert!(store.contains("ryu"));
        assert_eq!(store.moves("ken").len(), 0);
        let opts = SearchOptions { lang: Lang::En, ..Default::default() };
        let found = store.search("ryu", "hado", &opts);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "hadoken");
        assert!(store.search("ken", "hado", &opts).is_empty());
    }

    #[test]
    fn loads_directory_and_skips_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let ryu = doc("ryu", &[("st_lp", "Jab")]);
        fs::write(dir.path().join("ryu.json"), ryu.to_json_pretty().unwrap()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = FrameDataStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["ryu"]);
        assert_eq!(store.get("ryu"), Some(&ryu));
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            FrameDataStore::load_dir(&missing),
            Err(Error::MissingDir(p)) if p == missing
        ));
    }
}

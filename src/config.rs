use std::path::{Path, PathBuf};

/// Where the pipeline reads sources and writes outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Hand-edited `<id>.csv` files.
    pub csv_dir: PathBuf,
    /// Third-party `<id>.toml` files.
    pub upstream_dir: PathBuf,
    /// Generated `<id>.json` documents.
    pub json_dir: PathBuf,
    /// Round-trip CSV exports.
    pub export_dir: PathBuf,
}

impl Paths {
    /// The default layout of a checkout rooted at `root`.
    pub fn under<P: AsRef<Path>>(root: P) -> Paths {
        let root = root.as_ref();
        Paths {
            csv_dir: root.join("src").join("data").join("sf6_data"),
            upstream_dir: root.join("vendor").join("sf6-move-data").join("moves"),
            json_dir: root.join("src").join("data").join("frameData"),
            export_dir: root.join("csv"),
        }
    }

    pub fn with_overrides(
        mut self,
        csv_dir: Option<PathBuf>,
        upstream_dir: Option<PathBuf>,
        json_dir: Option<PathBuf>,
        export_dir: Option<PathBuf>,
    ) -> Paths {
        if let Some(dir) = csv_dir {
            self.csv_dir = dir;
        }
        if let Some(dir) = upstream_dir {
            self.upstream_dir = dir;
        }
        if let Some(dir) = json_dir {
            self.json_dir = dir;
        }
        if let Some(dir) = export_dir {
            self.export_dir = dir;
        }
        self
    }

    pub fn csv_source(&self, id: &str) -> PathBuf {
        self.csv_dir.join(format!("{}.csv", id))
    }

    pub fn upstream_source(&self, id: &str) -> PathBuf {
        self.upstream_dir.join(format!("{}.toml", id))
    }

    pub fn document(&self, id: &str) -> PathBuf {
        self.json_dir.join(format!("{}.json", id))
    }

    pub fn export(&self, id: &str) -> PathBuf {
        self.export_dir.join(format!("{}.csv", id))
    }
}

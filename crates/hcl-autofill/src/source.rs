//! pluggable collections of configuration files
//!
//! A [FileSource] only has to enumerate its files and hand out their contents. The
//! [crate::store::ResourceStore] does the parsing.
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub trait FileSource {
    /// Paths of all configuration files, in the order they should take precedence
    fn files(&self) -> std::io::Result<Vec<PathBuf>>;

    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// Configuration files below a directory on disk
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions.to_vec(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_config_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| *wanted == ext))
    }
}

impl FileSource for DirectorySource {
    fn files(&self) -> std::io::Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            ));
        }

        // .terraform holds downloaded modules and providers, not our configuration
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".terraform");

        let mut files = vec![];
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(%err, "skipping unreadable directory entry");
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_config_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Configuration files held in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: IndexMap<PathBuf, String>,
}

impl MemorySource {
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl<P: Into<PathBuf>, C: Into<String>> FromIterator<(P, C)> for MemorySource {
    fn from_iter<T: IntoIterator<Item = (P, C)>>(iter: T) -> Self {
        let mut source = MemorySource::default();
        for (path, contents) in iter {
            source.insert(path, contents);
        }
        source
    }
}

impl FileSource for MemorySource {
    fn files(&self) -> std::io::Result<Vec<PathBuf>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}

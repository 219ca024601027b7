//! index of resource definitions found in a collection of configuration files
//!
//! [ResourceStore] is built once and read afterwards. It owns all of its data, so a shared
//! `&ResourceStore` can serve any number of concurrent auto-fill calls.
//!
//! Each file is parsed with [hcl_edit], which keeps track of where every block starts and ends.
//! That lets us hand out the block exactly as it was written, comments and formatting included.
use crate::config::AutoFillConfig;
use crate::identifier::{ResourceDefinition, ResourceIdentifier};
use crate::source::FileSource;
use hcl_edit::structure::{Block, Structure};
use hcl_edit::Span;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Retrieve a definition by identifier
pub trait ResourceLookup {
    fn lookup(&self, id: &ResourceIdentifier) -> Option<&ResourceDefinition>;
}

#[derive(Debug)]
pub struct ResourceStore {
    definition_block: String,
    definitions: IndexMap<ResourceIdentifier, ResourceDefinition>,
    skipped: Vec<StoreReadError>,
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new(&AutoFillConfig::default())
    }
}

impl ResourceStore {
    pub fn new(config: &AutoFillConfig) -> Self {
        Self {
            definition_block: config.definition_block.clone(),
            definitions: Default::default(),
            skipped: Default::default(),
        }
    }

    /// Indexes every file of `source`
    ///
    /// Files that cannot be read or parsed are skipped and remembered (see [Self::skipped]).
    /// Fails only if the source cannot list its files.
    pub fn load(&mut self, source: &dyn FileSource) -> Result<usize, LoadError> {
        let mut added = 0;

        for path in source.files()? {
            tracing::info!(path=%path.display(), "loading file");

            let text = match source.read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    self.skip(StoreReadError::IoError(path, err));
                    continue;
                }
            };

            match self.insert_document(&text, Some(path)) {
                Ok(count) => added += count,
                Err(err) => self.skip(err),
            }
        }

        Ok(added)
    }

    /// Indexes the definition blocks of a single document
    ///
    /// Returns the number of definitions added. A definition for an identifier that is already
    /// known is ignored; the first one wins.
    pub fn insert_document(
        &mut self,
        text: &str,
        source: Option<PathBuf>,
    ) -> Result<usize, StoreReadError> {
        let body = hcl_edit::parser::parse_body(text)
            .map_err(|err| StoreReadError::HclParseFailed(source.clone(), err))?;

        let mut added = 0;
        for structure in body.iter() {
            let Structure::Block(block) = structure else {
                continue;
            };

            if block.ident.value().as_str() != self.definition_block {
                continue;
            }

            let [resource_type, name] = block.labels.as_slice() else {
                tracing::debug!(
                    source=?source,
                    labels=block.labels.len(),
                    "ignoring definition block without exactly two labels"
                );
                continue;
            };

            let id = ResourceIdentifier::new(resource_type.as_str(), name.as_str());
            if let Some(existing) = self.definitions.get(&id) {
                tracing::warn!(
                    %id,
                    existing=?existing.source(),
                    duplicate=?source,
                    "duplicate definition ignored"
                );
                continue;
            }

            let Some(verbatim) = block_text(text, block) else {
                tracing::warn!(%id, source=?source, "definition block without source span ignored");
                continue;
            };

            let definition = ResourceDefinition::new(id.clone(), verbatim, source.clone());
            tracing::trace!(%id, "indexed");
            self.definitions.insert(id, definition);
            added += 1;
        }

        Ok(added)
    }

    fn skip(&mut self, err: StoreReadError) {
        tracing::warn!(error=%err, cause=%err.cause(), "skipping file");
        self.skipped.push(err);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// All definitions, in the order they were indexed
    pub fn definitions(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.definitions.values()
    }

    /// Files that were skipped while loading
    pub fn skipped(&self) -> &[StoreReadError] {
        &self.skipped
    }
}

impl ResourceLookup for ResourceStore {
    fn lookup(&self, id: &ResourceIdentifier) -> Option<&ResourceDefinition> {
        self.definitions.get(id)
    }
}

/// The block as written in `text`
///
/// Parsed blocks always carry a span; `None` means the span does not fit `text`.
fn block_text(text: &str, block: &Block) -> Option<String> {
    block
        .span()
        .and_then(|span| text.get(span))
        .map(|slice| slice.trim().to_string())
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Unable to list configuration files")]
    IoError(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreReadError {
    #[error("Unable to read {}", .0.display())]
    IoError(PathBuf, #[source] std::io::Error),
    #[error("Unable to parse hcl file {}", display_source(.0))]
    HclParseFailed(Option<PathBuf>, #[source] hcl_edit::parser::Error),
}

impl StoreReadError {
    pub fn path(&self) -> Option<&Path> {
        match self {
            StoreReadError::IoError(path, _) => Some(path),
            StoreReadError::HclParseFailed(path, _) => path.as_deref(),
        }
    }

    fn cause(&self) -> String {
        match self {
            StoreReadError::IoError(_, err) => err.to_string(),
            StoreReadError::HclParseFailed(_, err) => err.to_string(),
        }
    }
}

fn display_source(source: &Option<PathBuf>) -> String {
    source
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<memory>".to_string())
}

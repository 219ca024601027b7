//! configuration
//!
//! All settings have defaults that match plain terraform, so an empty file (or no file at all)
//! is a valid configuration. Files are written in HCL:
//!
//! ```hcl
//! definition_block = "resource"
//! max_passes       = 64
//!
//! references {
//!   allowed_prefixes = ["aws_"]
//! }
//!
//! store {
//!   extensions = ["tf"]
//! }
//! ```
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AutoFillConfig {
    /// Block keyword that introduces a `<keyword> "<type>" "<name>" {}` definition
    ///
    /// `resource` blocks are referenced as `<type>.<name>`, any other keyword as
    /// `<keyword>.<type>.<name>`. Set to `data` to fill data sources instead.
    pub definition_block: String,

    /// Upper bound for resolution passes per fragment
    ///
    /// Unbounded when unset. Resolution always terminates on its own; this guards against
    /// pathologically large stores.
    pub max_passes: Option<usize>,

    pub references: ReferencePolicy,

    pub store: StoreConfig,
}

impl Default for AutoFillConfig {
    fn default() -> Self {
        Self {
            definition_block: "resource".to_string(),
            max_passes: None,
            references: Default::default(),
            store: Default::default(),
        }
    }
}

impl AutoFillConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!(path=%path.display(), "loading config");
        let contents = std::fs::read_to_string(path)?;
        Ok(contents.parse()?)
    }
}

impl std::str::FromStr for AutoFillConfig {
    type Err = hcl::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hcl::from_str(s)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse config file")]
    ParseFailed(#[from] hcl::Error),
}

/// Decides which `<type>.<name>` traversals are resource references
///
/// Terraform reserves a handful of root names (`var.region`, `local.tags`, `each.value`, ...);
/// every other root is treated as a resource type. The allow-lists narrow this down further.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReferencePolicy {
    /// Roots that are never resource types
    pub reserved_namespaces: Vec<String>,

    /// Exact resource types to accept
    pub allowed_types: Vec<String>,

    /// Resource type prefixes to accept, usually the provider name (`aws_`)
    pub allowed_prefixes: Vec<String>,
}

impl Default for ReferencePolicy {
    fn default() -> Self {
        Self {
            reserved_namespaces: [
                "var",
                "local",
                "data",
                "module",
                "each",
                "count",
                "self",
                "path",
                "terraform",
            ]
            .map(String::from)
            .to_vec(),
            allowed_types: vec![],
            allowed_prefixes: vec![],
        }
    }
}

impl ReferencePolicy {
    pub fn is_resource_type(&self, root: &str) -> bool {
        if self.reserved_namespaces.iter().any(|ns| ns == root) {
            return false;
        }

        if self.allowed_types.is_empty() && self.allowed_prefixes.is_empty() {
            return true;
        }

        self.allowed_types.iter().any(|t| t == root)
            || self
                .allowed_prefixes
                .iter()
                .any(|prefix| root.starts_with(prefix.as_str()))
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// File extensions (without dot) considered part of the configuration tree
    pub extensions: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["tf".to_string()],
        }
    }
}

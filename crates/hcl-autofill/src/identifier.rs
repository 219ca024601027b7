//! resource identifiers and definitions
use std::path::{Path, PathBuf};

/// A `(type, name)` pair naming one resource definition block
///
/// `resource "aws_route53_zone" "example" {}` is identified by `aws_route53_zone.example`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct ResourceIdentifier {
    pub resource_type: String,
    pub name: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

impl std::str::FromStr for ResourceIdentifier {
    type Err = ParseIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((resource_type, name)) = s.split_once('.') else {
            return Err(ParseIdentifierError(s.to_string()));
        };

        if resource_type.is_empty() || name.is_empty() || name.contains('.') {
            return Err(ParseIdentifierError(s.to_string()));
        }

        Ok(Self::new(resource_type, name))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("expected <type>.<name>, got {0:?}")]
pub struct ParseIdentifierError(String);

/// Verbatim text of a definition block as found in its source file
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResourceDefinition {
    id: ResourceIdentifier,
    text: String,
    source: Option<PathBuf>,
}

impl ResourceDefinition {
    pub(crate) fn new(id: ResourceIdentifier, text: String, source: Option<PathBuf>) -> Self {
        Self { id, text, source }
    }

    pub fn id(&self) -> &ResourceIdentifier {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_and_parse() {
        let id: ResourceIdentifier = "aws_route53_zone.example".parse().unwrap();
        assert_eq!(id, ResourceIdentifier::new("aws_route53_zone", "example"));
        assert_eq!(id.to_string(), "aws_route53_zone.example");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("no_dot".parse::<ResourceIdentifier>().is_err());
        assert!(".name".parse::<ResourceIdentifier>().is_err());
        assert!("type.".parse::<ResourceIdentifier>().is_err());
        assert!("a.b.c".parse::<ResourceIdentifier>().is_err());
    }
}

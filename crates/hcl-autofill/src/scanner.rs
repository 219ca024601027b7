//! extract resource references from configuration text
use crate::config::{AutoFillConfig, ReferencePolicy};
use crate::identifier::ResourceIdentifier;
use crate::visit::{Scope, VisitTraversals};
use hcl::{Expression, Traversal, TraversalOperator};
use indexmap::IndexSet;

/// Managed resources are referenced as `<type>.<name>`; every other definition block as
/// `<block>.<type>.<name>` (`data.aws_ami.ubuntu`)
const MANAGED_RESOURCE_BLOCK: &str = "resource";

/// Finds resource definitions and resource references in HCL text
#[derive(Debug, Clone)]
pub struct ReferenceScanner {
    definition_block: String,
    policy: ReferencePolicy,
}

impl Default for ReferenceScanner {
    fn default() -> Self {
        Self::new(&AutoFillConfig::default())
    }
}

impl ReferenceScanner {
    pub fn new(config: &AutoFillConfig) -> Self {
        Self {
            definition_block: config.definition_block.clone(),
            policy: config.references.clone(),
        }
    }

    pub fn with_policy(mut self, policy: ReferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub fn scan(&self, text: &str) -> Result<Scan, ScanError> {
        let body = hcl::parse(text).map_err(ScanError::ParseFailed)?;

        let defined: IndexSet<ResourceIdentifier> = body
            .blocks()
            .filter(|block| block.identifier.as_str() == self.definition_block)
            .filter_map(|block| match block.labels.as_slice() {
                [resource_type, name] => Some(ResourceIdentifier::new(
                    resource_type.as_str(),
                    name.as_str(),
                )),
                _ => None,
            })
            .collect();

        let mut referenced = IndexSet::new();
        let mut collector = |traversal: &Traversal, scope: &Scope| {
            let Some(id) = self.reference_of(traversal, scope) else {
                return;
            };
            if !defined.contains(&id) {
                referenced.insert(id);
            }
        };
        body.visit_traversals(&mut collector, &mut Scope::default())
            .map_err(ScanError::TemplateParseFailed)?;

        tracing::trace!(?defined, ?referenced, "scanned");
        Ok(Scan {
            defined,
            referenced,
        })
    }

    /// Resources referenced but not defined in `text`, in order of first appearance
    pub fn references(&self, text: &str) -> Result<IndexSet<ResourceIdentifier>, ScanError> {
        self.scan(text).map(|scan| scan.referenced)
    }

    fn reference_of(&self, traversal: &Traversal, scope: &Scope) -> Option<ResourceIdentifier> {
        let Expression::Variable(root) = &traversal.expr else {
            return None;
        };

        if scope.is_bound(root.as_str()) {
            return None;
        }

        let mut path = traversal.operators.iter().map_while(|operator| match operator {
            TraversalOperator::GetAttr(ident) => Some(ident.as_str()),
            _ => None,
        });

        let (resource_type, name) = if self.definition_block == MANAGED_RESOURCE_BLOCK {
            (root.as_str(), path.next()?)
        } else if root.as_str() == self.definition_block {
            (path.next()?, path.next()?)
        } else {
            return None;
        };

        if !self.policy.is_resource_type(resource_type) {
            return None;
        }

        Some(ResourceIdentifier::new(resource_type, name))
    }
}

/// Outcome of scanning one text
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
pub struct Scan {
    /// Resources defined by top level blocks
    pub defined: IndexSet<ResourceIdentifier>,
    /// Resources referenced somewhere in an expression, excluding those in `defined`
    pub referenced: IndexSet<ResourceIdentifier>,
}

#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("Unable to parse configuration text")]
    ParseFailed(#[source] hcl::Error),
    #[error("Unable to parse template expression")]
    TemplateParseFailed(#[source] hcl::Error),
}

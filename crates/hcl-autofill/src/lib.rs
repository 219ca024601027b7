//! # hcl-autofill - self-contained terraform fragments
//!
//! A snippet of terraform configuration often refers to resources that are defined somewhere
//! else in the same repository:
//!
//! ```hcl
//! resource "aws_route53_record" "example" {
//!   zone_id = aws_route53_zone.example.zone_id
//! }
//! ```
//!
//! On its own this snippet can't be converted or validated since `aws_route53_zone.example`
//! is unknown. `hcl-autofill` finds the missing definitions in a configuration tree and
//! appends them to the snippet.
//!
//! ## Introduction for developers
//!
//! ### Terms
//!
//! - a `fragment` is the text we are asked to complete
//! - a `resource identifier` ([identifier::ResourceIdentifier]) is the `(type, name)` pair of a
//!   `resource "<type>" "<name>" {}` block
//! - a `reference` is a traversal `<type>.<name>...` inside any expression
//! - the `store` ([store::ResourceStore]) indexes all definition blocks of a configuration tree
//!
//! ### Scanning
//!
//! see [scanner::ReferenceScanner::scan]
//!
//! The text is parsed with [hcl::parse]. We walk every expression (see [visit]) and collect the
//! traversals that look like resource references. Roots that terraform reserves (`var`, `local`,
//! `each`, ...) and names bound by for-expressions or `dynamic` blocks are ignored. The policy
//! deciding what counts as a resource type lives in [config::ReferencePolicy].
//!
//! ### Loading the store
//!
//! see [store::ResourceStore::load]
//!
//! Files come from a [source::FileSource]: a directory on disk or an in-memory collection. Each
//! file is parsed with [hcl_edit] so the original text of every block can be recovered. Broken
//! files are skipped, they never prevent lookups of unrelated resources.
//!
//! ### Filling
//!
//! see [autofill::AutoFiller::fill]
//!
//! **Example**
//!
//! Store:
//!
//! ```hcl
//! resource "a" "x" { peer = b.y.id }
//! resource "b" "y" {}
//! ```
//!
//! | **pass** | **referenced** | **defined** | **action**      |
//! |----------|----------------|-------------|-----------------|
//! | 1        | `a.x`          |             | append `a.x`    |
//! | 2        | `b.y`          | `a.x`       | append `b.y`    |
//! | 3        |                | `a.x, b.y`  | done            |
//!
//! References the store doesn't know are remembered as unresolvable and skipped from then on,
//! so every pass either appends something new or ends the loop.
//!
//! ### Output
//!
//! The original fragment, byte for byte, followed by the injected blocks in the order they
//! were discovered. Each block is separated by a blank line.
//!
pub mod autofill;
pub mod config;
pub mod converter;
pub mod identifier;
pub mod scanner;
pub mod source;
pub mod store;
mod visit;

pub use autofill::{auto_fill, AutoFiller};
pub use identifier::{ResourceDefinition, ResourceIdentifier};
pub use store::{ResourceLookup, ResourceStore};

//! inject missing resource definitions into a fragment until it is self-contained
use crate::config::AutoFillConfig;
use crate::identifier::{ResourceDefinition, ResourceIdentifier};
use crate::scanner::{ReferenceScanner, ScanError};
use crate::store::ResourceLookup;
use indexmap::IndexSet;
use std::collections::HashSet;

/// Fill `fragment` from `store` using the default configuration
///
/// See [AutoFiller::fill].
pub fn auto_fill(store: &impl ResourceLookup, fragment: &str) -> Result<String, ScanError> {
    AutoFiller::default().fill(store, fragment)
}

#[derive(Debug, Clone, Default)]
pub struct AutoFiller {
    scanner: ReferenceScanner,
    max_passes: Option<usize>,
}

impl AutoFiller {
    pub fn new(config: &AutoFillConfig) -> Self {
        Self {
            scanner: ReferenceScanner::new(config),
            max_passes: config.max_passes,
        }
    }

    pub fn with_scanner(mut self, scanner: ReferenceScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Appends the definition of every resource `fragment` references but does not define
    ///
    /// Injected definitions are scanned as well, so their own references get resolved in a
    /// following pass. References the store cannot resolve are left as they are.
    ///
    /// The fragment is always a prefix of the result. Fails only if the text can't be parsed.
    pub fn fill(
        &self,
        store: &impl ResourceLookup,
        fragment: &str,
    ) -> Result<String, ScanError> {
        self.fill_counting_passes(store, fragment)
            .map(|(fragment, _passes)| fragment.into_text())
    }

    #[tracing::instrument(level = "debug", skip_all)]
    fn fill_counting_passes(
        &self,
        store: &impl ResourceLookup,
        fragment: &str,
    ) -> Result<(ConfigFragment, usize), ScanError> {
        let mut fragment = ConfigFragment::new(fragment);
        let mut defined: IndexSet<ResourceIdentifier> = IndexSet::new();
        let mut unresolvable: HashSet<ResourceIdentifier> = HashSet::new();
        let mut passes = 0;

        loop {
            if self.max_passes.is_some_and(|max| passes >= max) {
                tracing::warn!(passes, "pass limit reached, returning partially filled fragment");
                break;
            }
            passes += 1;

            let scan = self.scanner.scan(fragment.text())?;
            defined.extend(scan.defined);

            let missing: Vec<_> = scan
                .referenced
                .into_iter()
                .filter(|id| !defined.contains(id) && !unresolvable.contains(id))
                .collect();

            if missing.is_empty() {
                tracing::debug!(passes, "fixed point reached");
                break;
            }

            let mut resolved = 0;
            for id in missing {
                match store.lookup(&id) {
                    Some(definition) => {
                        tracing::debug!(%id, source=?definition.source(), "injecting definition");
                        fragment.inject(definition);
                        defined.insert(id);
                        resolved += 1;
                    }
                    None => {
                        tracing::debug!(%id, "no definition found");
                        unresolvable.insert(id);
                    }
                }
            }

            if resolved == 0 {
                tracing::debug!(passes, unresolved=unresolvable.len(), "nothing left to resolve");
                break;
            }
        }

        Ok((fragment, passes))
    }
}

/// The caller's fragment followed by the definitions injected so far
#[derive(Debug)]
struct ConfigFragment {
    /// Always starts with the caller's fragment, byte for byte
    text: String,
    /// Definitions appended to `text`, in injection order
    injected: Vec<ResourceIdentifier>,
}

impl ConfigFragment {
    fn new(fragment: &str) -> Self {
        Self {
            text: fragment.to_string(),
            injected: vec![],
        }
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn inject(&mut self, definition: &ResourceDefinition) {
        debug_assert!(
            !self.injected.contains(definition.id()),
            "{} injected twice",
            definition.id()
        );

        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push('\n');
        self.text.push_str(definition.text());
        self.text.push('\n');

        self.injected.push(definition.id().clone());
    }

    fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::ResourceStore;
    use pretty_assertions::assert_eq;

    fn store(documents: &[&str]) -> ResourceStore {
        let mut store = ResourceStore::default();
        for document in documents {
            store.insert_document(document, None).unwrap();
        }
        store
    }

    fn injected(filled: &ConfigFragment) -> String {
        filled
            .injected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[test]
    fn transitive_definitions() {
        let store = store(&[
            "resource \"a\" \"x\" {\n  peer = b.y.id\n}",
            "resource \"b\" \"y\" {}",
        ]);

        let (filled, passes) = AutoFiller::default()
            .fill_counting_passes(&store, "value = a.x.id\n")
            .unwrap();

        assert_eq!(
            filled.text(),
            "value = a.x.id\n\nresource \"a\" \"x\" {\n  peer = b.y.id\n}\n\nresource \"b\" \"y\" {}\n"
        );
        insta::assert_snapshot!(injected(&filled), @"a.x, b.y");
        assert_eq!(passes, 3);
    }

    #[test]
    fn mutual_references() {
        let store = store(&[
            "resource \"a\" \"x\" {\n  peer = b.y.id\n}",
            "resource \"b\" \"y\" {\n  peer = a.x.id\n}",
        ]);

        let (filled, _) = AutoFiller::default()
            .fill_counting_passes(&store, "value = b.y.id")
            .unwrap();

        insta::assert_snapshot!(injected(&filled), @"b.y, a.x");
    }

    #[test]
    fn unresolvable_reference_stops_after_one_pass() {
        let (filled, passes) = AutoFiller::default()
            .fill_counting_passes(&store(&[]), "value = foo.bar.id")
            .unwrap();

        assert_eq!(filled.text(), "value = foo.bar.id");
        assert_eq!(passes, 1);
    }

    #[test]
    fn unresolvable_reference_next_to_resolvable_ones() {
        let store = store(&["resource \"a\" \"x\" {\n  peer = missing.one.id\n}"]);

        let (filled, passes) = AutoFiller::default()
            .fill_counting_passes(&store, "value = [missing.two.id, a.x.id]")
            .unwrap();

        insta::assert_snapshot!(injected(&filled), @"a.x");
        assert_eq!(passes, 2);
    }

    #[test]
    fn passes_are_bounded_by_store_size() {
        // a chain of four definitions, each referring to the next
        let documents = [
            "resource \"n\" \"one\" { next = n.two.id }",
            "resource \"n\" \"two\" { next = n.three.id }",
            "resource \"n\" \"three\" { next = n.four.id }",
            "resource \"n\" \"four\" {}",
        ];
        let store = store(&documents);

        let (filled, passes) = AutoFiller::default()
            .fill_counting_passes(&store, "value = n.one.id")
            .unwrap();

        assert_eq!(filled.injected.len(), 4);
        assert!(passes <= documents.len() + 1);
    }

    #[test]
    fn pass_limit() {
        let store = store(&[
            "resource \"n\" \"one\" { next = n.two.id }",
            "resource \"n\" \"two\" {}",
        ]);
        let config = AutoFillConfig {
            max_passes: Some(1),
            ..Default::default()
        };

        let (filled, passes) = AutoFiller::new(&config)
            .fill_counting_passes(&store, "value = n.one.id")
            .unwrap();

        insta::assert_snapshot!(injected(&filled), @"n.one");
        assert_eq!(passes, 1);
    }

    #[test]
    fn injected_policy_limits_references() {
        let store = store(&[
            "resource \"aws_vpc\" \"main\" {}",
            "resource \"random_id\" \"suffix\" {}",
        ]);
        let scanner = ReferenceScanner::default().with_policy(crate::config::ReferencePolicy {
            allowed_prefixes: vec!["aws_".to_string()],
            ..Default::default()
        });

        let (filled, _) = AutoFiller::default()
            .with_scanner(scanner)
            .fill_counting_passes(&store, "a = aws_vpc.main.id\nb = random_id.suffix.hex")
            .unwrap();

        insta::assert_snapshot!(injected(&filled), @"aws_vpc.main");
    }

    #[test]
    fn references_behind_unary_operators_are_filled() {
        let store = store(&[
            "resource \"aws_lb\" \"x\" {\n  internal = true\n}",
            "resource \"aws_y\" \"z\" {\n  n = 1\n}",
        ]);

        let (filled, _) = AutoFiller::default()
            .fill_counting_passes(&store, "a = !aws_lb.x.internal\nb = -aws_y.z.n\n")
            .unwrap();

        insta::assert_snapshot!(injected(&filled), @"aws_lb.x, aws_y.z");
        assert_eq!(
            filled.text(),
            "a = !aws_lb.x.internal\nb = -aws_y.z.n\n\nresource \"aws_lb\" \"x\" {\n  internal = true\n}\n\nresource \"aws_y\" \"z\" {\n  n = 1\n}\n"
        );
    }

    #[test]
    fn data_sources_are_filled() {
        let config = AutoFillConfig {
            definition_block: "data".to_string(),
            ..Default::default()
        };
        let mut store = ResourceStore::new(&config);
        store
            .insert_document(
                "data \"aws_ami\" \"ubuntu\" {\n  most_recent = true\n}\nresource \"aws_vpc\" \"main\" {}",
                None,
            )
            .unwrap();

        let filled = AutoFiller::new(&config)
            .fill(&store, "ami = data.aws_ami.ubuntu.id\nvpc = aws_vpc.main.id\n")
            .unwrap();

        assert_eq!(
            filled,
            "ami = data.aws_ami.ubuntu.id\nvpc = aws_vpc.main.id\n\ndata \"aws_ami\" \"ubuntu\" {\n  most_recent = true\n}\n"
        );
        assert_eq!(AutoFiller::new(&config).fill(&store, &filled).unwrap(), filled);
    }

    #[test]
    fn empty_fragment() {
        assert_eq!(auto_fill(&store(&[]), "").unwrap(), "");
    }

    #[test]
    fn parse_failure_is_an_error() {
        assert!(auto_fill(&store(&[]), "resource \"a\" {").is_err());
    }
}

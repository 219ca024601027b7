//! visitor pattern helpers
mod visit_traversals;
pub use visit_traversals::VisitTraversals;

/// Visitor that receives its subjects together with the names bound around them
pub trait Visit<T> {
    fn visit(&mut self, value: &T, scope: &Scope);
}

// blanket impl for FnMut
impl<T, F> Visit<T> for F
where
    F: FnMut(&T, &Scope),
{
    fn visit(&mut self, value: &T, scope: &Scope) {
        self(value, scope)
    }
}

/// Names introduced by enclosing for-expressions, template `for` directives and `dynamic` blocks
///
/// A traversal rooted at a bound name (`dvo.domain_name` inside `for dvo in ...`) refers to the
/// iteration variable and not to anything defined at the top level.
#[derive(Debug, Default)]
pub struct Scope {
    bound: Vec<String>,
}

impl Scope {
    pub fn is_bound(&self, name: &str) -> bool {
        self.bound.iter().any(|bound| bound == name)
    }

    /// Runs `f` with `names` bound, unbinding them afterwards
    pub fn scoped<'n, R>(
        &mut self,
        names: impl IntoIterator<Item = &'n str>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let depth = self.bound.len();
        self.bound.extend(names.into_iter().map(str::to_string));
        let result = f(self);
        self.bound.truncate(depth);
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scoped_names_are_released() {
        let mut scope = Scope::default();

        let inner = scope.scoped(["key", "value"], |scope| {
            scope.scoped(["nested"], |scope| scope.is_bound("key") && scope.is_bound("nested"))
        });

        assert!(inner);
        assert!(!scope.is_bound("key"));
        assert!(!scope.is_bound("nested"));
    }
}

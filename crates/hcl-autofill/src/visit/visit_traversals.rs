use super::{Scope, Visit};
use hcl::{
    template::{Directive, Element},
    Block, Body, Expression, ObjectKey, Operation, Structure, Template, Traversal,
    TraversalOperator,
};

/// Recursively visit all [hcl::Traversal]s
///
/// Fails only if an embedded template cannot be parsed.
pub trait VisitTraversals {
    fn visit_traversals(
        &self,
        visitor: &mut dyn Visit<Traversal>,
        scope: &mut Scope,
    ) -> Result<(), hcl::Error>;
}

impl VisitTraversals for Body {
    fn visit_traversals(
        &self,
        visitor: &mut dyn Visit<Traversal>,
        scope: &mut Scope,
    ) -> Result<(), hcl::Error> {
        for structure in self.iter() {
            match structure {
                Structure::Attribute(attr) => attr.expr.visit_traversals(visitor, scope)?,
                Structure::Block(block) => block.visit_traversals(visitor, scope)?,
            }
        }

        Ok(())
    }
}

impl VisitTraversals for Block {
    fn visit_traversals(
        &self,
        visitor: &mut dyn Visit<Traversal>,
        scope: &mut Scope,
    ) -> Result<(), hcl::Error> {
        if self.identifier.as_str() != "dynamic" {
            return self.body.visit_traversals(visitor, scope);
        }

        // `dynamic "ingress" { ... }` binds `ingress` unless an `iterator` is given
        let iterator = self
            .body
            .attributes()
            .find(|attr| attr.key.as_str() == "iterator")
            .and_then(|attr| match &attr.expr {
                Expression::Variable(var) => Some(var.as_str()),
                _ => None,
            })
            .or_else(|| self.labels.first().map(|label| label.as_str()));

        scope.scoped(iterator, |scope| self.body.visit_traversals(visitor, scope))
    }
}

impl VisitTraversals for Expression {
    fn visit_traversals(
        &self,
        visitor: &mut dyn Visit<Traversal>,
        scope: &mut Scope,
    ) -> Result<(), hcl::Error> {
        match self {
            Expression::Traversal(traversal) => {
                match lift_unary_operand(traversal) {
                    Some(lifted) => visitor.visit(&lifted, scope),
                    None => visitor.visit(traversal, scope),
                }
                traversal.expr.visit_traversals(visitor, scope)?;
                for operator in &traversal.operators {
                    if let TraversalOperator::Index(index) = operator {
                        index.visit_traversals(visitor, scope)?;
                    }
                }
            }
            Expression::Array(array) => {
                for expr in array {
                    expr.visit_traversals(visitor, scope)?;
                }
            }
            Expression::Object(object) => {
                for (key, value) in object.iter() {
                    if let ObjectKey::Expression(key) = key {
                        key.visit_traversals(visitor, scope)?;
                    }
                    value.visit_traversals(visitor, scope)?;
                }
            }
            Expression::TemplateExpr(template_expr) => {
                let template = Template::from_expr(template_expr)?;
                template.visit_traversals(visitor, scope)?;
            }
            Expression::FuncCall(func_call) => {
                for arg in &func_call.args {
                    arg.visit_traversals(visitor, scope)?;
                }
            }
            Expression::Parenthesis(expr) => {
                expr.visit_traversals(visitor, scope)?;
            }
            Expression::Conditional(cond) => {
                cond.cond_expr.visit_traversals(visitor, scope)?;
                cond.true_expr.visit_traversals(visitor, scope)?;
                cond.false_expr.visit_traversals(visitor, scope)?;
            }
            Expression::Operation(operation) => match operation.as_ref() {
                Operation::Binary(binop) => {
                    binop.lhs_expr.visit_traversals(visitor, scope)?;
                    binop.rhs_expr.visit_traversals(visitor, scope)?;
                }
                Operation::Unary(unop) => {
                    unop.expr.visit_traversals(visitor, scope)?;
                }
            },
            Expression::ForExpr(forexpr) => {
                // the collection is evaluated outside of the loop variables
                forexpr.collection_expr.visit_traversals(visitor, scope)?;

                let bound = forexpr
                    .key_var
                    .iter()
                    .chain(std::iter::once(&forexpr.value_var))
                    .map(|ident| ident.as_str());

                scope.scoped(bound, |scope| {
                    if let Some(key_expr) = &forexpr.key_expr {
                        key_expr.visit_traversals(visitor, scope)?;
                    }
                    forexpr.value_expr.visit_traversals(visitor, scope)?;
                    if let Some(cond_expr) = &forexpr.cond_expr {
                        cond_expr.visit_traversals(visitor, scope)?;
                    }
                    Ok::<_, hcl::Error>(())
                })?;
            }
            _ => {}
        }

        Ok(())
    }
}

/// The parser reads `!a.b` as `(!a).b`: a traversal whose root is a unary operation
///
/// Returns the traversal `a.b` in that case so visitors see the variable as root.
fn lift_unary_operand(traversal: &Traversal) -> Option<Traversal> {
    let Expression::Operation(operation) = &traversal.expr else {
        return None;
    };
    let Operation::Unary(unop) = operation.as_ref() else {
        return None;
    };
    let Expression::Variable(_) = &unop.expr else {
        return None;
    };

    Some(Traversal::new(unop.expr.clone(), traversal.operators.clone()))
}

impl VisitTraversals for Template {
    fn visit_traversals(
        &self,
        visitor: &mut dyn Visit<Traversal>,
        scope: &mut Scope,
    ) -> Result<(), hcl::Error> {
        for element in self.elements() {
            match element {
                Element::Interpolation(interpolation) => {
                    interpolation.expr.visit_traversals(visitor, scope)?;
                }
                Element::Directive(directive) => match directive {
                    Directive::If(ifdir) => {
                        ifdir.cond_expr.visit_traversals(visitor, scope)?;
                        ifdir.true_template.visit_traversals(visitor, scope)?;
                        if let Some(false_template) = &ifdir.false_template {
                            false_template.visit_traversals(visitor, scope)?;
                        }
                    }
                    Directive::For(fordir) => {
                        fordir.collection_expr.visit_traversals(visitor, scope)?;

                        let bound = fordir
                            .key_var
                            .iter()
                            .chain(std::iter::once(&fordir.value_var))
                            .map(|ident| ident.as_str());

                        scope.scoped(bound, |scope| {
                            fordir.template.visit_traversals(visitor, scope)
                        })?;
                    }
                },
                Element::Literal(_) => {}
            }
        }

        Ok(())
    }
}

use crate::{
    ast::{parse, Group, Node, Variable},
    config::Lookup,
    convert,
    error::{EvalError, ParseError},
    eval,
    value::Constant,
};
use core::{fmt, str::FromStr};

///
/// A parsed value expression.
///
/// Parsing happens once, eagerly; a value of this type is always well formed.
/// Evaluation reads the tree without changing it, so an expression can be
/// evaluated any number of times, and from several threads at once.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Group,
}

impl Expression {
    #[allow(clippy::missing_errors_doc)]
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let root = parse::parse(source)?;
        tracing::debug!(nodes = root.len(), "parsed");

        Ok(Self {
            source: source.to_owned(),
            root,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn root(&self) -> &Group {
        &self.root
    }

    ///
    /// A single literal or variable, with no operators or groups.
    ///
    #[must_use]
    pub fn is_simple(&self) -> bool {
        matches!(
            self.root.nodes(),
            [Node::Constant(_) | Node::Variable(_)]
        )
    }

    #[must_use]
    pub fn has_variables(&self) -> bool {
        !self.variables().is_empty()
    }

    ///
    /// Every variable, in order of first appearance, depth-first.
    ///
    /// A name used twice appears twice.
    ///
    #[must_use]
    pub fn variables(&self) -> Vec<&Variable> {
        let mut out = Vec::new();
        self.root.collect_variables(&mut out);
        out
    }

    #[must_use]
    pub fn variables_mut(&mut self) -> Vec<&mut Variable> {
        let mut out = Vec::new();
        self.root.collect_variables_mut(&mut out);
        out
    }

    ///
    /// Set every occurrence of `name`, returning how many were set.
    ///
    pub fn set_variable(&mut self, name: &str, value: impl Into<Constant>) -> usize {
        let value = value.into();
        let mut count = 0;
        for var in self.variables_mut() {
            if var.name() == name {
                var.set(value.clone());
                count += 1;
            }
        }
        count
    }

    pub fn clear_variables(&mut self) {
        for var in self.variables_mut() {
            var.clear();
        }
    }

    ///
    /// Fill in every variable `lookup` knows, returning how many were filled.
    ///
    /// Names the lookup does not know keep whatever value they had.
    ///
    pub fn resolve(&mut self, lookup: &(impl Lookup + ?Sized)) -> usize {
        let mut count = 0;
        for var in self.variables_mut() {
            if let Some(text) = lookup.lookup(var.name()) {
                var.set(convert::infer(&text));
                count += 1;
            }
        }
        tracing::debug!(count, "resolved variables");
        count
    }

    ///
    /// Compute the value of the expression.
    ///
    /// Fails naming the first variable without a value.
    ///
    #[allow(clippy::missing_errors_doc)]
    #[tracing::instrument(level = "trace", skip_all, fields(source = %self.source))]
    pub fn evaluate(&self) -> Result<Constant, EvalError> {
        if let Some(var) = self.variables().into_iter().find(|v| !v.is_resolved()) {
            return Err(EvalError::UnresolvedVariable {
                name: var.name().to_owned(),
            });
        }

        let value = match self.root.nodes() {
            [Node::Constant(c)] => c.clone(),
            [Node::Variable(v)] => v
                .value()
                .cloned()
                .ok_or(EvalError::Malformed)?
                .canonical()?,
            _ => eval::evaluate(&self.root)?,
        };
        tracing::trace!(%value, "evaluated");
        Ok(value)
    }

    ///
    /// Evaluate against `lookup` without touching this expression's variables.
    ///
    #[allow(clippy::missing_errors_doc)]
    pub fn evaluate_with(&self, lookup: &(impl Lookup + ?Sized)) -> Result<Constant, EvalError> {
        if !self.has_variables() {
            return self.evaluate();
        }

        let mut resolved = self.clone();
        resolved.resolve(lookup);
        resolved.evaluate()
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod test {
    use super::Expression;
    use crate::{
        error::{EvalError, ParseErrorKind},
        value::Constant,
    };
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn simple() {
        assert!(Expression::parse("10").unwrap().is_simple());
        assert!(Expression::parse("{a}").unwrap().is_simple());
        assert!(Expression::parse("plain text").unwrap().is_simple());
        assert!(!Expression::parse("(10)").unwrap().is_simple());
        assert!(!Expression::parse("1 + 2").unwrap().is_simple());
    }

    #[test]
    fn variables_in_order() {
        let expr = Expression::parse("{a} + ({b} * {a}) - {c}").unwrap();
        let names: Vec<_> = expr.variables().iter().map(|v| v.name()).collect();

        assert_eq!(names, ["a", "b", "a", "c"]);
        assert!(expr.has_variables());
        assert!(!Expression::parse("1").unwrap().has_variables());
    }

    #[test]
    fn unresolved_then_resolved() {
        let mut expr = Expression::parse("{x} * ({y} + 1)").unwrap();
        assert_eq!(
            expr.evaluate(),
            Err(EvalError::UnresolvedVariable { name: "x".into() })
        );

        assert_eq!(expr.set_variable("x", 3), 1);
        assert_eq!(
            expr.evaluate(),
            Err(EvalError::UnresolvedVariable { name: "y".into() })
        );

        for var in expr.variables_mut() {
            if var.name() == "y" {
                var.set(4);
            }
        }
        assert_eq!(expr.evaluate(), Ok(Constant::Int(15)));
    }

    #[test]
    fn fresh_values_on_each_evaluation() {
        let mut expr = Expression::parse("{n} * 2").unwrap();

        expr.set_variable("n", 2);
        assert_eq!(expr.evaluate(), Ok(Constant::Int(4)));
        assert_eq!(expr.evaluate(), Ok(Constant::Int(4)));

        expr.set_variable("n", 5);
        assert_eq!(expr.evaluate(), Ok(Constant::Int(10)));

        expr.clear_variables();
        assert!(expr.evaluate().is_err());
    }

    #[test]
    fn resolve_from_lookup() {
        let lookup = HashMap::from([
            ("Configured.Property".to_owned(), "12".to_owned()),
            ("Name".to_owned(), "World".to_owned()),
        ]);

        let mut expr = Expression::parse("'Hello ' + {Name} + {Configured.Property}").unwrap();
        assert_eq!(expr.resolve(&lookup), 2);
        assert_eq!(expr.evaluate(), Ok(Constant::from("Hello World12")));

        let expr = Expression::parse("{Configured.Property} / 4").unwrap();
        assert_eq!(expr.evaluate_with(&lookup), Ok(Constant::Int(3)));
        assert!(!expr.variables()[0].is_resolved());
    }

    #[test]
    fn simple_variable_is_canonical() {
        let mut expr = Expression::parse("{big}").unwrap();
        expr.set_variable("big", 7_u64);
        assert_eq!(expr.evaluate(), Ok(Constant::Int(7)));
    }

    #[test]
    fn malformed_fails_at_construction() {
        for (src, kind) in [
            ("(1 + 2", ParseErrorKind::UnbalancedGroup),
            ("1 + ", ParseErrorKind::DanglingOperator),
            ("'unterminated", ParseErrorKind::UnterminatedString),
            ("{unterminated", ParseErrorKind::UnterminatedVariable),
        ] {
            assert_eq!(src.parse::<Expression>().unwrap_err().kind, kind, "{src}");
        }
    }

    #[test]
    fn renders_back_to_source() {
        let expr = Expression::parse(r"'it\'s '+({x}*-2)  %3").unwrap();
        assert_eq!(expr.to_string(), r"'it\'s ' + ({x} * -2) % 3");
        assert_eq!(Expression::parse(&expr.to_string()).unwrap().root(), expr.root());
    }
}

use crate::{ast::Symbol, value::Family};
use thiserror::Error;

///
/// What went wrong while reading expression text.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("empty expression")]
    EmptyExpression,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated variable")]
    UnterminatedVariable,
    #[error("empty variable name")]
    EmptyVariable,
    #[error("unparseable numeric literal")]
    InvalidNumber,
    #[error("unbalanced group")]
    UnbalancedGroup,
    #[error("empty group")]
    EmptyGroup,
    #[error("dangling operator")]
    DanglingOperator,
    #[error("missing operator")]
    MissingOperator,
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("groups nested too deeply")]
    TooDeep,
}

///
/// A malformed expression.
///
/// `offset` counts characters, not bytes, from the start of the source text.
///
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset} near `{excerpt}`")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
    pub excerpt: String,
}

impl ParseError {
    const EXCERPT_LEN: usize = 12;

    ///
    /// Build an error for `kind` at byte position `at` of `src`.
    ///
    #[must_use]
    pub fn at(src: &str, at: usize, kind: ParseErrorKind) -> Self {
        let at = at.min(src.len());
        Self {
            kind,
            offset: src[..at].chars().count(),
            excerpt: src[at..].chars().take(Self::EXCERPT_LEN).collect(),
        }
    }
}

///
/// A well-formed expression that still cannot produce a value.
///
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("variable `{name}` has no value")]
    UnresolvedVariable { name: String },

    #[error("unsupported operator `{symbol}` for {family} values")]
    UnsupportedOperator { symbol: Symbol, family: Family },

    #[error("division by zero in `{symbol}`")]
    DivisionByZero { symbol: Symbol },

    #[error("value {value} is outside every numeric range")]
    OutOfRange { value: String },

    #[error("unable to evaluate expression")]
    Malformed,
}

impl EvalError {
    pub(crate) fn out_of_range(value: impl ToString) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
        }
    }
}

///
/// Text that cannot be read as the requested family.
///
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert `{text}` to {family}")]
pub struct ConvertError {
    pub text: String,
    pub family: Family,
}

///
/// Any error the crate can produce.
///
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

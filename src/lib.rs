#![forbid(unsafe_code)]

pub mod ast;
pub mod config;
pub mod convert;
pub mod error;
pub mod eval;
pub mod expr;
pub mod lex;
pub mod value;

pub mod prelude {
    pub use crate::ast::{Group, Node, Symbol, Variable};
    pub use crate::config::{from_fn, EnvSource, Layered, Lookup, MapSource};
    pub use crate::convert::{convert, infer};
    pub use crate::error::{ConvertError, Error, EvalError, ParseError, ParseErrorKind};
    pub use crate::expr::Expression;
    pub use crate::lex::{Lexer, Token};
    pub use crate::value::{Constant, Family};
}

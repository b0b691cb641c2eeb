//
// Builds the node tree from lexemes, checking that operands and operators
// alternate and that groups balance.
//

use super::{Group, Node, Variable};
use crate::{
    error::{ParseError, ParseErrorKind},
    lex::{self, Lexeme, Lexer, Token},
    value::Constant,
};

///
/// A group still being read, and where its `(` was.
///
#[derive(Debug)]
struct Frame {
    group: Group,
    open: usize,
    // byte offset of the latest symbol if it still lacks a right operand
    dangling: Option<usize>,
}

impl Frame {
    fn new(open: usize) -> Self {
        Self {
            group: Group::default(),
            open,
            dangling: None,
        }
    }

    fn expects_operand(&self) -> bool {
        self.group.is_empty() || self.dangling.is_some()
    }
}

struct Parser<'src> {
    src: &'src str,
    frame: Frame,
    outer: Vec<Frame>,
}

///
/// Parse expression text into its root group.
///
/// Text whose first character starts no token is taken whole as a string.
///
#[allow(clippy::missing_errors_doc)]
pub fn parse(src: &str) -> Result<Group, ParseError> {
    let text = src.trim_start();

    match text.chars().next() {
        None => Err(ParseError::at(src, 0, ParseErrorKind::EmptyExpression)),
        Some(c) if !lex::starts_token(c) => Ok(Group::new(vec![Node::Constant(
            Constant::Str(text.to_owned()),
        )])),
        Some(_) => Parser::new(src).run(),
    }
}

impl<'src> Parser<'src> {
    /// Evaluation and rendering recurse once per level.
    pub(crate) const MAX_DEPTH: usize = 256;

    fn new(src: &'src str) -> Self {
        Self {
            src,
            frame: Frame::new(0),
            outer: Vec::new(),
        }
    }

    fn error(&self, at: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::at(self.src, at, kind)
    }

    fn run(mut self) -> Result<Group, ParseError> {
        for lexeme in Lexer::new(self.src) {
            self.feed(lexeme?)?;
        }
        self.finish()
    }

    fn feed(&mut self, Lexeme { token, start }: Lexeme) -> Result<(), ParseError> {
        match token {
            Token::Literal(c) => self.operand(Node::Constant(c), start),
            Token::Variable(name) => self.operand(Node::Variable(Variable::new(name)), start),
            Token::Symbol(symbol) => {
                if self.frame.expects_operand() {
                    return Err(self.error(start, ParseErrorKind::DanglingOperator));
                }
                self.frame.group.push(Node::Symbol(symbol));
                self.frame.dangling = Some(start);
                Ok(())
            }
            Token::LParen => {
                if !self.frame.expects_operand() {
                    return Err(self.error(start, ParseErrorKind::MissingOperator));
                }
                if self.outer.len() == Self::MAX_DEPTH {
                    return Err(self.error(start, ParseErrorKind::TooDeep));
                }
                let parent = core::mem::replace(&mut self.frame, Frame::new(start));
                self.outer.push(parent);
                Ok(())
            }
            Token::RParen => {
                let Some(parent) = self.outer.pop() else {
                    return Err(self.error(start, ParseErrorKind::UnbalancedGroup));
                };
                if self.frame.group.is_empty() {
                    return Err(self.error(self.frame.open, ParseErrorKind::EmptyGroup));
                }
                if let Some(at) = self.frame.dangling {
                    return Err(self.error(at, ParseErrorKind::DanglingOperator));
                }

                let inner = core::mem::replace(&mut self.frame, parent);
                self.operand(Node::Group(inner.group), inner.open)
            }
        }
    }

    fn operand(&mut self, node: Node, start: usize) -> Result<(), ParseError> {
        if !self.frame.expects_operand() {
            return Err(self.error(start, ParseErrorKind::MissingOperator));
        }
        self.frame.group.push(node);
        self.frame.dangling = None;
        Ok(())
    }

    fn finish(self) -> Result<Group, ParseError> {
        if !self.outer.is_empty() {
            return Err(self.error(self.frame.open, ParseErrorKind::UnbalancedGroup));
        }
        if let Some(at) = self.frame.dangling {
            return Err(self.error(at, ParseErrorKind::DanglingOperator));
        }
        if self.frame.group.is_empty() {
            return Err(self.error(self.src.len(), ParseErrorKind::EmptyExpression));
        }
        Ok(self.frame.group)
    }
}

#[cfg(test)]
mod test {
    use super::{parse, Parser};
    use crate::{
        ast::{Group, Node, Symbol, Variable},
        error::ParseErrorKind,
        value::Constant,
    };
    use pretty_assertions::assert_eq;

    fn kind(src: &str) -> (ParseErrorKind, usize) {
        let err = parse(src).expect_err("input should not parse");
        (err.kind, err.offset)
    }

    #[test]
    fn nested_groups() {
        let group = parse("1 * (2 + ({x}))").unwrap();
        assert_eq!(
            group,
            Group::new(vec![
                Node::Constant(Constant::Int(1)),
                Node::Symbol(Symbol::Mul),
                Node::Group(Group::new(vec![
                    Node::Constant(Constant::Int(2)),
                    Node::Symbol(Symbol::Add),
                    Node::Group(Group::new(vec![Node::Variable(Variable::new("x"))])),
                ])),
            ])
        );
    }

    #[test]
    fn bare_text_is_one_string() {
        let group = parse("  Hello (world) + 1").unwrap();
        assert_eq!(
            group,
            Group::new(vec![Node::Constant(Constant::from("Hello (world) + 1"))])
        );
    }

    #[test]
    fn single_variable() {
        let group = parse("{Configured.Property}").unwrap();
        assert_eq!(
            group.nodes(),
            [Node::Variable(Variable::new("Configured.Property"))]
        );
    }

    #[test]
    fn unbalanced_groups() {
        assert_eq!(kind("(1 + 2"), (ParseErrorKind::UnbalancedGroup, 0));
        assert_eq!(kind("1 + (2 * (3)"), (ParseErrorKind::UnbalancedGroup, 4));
        assert_eq!(kind("1 + 2)"), (ParseErrorKind::UnbalancedGroup, 5));
        assert_eq!(kind("()"), (ParseErrorKind::EmptyGroup, 0));
    }

    #[test]
    fn dangling_operators() {
        assert_eq!(kind("1 + "), (ParseErrorKind::DanglingOperator, 2));
        assert_eq!(kind("1 + * 2"), (ParseErrorKind::DanglingOperator, 4));
        assert_eq!(kind("* 2"), (ParseErrorKind::DanglingOperator, 0));
        assert_eq!(kind("(1 -) + 2"), (ParseErrorKind::DanglingOperator, 3));
        assert_eq!(kind("- 1"), (ParseErrorKind::DanglingOperator, 0));
    }

    #[test]
    fn missing_operators() {
        assert_eq!(kind("1 2"), (ParseErrorKind::MissingOperator, 2));
        assert_eq!(kind("{a} (2)"), (ParseErrorKind::MissingOperator, 4));
        assert_eq!(kind("(1) 'x'"), (ParseErrorKind::MissingOperator, 4));
    }

    #[test]
    fn nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));

        assert!(parse(&nested(Parser::MAX_DEPTH)).is_ok());
        assert_eq!(
            kind(&nested(Parser::MAX_DEPTH + 1)),
            (ParseErrorKind::TooDeep, Parser::MAX_DEPTH)
        );
        assert_eq!(
            kind(&nested(100_000)),
            (ParseErrorKind::TooDeep, Parser::MAX_DEPTH)
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(kind(""), (ParseErrorKind::EmptyExpression, 0));
        assert_eq!(kind("   "), (ParseErrorKind::EmptyExpression, 0));
    }

    #[test]
    fn lexing_errors_surface() {
        assert_eq!(kind("'unterminated"), (ParseErrorKind::UnterminatedString, 0));
        assert_eq!(kind("{unterminated"), (ParseErrorKind::UnterminatedVariable, 0));
    }
}

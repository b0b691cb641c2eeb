use crate::{
    ast::Symbol,
    error::{ParseError, ParseErrorKind},
    value::Constant,
};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while},
    character::complete::{anychar, char, digit1},
    combinator::{map, map_opt, opt, recognize},
    sequence::pair,
};

pub type Result<'src, O> = nom::IResult<&'src str, O, Error<'src>>;

///
/// A lexing failure, pointing into the input where it happened.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Error<'src> {
    pub input: &'src str,
    pub kind: ParseErrorKind,
}

impl<'src> Error<'src> {
    fn failure(input: &'src str, kind: ParseErrorKind) -> nom::Err<Self> {
        nom::Err::Failure(Self { input, kind })
    }
}

impl<'src> nom::error::ParseError<&'src str> for Error<'src> {
    fn from_error_kind(input: &'src str, _: nom::error::ErrorKind) -> Self {
        Self {
            input,
            kind: ParseErrorKind::UnexpectedCharacter,
        }
    }

    fn append(_: &'src str, _: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

///
/// A syntactic token of a value expression.
///
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Literal(Constant),
    Variable(String),
    Symbol(Symbol),

    LParen,
    RParen,
}

///
/// A [`Token`] and the byte offset it starts at.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub start: usize,
}

#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    src: &'src str,
    rest: &'src str,
    operand_pending: bool,
}

impl Token {
    ///
    /// Parse a [`Token`] from an input slice, assuming no preceding whitespace.
    ///
    /// `operand_pending` tells whether a left operand precedes the slice, which
    /// decides if `-` is a sign or the subtract operator.
    ///
    #[allow(clippy::missing_errors_doc)]
    pub fn parse<'src>(src: &'src str, operand_pending: bool) -> Result<'src, Self> {
        fn paren(src: &str) -> Result<Token> {
            alt((
                map(tag("("), |_| Token::LParen),
                map(tag(")"), |_| Token::RParen),
            ))(src)
        }

        alt((
            map(
                move |s: &'src str| number(s, !operand_pending),
                Token::Literal,
            ),
            map(string, Token::Literal),
            map(variable, Token::Variable),
            map(map_opt(anychar, Symbol::from_char), Token::Symbol),
            paren,
        ))(src)
    }

    ///
    /// Whether a left operand is pending once this token has been read.
    ///
    #[must_use]
    pub const fn ends_operand(&self) -> bool {
        matches!(self, Self::Literal(_) | Self::Variable(_) | Self::RParen)
    }
}

///
/// Whether `c` can begin some token.
///
#[must_use]
pub fn starts_token(c: char) -> bool {
    c.is_ascii_digit()
        || matches!(c, '\'' | '{' | '(' | ')')
        || Symbol::from_char(c).is_some()
}

///
/// Parse a numeric literal. A leading `-` is only accepted when `signed`.
///
#[allow(clippy::missing_errors_doc)]
pub fn number(src: &str, signed: bool) -> Result<'_, Constant> {
    let (rest, _) = if signed {
        recognize(pair(opt(char('-')), digit1))(src)?
    } else {
        digit1(src)?
    };
    let (rest, _) = take_till(ends_number)(rest)?;

    let text = &src[..src.len() - rest.len()];
    util::number(text)
        .map(|c| (rest, c))
        .ok_or_else(|| Error::failure(src, ParseErrorKind::InvalidNumber))
}

fn ends_number(c: char) -> bool {
    c.is_whitespace() || c == ')' || Symbol::from_char(c).is_some()
}

///
/// Parse a single-quoted string literal.
///
#[allow(clippy::missing_errors_doc)]
pub fn string(src: &str) -> Result<'_, Constant> {
    let (body, _) = char('\'')(src)?;
    let (rest, text) = util::escaped(body, '\'', &['\''])
        .ok_or_else(|| Error::failure(src, ParseErrorKind::UnterminatedString))?;

    Ok((rest, Constant::Str(text)))
}

///
/// Parse a braced variable reference, yielding its name.
///
#[allow(clippy::missing_errors_doc)]
pub fn variable(src: &str) -> Result<'_, String> {
    let (body, _) = char('{')(src)?;
    let (rest, name) = util::escaped(body, '}', &['{', '}'])
        .ok_or_else(|| Error::failure(src, ParseErrorKind::UnterminatedVariable))?;

    if name.trim().is_empty() {
        return Err(Error::failure(src, ParseErrorKind::EmptyVariable));
    }
    Ok((rest, name))
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            rest: src,
            operand_pending: false,
        }
    }

    fn error(&self, err: nom::Err<Error<'src>>, start: usize) -> ParseError {
        match err {
            nom::Err::Failure(e) => {
                ParseError::at(self.src, self.src.len() - e.input.len(), e.kind)
            }
            nom::Err::Error(_) | nom::Err::Incomplete(_) => {
                ParseError::at(self.src, start, ParseErrorKind::UnexpectedCharacter)
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = core::result::Result<Lexeme, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (src, _) = take_while::<_, _, Error<'_>>(char::is_whitespace)(self.rest).ok()?;
        if src.is_empty() {
            self.rest = src;
            return None;
        }

        let start = self.src.len() - src.len();
        match Token::parse(src, self.operand_pending) {
            Ok((rest, token)) => {
                self.rest = rest;
                self.operand_pending = token.ends_operand();
                Some(Ok(Lexeme { token, start }))
            }
            Err(err) => {
                // nothing sensible follows a lexing error
                self.rest = "";
                Some(Err(self.error(err, start)))
            }
        }
    }
}

pub(crate) mod util {
    use super::Error;
    use crate::value::{canonical_float, canonical_integer, Constant};
    use nom::{bytes::complete::take_till, character::complete::anychar};

    ///
    /// Read a complete numeric literal: `-?digits(.digits)?`.
    ///
    /// Integers are read exactly; decimals go through `f64`.
    ///
    pub fn number(text: &str) -> Option<Constant> {
        let unsigned = text.strip_prefix('-').unwrap_or(text);
        let (int_part, fract_part) = match unsigned.split_once('.') {
            Some((int_part, fract_part)) => (int_part, Some(fract_part)),
            None => (unsigned, None),
        };

        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(int_part) || fract_part.is_some_and(|f| !digits(f)) {
            return None;
        }

        if fract_part.is_none() {
            if let Ok(i) = text.parse::<i128>() {
                return Some(canonical_integer(i));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(|f| canonical_float(f).ok())
    }

    ///
    /// Read up to an unescaped `close`, resolving escapes.
    ///
    /// `\\` and `\` followed by one of `specials` are escapes; any other
    /// backslash is kept. Returns `None` if `close` never appears.
    ///
    pub fn escaped<'src>(
        mut src: &'src str,
        close: char,
        specials: &[char],
    ) -> Option<(&'src str, String)> {
        let mut out = String::new();

        loop {
            let (rest, chunk) =
                take_till::<_, _, Error<'_>>(|c: char| c == close || c == '\\')(src).ok()?;
            out.push_str(chunk);

            let (rest, c) = anychar::<_, Error<'_>>(rest).ok()?;
            if c == close {
                return Some((rest, out));
            }

            match rest.chars().next() {
                Some(e) if e == '\\' || specials.contains(&e) => {
                    out.push(e);
                    src = &rest[e.len_utf8()..];
                }
                Some(_) => {
                    out.push('\\');
                    src = rest;
                }
                None => return None,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Lexer, Token};
    use crate::{ast::Symbol, error::ParseErrorKind, value::Constant};

    ///
    /// Declares a test case with a name, given input and expected output.
    ///
    macro_rules! test_case {
        ($name:ident, $input:expr, $expected:expr $(,)?) => {
            #[test]
            fn $name() {
                let expected = $expected;

                let mut tokens = 0;
                for (i, lexeme) in Lexer::new($input).enumerate() {
                    assert_eq!(lexeme.unwrap().token, expected[i]);
                    tokens += 1;
                }

                assert_eq!(tokens, expected.len());
            }
        };
    }

    ///
    /// Declares a test case whose input fails to lex.
    ///
    macro_rules! error_case {
        ($name:ident, $input:expr, $kind:expr, $offset:expr $(,)?) => {
            #[test]
            fn $name() {
                let err = Lexer::new($input)
                    .find_map(Result::err)
                    .expect("input should not lex");

                assert_eq!(err.kind, $kind);
                assert_eq!(err.offset, $offset);
            }
        };
    }

    fn lit(c: impl Into<Constant>) -> Token {
        Token::Literal(c.into())
    }

    test_case!(
        general,
        "20 + 100 / 2 - 40 % 4 * (10)",
        [
            lit(20),
            Token::Symbol(Symbol::Add),
            lit(100),
            Token::Symbol(Symbol::Div),
            lit(2),
            Token::Symbol(Symbol::Sub),
            lit(40),
            Token::Symbol(Symbol::Mod),
            lit(4),
            Token::Symbol(Symbol::Mul),
            Token::LParen,
            lit(10),
            Token::RParen,
        ],
    );

    test_case!(
        signs,
        "-5 - -3 -2 (-1)",
        [
            lit(-5),
            Token::Symbol(Symbol::Sub),
            lit(-3),
            Token::Symbol(Symbol::Sub),
            lit(2),
            Token::LParen,
            lit(-1),
            Token::RParen,
        ],
    );

    test_case!(
        packed,
        "1+2*(3)-4",
        [
            lit(1),
            Token::Symbol(Symbol::Add),
            lit(2),
            Token::Symbol(Symbol::Mul),
            Token::LParen,
            lit(3),
            Token::RParen,
            Token::Symbol(Symbol::Sub),
            lit(4),
        ],
    );

    test_case!(
        number_widths,
        "1.5 0.1 4294967296 18446744073709551615",
        [
            lit(1.5_f32),
            lit(0.1_f64),
            lit(4_294_967_296_i64),
            lit(u64::MAX),
        ],
    );

    test_case!(
        strings_and_variables,
        r"'it\'s' + {Configured.Property} + {x\}y} + 'a\b' + ''",
        [
            lit("it's"),
            Token::Symbol(Symbol::Add),
            Token::Variable("Configured.Property".into()),
            Token::Symbol(Symbol::Add),
            Token::Variable("x}y".into()),
            Token::Symbol(Symbol::Add),
            lit(r"a\b"),
            Token::Symbol(Symbol::Add),
            lit(""),
        ],
    );

    error_case!(
        unterminated_string,
        "'unterminated",
        ParseErrorKind::UnterminatedString,
        0,
    );
    error_case!(
        trailing_backslash_string,
        r"'abc\",
        ParseErrorKind::UnterminatedString,
        0,
    );
    error_case!(
        unterminated_variable,
        "1 + {unterminated",
        ParseErrorKind::UnterminatedVariable,
        4,
    );
    error_case!(empty_variable, "{  }", ParseErrorKind::EmptyVariable, 0);
    error_case!(letters_in_number, "2 * 12ab", ParseErrorKind::InvalidNumber, 4);
    error_case!(two_points, "1.2.3", ParseErrorKind::InvalidNumber, 0);
    error_case!(stray_character, "1 # 2", ParseErrorKind::UnexpectedCharacter, 2);
    error_case!(
        offset_in_characters,
        "'ππ' + 1 + ?",
        ParseErrorKind::UnexpectedCharacter,
        11,
    );
}

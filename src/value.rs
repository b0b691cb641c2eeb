use crate::error::EvalError;
use core::fmt;
use derive_more::{Display, From};

///
/// The arithmetic domain a value belongs to.
///
/// Declaration order is promotion order: when operands of several families
/// meet in one group, the greatest family governs the arithmetic.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Family {
    #[display("int")]
    Int,
    #[display("long")]
    Long,
    #[display("uint")]
    UInt,
    #[display("ulong")]
    ULong,
    #[display("float")]
    Float,
    #[display("string")]
    Str,
}

///
/// A value, either written literally or produced by evaluation.
///
/// `Display` is the textual form used for string concatenation; see
/// [`Constant::literal`] for the form that parses back.
///
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
#[derive(Display, From)]
pub enum Constant {
    #[display("{_0}")] Int(i32),
    #[display("{_0}")] Long(i64),
    #[display("{_0}")] UInt(u32),
    #[display("{_0}")] ULong(u64),
    #[display("{_0}")] Single(f32),
    #[display("{_0}")] Double(f64),
    #[display("{_0}")] Str(String),
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl Constant {
    #[must_use]
    pub const fn family(&self) -> Family {
        match self {
            Self::Int(_) => Family::Int,
            Self::Long(_) => Family::Long,
            Self::UInt(_) => Family::UInt,
            Self::ULong(_) => Family::ULong,
            Self::Single(_) | Self::Double(_) => Family::Float,
            Self::Str(_) => Family::Str,
        }
    }

    ///
    /// The value as an integer, if it is one.
    ///
    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::Int(i) => Some(i.into()),
            Self::Long(i) => Some(i.into()),
            Self::UInt(i) => Some(i.into()),
            Self::ULong(i) => Some(i.into()),
            _ => None,
        }
    }

    ///
    /// The value as a double, if it is numeric.
    ///
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Self::Single(f) => Some(f.into()),
            Self::Double(f) => Some(f),
            Self::Str(_) => None,
            _ => self.as_integer().map(|i| i as f64),
        }
    }

    ///
    /// Re-express a number in its narrowest variant. Strings are returned as-is.
    ///
    #[allow(clippy::missing_errors_doc)]
    pub fn canonical(self) -> Result<Self, EvalError> {
        match self {
            Self::Single(f) => canonical_float(f.into()),
            Self::Double(f) => canonical_float(f),
            Self::Str(_) => Ok(self),
            _ => Ok(self.as_integer().map_or(self, canonical_integer)),
        }
    }

    ///
    /// Render as source text: strings quoted and escaped, numbers as written.
    ///
    #[must_use]
    pub fn literal(&self) -> Literal<'_> {
        Literal(self)
    }
}

///
/// See [`Constant::literal`].
///
#[derive(Debug, Clone, Copy)]
pub struct Literal<'a>(&'a Constant);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Constant::Str(s) => write_escaped(f, '\'', '\'', s, &['\'']),
            c => write!(f, "{c}"),
        }
    }
}

pub(crate) fn write_escaped(
    f: &mut fmt::Formatter<'_>,
    open: char,
    close: char,
    text: &str,
    specials: &[char],
) -> fmt::Result {
    use fmt::Write;

    f.write_char(open)?;
    for c in text.chars() {
        if c == '\\' || specials.contains(&c) {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char(close)
}

///
/// Narrowest variant holding an integer exactly.
///
/// Signed widths are tried before unsigned ones; past `u64` the value can
/// only be approximated, so it falls back to a double.
///
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn canonical_integer(i: i128) -> Constant {
    if let Ok(i) = i32::try_from(i) {
        Constant::Int(i)
    } else if let Ok(i) = i64::try_from(i) {
        Constant::Long(i)
    } else if let Ok(i) = u64::try_from(i) {
        Constant::ULong(i)
    } else {
        Constant::Double(i as f64)
    }
}

///
/// Narrowest variant holding a float without loss.
///
/// Integral values become integers; the rest become a single if they survive
/// a round trip through `f32`, otherwise a double.
///
#[allow(clippy::missing_errors_doc)]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
pub fn canonical_float(f: f64) -> Result<Constant, EvalError> {
    // 2^63 and 2^64 are exact in f64, so comparing against them is exact too
    const I64_END: f64 = 9_223_372_036_854_775_808.0;
    const U64_END: f64 = 18_446_744_073_709_551_616.0;

    if !f.is_finite() {
        return Err(EvalError::out_of_range(f));
    }

    if libm::trunc(f) == f {
        if f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
            return Ok(Constant::Int(f as i32));
        }
        if (-I64_END..I64_END).contains(&f) {
            return Ok(Constant::Long(f as i64));
        }
        if (0.0..U64_END).contains(&f) {
            return Ok(Constant::ULong(f as u64));
        }
    }

    let single = f as f32;
    if single.is_finite() && f64::from(single) == f {
        Ok(Constant::Single(single))
    } else {
        Ok(Constant::Double(f))
    }
}

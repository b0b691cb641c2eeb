//
// Coercion between configuration text and typed values.
//

use crate::{
    error::ConvertError,
    lex,
    value::{Constant, Family},
};

///
/// Read `text` as a value of `family`.
///
/// Surrounding whitespace is ignored for numbers. [`Family::Float`] yields a
/// double, and [`Family::Str`] takes the text verbatim.
///
#[allow(clippy::missing_errors_doc)]
pub fn convert(text: &str, family: Family) -> Result<Constant, ConvertError> {
    let trimmed = text.trim();
    let converted = match family {
        Family::Int => trimmed.parse().ok().map(Constant::Int),
        Family::Long => trimmed.parse().ok().map(Constant::Long),
        Family::UInt => trimmed.parse().ok().map(Constant::UInt),
        Family::ULong => trimmed.parse().ok().map(Constant::ULong),
        Family::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Constant::Double),
        Family::Str => Some(Constant::Str(text.to_owned())),
    };

    converted.ok_or_else(|| ConvertError {
        text: text.to_owned(),
        family,
    })
}

///
/// The value configuration text stands for: a canonical number when the
/// whole text is a numeric literal, otherwise the text itself.
///
#[must_use]
pub fn infer(text: &str) -> Constant {
    lex::util::number(text.trim()).unwrap_or_else(|| Constant::Str(text.to_owned()))
}

impl Constant {
    ///
    /// Convert to `family` through the textual form.
    ///
    #[allow(clippy::missing_errors_doc)]
    pub fn coerce(&self, family: Family) -> Result<Self, ConvertError> {
        if self.family() == family {
            return Ok(self.clone());
        }
        convert(&self.to_string(), family)
    }
}

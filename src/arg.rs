use std::fmt::{self, Display};

/// A single printable value substituted into a fatal report template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FatalArg<'a> {
    /// A signed integer and the width in bits of the type it came from.
    Int { value: i64, bits: u32 },
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(&'a str),
    Pointer(usize),
}

impl FatalArg<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int { .. } => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Str(_) => "str",
            Self::Pointer(_) => "pointer",
        }
    }
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int { .. } | Self::UInt(_) | Self::Float(_) | Self::Pointer(_)
        )
    }
    /// The raw bits used for radix formatting, if the variant has any.
    /// Negative integers keep the two's complement width of their source type.
    pub fn as_bits(&self) -> Option<u64> {
        match self {
            Self::Int { value, bits } if *bits < u64::BITS => {
                Some(*value as u64 & ((1u64 << bits) - 1))
            }
            Self::Int { value, .. } => Some(*value as u64),
            Self::UInt(value) => Some(*value),
            Self::Pointer(address) => Some(*address as u64),
            Self::Bool(_) | Self::Char(_) | Self::Float(_) | Self::Str(_) => None,
        }
    }
    pub fn fmt_debug(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::Str(string) => write!(f, "{:?}", string),
            Self::Char(character) => write!(f, "{:?}", character),
            Self::Float(value) => write!(f, "{:?}", value),
            other => write!(f, "{}", other),
        }
    }
}

impl Display for FatalArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { value, .. } => write!(f, "{}", value),
            Self::UInt(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Char(value) => write!(f, "{}", value),
            Self::Str(value) => f.write_str(value),
            Self::Pointer(address) => write!(f, "{:#x}", address),
        }
    }
}

macro_rules! from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FatalArg<'_> {
            fn from(value: $ty) -> Self {
                Self::Int {
                    value: value as i64,
                    bits: <$ty>::BITS,
                }
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FatalArg<'_> {
            fn from(value: $ty) -> Self {
                Self::UInt(value as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for FatalArg<'_> {
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for FatalArg<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FatalArg<'_> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for FatalArg<'_> {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl<'a> From<&'a str> for FatalArg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a String> for FatalArg<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(value.as_str())
    }
}

impl<T> From<*const T> for FatalArg<'_> {
    fn from(pointer: *const T) -> Self {
        Self::Pointer(pointer as usize)
    }
}

impl<T> From<*mut T> for FatalArg<'_> {
    fn from(pointer: *mut T) -> Self {
        Self::Pointer(pointer as usize)
    }
}

/// Infers the most specific variant for a value typed on a command line.
/// Text that would not print back exactly as typed (`007`, `+5`, `1e5`,
/// `0X1F`) stays a string.
pub fn infer(raw: &str) -> FatalArg<'_> {
    let inferred: FatalArg<'_> = infer_typed(raw);
    match inferred {
        FatalArg::Str(_) | FatalArg::Char(_) | FatalArg::Bool(_) => inferred,
        _ if inferred.to_string() == raw => inferred,
        _ => FatalArg::Str(raw),
    }
}

fn infer_typed(raw: &str) -> FatalArg<'_> {
    if raw == "true" || raw == "false" {
        return FatalArg::Bool(raw == "true");
    }
    if let Some(hex) = raw.strip_prefix("0x") {
        if let Ok(address) = usize::from_str_radix(hex, 16) {
            return FatalArg::Pointer(address);
        }
    }
    if let Ok(value) = raw.parse::<i64>() {
        return FatalArg::from(value);
    }
    if let Ok(value) = raw.parse::<u64>() {
        return FatalArg::UInt(value);
    }
    if let Ok(value) = raw.parse::<f64>() {
        if value.is_finite() {
            return FatalArg::Float(value);
        }
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(character), None) => FatalArg::Char(character),
        _ => FatalArg::Str(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(FatalArg::from(42).to_string(), "42");
        assert_eq!(FatalArg::from(-7i8).to_string(), "-7");
        assert_eq!(FatalArg::from(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(FatalArg::from(1.5f64).to_string(), "1.5");
        assert_eq!(FatalArg::from(true).to_string(), "true");
        assert_eq!(FatalArg::from('z').to_string(), "z");
        assert_eq!(FatalArg::from("abc").to_string(), "abc");
        assert_eq!(FatalArg::Pointer(0xdead).to_string(), "0xdead");
    }

    #[test]
    fn signed_conversions_record_width() {
        assert_eq!(FatalArg::from(-3i8), FatalArg::Int { value: -3, bits: 8 });
        assert_eq!(FatalArg::from(5i64), FatalArg::Int { value: 5, bits: 64 });
    }

    #[test]
    fn pointers_convert_to_addresses() {
        let value: u32 = 5;
        let pointer: *const u32 = &value;
        assert_eq!(FatalArg::from(pointer), FatalArg::Pointer(pointer as usize));
    }

    #[test]
    fn debug_form_quotes_text() {
        let mut out: String = String::new();
        FatalArg::Str("a\"b").fmt_debug(&mut out).unwrap();
        FatalArg::Char('\n').fmt_debug(&mut out).unwrap();
        FatalArg::from(3).fmt_debug(&mut out).unwrap();
        assert_eq!(out, "\"a\\\"b\"'\\n'3");
    }

    #[test]
    fn signed_bits_keep_source_width() {
        assert_eq!(FatalArg::from(-1i32).as_bits(), Some(0xffff_ffff));
        assert_eq!(FatalArg::from(-2i8).as_bits(), Some(0xfe));
        assert_eq!(FatalArg::from(-1i64).as_bits(), Some(u64::MAX));
        assert_eq!(FatalArg::from(7i16).as_bits(), Some(7));
        assert_eq!(FatalArg::Str("x").as_bits(), None);
    }

    #[test]
    fn infers_command_line_values() {
        assert_eq!(infer("42"), FatalArg::from(42i64));
        assert_eq!(infer("-3"), FatalArg::from(-3i64));
        assert_eq!(infer("18446744073709551615"), FatalArg::UInt(u64::MAX));
        assert_eq!(infer("2.5"), FatalArg::Float(2.5));
        assert_eq!(infer("false"), FatalArg::Bool(false));
        assert_eq!(infer("0x1f"), FatalArg::Pointer(0x1f));
        assert_eq!(infer("q"), FatalArg::Char('q'));
        assert_eq!(infer("inf"), FatalArg::Str("inf"));
        assert_eq!(infer("hello"), FatalArg::Str("hello"));
        assert_eq!(infer(""), FatalArg::Str(""));
    }

    #[test]
    fn inference_never_rewrites_input() {
        for raw in ["007", "+5", "1e5", "1.50", "-0", "0X1F", "0x01"] {
            assert_eq!(infer(raw), FatalArg::Str(raw), "input {:?}", raw);
        }
    }
}

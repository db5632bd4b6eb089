use std::fmt::{self, Write};

use thiserror::Error;

use crate::arg::FatalArg;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("unclosed '{{' at byte {0}")]
    UnclosedBrace(usize),
    #[error("unmatched '}}' at byte {0}")]
    UnmatchedBrace(usize),
    #[error("placeholder {index} has no argument ({count} given)")]
    MissingArgument { index: usize, count: usize },
    #[error("invalid placeholder index '{0}'")]
    InvalidIndex(String),
    #[error("cannot mix automatic and explicit placeholder indexing")]
    MixedIndexing,
    #[error("unsupported format spec '{spec}' for {kind} argument")]
    UnsupportedSpec { spec: String, kind: &'static str },
    #[error("formatter error")]
    Fmt(#[from] fmt::Error),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Indexing {
    Unknown,
    Automatic,
    Explicit,
}

/// Renders `template` with `args` into a new string.
pub fn render(template: &str, args: &[FatalArg<'_>]) -> Result<String, RenderError> {
    let mut rendered: String = String::with_capacity(template.len());
    render_into(&mut rendered, template, args)?;
    Ok(rendered)
}

/// Renders `template` into `out`. Output written before an error is
/// detected stays in `out`.
pub fn render_into<W: Write>(
    out: &mut W,
    template: &str,
    args: &[FatalArg<'_>],
) -> Result<(), RenderError> {
    let mut indexing: Indexing = Indexing::Unknown;
    let mut next_index: usize = 0;
    let mut offset: usize = 0;
    let mut rest: &str = template;
    while let Some(at) = rest.find(['{', '}']) {
        out.write_str(&rest[..at])?;
        let tail: &str = &rest[at..];
        let consumed: usize = if tail.starts_with("{{") {
            out.write_char('{')?;
            2
        } else if tail.starts_with("}}") {
            out.write_char('}')?;
            2
        } else if tail.starts_with('}') {
            return Err(RenderError::UnmatchedBrace(offset + at));
        } else {
            let close: usize = tail
                .find('}')
                .ok_or(RenderError::UnclosedBrace(offset + at))?;
            let placeholder: &str = &tail[1..close];
            let (index_part, spec): (&str, &str) =
                placeholder.split_once(':').unwrap_or((placeholder, ""));
            let index: usize = if index_part.is_empty() {
                indexing = switch_indexing(indexing, Indexing::Automatic)?;
                next_index += 1;
                next_index - 1
            } else {
                indexing = switch_indexing(indexing, Indexing::Explicit)?;
                index_part
                    .parse::<usize>()
                    .map_err(|_| RenderError::InvalidIndex(index_part.to_owned()))?
            };
            let arg: &FatalArg<'_> = args.get(index).ok_or(RenderError::MissingArgument {
                index,
                count: args.len(),
            })?;
            write_arg(out, arg, spec)?;
            close + 1
        };
        rest = &tail[consumed..];
        offset += at + consumed;
    }
    out.write_str(rest)?;
    Ok(())
}

fn switch_indexing(current: Indexing, wanted: Indexing) -> Result<Indexing, RenderError> {
    match current {
        Indexing::Unknown => Ok(wanted),
        _ if current == wanted => Ok(wanted),
        _ => Err(RenderError::MixedIndexing),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Self::Left),
            '^' => Some(Self::Center),
            '>' => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Presentation {
    Display,
    Debug,
    LowerHex,
    UpperHex,
    Octal,
    Binary,
}

/// `[[fill]align]['#']['0'][width]['.' precision][type]`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FormatSpec {
    fill: char,
    align: Option<Align>,
    alternate: bool,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
    presentation: Presentation,
}

impl FormatSpec {
    fn parse(spec: &str) -> Option<Self> {
        let mut rest: &str = spec;
        let mut chars = rest.chars();
        let (fill, align): (char, Option<Align>) = match (chars.next(), chars.next()) {
            (Some(fill), Some(second)) if Align::from_char(second).is_some() => {
                rest = &rest[fill.len_utf8() + 1..];
                (fill, Align::from_char(second))
            }
            (Some(first), _) if Align::from_char(first).is_some() => {
                rest = &rest[1..];
                (' ', Align::from_char(first))
            }
            _ => (' ', None),
        };
        let alternate: bool = strip_flag(&mut rest, '#');
        let zero_pad: bool = strip_flag(&mut rest, '0');
        let width: Option<usize> = take_number(&mut rest)?;
        let precision: Option<usize> = if strip_flag(&mut rest, '.') {
            Some(take_number(&mut rest)??)
        } else {
            None
        };
        let presentation: Presentation = match rest {
            "" => Presentation::Display,
            "?" => Presentation::Debug,
            "x" => Presentation::LowerHex,
            "X" => Presentation::UpperHex,
            "o" => Presentation::Octal,
            "b" => Presentation::Binary,
            _ => return None,
        };
        Some(Self {
            fill,
            align,
            alternate,
            zero_pad,
            width,
            precision,
            presentation,
        })
    }

    fn pad<W: Write>(&self, out: &mut W, sign: &str, body: &str, numeric: bool) -> fmt::Result {
        let len: usize = sign.chars().count() + body.chars().count();
        let width: usize = self.width.unwrap_or(0);
        if self.zero_pad && numeric {
            out.write_str(sign)?;
            for _ in len..width {
                out.write_char('0')?;
            }
            return out.write_str(body);
        }
        let padding: usize = width.saturating_sub(len);
        let default_align: Align = if numeric { Align::Right } else { Align::Left };
        let (before, after): (usize, usize) = match self.align.unwrap_or(default_align) {
            Align::Left => (0, padding),
            Align::Center => (padding / 2, padding - padding / 2),
            Align::Right => (padding, 0),
        };
        for _ in 0..before {
            out.write_char(self.fill)?;
        }
        out.write_str(sign)?;
        out.write_str(body)?;
        for _ in 0..after {
            out.write_char(self.fill)?;
        }
        Ok(())
    }
}

fn strip_flag(rest: &mut &str, flag: char) -> bool {
    match rest.strip_prefix(flag) {
        Some(stripped) => {
            *rest = stripped;
            true
        }
        None => false,
    }
}

// Outer `None` is an unparseable number, inner `None` means no digits.
fn take_number(rest: &mut &str) -> Option<Option<usize>> {
    let digits: usize = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return Some(None);
    }
    let number: usize = rest[..digits].parse::<usize>().ok()?;
    *rest = &rest[digits..];
    Some(Some(number))
}

// Splits a leading minus sign off so zero padding lands after it.
fn split_sign(text: String) -> (&'static str, String) {
    match text.strip_prefix('-') {
        Some(unsigned) => ("-", unsigned.to_owned()),
        None => ("", text),
    }
}

fn truncate(text: String, precision: Option<usize>) -> String {
    match precision {
        Some(max) => text.chars().take(max).collect(),
        None => text,
    }
}

fn write_arg<W: Write>(out: &mut W, arg: &FatalArg<'_>, spec: &str) -> Result<(), RenderError> {
    let unsupported = || RenderError::UnsupportedSpec {
        spec: spec.to_owned(),
        kind: arg.kind(),
    };
    let format: FormatSpec = FormatSpec::parse(spec).ok_or_else(unsupported)?;
    let (sign, body): (&'static str, String) = match format.presentation {
        Presentation::Display => match (arg, format.precision) {
            (FatalArg::Float(value), Some(precision)) => {
                split_sign(format!("{:.*}", precision, value))
            }
            (FatalArg::Pointer(address), _) => ("0x", format!("{:x}", address)),
            (FatalArg::Str(_) | FatalArg::Bool(_) | FatalArg::Char(_), precision) => {
                ("", truncate(arg.to_string(), precision))
            }
            _ => split_sign(arg.to_string()),
        },
        Presentation::Debug => match (arg, format.precision) {
            (FatalArg::Float(value), Some(precision)) => {
                split_sign(format!("{:.*?}", precision, value))
            }
            _ => {
                let mut debug: String = String::new();
                arg.fmt_debug(&mut debug)?;
                split_sign(debug)
            }
        },
        radix => {
            let bits: u64 = arg.as_bits().ok_or_else(unsupported)?;
            let (prefix, digits): (&'static str, String) = match radix {
                Presentation::LowerHex => ("0x", format!("{:x}", bits)),
                Presentation::UpperHex => ("0x", format!("{:X}", bits)),
                Presentation::Octal => ("0o", format!("{:o}", bits)),
                _ => ("0b", format!("{:b}", bits)),
            };
            (if format.alternate { prefix } else { "" }, digits)
        }
    };
    format.pad(out, sign, &body, arg.is_numeric())?;
    Ok(())
}

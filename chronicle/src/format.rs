//! POSIX-`printf`-flavored formatting for log payloads.
//!
//! The original implementation builds its payload with C's variadic
//! `vasprintf`; this module specifies the same conversion specifiers
//! (`%d %s %u %ld %f %x %%`) against an explicit argument slice instead of
//! tying the crate to any particular language's variadic facility.

use std::fmt;

/// One formattable argument.
#[derive(Debug, Clone)]
pub enum FormatArg {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl From<i64> for FormatArg {
    fn from(v: i64) -> Self {
        FormatArg::Int(v)
    }
}
impl From<i32> for FormatArg {
    fn from(v: i32) -> Self {
        FormatArg::Int(v as i64)
    }
}
impl From<u64> for FormatArg {
    fn from(v: u64) -> Self {
        FormatArg::UInt(v)
    }
}
impl From<u32> for FormatArg {
    fn from(v: u32) -> Self {
        FormatArg::UInt(v as u64)
    }
}
impl From<f64> for FormatArg {
    fn from(v: f64) -> Self {
        FormatArg::Float(v)
    }
}
impl From<&str> for FormatArg {
    fn from(v: &str) -> Self {
        FormatArg::Str(v.to_string())
    }
}
impl From<String> for FormatArg {
    fn from(v: String) -> Self {
        FormatArg::Str(v)
    }
}

/// A malformed format string or an argument/specifier count mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError(pub String);

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format error: {}", self.0)
    }
}

impl std::error::Error for FormatError {}

/// Formats `fmt` against `args` using printf-style semantics, supporting
/// the `%d %s %u %ld %f %x` conversion specifiers plus a literal `%%`.
pub fn format_payload(fmt: &str, args: &[FormatArg]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars().peekable();
    let mut arg_iter = args.iter();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('l') => {
                // %ld — long decimal, same representation as %d in Rust.
                match chars.next() {
                    Some('d') => push_int(&mut out, &mut arg_iter, fmt)?,
                    other => {
                        return Err(FormatError(format!(
                            "unsupported conversion '%l{}' in {:?}",
                            other.map(String::from).unwrap_or_default(),
                            fmt
                        )))
                    }
                }
            }
            Some('d') => push_int(&mut out, &mut arg_iter, fmt)?,
            Some('u') => push_uint(&mut out, &mut arg_iter, fmt)?,
            Some('x') => push_hex(&mut out, &mut arg_iter, fmt)?,
            Some('f') => push_float(&mut out, &mut arg_iter, fmt)?,
            Some('s') => push_str(&mut out, &mut arg_iter, fmt)?,
            Some(other) => {
                return Err(FormatError(format!(
                    "unsupported conversion '%{}' in {:?}",
                    other, fmt
                )))
            }
            None => return Err(FormatError(format!("dangling '%' in {:?}", fmt))),
        }
    }

    if arg_iter.next().is_some() {
        return Err(FormatError(format!(
            "more arguments supplied than conversion specifiers in {:?}",
            fmt
        )));
    }

    Ok(out)
}

fn next_arg<'a>(
    args: &mut std::slice::Iter<'a, FormatArg>,
    fmt: &str,
) -> Result<&'a FormatArg, FormatError> {
    args.next()
        .ok_or_else(|| FormatError(format!("missing argument for conversion in {:?}", fmt)))
}

fn push_int(
    out: &mut String,
    args: &mut std::slice::Iter<'_, FormatArg>,
    fmt: &str,
) -> Result<(), FormatError> {
    match next_arg(args, fmt)? {
        FormatArg::Int(v) => out.push_str(&v.to_string()),
        FormatArg::UInt(v) => out.push_str(&v.to_string()),
        other => return Err(type_mismatch("%d", other, fmt)),
    }
    Ok(())
}

fn push_uint(
    out: &mut String,
    args: &mut std::slice::Iter<'_, FormatArg>,
    fmt: &str,
) -> Result<(), FormatError> {
    match next_arg(args, fmt)? {
        FormatArg::UInt(v) => out.push_str(&v.to_string()),
        FormatArg::Int(v) if *v >= 0 => out.push_str(&v.to_string()),
        other => return Err(type_mismatch("%u", other, fmt)),
    }
    Ok(())
}

fn push_hex(
    out: &mut String,
    args: &mut std::slice::Iter<'_, FormatArg>,
    fmt: &str,
) -> Result<(), FormatError> {
    match next_arg(args, fmt)? {
        FormatArg::UInt(v) => out.push_str(&format!("{:x}", v)),
        FormatArg::Int(v) => out.push_str(&format!("{:x}", v)),
        other => return Err(type_mismatch("%x", other, fmt)),
    }
    Ok(())
}

fn push_float(
    out: &mut String,
    args: &mut std::slice::Iter<'_, FormatArg>,
    fmt: &str,
) -> Result<(), FormatError> {
    match next_arg(args, fmt)? {
        FormatArg::Float(v) => out.push_str(&format!("{:.6}", v)),
        other => return Err(type_mismatch("%f", other, fmt)),
    }
    Ok(())
}

fn push_str(
    out: &mut String,
    args: &mut std::slice::Iter<'_, FormatArg>,
    fmt: &str,
) -> Result<(), FormatError> {
    match next_arg(args, fmt)? {
        FormatArg::Str(v) => out.push_str(v),
        other => return Err(type_mismatch("%s", other, fmt)),
    }
    Ok(())
}

fn type_mismatch(spec: &str, got: &FormatArg, fmt: &str) -> FormatError {
    FormatError(format!(
        "argument {:?} does not match conversion '{}' in {:?}",
        got, spec, fmt
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_mixed_specifiers() {
        let out = format_payload(
            "%s is %d years, hex %x, %f%%",
            &[
                FormatArg::from("Ada"),
                FormatArg::from(36i64),
                FormatArg::from(255u64),
                FormatArg::from(3.5f64),
            ],
        )
        .unwrap();
        assert_eq!(out, "Ada is 36 years, hex ff, 3.500000%");
    }

    #[test]
    fn supports_long_decimal() {
        let out = format_payload("%ld", &[FormatArg::from(42i64)]).unwrap();
        assert_eq!(out, "42");
    }

    #[test]
    fn errors_on_missing_argument() {
        assert!(format_payload("%d", &[]).is_err());
    }

    #[test]
    fn errors_on_unknown_specifier() {
        assert!(format_payload("%q", &[FormatArg::from(1i64)]).is_err());
    }

    #[test]
    fn errors_on_extra_arguments() {
        assert!(format_payload("no specifiers", &[FormatArg::from(1i64)]).is_err());
    }
}

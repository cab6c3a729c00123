// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! POSIX-subset printf applied to string-valued arguments.
//!
//! The format is parsed once into literal and directive pieces, then
//! expanded against the argument vector, reusing the format as long as
//! arguments remain. Numbered (`%2$s`) and unnumbered directives must not
//! be mixed; on a short round both pad alike with empty strings and
//! zeroes, a documented divergence from POSIX point 11.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Flags {
    minus: bool,
    plus: bool,
    space: bool,
    hash: bool,
    zero: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Conv {
    /// `%c`: the first character of the argument.
    Char,
    /// `%s`: the argument as-is.
    Str,
    /// `%d` / `%i`.
    Int,
    /// `%u`, `%o`, `%x`, `%X`: the conversion letter is kept.
    Uint(char),
    /// `%e`, `%E`, `%f`, `%F`, `%g`, `%G`, `%a`, `%A`.
    Float(char),
}

#[derive(Clone, Debug, PartialEq)]
enum Piece {
    Literal(String),
    Directive(Directive),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Directive {
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conv: Conv,
    /// 1-based argument position; `None` for unnumbered directives.
    position: Option<usize>,
}

/// A fatal format-string error; nothing is printed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintfError {
    pub message: String,
}

impl std::fmt::Display for PrintfError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PrintfError {}

fn err(message: impl Into<String>) -> PrintfError {
    PrintfError {
        message: message.into(),
    }
}

/// Decode one backslash escape in literal text.
fn push_escape(out: &mut String, chars: &mut std::iter::Peekable<std::str::Chars>) {
    let Some(c) = chars.next() else {
        out.push('\\');
        return;
    };
    match c {
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        'a' => out.push('\x07'),
        'b' => out.push('\x08'),
        'f' => out.push('\x0c'),
        'v' => out.push('\x0b'),
        '\\' => out.push('\\'),
        '"' => out.push('"'),
        '\'' => out.push('\''),
        '0'..='7' => {
            let mut value = c as u32 - '0' as u32;
            for _ in 0..2 {
                match chars.peek() {
                    Some(&d) if ('0'..='7').contains(&d) => {
                        value = value * 8 + (d as u32 - '0' as u32);
                        chars.next();
                    }
                    _ => break,
                }
            }
            out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
        }
        'x' => {
            let mut value: u32 = 0;
            let mut digits = 0;
            while let Some(&d) = chars.peek() {
                if let Some(v) = d.to_digit(16) {
                    value = value.wrapping_mul(16).wrapping_add(v);
                    digits += 1;
                    chars.next();
                } else {
                    break;
                }
            }
            if digits == 0 {
                out.push_str("\\x");
            } else {
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
        }
        other => {
            out.push('\\');
            out.push(other);
        }
    }
}

fn parse_format(format: &str) -> Result<Vec<Piece>, PrintfError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => push_escape(&mut literal, &mut chars),
            '%' => {
                if chars.peek() == Some(&'%') {
                    chars.next();
                    literal.push('%');
                    continue;
                }
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Directive(parse_directive(&mut chars)?));
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    check_numbering(&pieces)?;
    Ok(pieces)
}

fn parse_directive(
    chars: &mut std::iter::Peekable<std::str::Chars>,
) -> Result<Directive, PrintfError> {
    // Positional `M$`.
    let mut position = None;
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            digits.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if !digits.is_empty() && chars.peek() == Some(&'$') {
        chars.next();
        let value: usize = digits
            .parse()
            .map_err(|_| err("invalid argument number"))?;
        if value == 0 {
            return Err(err("invalid argument number 0"));
        }
        position = Some(value);
        digits.clear();
    }

    // Flags (unless the digits already read were a width).
    let mut flags = Flags::default();
    if digits.is_empty() {
        loop {
            match chars.peek() {
                Some('-') => flags.minus = true,
                Some('+') => flags.plus = true,
                Some(' ') => flags.space = true,
                Some('#') => flags.hash = true,
                Some('0') => flags.zero = true,
                _ => break,
            }
            chars.next();
        }
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                chars.next();
            } else {
                break;
            }
        }
    } else if let Some(stripped) = digits.strip_prefix('0') {
        // A width that began with 0 carries the zero flag.
        flags.zero = true;
        digits = stripped.to_string();
    }
    let width = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().map_err(|_| err("field width out of range"))?)
    };

    let mut precision = None;
    if chars.peek() == Some(&'.') {
        chars.next();
        let mut digits = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                chars.next();
            } else {
                break;
            }
        }
        precision = Some(if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| err("precision out of range"))?
        });
    }

    let Some(c) = chars.next() else {
        return Err(err("missing conversion specifier at end of format"));
    };
    let conv = match c {
        'c' => Conv::Char,
        's' => Conv::Str,
        'd' | 'i' => Conv::Int,
        'u' | 'o' | 'x' | 'X' => Conv::Uint(c),
        'e' | 'E' | 'f' | 'F' | 'g' | 'G' | 'a' | 'A' => Conv::Float(c),
        _ => return Err(err(format!("invalid conversion specifier '{c}'"))),
    };
    if flags.hash && matches!(conv, Conv::Char | Conv::Str | Conv::Int) {
        return Err(err(format!("flag '#' is invalid with %{c}")));
    }
    if flags.zero && matches!(conv, Conv::Char | Conv::Str) {
        return Err(err(format!("flag '0' is invalid with %{c}")));
    }
    Ok(Directive {
        flags,
        width,
        precision,
        conv,
        position,
    })
}

fn check_numbering(pieces: &[Piece]) -> Result<(), PrintfError> {
    let mut numbered = false;
    let mut unnumbered = false;
    for piece in pieces {
        if let Piece::Directive(d) = piece {
            match d.position {
                Some(_) => numbered = true,
                None => unnumbered = true,
            }
        }
    }
    if numbered && unnumbered {
        Err(err(
            "format string mixes numbered and unnumbered argument specifications",
        ))
    } else {
        Ok(())
    }
}

/// Arguments consumed per application of the format: the highest numbered
/// position, or the count of directives.
fn args_each_round(pieces: &[Piece]) -> usize {
    let mut count = 0;
    let mut max_position = 0;
    for piece in pieces {
        if let Piece::Directive(d) = piece {
            count += 1;
            if let Some(p) = d.position {
                max_position = max_position.max(p);
            }
        }
    }
    if max_position > 0 { max_position } else { count }
}

/// Parse an integer argument: base auto-detection, and a leading quote
/// makes the value the scalar of the next character.
fn parse_integer(arg: &str) -> (i128, Option<String>) {
    let s = arg.trim();
    if let Some(rest) = s.strip_prefix('\'').or_else(|| s.strip_prefix('"')) {
        return match rest.chars().next() {
            Some(c) => (i128::from(c as u32), None),
            None => (0, Some(format!("'{arg}': expected a numeric value"))),
        };
    }
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (base, digits) = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (16, hex)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };
    let mut value: i128 = 0;
    let mut consumed = 0;
    for c in digits.chars() {
        match c.to_digit(base) {
            Some(d) => {
                value = value.saturating_mul(i128::from(base)).saturating_add(i128::from(d));
                consumed += 1;
            }
            None => break,
        }
    }
    if negative {
        value = -value;
    }
    if consumed == 0 {
        (0, Some(format!("'{arg}': expected a numeric value")))
    } else if consumed < digits.chars().count() {
        (value, Some(format!("'{arg}': value not completely converted")))
    } else {
        (value, None)
    }
}

fn parse_float(arg: &str) -> (f64, Option<String>) {
    let s = arg.trim();
    if s.is_empty() {
        return (0.0, Some(format!("'{arg}': expected a numeric value")));
    }
    match s.parse::<f64>() {
        Ok(value) => (value, None),
        Err(_) => {
            // Accept the longest numeric prefix, like strtod.
            let mut end = 0;
            for i in (1..=s.len()).rev() {
                if s.is_char_boundary(i) && s[..i].parse::<f64>().is_ok() {
                    end = i;
                    break;
                }
            }
            if end == 0 {
                (0.0, Some(format!("'{arg}': expected a numeric value")))
            } else {
                let value = s[..end].parse::<f64>().unwrap_or(0.0);
                (value, Some(format!("'{arg}': value not completely converted")))
            }
        }
    }
}

fn pad(text: String, width: Option<usize>, left_align: bool) -> String {
    let Some(width) = width else {
        return text;
    };
    let len = text.chars().count();
    if len >= width {
        return text;
    }
    let padding = " ".repeat(width - len);
    if left_align {
        text + &padding
    } else {
        padding + &text
    }
}

fn format_int(d: &Directive, value: i128) -> String {
    let mut digits = value.unsigned_abs().to_string();
    if d.precision == Some(0) && value == 0 {
        digits = String::new();
    }
    if let Some(precision) = d.precision
        && digits.len() < precision
    {
        digits = "0".repeat(precision - digits.len()) + &digits;
    }
    let sign = if value < 0 {
        "-"
    } else if d.flags.plus {
        "+"
    } else if d.flags.space {
        " "
    } else {
        ""
    };
    if d.flags.zero && !d.flags.minus && d.precision.is_none()
        && let Some(width) = d.width
    {
        let used = sign.len() + digits.len();
        if used < width {
            digits = "0".repeat(width - used) + &digits;
        }
    }
    pad(format!("{sign}{digits}"), d.width, d.flags.minus)
}

fn format_uint(d: &Directive, conv: char, value: u64) -> String {
    let mut digits = match conv {
        'o' => format!("{value:o}"),
        'x' => format!("{value:x}"),
        'X' => format!("{value:X}"),
        _ => value.to_string(),
    };
    if d.precision == Some(0) && value == 0 {
        digits = String::new();
    }
    if let Some(precision) = d.precision
        && digits.len() < precision
    {
        digits = "0".repeat(precision - digits.len()) + &digits;
    }
    let prefix = if d.flags.hash && value != 0 {
        match conv {
            'o' if !digits.starts_with('0') => "0",
            'x' => "0x",
            'X' => "0X",
            _ => "",
        }
    } else {
        ""
    };
    if d.flags.zero && !d.flags.minus && d.precision.is_none()
        && let Some(width) = d.width
    {
        let used = prefix.len() + digits.len();
        if used < width {
            digits = "0".repeat(width - used) + &digits;
        }
    }
    pad(format!("{prefix}{digits}"), d.width, d.flags.minus)
}

/// C-style exponent form: at least two exponent digits, explicit sign.
fn format_exp(value: f64, precision: usize, upper: bool) -> String {
    let e = if upper { 'E' } else { 'e' };
    if value == 0.0 {
        let mantissa = format!("{:.precision$}", 0.0);
        return format!("{mantissa}{e}+00");
    }
    let mut exp = value.abs().log10().floor() as i32;
    let mut mantissa = value / 10f64.powi(exp);
    // Rounding the mantissa can push it to 10.0.
    if format!("{mantissa:.precision$}")
        .trim_start_matches('-')
        .starts_with("10")
    {
        mantissa /= 10.0;
        exp += 1;
    }
    let sign = if exp < 0 { '-' } else { '+' };
    let abs_exp = exp.abs();
    format!("{mantissa:.precision$}{e}{sign}{abs_exp:02}")
}

fn strip_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let s = s.trim_end_matches('0');
    s.trim_end_matches('.').to_string()
}

/// C-style `%g`: shortest of `%e` and `%f` at the given significant
/// digits, trailing zeros removed.
fn format_general(value: f64, precision: usize, upper: bool) -> String {
    let p = precision.max(1);
    let exp = if value == 0.0 {
        0
    } else {
        value.abs().log10().floor() as i32
    };
    if exp < -4 || exp >= p as i32 {
        let text = format_exp(value, p - 1, upper);
        match text.split_once(if upper { 'E' } else { 'e' }) {
            Some((mantissa, exponent)) => {
                let e = if upper { 'E' } else { 'e' };
                format!("{}{e}{exponent}", strip_trailing_zeros(mantissa))
            }
            None => text,
        }
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        strip_trailing_zeros(&format!("{value:.decimals$}"))
    }
}

/// C-style `%a` hexadecimal floating point.
fn format_hex_float(value: f64, upper: bool) -> String {
    let text = if value == 0.0 {
        let sign = if value.is_sign_negative() { "-" } else { "" };
        format!("{sign}0x0p+0")
    } else if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value < 0.0 { "-inf".to_string() } else { "inf".to_string() }
    } else {
        let bits = value.to_bits();
        let sign = if bits >> 63 == 1 { "-" } else { "" };
        let raw_exp = ((bits >> 52) & 0x7ff) as i64;
        let mantissa = bits & 0x000f_ffff_ffff_ffff;
        let (lead, exp) = if raw_exp == 0 {
            // Subnormal.
            (0, -1022)
        } else {
            (1, raw_exp - 1023)
        };
        let mut hex = format!("{mantissa:013x}");
        while hex.len() > 1 && hex.ends_with('0') {
            hex.pop();
        }
        if mantissa == 0 {
            format!("{sign}0x{lead}p{sign_e}{exp}", sign_e = if exp < 0 { "-" } else { "+" }, exp = exp.abs())
        } else {
            format!(
                "{sign}0x{lead}.{hex}p{sign_e}{exp}",
                sign_e = if exp < 0 { "-" } else { "+" },
                exp = exp.abs()
            )
        }
    };
    if upper { text.to_uppercase() } else { text }
}

fn format_float_conv(d: &Directive, conv: char, value: f64) -> String {
    let precision = d.precision.unwrap_or(6);
    let upper = conv.is_ascii_uppercase();
    let mut text = if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value < 0.0 { "-inf".to_string() } else { "inf".to_string() }
    } else {
        match conv.to_ascii_lowercase() {
            'e' => format_exp(value, precision, upper),
            'g' => format_general(value, precision, upper),
            'a' => format_hex_float(value, upper),
            _ => format!("{value:.precision$}"),
        }
    };
    if upper && conv.to_ascii_lowercase() != 'a' {
        text = text.to_uppercase();
    }
    if !text.starts_with('-') {
        if d.flags.plus {
            text = format!("+{text}");
        } else if d.flags.space {
            text = format!(" {text}");
        }
    }
    if d.flags.zero && !d.flags.minus
        && let Some(width) = d.width
        && text.len() < width
        && value.is_finite()
    {
        let (sign, rest) = match text.strip_prefix(['-', '+', ' ']) {
            Some(rest) => (text[..1].to_string(), rest.to_string()),
            None => (String::new(), text.clone()),
        };
        text = format!("{sign}{}{rest}", "0".repeat(width - text.len()));
    }
    pad(text, d.width, d.flags.minus)
}

fn expand_directive(d: &Directive, arg: &str, warnings: &mut Vec<String>) -> String {
    match d.conv {
        Conv::Char => {
            let text: String = arg.chars().take(1).collect();
            pad(text, d.width, d.flags.minus)
        }
        Conv::Str => {
            let text: String = match d.precision {
                Some(precision) => arg.chars().take(precision).collect(),
                None => arg.to_string(),
            };
            pad(text, d.width, d.flags.minus)
        }
        Conv::Int => {
            let (value, warning) = parse_integer(arg);
            warnings.extend(warning);
            format_int(d, value)
        }
        Conv::Uint(conv) => {
            let (value, warning) = parse_integer(arg);
            warnings.extend(warning);
            format_uint(d, conv, value as u64)
        }
        Conv::Float(conv) => {
            let (value, warning) = parse_float(arg);
            warnings.extend(warning);
            format_float_conv(d, conv, value)
        }
    }
}

/// Apply a parsed format to one round of arguments.
fn expand_round(pieces: &[Piece], args: &[&str], out: &mut String, warnings: &mut Vec<String>) {
    let mut next = 0usize;
    for piece in pieces {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Directive(d) => {
                let index = match d.position {
                    Some(p) => p - 1,
                    None => {
                        let i = next;
                        next += 1;
                        i
                    }
                };
                // Arguments short of a full round pad with the empty
                // string; the numeric conversions read it as zero.
                let arg = args.get(index).copied().unwrap_or("");
                let text = if arg.is_empty() && !matches!(d.conv, Conv::Char | Conv::Str) {
                    expand_directive(d, "0", warnings)
                } else {
                    expand_directive(d, arg, warnings)
                };
                out.push_str(&text);
            }
        }
    }
}

/// Run the `printf` command: expand the format to standard out, warnings
/// to the secondary stream. The exit status reflects whether any argument
/// conversion reported trouble.
pub fn run_printf(args: &crate::args::PrintfArgs) -> i32 {
    use std::io::Write;
    match format_args(&args.format, &args.args) {
        Ok((out, warnings)) => {
            print!("{out}");
            let _ = std::io::stdout().flush();
            let mut trouble = false;
            for warning in &warnings {
                eprintln!("pomerge: {warning}");
                trouble = trouble || warning != "ignoring excess arguments";
            }
            i32::from(trouble)
        }
        Err(error) => {
            eprintln!("pomerge: {error}");
            1
        }
    }
}

/// Format `args` with `format`, reusing the format as long as arguments
/// remain. Returns the expanded text and the conversion warnings.
pub fn format_args(format: &str, args: &[String]) -> Result<(String, Vec<String>), PrintfError> {
    let pieces = parse_format(format)?;
    let per_round = args_each_round(&pieces);
    let mut out = String::new();
    let mut warnings = Vec::new();
    if per_round == 0 {
        if !args.is_empty() {
            warnings.push("ignoring excess arguments".to_string());
        }
        expand_round(&pieces, &[], &mut out, &mut warnings);
        return Ok((out, warnings));
    }
    let mut start = 0;
    loop {
        let round: Vec<&str> = args[start.min(args.len())..(start + per_round).min(args.len())]
            .iter()
            .map(String::as_str)
            .collect();
        expand_round(&pieces, &round, &mut out, &mut warnings);
        start += per_round;
        if start >= args.len() {
            break;
        }
    }
    Ok((out, warnings))
}

//! Literal syntax shared by both program loaders
//!
//! - identifiers: `[A-Za-z_\-$&%*!?][A-Za-z0-9_\-$&%*!?]*`
//! - integers: optional sign, decimal / `0x` hex / `0o` or leading-zero octal,
//!   `_` allowed between digit groups
//! - strings: `\ddd` escapes a codepoint by three decimal digits

const IDENT_SPECIAL: &str = "_-$&%*!?";

/// Check whether `s` is a valid label or variable name
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || IDENT_SPECIAL.contains(c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || IDENT_SPECIAL.contains(c))
}

/// Parse an integer literal
pub fn parse_int(text: &str) -> Option<i64> {
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(rest) = strip_prefix_ci(body, "0x") {
        (16, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0o") {
        (8, rest)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }

    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if !cleaned.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i128::from_str_radix(&cleaned, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Decode `\ddd` escape sequences
///
/// Returns `None` for a backslash not followed by exactly three decimal
/// digits, or for a code that is not a valid `char`.
pub fn unescape(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut code = 0u32;
        for _ in 0..3 {
            code = code * 10 + chars.next()?.to_digit(10)?;
        }
        out.push(char::from_u32(code)?);
    }
    Some(out)
}

/// Encode a string so it survives as a single whitespace-free token
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if (c as u32) <= 32 || c == '#' || c == '\\' {
            out.push_str(&format!("\\{:03}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

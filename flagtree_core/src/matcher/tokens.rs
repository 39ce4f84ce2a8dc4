use crate::constant::DOUBLE_DASH;
use crate::model::OptionStyle;

/// An option token, split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OptionToken<'t> {
    pub(crate) prefix: &'t str,
    pub(crate) name: &'t str,
    pub(crate) delimiter: Option<char>,
    pub(crate) argument: Option<&'t str>,
    pub(crate) is_long: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'t> {
    DoubleDash,
    Option(OptionToken<'t>),
    Positional(&'t str),
}

/// Whether `token` is spelled like an option.
///
/// A lone `-` and tokens starting with three dashes are not options.
pub(crate) fn is_option(token: &str, style: OptionStyle) -> bool {
    let mut chars = token.chars();

    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some('-'), Some(c)) => c != '-',
        (Some('-'), Some(c), _) => c != '-',
        (Some('/'), Some(_), _) => style == OptionStyle::Windows,
        _ => false,
    }
}

pub(crate) fn classify(token: &str, style: OptionStyle) -> Token<'_> {
    if token == DOUBLE_DASH {
        Token::DoubleDash
    } else if is_option(token, style) {
        Token::Option(split_option(token))
    } else {
        Token::Positional(token)
    }
}

// Callers must check `is_option` first.
fn split_option(token: &str) -> OptionToken<'_> {
    let (prefix, body, is_long) = if let Some(body) = token.strip_prefix(DOUBLE_DASH) {
        (DOUBLE_DASH, body, true)
    } else if let Some(body) = token.strip_prefix('-') {
        ("-", body, false)
    } else {
        // Windows: a body longer than one character is a long name.
        let body = &token[1..];
        ("/", body, body.chars().count() > 1)
    };
    let delimiter = if prefix == "/" { ':' } else { '=' };

    match body.split_once(delimiter) {
        Some((name, argument)) => OptionToken {
            prefix,
            name,
            delimiter: Some(delimiter),
            argument: Some(argument),
            is_long,
        },
        None => OptionToken {
            prefix,
            name: body,
            delimiter: None,
            argument: None,
            is_long,
        },
    }
}

/// Whether `token` reads as a negative number, so that a numeric flag may take it as its value.
pub(crate) fn is_negative_number(token: &str) -> bool {
    token
        .strip_prefix('-')
        .map(|digits| {
            !digits.is_empty()
                && digits
                    .chars()
                    .all(|c| c.is_ascii_hexdigit() || c == '.' || c == 'e' || c == '_')
                && digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        })
        .unwrap_or(false)
}

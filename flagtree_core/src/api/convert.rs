use std::path::PathBuf;
use std::time::Duration;

use crate::prelude::FlagValue;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const NANOS_PER_SECOND: u128 = 1_000_000_000;

fn format_radix(negative: bool, mut magnitude: u128, base: u32) -> String {
    if base == 10 || !(2..=36).contains(&base) {
        return if negative {
            format!("-{magnitude}")
        } else {
            magnitude.to_string()
        };
    }

    let mut digits = Vec::default();

    loop {
        digits.push(DIGITS[(magnitude % base as u128) as usize]);
        magnitude /= base as u128;

        if magnitude == 0 {
            break;
        }
    }

    if negative {
        digits.push(b'-');
    }

    digits.iter().rev().map(|d| *d as char).collect()
}

macro_rules! signed_flag_value {
    ($($t:ty),*) => {
        $(
            impl FlagValue for $t {
                fn parse_flag(token: &str, base: u32) -> Result<Self, String> {
                    <$t>::from_str_radix(token, base).map_err(|error| error.to_string())
                }

                fn format_flag(&self, base: u32) -> String {
                    format_radix(*self < 0, (*self as i128).unsigned_abs(), base)
                }

                fn is_numeric() -> bool {
                    true
                }
            }
        )*
    };
}

macro_rules! unsigned_flag_value {
    ($($t:ty),*) => {
        $(
            impl FlagValue for $t {
                fn parse_flag(token: &str, base: u32) -> Result<Self, String> {
                    <$t>::from_str_radix(token, base).map_err(|error| error.to_string())
                }

                fn format_flag(&self, base: u32) -> String {
                    format_radix(false, *self as u128, base)
                }

                fn is_numeric() -> bool {
                    true
                }
            }
        )*
    };
}

macro_rules! float_flag_value {
    ($($t:ty),*) => {
        $(
            impl FlagValue for $t {
                fn parse_flag(token: &str, _base: u32) -> Result<Self, String> {
                    token.parse::<$t>().map_err(|error| error.to_string())
                }

                fn format_flag(&self, _base: u32) -> String {
                    self.to_string()
                }

                fn is_numeric() -> bool {
                    true
                }
            }
        )*
    };
}

signed_flag_value!(i8, i16, i32, i64, i128, isize);
unsigned_flag_value!(u8, u16, u32, u64, u128, usize);
float_flag_value!(f32, f64);

impl FlagValue for String {
    fn parse_flag(token: &str, _base: u32) -> Result<Self, String> {
        Ok(token.to_string())
    }

    fn format_flag(&self, _base: u32) -> String {
        self.clone()
    }
}

impl FlagValue for PathBuf {
    fn parse_flag(token: &str, _base: u32) -> Result<Self, String> {
        Ok(PathBuf::from(token))
    }

    fn format_flag(&self, _base: u32) -> String {
        self.display().to_string()
    }
}

impl FlagValue for char {
    fn parse_flag(token: &str, _base: u32) -> Result<Self, String> {
        let mut chars = token.chars();

        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err("expected a single character".to_string()),
        }
    }

    fn format_flag(&self, _base: u32) -> String {
        self.to_string()
    }
}

impl FlagValue for bool {
    // An absent value means the flag was given.
    fn parse_flag(token: &str, _base: u32) -> Result<Self, String> {
        match token {
            "" | "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(format!("invalid boolean `{token}'")),
        }
    }

    fn format_flag(&self, _base: u32) -> String {
        self.to_string()
    }

    fn is_boolean() -> bool {
        true
    }
}

impl FlagValue for Duration {
    fn parse_flag(token: &str, _base: u32) -> Result<Self, String> {
        parse_duration(token)
    }

    fn format_flag(&self, _base: u32) -> String {
        format_duration(self)
    }
}

/// Parse durations of the form `1h30m`, `1.5s`, `300ms`, `10us`, `42ns`.
fn parse_duration(token: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid duration `{token}'");
    let mut rest = token.strip_prefix('+').unwrap_or(token);

    if rest == "0" {
        return Ok(Duration::ZERO);
    }

    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        rest = &rest[number_end..];
        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        if number.is_empty() || number == "." {
            return Err(invalid());
        }

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SECOND,
            "m" => 60 * NANOS_PER_SECOND,
            "h" => 3_600 * NANOS_PER_SECOND,
            "" => return Err(format!("missing unit in duration `{token}'")),
            _ => return Err(format!("unknown unit `{unit}' in duration `{token}'")),
        };
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(invalid)?;
        let mut numerator: u128 = 0;
        let mut denominator: u128 = 1;

        for digit in fraction.chars().take(18) {
            numerator = numerator * 10 + digit.to_digit(10).ok_or_else(invalid)? as u128;
            denominator *= 10;
        }

        nanos = nanos
            .checked_add(numerator * scale / denominator)
            .ok_or_else(invalid)?;
        total = total.checked_add(nanos).ok_or_else(invalid)?;
    }

    let seconds = u64::try_from(total / NANOS_PER_SECOND).map_err(|_| invalid())?;
    Ok(Duration::new(seconds, (total % NANOS_PER_SECOND) as u32))
}

fn format_duration(duration: &Duration) -> String {
    let nanos = duration.subsec_nanos();

    if nanos == 0 {
        format!("{}s", duration.as_secs())
    } else if nanos % 1_000_000 == 0 {
        format!("{}ms", duration.as_millis())
    } else if nanos % 1_000 == 0 {
        format!("{}us", duration.as_micros())
    } else {
        format!("{}ns", duration.as_nanos())
    }
}

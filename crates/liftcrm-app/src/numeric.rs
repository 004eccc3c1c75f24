// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Lenient number parsing for form inputs. Leading whitespace is skipped and
//! the longest numeric prefix wins, so `"12kg"` reads as 12 and `"abc"` reads
//! as nothing. Decimals accept an exponent (`"1e3"`); integers stop at it.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Leading integer of `raw`, e.g. `"4.7"` -> 4.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits = text[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}

/// Powers of ten past this underflow to zero or overflow any `Decimal`.
const MAX_EXPONENT_STEPS: u64 = 64;

/// Leading decimal number of `raw`, e.g. `"12.50 INR"` -> 12.50 and
/// `"2.5E-1"` -> 0.25. A dangling exponent marker is ignored (`"1e"` -> 1).
pub fn parse_decimal_prefix(raw: &str) -> Option<Decimal> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = usize::from(text.starts_with(['+', '-']));
    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if frac_digits > 0 || int_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    let mantissa_end = end;
    let mut exponent = None;
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign_len = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let digits = bytes[end + 1 + sign_len..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0 {
            exponent = Some(&text[end + 1..end + 1 + sign_len + digits]);
        }
    }

    let number = text[..mantissa_end].trim_end_matches('.');
    let number = number.strip_prefix('+').unwrap_or(number);
    let normalized = match number.strip_prefix('-') {
        Some(rest) if rest.starts_with('.') => format!("-0{rest}"),
        _ if number.starts_with('.') => format!("0{number}"),
        _ => number.to_owned(),
    };
    let mantissa = Decimal::from_str(&normalized).ok()?;
    match exponent {
        Some(exponent) => scale_by_ten(mantissa, exponent.parse().ok()?),
        None => Some(mantissa),
    }
}

fn scale_by_ten(value: Decimal, exponent: i64) -> Option<Decimal> {
    let steps = exponent.unsigned_abs().min(MAX_EXPONENT_STEPS);
    (0..steps).try_fold(value, |value, _| {
        if exponent > 0 {
            value.checked_mul(Decimal::TEN)
        } else {
            value.checked_div(Decimal::TEN)
        }
    })
}

/// `parse_decimal_prefix`, treating anything unparsable as zero.
pub fn decimal_or_zero(raw: &str) -> Decimal {
    parse_decimal_prefix(raw).unwrap_or(Decimal::ZERO)
}

// Fixed-point unit helpers
//
// Native amounts and reference (USD) amounts both carry 18 decimals.

use crate::core::Amount;

/// Decimals of the native value unit
pub const NATIVE_DECIMALS: u32 = 18;

/// Decimals of reference-unit amounts (minimum contribution, converted values)
pub const REFERENCE_DECIMALS: u32 = 18;

/// One whole native unit (1e18)
pub const ONE_NATIVE: Amount = 1_000_000_000_000_000_000;

/// 10^exp, or None if it doesn't fit
pub fn pow10(exp: u32) -> Option<Amount> {
    10u128.checked_pow(exp)
}

/// Parse a decimal string ("1.5") into fixed-point units
pub fn parse_units(value: &str, decimals: u32) -> Result<Amount, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Empty amount".to_string());
    }

    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };

    if frac.len() > decimals as usize {
        return Err(format!("Too many decimal places: {} (max {})", frac.len(), decimals));
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(format!("Invalid amount: {}", value));
    }

    let scale = pow10(decimals).ok_or("Decimals out of range")?;
    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|e| format!("Invalid amount {}: {}", value, e))?
    };

    let frac_value: Amount = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        padded.parse().map_err(|e| format!("Invalid amount {}: {}", value, e))?
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_value))
        .ok_or_else(|| format!("Amount too large: {}", value))
}

/// Format fixed-point units as a decimal string, trimming trailing zeros
pub fn format_units(amount: Amount, decimals: u32) -> String {
    let Some(scale) = pow10(decimals) else {
        return amount.to_string();
    };
    let whole = amount / scale;
    let frac = amount % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Parse a native amount ("1.0" -> 1e18)
pub fn parse_ether(value: &str) -> Result<Amount, String> {
    parse_units(value, NATIVE_DECIMALS)
}

/// Format a native amount (1e18 -> "1")
pub fn format_ether(amount: Amount) -> String {
    format_units(amount, NATIVE_DECIMALS)
}

/// Whole reference units as an 18-decimal fixed-point amount
pub fn usd(whole: u64) -> Amount {
    Amount::from(whole) * ONE_NATIVE
}

//! Amount conversion between decimal strings and smallest-unit integers.
//!
//! EVM conversions are exact string arithmetic (no float multiply), since a
//! wei amount at 18 decimals exceeds f64 precision. Solana conversions keep
//! the original float-multiply-then-floor behavior; see the dispatcher.

use super::error::ValidationError;

/// Parse a decimal amount string into its smallest-unit integer at the given
/// decimal count. Exact: `"1.5"` at 18 decimals -> `1500000000000000000`.
pub fn parse_units(amount: &str, decimals: u8) -> Result<u128, ValidationError> {
    let amount = amount.trim();
    if amount.is_empty() || amount.starts_with('-') {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }

    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }
    if whole.is_empty() && frac.is_empty() {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }
    if frac.len() > decimals as usize {
        return Err(ValidationError::InvalidAmount(format!(
            "{} has more than {} decimal places",
            amount, decimals
        )));
    }

    let whole_part: u128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| ValidationError::InvalidAmount(amount.to_string()))?
    };

    let mut frac_padded = frac.to_string();
    while frac_padded.len() < decimals as usize {
        frac_padded.push('0');
    }
    let frac_part: u128 = if frac_padded.is_empty() {
        0
    } else {
        frac_padded
            .parse()
            .map_err(|_| ValidationError::InvalidAmount(amount.to_string()))?
    };

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| ValidationError::InvalidAmount(amount.to_string()))?;
    whole_part
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_part))
        .ok_or_else(|| ValidationError::InvalidAmount(format!("{} overflows", amount)))
}

/// Format a smallest-unit decimal integer string back into a human-readable
/// decimal value, trimming trailing zeros. `"1500000000000000000"` at 18
/// decimals -> `"1.5"`.
pub fn format_units(raw: &str, decimals: u8) -> Result<String, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(raw.to_string()));
    }

    let decimals = decimals as usize;
    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - raw.len() + 1), raw)
    } else {
        raw.to_string()
    };

    let split = padded.len() - decimals;
    let whole = padded[..split].trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    let frac = padded[split..].trim_end_matches('0');

    if frac.is_empty() {
        Ok(whole.to_string())
    } else {
        Ok(format!("{}.{}", whole, frac))
    }
}

/// Convert a hex-prefixed RPC quantity into a decimal integer string.
pub fn hex_to_decimal(hex: &str) -> Result<String, ValidationError> {
    let stripped = hex.trim().trim_start_matches("0x");
    if stripped.is_empty() {
        return Ok("0".to_string());
    }
    u128::from_str_radix(stripped, 16)
        .map(|v| v.to_string())
        .map_err(|_| ValidationError::InvalidAmount(format!("invalid hex quantity: {}", hex)))
}

/// Encode a smallest-unit integer as a hex-prefixed quantity.
#[must_use]
pub fn to_hex_quantity(raw: u128) -> String {
    format!("0x{:x}", raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units_exact() {
        assert_eq!(parse_units("1.5", 18).unwrap(), 1_500_000_000_000_000_000);
        assert_eq!(parse_units("0.01", 18).unwrap(), 10_000_000_000_000_000);
        assert_eq!(parse_units("2", 6).unwrap(), 2_000_000);
        assert_eq!(parse_units("0.000001", 6).unwrap(), 1);
        assert_eq!(parse_units("0", 18).unwrap(), 0);
    }

    #[test]
    fn test_parse_units_rejects_garbage() {
        assert!(parse_units("", 18).is_err());
        assert!(parse_units("-1", 18).is_err());
        assert!(parse_units("1.2.3", 18).is_err());
        assert!(parse_units("abc", 18).is_err());
        // More fractional digits than the token carries
        assert!(parse_units("0.0000001", 6).is_err());
    }

    #[test]
    fn test_round_trip_recovers_original() {
        let raw = parse_units("1.5", 18).unwrap();
        assert_eq!(raw.to_string(), "1500000000000000000");
        assert_eq!(format_units(&raw.to_string(), 18).unwrap(), "1.5");

        let raw = parse_units("0.25", 6).unwrap();
        assert_eq!(format_units(&raw.to_string(), 6).unwrap(), "0.25");
    }

    #[test]
    fn test_format_units_small_values() {
        assert_eq!(format_units("1", 18).unwrap(), "0.000000000000000001");
        assert_eq!(format_units("0", 18).unwrap(), "0");
        assert_eq!(format_units("1000000", 6).unwrap(), "1");
    }

    #[test]
    fn test_hex_quantity_round_trip() {
        assert_eq!(hex_to_decimal("0xde0b6b3a7640000").unwrap(), "1000000000000000000");
        assert_eq!(hex_to_decimal("0x0").unwrap(), "0");
        assert_eq!(hex_to_decimal("0x").unwrap(), "0");
        assert!(hex_to_decimal("0xzz").is_err());

        assert_eq!(to_hex_quantity(1_000_000_000_000_000_000), "0xde0b6b3a7640000");
        assert_eq!(to_hex_quantity(0), "0x0");
    }
}

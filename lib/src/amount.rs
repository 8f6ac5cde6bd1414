//! Decimal amount scaling.
//!
//! Amounts are carried on-chain as integer base units. Scaling from decimal
//! text truncates extra fractional digits so no fractional base unit is
//! ever produced.

use crate::error::AmountError;

/// Largest decimal precision whose scale factor fits in a `u64`.
pub const MAX_DECIMALS: u8 = 18;

fn scale_factor(decimals: u8) -> Result<u64, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }
    Ok(10u64.pow(decimals as u32))
}

/// Parse a decimal string like "12.345" into base units.
///
/// Digits beyond `decimals` are dropped (floor rounding).
pub fn scale(amount: &str, decimals: u8) -> Result<u64, AmountError> {
    let factor = scale_factor(decimals)?;
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match amount.split_once('.') {
        Some((_, rest)) if rest.contains('.') => return Err(AmountError::MultipleDecimalPoints),
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(c) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(c));
    }

    let mut units: u64 = 0;
    for digit in whole.bytes() {
        units = units
            .checked_mul(10)
            .and_then(|u| u.checked_add((digit - b'0') as u64))
            .ok_or(AmountError::Overflow)?;
    }
    units = units.checked_mul(factor).ok_or(AmountError::Overflow)?;

    let mut frac_units: u64 = 0;
    let mut place = factor;
    for digit in frac.bytes().take(decimals as usize) {
        place /= 10;
        frac_units += (digit - b'0') as u64 * place;
    }

    units.checked_add(frac_units).ok_or(AmountError::Overflow)
}

/// Render base units as a decimal string, trimming trailing fractional zeros.
pub fn unscale(units: u64, decimals: u8) -> Result<String, AmountError> {
    let factor = scale_factor(decimals)?;
    let whole = units / factor;
    let frac = units % factor;
    if frac == 0 {
        return Ok(whole.to_string());
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    Ok(format!("{}.{}", whole, frac.trim_end_matches('0')))
}

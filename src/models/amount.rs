use crate::error::AmountParseError;
use ethers::types::U256;
use serde::{Serialize, Serializer};
use std::fmt;

/// USDC on Base uses 6 decimals.
pub const USDC_DECIMALS: u8 = 6;

/// Largest precision we accept; 10^77 is the biggest power of ten that fits in a U256.
const MAX_DECIMALS: u8 = 77;

/// Fixed-point token amount: an integer count of the token's smallest unit.
///
/// Amounts are only ever created from a decimal string (`parse`) or from raw units read
/// off-chain (`from_units`). All arithmetic stays in unit space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    units: U256,
    decimals: u8,
}

impl TokenAmount {
    pub fn from_units(units: U256, decimals: u8) -> Self {
        Self { units, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::from_units(U256::zero(), decimals)
    }

    /// Scale a human-entered decimal string into token units without touching floats.
    pub fn parse(input: &str, decimals: u8) -> Result<Self, AmountParseError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountParseError::UnsupportedPrecision(decimals));
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(AmountParseError::Negative(trimmed.to_string()));
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(AmountParseError::Malformed(trimmed.to_string()));
        }
        if fraction.len() > decimals as usize {
            return Err(AmountParseError::TooManyDecimals {
                value: trimmed.to_string(),
                max: decimals,
            });
        }

        // Right-pad the fraction so "25.5" with 6 decimals becomes "25" + "500000".
        let mut digits = String::with_capacity(whole.len() + decimals as usize);
        digits.push_str(whole);
        digits.push_str(fraction);
        digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));

        let digits = digits.trim_start_matches('0');
        let units = if digits.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(digits)
                .map_err(|_| AmountParseError::Overflow(trimmed.to_string()))?
        };

        Ok(Self { units, decimals })
    }

    pub fn units(&self) -> U256 {
        self.units
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.units.is_zero()
    }

    /// Canonical decimal form: no trailing fractional zeros and no dangling point.
    pub fn to_decimal_string(&self) -> String {
        let raw = self.units.to_string();
        let decimals = self.decimals as usize;

        if decimals == 0 {
            return raw;
        }

        let padded = format!("{:0>width$}", raw, width = decimals + 1);
        let (whole, fraction) = padded.split_at(padded.len() - decimals);
        let fraction = fraction.trim_end_matches('0');

        if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, fraction)
        }
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

pub fn parse_token_amount(input: &str) -> Result<TokenAmount, AmountParseError> {
    TokenAmount::parse(input, USDC_DECIMALS)
}

pub fn format_token_amount(amount: &TokenAmount) -> String {
    amount.to_decimal_string()
}

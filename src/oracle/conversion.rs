// Native amount -> reference value conversion

use crate::core::Amount;
use crate::oracle::RoundData;
use num_bigint::BigUint;

/// Conversion error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Feed reported zero or a negative price
    NonPositiveAnswer(i128),
    /// Converted value doesn't fit in an Amount
    Overflow,
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConversionError::NonPositiveAnswer(answer) => write!(f, "Non-positive price answer: {}", answer),
            ConversionError::Overflow => write!(f, "Conversion overflow"),
        }
    }
}

impl std::error::Error for ConversionError {}

/// Reference value of `amount` native units at the given round.
///
/// `amount` and the result both carry 18 decimals, so the feed's own
/// precision cancels out: `amount * answer / 10^decimals`.
/// The product is taken at full width; division truncates toward zero.
pub fn conversion_rate(amount: Amount, round: &RoundData) -> Result<Amount, ConversionError> {
    if round.answer <= 0 {
        return Err(ConversionError::NonPositiveAnswer(round.answer));
    }
    let answer = BigUint::from(round.answer as u128);
    let scale = BigUint::from(10u32).pow(round.decimals as u32);

    let value = BigUint::from(amount) * answer / scale;
    Amount::try_from(value).map_err(|_| ConversionError::Overflow)
}

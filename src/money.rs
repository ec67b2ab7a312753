//! Money helpers
//!
//! All amounts in the checkout core are exact minor-unit values in the
//! marketplace currency. The backend and the payment provider speak in major
//! units (floating point), so conversions happen at the edges only.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Currency every order is priced and paid in.
pub fn marketplace_currency() -> &'static Currency {
    iso::SAR
}

/// Errors converting between wire amounts and exact money values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// The amount was NaN or infinite.
    #[error("amount is not a finite number")]
    NotFinite,

    /// The amount does not fit into minor units.
    #[error("amount overflowed while converting to minor units")]
    Overflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Convert a major-unit amount (e.g. `207.5` SAR) into exact money, rounding
/// half away from zero to the currency's minor unit.
///
/// # Errors
///
/// - [`AmountError::NotFinite`]: the amount was NaN or infinite.
/// - [`AmountError::Overflow`]: the amount cannot be represented in minor units.
pub fn money_from_major(
    amount: f64,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, AmountError> {
    if !amount.is_finite() {
        return Err(AmountError::NotFinite);
    }

    let major = Decimal::from_f64(amount).ok_or(AmountError::Overflow)?;
    let scale = minor_unit_scale(currency)?;

    let minor = major
        .round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(scale)
        .ok_or(AmountError::Overflow)?
        .to_i64()
        .ok_or(AmountError::Overflow)?;

    Ok(Money::from_minor(minor, currency))
}

/// Express a money value in major units as an exact decimal.
pub fn to_major(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Calculate a percentage of a minor unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`AmountError::PercentConversion`] if the result cannot be
/// represented in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, AmountError> {
    let minor = Decimal::from_i64(minor).ok_or(AmountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(AmountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AmountError::PercentConversion)
}

fn minor_unit_scale(currency: &Currency) -> Result<Decimal, AmountError> {
    10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or(AmountError::Overflow)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn money_from_major_converts_whole_amounts() -> TestResult {
        let money = money_from_major(207.0, marketplace_currency())?;

        assert_eq!(money, Money::from_minor(20_700, marketplace_currency()));

        Ok(())
    }

    #[test]
    fn money_from_major_rounds_to_minor_unit() -> TestResult {
        assert_eq!(
            money_from_major(12.345_678, marketplace_currency())?.to_minor_units(),
            1_235
        );
        assert_eq!(
            money_from_major(0.1 + 0.2, marketplace_currency())?.to_minor_units(),
            30
        );

        Ok(())
    }

    #[test]
    fn money_from_major_rejects_non_finite() {
        assert_eq!(
            money_from_major(f64::NAN, marketplace_currency()),
            Err(AmountError::NotFinite)
        );
        assert_eq!(
            money_from_major(f64::INFINITY, marketplace_currency()),
            Err(AmountError::NotFinite)
        );
    }

    #[test]
    fn money_from_major_rejects_overflow() {
        assert_eq!(
            money_from_major(1e30, marketplace_currency()),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn to_major_keeps_minor_precision() {
        let money = Money::from_minor(23_050, marketplace_currency());

        assert_eq!(to_major(&money), Decimal::new(23_050, 2));
    }

    #[test]
    fn percent_of_minor_calculates_tax() -> TestResult {
        let result = percent_of_minor(&Percentage::from(0.15), 20_000)?;

        assert_eq!(result, 3_000);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(percent_of_minor(&Percentage::from(0.5), 3)?, 2);
        assert_eq!(percent_of_minor(&Percentage::from(0.25), 3)?, 1);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let result = percent_of_minor(&Percentage::from(2.0), i64::MAX);

        assert_eq!(result, Err(AmountError::PercentConversion));
    }
}

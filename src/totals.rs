//! Totals

use decimal_percentage::Percentage;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    coupons::CouponResult,
    money::{AmountError, percent_of_minor},
};

/// VAT applied to locally estimated totals.
pub const STANDARD_TAX_RATE: f64 = 0.15;

/// The standard tax rate as a percentage.
pub fn standard_tax_rate() -> Percentage {
    Percentage::from(STANDARD_TAX_RATE)
}

/// Errors that can occur while calculating totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// Price multiplied by quantity overflowed.
    #[error("line total overflowed")]
    Overflow,

    /// Tax could not be calculated.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Financial breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// Amount before tax.
    pub before_tax: Money<'static, Currency>,

    /// Discount granted by a coupon.
    pub discount: Money<'static, Currency>,

    /// Tax amount.
    pub tax: Money<'static, Currency>,

    /// Amount the customer pays.
    pub grand_total: Money<'static, Currency>,
}

impl From<&CouponResult> for Totals {
    fn from(coupon: &CouponResult) -> Self {
        Self {
            before_tax: coupon.total_before_tax,
            discount: coupon.discount,
            tax: coupon.total_tax,
            grand_total: coupon.final_total,
        }
    }
}

/// Calculates the totals of a service line.
///
/// A server-confirmed coupon result is authoritative and is returned verbatim.
/// Without one, totals are estimated locally: `before_tax = price * quantity`,
/// no discount, tax at `tax_rate` and a grand total clamped at zero.
///
/// # Errors
///
/// - [`TotalsError::Overflow`]: the line total does not fit in minor units.
/// - [`TotalsError::Amount`]: the tax could not be calculated.
/// - [`TotalsError::Money`]: wrapped money arithmetic error.
pub fn compute_totals(
    base_price: &Money<'static, Currency>,
    quantity: u32,
    coupon: Option<&CouponResult>,
    tax_rate: &Percentage,
) -> Result<Totals, TotalsError> {
    if let Some(coupon) = coupon {
        return Ok(Totals::from(coupon));
    }

    let currency = base_price.currency();

    let before_tax_minor = base_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(TotalsError::Overflow)?;

    let before_tax = Money::from_minor(before_tax_minor, currency);
    let discount = Money::from_minor(0, currency);
    let tax = Money::from_minor(percent_of_minor(tax_rate, before_tax_minor)?, currency);

    let grand_total = before_tax.sub(discount)?.add(tax)?;
    let grand_total = if grand_total.to_minor_units() < 0 {
        Money::from_minor(0, currency)
    } else {
        grand_total
    };

    Ok(Totals {
        before_tax,
        discount,
        tax,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::SAR;
    use testresult::TestResult;

    use super::*;

    fn sar(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, SAR)
    }

    #[test]
    fn local_estimate_applies_standard_tax() -> TestResult {
        let totals = compute_totals(&sar(10_000), 2, None, &standard_tax_rate())?;

        assert_eq!(totals.before_tax, sar(20_000));
        assert_eq!(totals.discount, sar(0));
        assert_eq!(totals.tax, sar(3_000));
        assert_eq!(totals.grand_total, sar(23_000));

        Ok(())
    }

    #[test]
    fn local_estimate_grand_total_is_before_tax_plus_tax() -> TestResult {
        for (price, quantity) in [(0, 1), (1, 1), (999, 3), (12_345, 7), (250_000, 40)] {
            let totals = compute_totals(&sar(price), quantity, None, &standard_tax_rate())?;

            assert_eq!(
                totals.grand_total,
                totals.before_tax.add(totals.tax)?,
                "price {price} x {quantity}"
            );
            assert_eq!(totals.discount, sar(0), "price {price} x {quantity}");
            assert!(
                totals.grand_total.to_minor_units() >= 0,
                "price {price} x {quantity}"
            );
        }

        Ok(())
    }

    #[test]
    fn coupon_result_is_used_verbatim() -> TestResult {
        let coupon = CouponResult {
            total_before_tax: sar(20_000),
            discount: sar(2_000),
            total_tax: sar(2_700),
            final_total: sar(20_700),
        };

        let totals = compute_totals(&sar(10_000), 2, Some(&coupon), &standard_tax_rate())?;

        assert_eq!(totals.before_tax, sar(20_000));
        assert_eq!(totals.discount, sar(2_000));
        assert_eq!(totals.tax, sar(2_700));
        assert_eq!(totals.grand_total, sar(20_700));

        Ok(())
    }

    #[test]
    fn coupon_result_ignores_local_inputs() -> TestResult {
        let coupon = CouponResult {
            total_before_tax: sar(1),
            discount: sar(2),
            total_tax: sar(3),
            final_total: sar(4),
        };

        let totals = compute_totals(&sar(999_999), 50, Some(&coupon), &Percentage::from(0.5))?;

        assert_eq!(totals, Totals::from(&coupon));

        Ok(())
    }

    #[test]
    fn negative_price_clamps_grand_total_at_zero() -> TestResult {
        let totals = compute_totals(&sar(-500), 1, None, &standard_tax_rate())?;

        assert_eq!(totals.grand_total, sar(0));

        Ok(())
    }

    #[test]
    fn overflowing_line_total_is_an_error() {
        let result = compute_totals(&sar(i64::MAX), 2, None, &standard_tax_rate());

        assert_eq!(result, Err(TotalsError::Overflow));
    }
}

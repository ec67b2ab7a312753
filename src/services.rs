//! Service selections

use rusty_money::{Money, iso::Currency};
use serde::Serialize;

use crate::{money::marketplace_currency, validation::ValidationError};

/// Unvalidated service line, as picked by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewServiceSelection {
    /// Parent category identifier.
    pub category_id: String,

    /// Sub-category identifier.
    pub sub_category_id: String,

    /// Identifier of the priced service (sent to the coupon check).
    pub service_id: String,

    /// Category display title.
    pub category_title: String,

    /// Sub-category display title.
    pub sub_category_title: String,

    /// Price of a single unit.
    pub unit_price: Money<'static, Currency>,

    /// Number of units ordered.
    pub quantity: u32,
}

/// One ordered service line.
///
/// Values are validated on construction and never change afterwards; edits
/// replace the whole selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSelection {
    category_id: String,
    sub_category_id: String,
    service_id: String,
    category_title: String,
    sub_category_title: String,
    unit_price: Money<'static, Currency>,
    quantity: u32,
}

impl ServiceSelection {
    /// Parent category identifier.
    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    /// Sub-category identifier.
    pub fn sub_category_id(&self) -> &str {
        &self.sub_category_id
    }

    /// Priced service identifier.
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Category display title.
    pub fn category_title(&self) -> &str {
        &self.category_title
    }

    /// Sub-category display title.
    pub fn sub_category_title(&self) -> &str {
        &self.sub_category_title
    }

    /// Price of a single unit.
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Number of units ordered, always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The line as sent to the pricing service.
    pub fn coupon_line(&self) -> CouponLine {
        CouponLine {
            service_id: self.service_id.clone(),
            qty: self.quantity,
        }
    }
}

impl TryFrom<NewServiceSelection> for ServiceSelection {
    type Error = ValidationError;

    fn try_from(new: NewServiceSelection) -> Result<Self, Self::Error> {
        ensure_present("category_id", &new.category_id)?;
        ensure_present("sub_category_id", &new.sub_category_id)?;
        ensure_present("service_id", &new.service_id)?;

        if new.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }

        let currency = new.unit_price.currency();
        let expected = marketplace_currency();

        if currency != expected {
            return Err(ValidationError::CurrencyMismatch(
                currency.iso_alpha_code,
                expected.iso_alpha_code,
            ));
        }

        if new.unit_price.to_minor_units() < 0 {
            return Err(ValidationError::NegativePrice);
        }

        Ok(Self {
            category_id: new.category_id,
            sub_category_id: new.sub_category_id,
            service_id: new.service_id,
            category_title: new.category_title,
            sub_category_title: new.sub_category_title,
            unit_price: new.unit_price,
            quantity: new.quantity,
        })
    }
}

/// Service line entry of a coupon check request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponLine {
    /// Priced service identifier.
    pub service_id: String,

    /// Number of units.
    pub qty: u32,
}

fn ensure_present(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    fn cleaning(quantity: u32) -> NewServiceSelection {
        NewServiceSelection {
            category_id: "64a9938c49c9b40021aa8126".to_string(),
            sub_category_id: "6594394a616885647682c071".to_string(),
            service_id: "6594394a616885647682c071".to_string(),
            category_title: "General services".to_string(),
            sub_category_title: "Cleaning".to_string(),
            unit_price: Money::from_minor(10_000, iso::SAR),
            quantity,
        }
    }

    #[test]
    fn valid_selection_is_accepted() -> TestResult {
        let selection = ServiceSelection::try_from(cleaning(2))?;

        assert_eq!(selection.quantity(), 2);
        assert_eq!(selection.unit_price(), &Money::from_minor(10_000, iso::SAR));
        assert_eq!(selection.sub_category_title(), "Cleaning");

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = ServiceSelection::try_from(cleaning(0));

        assert_eq!(result, Err(ValidationError::ZeroQuantity));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut new = cleaning(1);
        new.unit_price = Money::from_minor(-1, iso::SAR);

        assert_eq!(
            ServiceSelection::try_from(new),
            Err(ValidationError::NegativePrice)
        );
    }

    #[test]
    fn foreign_currency_is_rejected() {
        let mut new = cleaning(1);
        new.unit_price = Money::from_minor(100, iso::USD);

        assert_eq!(
            ServiceSelection::try_from(new),
            Err(ValidationError::CurrencyMismatch("USD", "SAR"))
        );
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        let mut new = cleaning(1);
        new.service_id = "  ".to_string();

        assert_eq!(
            ServiceSelection::try_from(new),
            Err(ValidationError::EmptyField("service_id"))
        );
    }

    #[test]
    fn coupon_line_carries_service_and_quantity() -> TestResult {
        let selection = ServiceSelection::try_from(cleaning(3))?;

        assert_eq!(
            selection.coupon_line(),
            CouponLine {
                service_id: "6594394a616885647682c071".to_string(),
                qty: 3,
            }
        );

        Ok(())
    }
}

//! Order creation request body.

use serde::Serialize;

use crate::{
    draft::OrderDraft,
    location::{LocationPolicy, SavedAddress},
    payments::PaymentMethod,
    validation::ValidationError,
};

/// Address-book fields, sent only when a saved address is the active location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressBookFields {
    /// Address book identifier.
    pub address_id: String,

    /// Full address text.
    pub address: String,

    /// Building number.
    #[serde(rename = "buildingNo")]
    pub building_no: String,

    /// Floor number.
    #[serde(rename = "floorNo")]
    pub floor_no: String,

    /// Flat number.
    #[serde(rename = "flatNo")]
    pub flat_no: String,
}

impl From<&SavedAddress> for AddressBookFields {
    fn from(address: &SavedAddress) -> Self {
        Self {
            address_id: address.id.clone(),
            address: address.address.clone(),
            building_no: address.building_no.clone(),
            floor_no: address.floor_no.clone(),
            flat_no: address.flat_no.clone(),
        }
    }
}

/// Order creation request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    /// Category identifier.
    pub category_id: String,

    /// Sub-category identifier.
    pub sub_category_id: String,

    /// Category display title.
    pub title: String,

    /// Saved-address street, or the sub-category title for live locations.
    #[serde(rename = "streetName")]
    pub street_name: String,

    /// Free-text notes.
    pub notes: String,

    /// Visit date, `yyyy-MM-dd` or empty.
    pub dt_date: String,

    /// Visit time, `HH:mm` or empty.
    pub dt_time: String,

    /// Ordered quantity.
    pub qty: u32,

    /// Latitude.
    pub lat: f64,

    /// Longitude.
    pub lng: f64,

    /// Saved-address fields.
    #[serde(flatten)]
    pub address_book: Option<AddressBookFields>,

    /// Coupon code, empty when none was applied.
    #[serde(rename = "couponCode")]
    pub coupon_code: String,

    /// Payment method code.
    #[serde(rename = "paymentType")]
    pub payment_type: u8,

    /// Provider payment reference for online payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

impl OrderRequest {
    /// Build the request body for a draft.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the draft has no service, no location,
    /// or a location that cannot be resolved.
    pub fn from_draft(
        draft: &OrderDraft,
        policy: &LocationPolicy,
        coupon_code: Option<&str>,
        method: PaymentMethod,
    ) -> Result<Self, ValidationError> {
        let validated = draft.validate(policy)?;
        let service = validated.service;
        let location = validated.location;

        let street_name = location.saved_address.map_or_else(
            || service.sub_category_title().to_string(),
            |address| address.street_name.clone(),
        );

        Ok(Self {
            category_id: service.category_id().to_string(),
            sub_category_id: service.sub_category_id().to_string(),
            title: service.category_title().to_string(),
            street_name,
            notes: validated.notes.to_string(),
            dt_date: validated.schedule.date_string(),
            dt_time: validated.schedule.time_string(),
            qty: service.quantity(),
            lat: location.coordinate.lat(),
            lng: location.coordinate.lng(),
            address_book: location.saved_address.map(AddressBookFields::from),
            coupon_code: coupon_code.unwrap_or_default().to_string(),
            payment_type: method.api_code(),
            payment_id: None,
        })
    }

    /// Attach the provider's payment reference.
    #[must_use]
    pub fn with_payment_id(mut self, payment_id: Option<String>) -> Self {
        self.payment_id = payment_id;
        self
    }
}

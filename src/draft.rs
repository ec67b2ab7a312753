//! Order draft

use smallvec::SmallVec;

use crate::{
    coupons::CouponCheckRequest,
    location::{LocationChoice, LocationPolicy, ResolvedLocation, resolve_location},
    schedule::Schedule,
    services::ServiceSelection,
    validation::ValidationError,
};

/// The order being composed in a checkout session.
///
/// Only the first service line is priced and submitted; lines are kept in an
/// ordered list so multi-line orders can be added without reshaping the draft.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderDraft {
    services: SmallVec<[ServiceSelection; 1]>,
    location: Option<LocationChoice>,
    notes: String,
    schedule: Schedule,
}

/// A draft that passed validation, ready to be priced and submitted.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedDraft<'a> {
    /// The priced service line.
    pub service: &'a ServiceSelection,

    /// The authoritative order location.
    pub location: ResolvedLocation<'a>,

    /// Free-text notes.
    pub notes: &'a str,

    /// Requested visit date/time.
    pub schedule: &'a Schedule,
}

impl OrderDraft {
    /// Create an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the service line.
    pub fn set_service(&mut self, service: ServiceSelection) {
        self.services.clear();
        self.services.push(service);
    }

    /// All service lines, in order.
    pub fn services(&self) -> &[ServiceSelection] {
        &self.services
    }

    /// The service line that is priced and submitted.
    pub fn service(&self) -> Option<&ServiceSelection> {
        self.services.first()
    }

    /// Choose where the order is fulfilled.
    pub fn set_location(&mut self, location: LocationChoice) {
        self.location = Some(location);
    }

    /// Forget the location choice, e.g. when live location becomes unavailable.
    pub fn clear_location(&mut self) {
        self.location = None;
    }

    /// The active location choice.
    pub fn location(&self) -> Option<&LocationChoice> {
        self.location.as_ref()
    }

    /// Set the free-text notes.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Free-text notes.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Set the requested visit date/time.
    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.schedule = schedule;
    }

    /// Requested visit date/time.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Build the coupon check request for this draft.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingService`] when no service is selected.
    pub fn coupon_request(&self, code: &str) -> Result<CouponCheckRequest, ValidationError> {
        if self.services.is_empty() {
            return Err(ValidationError::MissingService);
        }

        Ok(CouponCheckRequest {
            code: code.to_string(),
            extra: self
                .services
                .iter()
                .map(ServiceSelection::coupon_line)
                .collect(),
        })
    }

    /// Check that the draft can be submitted.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingService`]: no service is selected.
    /// - [`ValidationError::MissingLocation`]: no location is chosen.
    /// - [`ValidationError::Location`]: the location cannot be resolved.
    pub fn validate(&self, policy: &LocationPolicy) -> Result<ValidatedDraft<'_>, ValidationError> {
        let service = self.service().ok_or(ValidationError::MissingService)?;
        let location = self
            .location
            .as_ref()
            .ok_or(ValidationError::MissingLocation)?;

        Ok(ValidatedDraft {
            service,
            location: resolve_location(location, policy)?,
            notes: &self.notes,
            schedule: &self.schedule,
        })
    }
}

//! Coupon ledger
//!
//! Tracks the coupon applied to a draft and orders concurrent coupon checks.
//! Every check is issued a sequence number; only a result carrying the most
//! recently issued number is applied. Anything older is discarded on arrival.

use crate::{
    coupons::{CouponError, CouponResult},
    validation::ValidationError,
};

/// Handle for one issued coupon check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponTicket {
    sequence: u64,
    code: String,
}

impl CouponTicket {
    /// Sequence number of this check.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Trimmed coupon code being checked.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// A coupon confirmed by the pricing service.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon {
    /// The code the user entered.
    pub code: String,

    /// Server-confirmed totals.
    pub result: CouponResult,
}

/// What happened when a coupon check finished.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponResolution {
    /// The result was applied to the draft.
    Applied(CouponResult),

    /// The check failed; any previously applied coupon has been cleared.
    Rejected(CouponError),

    /// A newer check was issued (or the coupon was invalidated) before this one
    /// finished; its result was discarded.
    Superseded,
}

/// Coupon state of a single checkout session.
#[derive(Debug, Default)]
pub struct CouponLedger {
    issued: u64,
    in_flight: Option<u64>,
    applied: Option<AppliedCoupon>,
}

impl CouponLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new coupon check, superseding any check still in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCouponCode`] when the trimmed code is empty.
    /// No sequence number is consumed in that case.
    pub fn issue(&mut self, code: &str) -> Result<CouponTicket, ValidationError> {
        let code = code.trim();

        if code.is_empty() {
            return Err(ValidationError::EmptyCouponCode);
        }

        self.issued += 1;
        self.in_flight = Some(self.issued);

        Ok(CouponTicket {
            sequence: self.issued,
            code: code.to_string(),
        })
    }

    /// Record the outcome of a coupon check.
    pub fn resolve(
        &mut self,
        ticket: CouponTicket,
        result: Result<CouponResult, CouponError>,
    ) -> CouponResolution {
        if self.in_flight != Some(ticket.sequence) {
            return CouponResolution::Superseded;
        }

        self.in_flight = None;

        match result {
            Ok(result) => {
                self.applied = Some(AppliedCoupon {
                    code: ticket.code,
                    result,
                });

                CouponResolution::Applied(result)
            }
            Err(error) => {
                self.applied = None;

                CouponResolution::Rejected(error)
            }
        }
    }

    /// Drop the applied coupon and discard any check still in flight.
    pub fn invalidate(&mut self) {
        self.applied = None;
        self.in_flight = None;
    }

    /// Give up on a check that will never be resolved. The applied coupon is kept.
    pub fn abandon(&mut self, sequence: u64) {
        if self.in_flight == Some(sequence) {
            self.in_flight = None;
        }
    }

    /// The currently applied coupon.
    pub fn applied(&self) -> Option<&AppliedCoupon> {
        self.applied.as_ref()
    }

    /// Server-confirmed totals of the applied coupon.
    pub fn result(&self) -> Option<&CouponResult> {
        self.applied.as_ref().map(|applied| &applied.result)
    }

    /// Code of the applied coupon.
    pub fn code(&self) -> Option<&str> {
        self.applied.as_ref().map(|applied| applied.code.as_str())
    }

    /// Whether a check is outstanding.
    pub fn is_checking(&self) -> bool {
        self.in_flight.is_some()
    }
}

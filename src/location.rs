//! Order location
//!
//! An order's location comes from exactly one of three sources. The
//! [`LocationChoice`] union makes that explicit, and [`resolve_location`] is the
//! only place that turns a choice into the coordinates sent with an order.

use thiserror::Error;

/// Errors resolving a location choice to coordinates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocationError {
    /// A saved address has no stored latitude/longitude.
    #[error("saved address {0} has no coordinates")]
    MissingCoordinates(String),

    /// Latitude/longitude were not finite or out of range (lat, lng).
    #[error("invalid coordinate ({0}, {1})")]
    InvalidCoordinate(f64, f64),

    /// The configured default location was chosen but policy forbids it.
    #[error("orders without a user-provided location are not allowed")]
    DefaultLocationDisallowed,
}

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Create a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidCoordinate`] when either component is
    /// not finite, latitude is outside `[-90, 90]` or longitude is outside
    /// `[-180, 180]`.
    pub fn new(lat: f64, lng: f64) -> Result<Self, LocationError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(LocationError::InvalidCoordinate(lat, lng))
        }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// An entry from the user's address book.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavedAddress {
    /// Address book identifier.
    pub id: String,

    /// Full address text.
    pub address: String,

    /// Street name.
    pub street_name: String,

    /// Building number.
    pub building_no: String,

    /// Floor number.
    pub floor_no: String,

    /// Flat number.
    pub flat_no: String,

    /// Stored latitude, if the address was pinned on a map.
    pub lat: Option<f64>,

    /// Stored longitude, if the address was pinned on a map.
    pub lng: Option<f64>,
}

/// The device's current position.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveLocation {
    /// Device-reported coordinate.
    pub coordinate: Coordinate,

    /// Reverse-geocoded label, when the UI has one.
    pub label: Option<String>,
}

/// Where an order should be fulfilled.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationChoice {
    /// A saved address-book entry.
    SavedAddress(SavedAddress),

    /// The device's live location.
    LiveLocation(LiveLocation),

    /// The configured fallback coordinate.
    DefaultFallback(Coordinate),
}

/// Location policy switches.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationPolicy {
    /// Permit orders placed at the configured fallback coordinate.
    pub allow_default_location: bool,
}

/// The authoritative location of an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLocation<'a> {
    /// Coordinates sent with the order.
    pub coordinate: Coordinate,

    /// Human readable address or label.
    pub label: Option<&'a str>,

    /// The saved address, when one is the active choice.
    pub saved_address: Option<&'a SavedAddress>,
}

/// Resolve a location choice into the coordinates and address used for an order.
///
/// # Errors
///
/// - [`LocationError::MissingCoordinates`]: a saved address lacks lat/lng.
/// - [`LocationError::InvalidCoordinate`]: stored coordinates are out of range.
/// - [`LocationError::DefaultLocationDisallowed`]: the fallback was chosen while
///   the policy forbids it.
pub fn resolve_location<'a>(
    choice: &'a LocationChoice,
    policy: &LocationPolicy,
) -> Result<ResolvedLocation<'a>, LocationError> {
    match choice {
        LocationChoice::SavedAddress(address) => {
            let (Some(lat), Some(lng)) = (address.lat, address.lng) else {
                return Err(LocationError::MissingCoordinates(address.id.clone()));
            };

            Ok(ResolvedLocation {
                coordinate: Coordinate::new(lat, lng)?,
                label: Some(address.address.as_str()),
                saved_address: Some(address),
            })
        }
        LocationChoice::LiveLocation(live) => Ok(ResolvedLocation {
            coordinate: live.coordinate,
            label: live.label.as_deref(),
            saved_address: None,
        }),
        LocationChoice::DefaultFallback(coordinate) => {
            if !policy.allow_default_location {
                return Err(LocationError::DefaultLocationDisallowed);
            }

            Ok(ResolvedLocation {
                coordinate: *coordinate,
                label: None,
                saved_address: None,
            })
        }
    }
}

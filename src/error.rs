// Error types shared by the store, the booking service and the facade

use thiserror::Error;

use crate::flight::FlightId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error("Flight not found: {0}")]
    NotFound(FlightId),

    #[error("Flight {0} already exists")]
    DuplicateIdentity(FlightId),

    #[error("Invalid price for flight {id}: {price}")]
    InvalidPrice { id: FlightId, price: f64 },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),
}

impl From<serde_json::Error> for BookingError {
    fn from(err: serde_json::Error) -> Self {
        BookingError::JsonParseError(err.to_string())
    }
}

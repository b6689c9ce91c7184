// Main library file for the flight index

pub mod activity;
pub mod booking;
pub mod error;
pub mod flight;
pub mod price_index;
pub mod search;
pub mod store;
pub mod system;

// Re-export key types for convenience
pub use activity::{
    EventSink, FlightEvent, Notification, NotificationQueue, RecentSearches, UndoLog,
};
pub use booking::BookingService;
pub use error::BookingError;
pub use flight::{BookingOutcome, Flight, FlightId, NewFlight, PassengerId, RouteKey, SeatStatus};
pub use price_index::PriceIndex;
pub use search::{FlightSummary, SearchService};
pub use store::{FlightStore, IndexSizes, StoreView};
pub use system::{FlightBookingSystem, SystemConfig, SystemStats};

// Booking service: seat decrement while capacity lasts, waiting list afterwards

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    activity::{EventSink, FlightEvent},
    error::BookingError,
    flight::{BookingOutcome, FlightId, PassengerId},
    store::FlightStore,
};

pub struct BookingService {
    store: Arc<FlightStore>,
    sink: Arc<dyn EventSink>,
    notify_on_waitlist: bool,
}

impl BookingService {
    pub fn new(
        store: Arc<FlightStore>,
        sink: Arc<dyn EventSink>,
        notify_on_waitlist: bool,
    ) -> Self {
        Self {
            store,
            sink,
            notify_on_waitlist,
        }
    }

    // Books a seat for `passenger_id`, or queues the passenger when the flight is
    // full. Repeat requests from the same passenger are queued again.
    pub fn book(
        &self,
        flight_id: FlightId,
        passenger_id: PassengerId,
    ) -> Result<BookingOutcome, BookingError> {
        let flight = self.store.find_by_id(flight_id)?;
        let outcome = flight.reserve(passenger_id);

        match outcome {
            BookingOutcome::Confirmed { remaining_seats } => {
                info!(flight_id, passenger_id, remaining_seats, "booking confirmed");
                self.sink.publish(FlightEvent::BookingConfirmed {
                    flight_id,
                    passenger_id,
                });
            }
            BookingOutcome::Queued { position } => {
                info!(flight_id, passenger_id, position, "flight full, passenger waitlisted");
                if self.notify_on_waitlist {
                    self.sink.publish(FlightEvent::Waitlisted {
                        flight_id,
                        passenger_id,
                        position,
                    });
                } else {
                    debug!(flight_id, "waitlist notification suppressed");
                }
            }
        }

        Ok(outcome)
    }
}

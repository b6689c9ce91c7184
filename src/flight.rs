// Flight records and the seat state machine that lives on each of them

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub type FlightId = u32;
pub type PassengerId = u32;

// Direct route between two cities, used as the route index key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteKey {
    pub origin: String,
    pub destination: String,
}

impl RouteKey {
    pub fn new(origin: &str, destination: &str) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.origin, self.destination)
    }
}

// Payload accepted by the store when a flight is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFlight {
    pub id: FlightId,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub total_seats: u32,
    pub price: f64,
}

impl NewFlight {
    pub fn new(
        id: FlightId,
        origin: &str,
        destination: &str,
        departure_time: &str,
        total_seats: u32,
        price: f64,
    ) -> Self {
        Self {
            id,
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_time: departure_time.to_string(),
            total_seats,
            price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatStatus {
    HasCapacity,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOutcome {
    Confirmed { remaining_seats: u32 },
    // 1-based position on the waiting list
    Queued { position: usize },
}

#[derive(Debug)]
struct SeatState {
    available: u32,
    waiting_list: Vec<PassengerId>,
}

impl SeatState {
    fn status(&self) -> SeatStatus {
        if self.available > 0 {
            SeatStatus::HasCapacity
        } else {
            SeatStatus::Full
        }
    }
}

// A single flight. Identity, route, schedule, capacity and price never change after
// creation; the seat count and waiting list sit behind a per-flight lock.
#[derive(Debug)]
pub struct Flight {
    id: FlightId,
    route: RouteKey,
    departure_time: String,
    total_seats: u32,
    price: f64,
    seats: Mutex<SeatState>,
}

impl Flight {
    pub(crate) fn from_new(new: NewFlight) -> Self {
        Self {
            id: new.id,
            route: RouteKey {
                origin: new.origin,
                destination: new.destination,
            },
            departure_time: new.departure_time,
            total_seats: new.total_seats,
            price: new.price,
            seats: Mutex::new(SeatState {
                available: new.total_seats,
                waiting_list: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> FlightId {
        self.id
    }

    pub fn origin(&self) -> &str {
        &self.route.origin
    }

    pub fn destination(&self) -> &str {
        &self.route.destination
    }

    pub fn route(&self) -> &RouteKey {
        &self.route
    }

    pub fn departure_time(&self) -> &str {
        &self.departure_time
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn available_seats(&self) -> u32 {
        self.seats.lock().available
    }

    pub fn waiting_list(&self) -> Vec<PassengerId> {
        self.seats.lock().waiting_list.clone()
    }

    pub fn status(&self) -> SeatStatus {
        self.seats.lock().status()
    }

    // Takes a seat if one is left, otherwise appends the passenger to the waiting list.
    // The check and the mutation happen under one lock acquisition.
    pub(crate) fn reserve(&self, passenger_id: PassengerId) -> BookingOutcome {
        let mut seats = self.seats.lock();
        match seats.status() {
            SeatStatus::HasCapacity => {
                seats.available -= 1;
                BookingOutcome::Confirmed {
                    remaining_seats: seats.available,
                }
            }
            SeatStatus::Full => {
                seats.waiting_list.push(passenger_id);
                BookingOutcome::Queued {
                    position: seats.waiting_list.len(),
                }
            }
        }
    }
}

// Activity logs kept next to the indexes: recent searches, undo history, notifications

use std::{collections::VecDeque, fmt};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::flight::{FlightId, PassengerId, RouteKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlightEvent {
    FlightAdded {
        flight_id: FlightId,
        origin: String,
        destination: String,
    },
    BookingConfirmed {
        flight_id: FlightId,
        passenger_id: PassengerId,
    },
    Waitlisted {
        flight_id: FlightId,
        passenger_id: PassengerId,
        position: usize,
    },
}

impl fmt::Display for FlightEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightEvent::FlightAdded {
                origin,
                destination,
                ..
            } => write!(f, "New flight added: {} to {}", origin, destination),
            FlightEvent::BookingConfirmed { flight_id, .. } => {
                write!(f, "New booking: Flight {}", flight_id)
            }
            FlightEvent::Waitlisted {
                flight_id,
                passenger_id,
                ..
            } => write!(f, "Waitlisted: passenger {} on Flight {}", passenger_id, flight_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub event: FlightEvent,
    pub created_at: DateTime<Utc>,
}

// Where booking and catalogue events get published
pub trait EventSink: Send + Sync {
    fn publish(&self, event: FlightEvent);
}

#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<VecDeque<Notification>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: FlightEvent) {
        self.pending.lock().push_back(Notification {
            event,
            created_at: Utc::now(),
        });
    }

    // Removes and returns every pending notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.pending.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl EventSink for NotificationQueue {
    fn publish(&self, event: FlightEvent) {
        self.push(event);
    }
}

// Most-recent-first list of searched routes. Once full, recording a new route
// drops the oldest one.
#[derive(Debug)]
pub struct RecentSearches {
    capacity: usize,
    routes: Mutex<VecDeque<RouteKey>>,
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            routes: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn record(&self, route: RouteKey) {
        let mut routes = self.routes.lock();
        routes.push_front(route);
        routes.truncate(self.capacity);
    }

    pub fn snapshot(&self) -> Vec<RouteKey> {
        self.routes.lock().iter().cloned().collect()
    }
}

#[derive(Debug)]
pub struct UndoLog {
    capacity: usize,
    actions: Mutex<VecDeque<String>>,
}

impl UndoLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            actions: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, action: String) {
        if self.capacity == 0 {
            return;
        }
        let mut actions = self.actions.lock();
        while actions.len() >= self.capacity {
            actions.pop_front();
        }
        actions.push_back(action);
    }

    pub fn pop(&self) -> Option<String> {
        self.actions.lock().pop_back()
    }

    pub fn peek(&self) -> Option<String> {
        self.actions.lock().back().cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.actions.lock().len()
    }
}

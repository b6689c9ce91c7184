// Flight booking system: one entry point over the store, the services and the activity logs

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tracing::info;

use crate::{
    activity::{EventSink, FlightEvent, NotificationQueue, RecentSearches, UndoLog},
    booking::BookingService,
    error::BookingError,
    flight::{BookingOutcome, Flight, FlightId, NewFlight, PassengerId, RouteKey},
    search::{FlightSummary, SearchService},
    store::FlightStore,
};

#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub recent_searches_capacity: usize,
    pub undo_log_capacity: usize,
    pub notify_on_waitlist: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            recent_searches_capacity: 10,
            undo_log_capacity: 100,
            notify_on_waitlist: true,
        }
    }
}

impl SystemConfig {
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.recent_searches_capacity == 0 {
            return Err(BookingError::InvalidConfig(
                "recent_searches_capacity must be at least 1".to_string(),
            ));
        }
        if self.undo_log_capacity == 0 {
            return Err(BookingError::InvalidConfig(
                "undo_log_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SystemStats {
    pub flights: usize,
    pub routes: usize,
    pub price_levels: usize,
    pub price_index_height: usize,
    pub bookings_confirmed: usize,
    pub bookings_waitlisted: usize,
    pub searches: usize,
    pub undo_entries: usize,
}

#[derive(Debug, Default)]
struct Counters {
    confirmed: AtomicUsize,
    waitlisted: AtomicUsize,
    searches: AtomicUsize,
}

pub struct FlightBookingSystem {
    config: SystemConfig,
    store: Arc<FlightStore>,
    booking: BookingService,
    search: SearchService,
    recent: Arc<RecentSearches>,
    undo: UndoLog,
    notifications: Arc<NotificationQueue>,
    counters: Counters,
}

impl FlightBookingSystem {
    pub fn new(config: SystemConfig) -> Result<Self, BookingError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: SystemConfig) -> Self {
        let store = Arc::new(FlightStore::new());
        let recent = Arc::new(RecentSearches::new(config.recent_searches_capacity));
        let notifications = Arc::new(NotificationQueue::new());

        Self {
            booking: BookingService::new(
                store.clone(),
                notifications.clone(),
                config.notify_on_waitlist,
            ),
            search: SearchService::new(store.clone(), recent.clone()),
            undo: UndoLog::new(config.undo_log_capacity),
            store,
            recent,
            notifications,
            counters: Counters::default(),
            config,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // Adds a flight to every index. The undo entry and the notification are only
    // written once the store accepted the flight.
    pub fn add_flight(&self, new: NewFlight) -> Result<Arc<Flight>, BookingError> {
        let flight = self.store.add_flight(new)?;

        self.undo.push(format!("Added flight {}", flight.id()));
        self.notifications.publish(FlightEvent::FlightAdded {
            flight_id: flight.id(),
            origin: flight.origin().to_string(),
            destination: flight.destination().to_string(),
        });
        info!(flight_id = flight.id(), route = %flight.route(), "flight added");

        Ok(flight)
    }

    // Parses a JSON array of flights and adds them in order.
    // Nothing is added if the document does not parse. Otherwise adding stops at
    // the first rejected flight; the ones before it stay.
    pub fn load_json(&self, json: &str) -> Result<usize, BookingError> {
        let flights: Vec<NewFlight> = serde_json::from_str(json)?;
        let mut added = 0;
        for flight in flights {
            self.add_flight(flight)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn search(&self, origin: &str, destination: &str, max_price: f64) -> Vec<FlightSummary> {
        self.counters.searches.fetch_add(1, Ordering::Relaxed);
        self.search.search(origin, destination, max_price)
    }

    pub fn book(
        &self,
        flight_id: FlightId,
        passenger_id: PassengerId,
    ) -> Result<BookingOutcome, BookingError> {
        let outcome = self.booking.book(flight_id, passenger_id)?;
        let counter = match outcome {
            BookingOutcome::Confirmed { .. } => &self.counters.confirmed,
            BookingOutcome::Queued { .. } => &self.counters.waitlisted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(outcome)
    }

    pub fn find_flight(&self, id: FlightId) -> Result<Arc<Flight>, BookingError> {
        self.store.find_by_id(id)
    }

    pub fn flights_on_route(&self, origin: &str, destination: &str) -> Vec<Arc<Flight>> {
        self.store.find_by_route(origin, destination)
    }

    pub fn flights_in_price_range(&self, min: f64, max: f64) -> Vec<Arc<Flight>> {
        self.store.find_in_price_range(min, max)
    }

    pub fn recent_searches(&self) -> Vec<RouteKey> {
        self.recent.snapshot()
    }

    // Pending notification messages, oldest first. Draining empties the queue.
    pub fn drain_notifications(&self) -> Vec<String> {
        self.notifications
            .drain()
            .into_iter()
            .map(|n| n.event.to_string())
            .collect()
    }

    pub fn pending_notifications(&self) -> usize {
        self.notifications.len()
    }

    pub fn last_action(&self) -> Option<String> {
        self.undo.peek()
    }

    pub fn pop_action(&self) -> Option<String> {
        self.undo.pop()
    }

    pub fn stats(&self) -> SystemStats {
        SystemStats {
            flights: self.store.len(),
            routes: self.store.route_count(),
            price_levels: self.store.price_levels(),
            price_index_height: self.store.price_index_height(),
            bookings_confirmed: self.counters.confirmed.load(Ordering::Relaxed),
            bookings_waitlisted: self.counters.waitlisted.load(Ordering::Relaxed),
            searches: self.counters.searches.load(Ordering::Relaxed),
            undo_entries: self.undo.len(),
        }
    }
}

impl Default for FlightBookingSystem {
    fn default() -> Self {
        Self::with_config(SystemConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn sample_system() -> FlightBookingSystem {
        let system = FlightBookingSystem::default();
        let flights = [
            NewFlight::new(101, "New York", "London", "10:00", 200, 850.50),
            NewFlight::new(102, "London", "Paris", "14:30", 150, 220.75),
            NewFlight::new(103, "Paris", "Rome", "16:45", 180, 175.25),
            NewFlight::new(104, "New York", "London", "18:00", 200, 750.00),
            NewFlight::new(105, "Tokyo", "Seoul", "09:15", 160, 445.00),
            NewFlight::new(106, "Dubai", "Mumbai", "13:20", 190, 380.25),
            NewFlight::new(107, "Singapore", "Bangkok", "11:30", 170, 290.75),
            NewFlight::new(108, "New York", "London", "22:45", 200, 920.50),
        ];
        for flight in flights {
            system.add_flight(flight).unwrap();
        }
        system
    }

    #[test]
    fn test_sample_schedule_end_to_end() {
        let system = sample_system();

        let results = system.search("New York", "London", 900.0);
        let prices: Vec<f64> = results.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![750.00, 850.50]);

        assert_eq!(
            system.book(101, 1001).unwrap(),
            BookingOutcome::Confirmed { remaining_seats: 199 }
        );
        assert_eq!(
            system.book(104, 1002).unwrap(),
            BookingOutcome::Confirmed { remaining_seats: 199 }
        );

        assert_eq!(
            system.recent_searches(),
            vec![RouteKey::new("New York", "London")]
        );

        let notifications = system.drain_notifications();
        assert_eq!(notifications.len(), 10);
        assert_eq!(notifications[0], "New flight added: New York to London");
        assert_eq!(notifications[8], "New booking: Flight 101");
        assert_eq!(notifications[9], "New booking: Flight 104");
        assert!(system.drain_notifications().is_empty());

        let stats = system.stats();
        assert_eq!(stats.flights, 8);
        assert_eq!(stats.routes, 6);
        assert_eq!(stats.price_levels, 8);
        assert!(stats.price_index_height <= 5);
        assert_eq!(stats.bookings_confirmed, 2);
        assert_eq!(stats.searches, 1);
        assert_eq!(stats.undo_entries, 8);
    }

    #[test]
    fn test_duplicate_flight_records_no_activity() {
        let system = sample_system();
        system.drain_notifications();
        let last = system.last_action();

        let err = system
            .add_flight(NewFlight::new(105, "Tokyo", "Osaka", "12:00", 10, 99.0))
            .unwrap_err();

        assert_eq!(err, BookingError::DuplicateIdentity(105));
        assert_eq!(system.pending_notifications(), 0);
        assert_eq!(system.last_action(), last);
        assert_eq!(system.stats().flights, 8);
    }

    #[test]
    fn test_undo_log_tracks_added_flights() {
        let system = sample_system();

        assert_eq!(system.last_action().as_deref(), Some("Added flight 108"));
        assert_eq!(system.pop_action().as_deref(), Some("Added flight 108"));
        assert_eq!(system.pop_action().as_deref(), Some("Added flight 107"));
        assert_eq!(system.stats().undo_entries, 6);
    }

    #[test]
    fn test_recent_searches_hold_last_ten() {
        let system = sample_system();
        for i in 0..11 {
            system.search(&format!("Origin{}", i), "London", 1000.0);
        }

        let recent = system.recent_searches();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0], RouteKey::new("Origin10", "London"));
        assert_eq!(recent[9], RouteKey::new("Origin1", "London"));
    }

    #[test]
    fn test_full_flight_queues_and_counts_waitlist() {
        let system = FlightBookingSystem::default();
        system
            .add_flight(NewFlight::new(1, "Paris", "Rome", "16:45", 1, 175.25))
            .unwrap();

        assert_eq!(
            system.book(1, 10).unwrap(),
            BookingOutcome::Confirmed { remaining_seats: 0 }
        );
        assert_eq!(system.book(1, 11).unwrap(), BookingOutcome::Queued { position: 1 });
        assert_eq!(system.book(1, 11).unwrap(), BookingOutcome::Queued { position: 2 });
        assert_eq!(system.book(2, 11).unwrap_err(), BookingError::NotFound(2));

        let flight = system.find_flight(1).unwrap();
        assert_eq!(flight.available_seats(), 0);
        assert_eq!(flight.waiting_list(), vec![11, 11]);
        assert!(system.search("Paris", "Rome", 500.0).is_empty());

        let stats = system.stats();
        assert_eq!(stats.bookings_confirmed, 1);
        assert_eq!(stats.bookings_waitlisted, 2);
    }

    #[test]
    fn test_config_validation() {
        let config = SystemConfig {
            recent_searches_capacity: 0,
            ..SystemConfig::default()
        };
        assert!(matches!(
            FlightBookingSystem::new(config),
            Err(BookingError::InvalidConfig(_))
        ));

        let config = SystemConfig {
            recent_searches_capacity: 3,
            undo_log_capacity: 1,
            notify_on_waitlist: false,
        };
        let system = FlightBookingSystem::new(config).unwrap();
        for i in 0..5 {
            system.search(&format!("City{}", i), "Hub", 10.0);
        }
        assert_eq!(system.recent_searches().len(), 3);
        assert_eq!(system.config().undo_log_capacity, 1);
    }

    #[test]
    fn test_load_json_seeds_the_system() {
        let system = FlightBookingSystem::default();
        let json = r#"[
            {"id": 1, "origin": "Lisbon", "destination": "Madrid",
             "departure_time": "06:10", "total_seats": 120, "price": 89.0},
            {"id": 2, "origin": "Lisbon", "destination": "Madrid",
             "departure_time": "19:40", "total_seats": 120, "price": 59.0}
        ]"#;

        assert_eq!(system.load_json(json).unwrap(), 2);
        let ids: Vec<FlightId> = system
            .search("Lisbon", "Madrid", 100.0)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(system.pending_notifications(), 2);
        assert!(system.load_json("not json").is_err());
    }

    #[test]
    fn test_indexes_stay_consistent_under_random_operations() {
        let mut rng = StdRng::seed_from_u64(42);
        let system = FlightBookingSystem::default();
        let cities = ["A", "B", "C", "D"];

        for _ in 0..400 {
            let id = rng.gen_range(0..300);
            let origin = cities[rng.gen_range(0..cities.len())];
            let destination = cities[rng.gen_range(0..cities.len())];
            let price = rng.gen_range(0..100) as f64 * 10.0;
            let seats = rng.gen_range(0..4);

            let before = system.stats().flights;
            let result =
                system.add_flight(NewFlight::new(id, origin, destination, "12:00", seats, price));
            let expected = if result.is_ok() { before + 1 } else { before };
            assert_eq!(system.stats().flights, expected);

            if rng.gen_bool(0.5) {
                let _ = system.book(rng.gen_range(0..300), rng.gen_range(0..1000));
            }

            let sizes = system.store.index_sizes();
            assert_eq!(sizes.by_id, sizes.by_route);
            assert_eq!(sizes.by_id, sizes.by_price);
        }

        for flight in system.flights_in_price_range(0.0, f64::MAX) {
            let same = system.find_flight(flight.id()).unwrap();
            assert!(Arc::ptr_eq(&flight, &same));
            assert!(system
                .flights_on_route(flight.origin(), flight.destination())
                .iter()
                .any(|f| Arc::ptr_eq(f, &flight)));
            assert!(flight.available_seats() <= flight.total_seats());
        }
    }
}

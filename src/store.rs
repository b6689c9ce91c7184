// Flight store: the identity map owns every flight, the route map and the price
// index only hold flight ids pointing back into it

use std::{collections::HashMap, sync::Arc};

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, warn};

use crate::{
    error::BookingError,
    flight::{Flight, FlightId, NewFlight, RouteKey},
    price_index::PriceIndex,
};

#[derive(Debug, Default)]
struct Indexes {
    flights: HashMap<FlightId, Arc<Flight>>,
    routes: HashMap<RouteKey, Vec<FlightId>>,
    prices: PriceIndex<FlightId>,
}

impl Indexes {
    fn flight(&self, id: FlightId) -> Result<Arc<Flight>, BookingError> {
        self.flights
            .get(&id)
            .cloned()
            .ok_or(BookingError::NotFound(id))
    }

    fn resolve<'a>(&self, ids: impl IntoIterator<Item = &'a FlightId>) -> Vec<Arc<Flight>> {
        ids.into_iter()
            .filter_map(|id| self.flights.get(id).cloned())
            .collect()
    }
}

// Entry counts of the three indexes, equal whenever the store is consistent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSizes {
    pub by_id: usize,
    pub by_route: usize,
    pub by_price: usize,
}

#[derive(Debug, Default)]
pub struct FlightStore {
    inner: RwLock<Indexes>,
}

impl FlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds a flight to all three indexes.
    // Validation runs before anything is touched and the write lock is held for the
    // whole insert, so readers see either none or all of the new entries.
    pub fn add_flight(&self, new: NewFlight) -> Result<Arc<Flight>, BookingError> {
        if !new.price.is_finite() || new.price < 0.0 {
            warn!(flight_id = new.id, price = new.price, "rejecting flight with invalid price");
            return Err(BookingError::InvalidPrice {
                id: new.id,
                price: new.price,
            });
        }

        let mut indexes = self.inner.write();
        if indexes.flights.contains_key(&new.id) {
            warn!(flight_id = new.id, "rejecting duplicate flight id");
            return Err(BookingError::DuplicateIdentity(new.id));
        }

        let flight = Arc::new(Flight::from_new(new));
        let id = flight.id();

        indexes.flights.insert(id, flight.clone());
        indexes
            .routes
            .entry(flight.route().clone())
            .or_default()
            .push(id);
        indexes.prices.insert(flight.price(), id);

        debug!(
            flight_id = id,
            route = %flight.route(),
            price = flight.price(),
            "flight indexed"
        );
        Ok(flight)
    }

    pub fn find_by_id(&self, id: FlightId) -> Result<Arc<Flight>, BookingError> {
        self.inner.read().flight(id)
    }

    pub fn find_by_route(&self, origin: &str, destination: &str) -> Vec<Arc<Flight>> {
        self.view().find_by_route(&RouteKey::new(origin, destination))
    }

    pub fn find_in_price_range(&self, min: f64, max: f64) -> Vec<Arc<Flight>> {
        self.view().find_in_price_range(min, max)
    }

    // Read access to all indexes under one lock, for queries that combine them.
    pub fn view(&self) -> StoreView<'_> {
        StoreView {
            indexes: self.inner.read(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn route_count(&self) -> usize {
        self.inner.read().routes.len()
    }

    pub fn index_sizes(&self) -> IndexSizes {
        let indexes = self.inner.read();
        IndexSizes {
            by_id: indexes.flights.len(),
            by_route: indexes.routes.values().map(Vec::len).sum(),
            by_price: indexes.prices.len(),
        }
    }

    pub fn price_levels(&self) -> usize {
        self.inner.read().prices.node_count()
    }

    pub fn price_index_height(&self) -> usize {
        self.inner.read().prices.height()
    }
}

pub struct StoreView<'a> {
    indexes: RwLockReadGuard<'a, Indexes>,
}

impl StoreView<'_> {
    pub fn find_by_route(&self, route: &RouteKey) -> Vec<Arc<Flight>> {
        match self.indexes.routes.get(route) {
            Some(ids) => self.indexes.resolve(ids),
            None => Vec::new(),
        }
    }

    pub fn find_in_price_range(&self, min: f64, max: f64) -> Vec<Arc<Flight>> {
        self.indexes.resolve(self.indexes.prices.range(min, max))
    }

    pub fn price_range_ids(&self, min: f64, max: f64) -> Vec<FlightId> {
        self.indexes
            .prices
            .range(min, max)
            .into_iter()
            .copied()
            .collect()
    }
}

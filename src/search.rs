// Direct-route search over the route and price indexes

use std::{collections::HashSet, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    activity::RecentSearches,
    flight::{Flight, FlightId, RouteKey},
    store::FlightStore,
};

// What a caller needs to display one search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub id: FlightId,
    pub departure_time: String,
    pub available_seats: u32,
    pub price: f64,
}

impl From<&Flight> for FlightSummary {
    fn from(flight: &Flight) -> Self {
        Self {
            id: flight.id(),
            departure_time: flight.departure_time().to_string(),
            available_seats: flight.available_seats(),
            price: flight.price(),
        }
    }
}

pub struct SearchService {
    store: Arc<FlightStore>,
    recent: Arc<RecentSearches>,
}

impl SearchService {
    pub fn new(store: Arc<FlightStore>, recent: Arc<RecentSearches>) -> Self {
        Self { store, recent }
    }

    // Flights on the exact route priced at most `max_price` with a seat left,
    // cheapest first. Flights with equal prices keep their route order.
    // The route is recorded in the recent searches even when nothing matches.
    pub fn search(&self, origin: &str, destination: &str, max_price: f64) -> Vec<FlightSummary> {
        let route = RouteKey::new(origin, destination);
        self.recent.record(route.clone());

        let view = self.store.view();
        let affordable: HashSet<FlightId> =
            view.price_range_ids(0.0, max_price).into_iter().collect();

        // Seats are read once per flight; the filter and the summary share that count
        let mut matches: Vec<FlightSummary> = view
            .find_by_route(&route)
            .into_iter()
            .filter(|flight| affordable.contains(&flight.id()))
            .map(|flight| FlightSummary::from(flight.as_ref()))
            .filter(|summary| summary.available_seats > 0)
            .collect();
        drop(view);

        matches.sort_by(|a, b| a.price.total_cmp(&b.price));

        debug!(route = %route, max_price, hits = matches.len(), "flight search");
        matches
    }
}

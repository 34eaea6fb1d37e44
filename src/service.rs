//! The four fleet operations exposed to request handlers.

use tracing::info;

use crate::cancel::Cancel;
use crate::error::{Error, Result};
use crate::fetch::HttpClient;
use crate::models::{Route, Vehicle};
use crate::stats::{self, RouteStats};
use crate::upstream::{BATCH_CAP, UpstreamClient};

/// Stateless aggregation over an [`UpstreamClient`]. Every call re-fetches
/// from upstream, so concurrent calls share nothing but the call recorder.
pub struct FleetService<C> {
    upstream: UpstreamClient<C>,
}

impl<C: HttpClient> FleetService<C> {
    pub fn new(upstream: UpstreamClient<C>) -> Self {
        Self { upstream }
    }

    pub async fn get_routes(&self, cancel: &Cancel) -> Result<Vec<Route>> {
        self.upstream.fetch_routes(cancel).await
    }

    pub async fn get_vehicles(&self, cancel: &Cancel, route_ids: &[String]) -> Result<Vec<Vehicle>> {
        self.upstream.fetch_vehicles(cancel, route_ids).await
    }

    /// Vehicles on every route in the current route list.
    #[tracing::instrument(skip_all)]
    pub async fn get_all_vehicles(&self, cancel: &Cancel) -> Result<Vec<Vehicle>> {
        info!("fetching all vehicles");

        let routes = self.upstream.fetch_routes(cancel).await?;
        let route_ids: Vec<String> = routes.into_iter().map(|r| r.route_number).collect();
        let vehicles = self.fetch_in_batches(cancel, &route_ids).await?;

        info!(count = vehicles.len(), "successfully fetched all vehicles");
        Ok(vehicles)
    }

    /// Splits `route_ids` into consecutive batches of at most [`BATCH_CAP`]
    /// and fetches them one after another, concatenating in batch order.
    ///
    /// The first failing batch aborts the whole fetch; results gathered so far
    /// are discarded.
    pub async fn fetch_in_batches(&self, cancel: &Cancel, route_ids: &[String]) -> Result<Vec<Vehicle>> {
        let mut all = Vec::new();
        for (index, batch) in route_ids.chunks(BATCH_CAP).enumerate() {
            if cancel.is_cancelled() {
                info!(batch = index, "cancelled before batch");
                return Err(Error::Cancelled);
            }
            let vehicles = self.upstream.fetch_vehicles(cancel, batch).await?;
            all.extend(vehicles);
        }
        Ok(all)
    }

    /// One statistics record per known route, counting active vehicles by
    /// bearing bucket.
    #[tracing::instrument(skip_all)]
    pub async fn get_route_stats(&self, cancel: &Cancel) -> Result<Vec<RouteStats>> {
        info!("calculating route stats");

        let routes = self.upstream.fetch_routes(cancel).await?;
        let route_ids: Vec<String> = routes.iter().map(|r| r.route_number.clone()).collect();
        let vehicles = self.fetch_in_batches(cancel, &route_ids).await?;
        let result = stats::compute(&routes, &vehicles);

        info!(
            routes = result.len(),
            total_vehicles = vehicles.len(),
            "successfully calculated route stats"
        );
        Ok(result)
    }
}

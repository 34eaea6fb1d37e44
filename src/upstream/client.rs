use std::sync::Arc;

use reqwest::{Method, Request, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use super::wire::{Envelope, RoutesBody, VehiclesBody};
use crate::cancel::Cancel;
use crate::classify::settle;
use crate::config::{API_KEY_ENV, Config};
use crate::error::{Error, Result, truncate_body};
use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, HttpClient};
use crate::models::{Route, Vehicle};
use crate::tracker::CallRecorder;

pub const DEFAULT_BASE_URL: &str = "https://www.ctabustracker.com/bustime/api/v3";

/// Maximum number of route identifiers the provider accepts per vehicle call.
pub const BATCH_CAP: usize = 10;

const ROUTES_PATH: &str = "getroutes";
const VEHICLES_PATH: &str = "getvehicles";
const KEY_PARAM: &str = "key";

/// Authenticated client for the provider's `getroutes` and `getvehicles` calls.
///
/// The credential is mandatory: construction fails with
/// [`Error::Configuration`] instead of deferring the failure to the first call.
pub struct UpstreamClient<C> {
    http: UrlParam<C>,
    routes_url: Url,
    vehicles_url: Url,
    recorder: Option<Arc<dyn CallRecorder>>,
}

impl UpstreamClient<BasicClient> {
    /// Builds a client over a real HTTP transport using `config`'s timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        require_credential(&config.api_key)?;
        let transport = BasicClient::new(config.timeout)
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        Self::with_transport(transport, &config.api_key, &config.base_url)
    }
}

impl<C: HttpClient> UpstreamClient<C> {
    pub fn with_transport(transport: C, credential: &str, base_url: &str) -> Result<Self> {
        require_credential(credential)?;

        let base = base_url.trim_end_matches('/');
        let endpoint = |path: &str| {
            Url::parse(&format!("{base}/{path}")).map_err(|e| {
                Error::Configuration(format!("invalid upstream base URL {base_url:?}: {e}"))
            })
        };

        Ok(Self {
            http: UrlParam::new(transport, KEY_PARAM, credential),
            routes_url: endpoint(ROUTES_PATH)?,
            vehicles_url: endpoint(VEHICLES_PATH)?,
            recorder: None,
        })
    }

    /// Attaches a sink notified after every accepted upstream response.
    pub fn with_recorder(mut self, recorder: Arc<dyn CallRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Fetches the full route list.
    #[tracing::instrument(skip_all)]
    pub async fn fetch_routes(&self, cancel: &Cancel) -> Result<Vec<Route>> {
        info!("fetching routes from upstream");

        let body: RoutesBody = self.get(&self.routes_url, &[], cancel).await?;
        let routes: Vec<Route> = settle(body.routes, body.error)?
            .into_iter()
            .map(Route::from)
            .collect();

        info!(count = routes.len(), "successfully fetched routes");
        self.track(&self.routes_url).await;
        Ok(routes)
    }

    /// Fetches vehicle positions for between 1 and [`BATCH_CAP`] routes.
    #[tracing::instrument(skip(self, cancel), fields(routes = %route_ids.join(",")))]
    pub async fn fetch_vehicles(&self, cancel: &Cancel, route_ids: &[String]) -> Result<Vec<Vehicle>> {
        if route_ids.is_empty() {
            error!("no routes specified");
            return Err(Error::InvalidArgument(
                "at least one route identifier is required".to_string(),
            ));
        }
        if route_ids.len() > BATCH_CAP {
            error!(requested = route_ids.len(), "too many routes for one call");
            return Err(Error::InvalidArgument(format!(
                "at most {BATCH_CAP} route identifiers can be requested at once, got {}",
                route_ids.len()
            )));
        }

        let joined = route_ids.join(",");
        let body: VehiclesBody = self
            .get(&self.vehicles_url, &[("rt", joined.as_str())], cancel)
            .await?;
        let vehicles: Vec<Vehicle> = settle(body.vehicles, body.error)?
            .into_iter()
            .map(Vehicle::from)
            .collect();

        info!(count = vehicles.len(), "successfully fetched vehicles");
        self.track(&self.vehicles_url).await;
        Ok(vehicles)
    }

    /// Issues a GET against `endpoint` and unwraps the `bustime-response` envelope.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &Url,
        params: &[(&str, &str)],
        cancel: &Cancel,
    ) -> Result<T> {
        let mut url = endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("format", "json");
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        // logged before the credential is appended by `UrlParam`
        debug!(url = %url, "sending upstream request");

        let request = Request::new(Method::GET, url);
        cancel
            .run(async move {
                let resp = self.http.execute(request).await.map_err(|e| {
                    error!(error = %e, "upstream request failed");
                    Error::unavailable(e)
                })?;

                let status = resp.status();
                if !status.is_success() {
                    let body = truncate_body(resp.text().await.unwrap_or_default());
                    error!(status = status.as_u16(), body = %body, "upstream returned non-OK status");
                    return Err(Error::UpstreamUnavailable {
                        message: format!("upstream returned status {status}"),
                        status: Some(status.as_u16()),
                        body: Some(body),
                    });
                }

                let bytes = resp.bytes().await.map_err(Error::unavailable)?;
                let envelope: Envelope<T> = serde_json::from_slice(&bytes).map_err(|e| {
                    error!(error = %e, "failed to decode upstream response");
                    Error::UpstreamProtocol(format!("failed to decode upstream response: {e}"))
                })?;
                Ok(envelope.body)
            })
            .await
    }

    async fn track(&self, endpoint: &Url) {
        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder.record(endpoint.as_str()).await {
                error!(error = %e, endpoint = %endpoint, "failed to track upstream call");
            }
        }
    }
}

fn require_credential(credential: &str) -> Result<()> {
    if credential.trim().is_empty() {
        return Err(Error::Configuration(format!("{API_KEY_ENV} is not set")));
    }
    Ok(())
}

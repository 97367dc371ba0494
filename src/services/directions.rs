use crate::models::TransitRoute;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Default Google Directions API base URL
pub const DEFAULT_DIRECTIONS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/directions";

/// Errors that can occur when querying the directions service
#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Directions API client
///
/// Resolves the transit commute between a user's current address and a
/// campus. The service is asked for alternative routes and the one with the
/// least walking is kept.
pub struct DirectionsClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl DirectionsClient {
    /// Create a new directions client
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, DirectionsError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every alternative transit route from `origin` to `destination`
    ///
    /// Returns an empty list when the service finds no route.
    pub async fn get_transit_routes(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<TransitRoute>, DirectionsError> {
        let url = format!(
            "{}/json?origin={}&destination={}&mode=transit&alternatives=true&key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(origin),
            urlencoding::encode(destination),
            urlencoding::encode(&self.api_key),
        );

        tracing::debug!("Requesting transit routes: {} -> {}", origin, destination);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(DirectionsError::ApiError(format!(
                "Failed to fetch directions: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        parse_routes(&json)
    }

    /// The alternative with the smallest walking distance, `None` when no route exists
    pub async fn get_transit_route(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Option<TransitRoute>, DirectionsError> {
        let routes = self.get_transit_routes(origin, destination).await?;
        let count = routes.len();
        let selected = select_least_walking(routes);

        match &selected {
            Some(route) => tracing::debug!(
                "Selected route among {} alternatives: {}s, transit {}m, walk {}m",
                count,
                route.duration_secs,
                route.transit_distance,
                route.walk_distance
            ),
            None => tracing::info!("No transit route found: {} -> {}", origin, destination),
        }

        Ok(selected)
    }
}

/// Pick the route with the least walking; the first one wins ties
pub fn select_least_walking(routes: Vec<TransitRoute>) -> Option<TransitRoute> {
    routes.into_iter().fold(None, |best, route| match best {
        Some(b) if b.walk_distance <= route.walk_distance => Some(b),
        _ => Some(route),
    })
}

fn parse_routes(json: &Value) -> Result<Vec<TransitRoute>, DirectionsError> {
    let status = json
        .get("status")
        .and_then(|s| s.as_str())
        .ok_or_else(|| DirectionsError::InvalidResponse("Missing status".into()))?;

    match status {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Ok(Vec::new()),
        other => {
            let message = json
                .get("error_message")
                .and_then(|m| m.as_str())
                .unwrap_or("no error message");
            return Err(DirectionsError::ApiError(format!("{}: {}", other, message)));
        }
    }

    let routes = json
        .get("routes")
        .and_then(|r| r.as_array())
        .ok_or_else(|| DirectionsError::InvalidResponse("Missing routes array".into()))?;

    routes.iter().map(parse_route).collect()
}

fn parse_route(route: &Value) -> Result<TransitRoute, DirectionsError> {
    let leg = route
        .get("legs")
        .and_then(|l| l.as_array())
        .and_then(|l| l.first())
        .ok_or_else(|| DirectionsError::InvalidResponse("Route has no legs".into()))?;

    let duration_secs = leg
        .pointer("/duration/value")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| DirectionsError::InvalidResponse("Leg is missing duration".into()))?;

    let steps = leg
        .get("steps")
        .and_then(|s| s.as_array())
        .ok_or_else(|| DirectionsError::InvalidResponse("Leg is missing steps".into()))?;

    let mut transit_distance = 0.0;
    let mut walk_distance = 0.0;
    for step in steps {
        let distance = step
            .pointer("/distance/value")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        match step.get("travel_mode").and_then(|m| m.as_str()) {
            Some("TRANSIT") => transit_distance += distance,
            Some("WALKING") => walk_distance += distance,
            _ => {}
        }
    }

    Ok(TransitRoute {
        duration_secs,
        transit_distance,
        walk_distance,
    })
}

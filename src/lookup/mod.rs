pub mod errors;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument};

pub use errors::LookupError;

use crate::models::{LookupResponse, VehicleId};

/// Default timeout for a single lookup call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Single-vehicle offence lookup
#[async_trait]
pub trait VehicleLookup: Send + Sync {
    /// Query the offences recorded for `vehicle`. Exactly one attempt is made.
    async fn check_vehicle(&self, vehicle: &VehicleId) -> Result<LookupResponse, LookupError>;
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    vehicle: &'a str,
}

/// HTTP client for the RTOC offence lookup endpoint
#[derive(Clone, Debug)]
pub struct RtocClient {
    client: Client,
    api_url: String,
}

impl RtocClient {
    /// Create a new client posting to `api_url` with the given request timeout
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }
}

#[async_trait]
impl VehicleLookup for RtocClient {
    #[instrument(name = "RTOC lookup", skip(self, vehicle), fields(registration = %vehicle))]
    async fn check_vehicle(&self, vehicle: &VehicleId) -> Result<LookupResponse, LookupError> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&LookupRequest {
                vehicle: vehicle.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "lookup responded");

        match status {
            StatusCode::OK => {
                let body = response.bytes().await?;
                Ok(serde_json::from_slice(&body)?)
            }
            StatusCode::TOO_MANY_REQUESTS => Err(LookupError::RateLimited),
            other => Err(LookupError::UnexpectedStatus(other)),
        }
    }
}

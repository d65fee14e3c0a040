use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::header;
use tracing::info;

use crate::api::BeaconError;
use crate::hit::Hit;

#[async_trait]
pub trait HitSink {
    async fn send(&self, hit: Hit) -> Result<(), BeaconError>;
}

/// Logs hits instead of delivering them. Local debug only.
pub struct PrintSink {}

#[async_trait]
impl HitSink for PrintSink {
    async fn send(&self, hit: Hit) -> Result<(), BeaconError> {
        tracing::info!("hit: {:?}", hit);
        counter!("beacon_hits_delivered_total").increment(1);

        Ok(())
    }
}

/// Delivers hits to the external collector endpoint: one url-encoded POST
/// per pageview, forwarding the visitor's `User-Agent`. Best effort by
/// design: a single attempt, bounded by the client timeout, no retries and
/// no queueing.
pub struct CollectorSink {
    client: reqwest::Client,
    endpoint: String,
}

impl CollectorSink {
    pub fn new(endpoint: String, timeout: Duration) -> anyhow::Result<CollectorSink> {
        info!("delivering hits to {}", endpoint);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(CollectorSink { client, endpoint })
    }
}

#[async_trait]
impl HitSink for CollectorSink {
    async fn send(&self, hit: Hit) -> Result<(), BeaconError> {
        let body = hit.form_body()?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .header(header::USER_AGENT, hit.user_agent.as_str())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BeaconError::DeliveryStatus(status));
        }

        tracing::debug!(status = %status, "collector accepted hit");
        counter!("beacon_hits_delivered_total").increment(1);

        Ok(())
    }
}

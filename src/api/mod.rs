//! Remote boundary: fetching operations from the site and remote graph conversion.
//!
//! The conversion core never calls into this module. Retries are up to the caller.

use crate::config::ApiConfig;
use crate::error::{CopilotError, Result};
use crate::maa::Operation;
use crate::schema::{parse_loose, parse_loose_value};
use crate::siming::SimingGraph;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const SUCCESS_STATUS: i64 = 200;

#[async_trait]
pub trait OperationSource: Send + Sync {
    async fn fetch_operation(&self, id: &str) -> Result<Operation>;
}

#[async_trait]
pub trait SimingConverter: Send + Sync {
    async fn convert_siming(&self, graph: &SimingGraph) -> Result<Value>;
}

/// Operation site client
#[derive(Debug, Clone)]
pub struct PrtsClient {
    client: Client,
    base_url: String,
    siming_endpoint: Option<String>,
}

impl PrtsClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            siming_endpoint: config.siming_endpoint.clone(),
        })
    }

    pub fn operation_url(&self, id: &str) -> String {
        format!("{}/copilot/get/{}", self.base_url, id.trim())
    }
}

#[async_trait]
impl OperationSource for PrtsClient {
    async fn fetch_operation(&self, id: &str) -> Result<Operation> {
        let url = self.operation_url(id);
        debug!(url = %url, "Fetching operation");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: Value = response.json().await?;
        let operation = decode_operation_envelope(body)?;

        info!(id, stage = %operation.stage_name, "Fetched operation");
        Ok(operation)
    }
}

#[async_trait]
impl SimingConverter for PrtsClient {
    async fn convert_siming(&self, graph: &SimingGraph) -> Result<Value> {
        let Some(endpoint) = &self.siming_endpoint else {
            return Err(CopilotError::Remote {
                status: 0,
                message: "siming endpoint is not configured".to_string(),
            });
        };
        debug!(endpoint = %endpoint, nodes = graph.len(), "Posting siming graph");

        let response = self
            .client
            .post(endpoint)
            .json(graph)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

/// Decodes a `{status_code, message?, data: {content}}` body.
///
/// `content` is usually an operation JSON string; an embedded object is accepted too.
pub fn decode_operation_envelope(body: Value) -> Result<Operation> {
    let status = body
        .get("status_code")
        .and_then(Value::as_i64)
        .unwrap_or(SUCCESS_STATUS);
    if status != SUCCESS_STATUS {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        return Err(CopilotError::Remote { status, message });
    }

    match body.pointer("/data/content") {
        Some(Value::String(content)) => parse_loose(content),
        Some(content @ Value::Object(_)) => parse_loose_value(content.clone()).map(|(op, _)| op),
        _ => Err(CopilotError::Remote {
            status,
            message: "response has no operation content".to_string(),
        }),
    }
}

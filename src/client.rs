//! Client for the marketplace order API that owns the order records.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Order, OrderStatus};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("order api returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),
}

/// Order API contract consumed by the lifecycle controller.
///
/// Object safe so the service can hold an `Arc<dyn OrderApi>` and tests can
/// swap in an in-memory double.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    async fn accept_order(&self, order_id: &str) -> Result<(), ApiError>;

    async fn update_order_status(&self, order_id: &str, status: OrderStatus)
    -> Result<(), ApiError>;
}

/// reqwest-backed [`OrderApi`].
///
/// The bearer token is passed in by the caller; do not log it.
#[derive(Debug, Clone)]
pub struct HttpOrderApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrdersBody {
    Bare(Vec<serde_json::Value>),
    Wrapped {
        #[serde(alias = "data")]
        orders: Vec<serde_json::Value>,
    },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl HttpOrderApi {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message.or(body.error))
            .unwrap_or(text);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Decode each record on its own so one malformed order does not hide the rest.
fn decode_orders(records: Vec<serde_json::Value>) -> Vec<Order> {
    records
        .into_iter()
        .filter_map(|record| {
            let order_id = record
                .get("id")
                .or_else(|| record.get("_id"))
                .and_then(serde_json::Value::as_str)
                .unwrap_or("-")
                .to_string();
            serde_json::from_value::<Order>(record)
                .inspect_err(|err| {
                    tracing::warn!(order_id = %order_id, error = %err, "skipping undecodable order");
                })
                .ok()
        })
        .collect()
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let response = self
            .authorize(self.http.get(self.url("/pharmacy/orders")))
            .send()
            .await?;
        let bytes = Self::check(response).await?.bytes().await?;
        let body: ListOrdersBody =
            serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))?;
        let records = match body {
            ListOrdersBody::Bare(records) | ListOrdersBody::Wrapped { orders: records } => records,
        };
        Ok(decode_orders(records))
    }

    async fn accept_order(&self, order_id: &str) -> Result<(), ApiError> {
        let path = format!("/pharmacy/orders/{order_id}/accept");
        let response = self
            .authorize(self.http.post(self.url(&path)))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/pharmacy/orders/{order_id}/status");
        let response = self
            .authorize(self.http.patch(self.url(&path)))
            .json(&serde_json::json!({ "status": status.as_str() }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

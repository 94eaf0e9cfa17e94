//! Integration test support for Cracker Cart.
//!
//! [`StubStore`] serves the store backend protocol and the PayU order
//! endpoint from an in-process axum server on an ephemeral port. Tests point
//! a real [`HttpGateway`](cracker_cart_client::HttpGateway) at it, script its
//! answers through [`StubStore::state`] and inspect what was sent.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cracker-cart-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use cracker_cart_client::{ClientConfig, PayuConfig};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Bearer token the PayU stub accepts.
pub const PAYU_TOKEN: &str = "d9a4536e-62ba-4f60-8017-6053211d3f47";

/// Order id the PayU stub hands out.
pub const PAYU_ORDER_ID: &str = "WZHF5FFDRJ140731GUEST000P01";

/// One request received by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path without the leading slash, e.g. `store/checkOut`.
    pub path: String,
    pub body: Value,
}

/// Scriptable backend state.
#[derive(Debug, Default)]
pub struct StoreState {
    /// Cart lines returned by `getCartItems`.
    pub products: Vec<Value>,
    /// Addresses returned by `getAddresses`; `addAddress` appends here.
    pub addresses: Vec<Value>,
    /// Applicable coupons: code to `(couponId, couponType)`.
    pub coupons: HashMap<String, (i64, i64)>,
    /// Envelope `response` code to answer with, per endpoint name.
    pub response_codes: HashMap<String, i64>,
    /// HTTP status to fail with, per endpoint name.
    pub http_failures: HashMap<String, StatusCode>,
    /// Endpoints that answer 200 without a `data` field.
    pub omit_data: Vec<String>,
    /// Everything received, in order.
    pub requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<StoreState>>;

/// An in-process store backend.
pub struct StubStore {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl StubStore {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let state = Shared::default();
        let app = Router::new()
            .route("/store/{endpoint}", post(store_endpoint))
            .route("/api/v2_1/orders", post(payu_orders))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL of the stub, with a trailing slash.
    ///
    /// # Panics
    ///
    /// Never for a bound socket address.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("socket address is a valid URL")
    }

    /// Client configuration pointing at the stub, online payment enabled.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::for_store(self.base_url());
        config.payu = Some(PayuConfig {
            base_url: self.base_url(),
            bearer_token: SecretString::from(PAYU_TOKEN),
            merchant_pos_id: "300746".to_string(),
            notify_url: None,
            currency_code: "INR".to_string(),
            customer_ip: "127.0.0.1".to_string(),
        });
        config
    }

    /// Lock the scripted state.
    pub fn state(&self) -> MutexGuard<'_, StoreState> {
        lock(&self.state)
    }

    /// Requests received on `path`, e.g. `store/checkOut`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<Value> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.body.clone())
            .collect()
    }
}

impl Drop for StubStore {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, StoreState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn store_endpoint(
    State(state): State<Shared>,
    Path(endpoint): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    state.requests.push(RecordedRequest {
        path: format!("store/{endpoint}"),
        body: body.clone(),
    });

    if let Some(status) = state.http_failures.get(&endpoint) {
        return (*status, "backend failure").into_response();
    }
    if let Some(code) = state.response_codes.get(&endpoint) {
        return Json(json!({ "response": code })).into_response();
    }
    if state.omit_data.contains(&endpoint) {
        return Json(json!({ "response": 200 })).into_response();
    }

    let data = match endpoint.as_str() {
        "getCartItems" => json!({ "products": state.products }),
        "getAddresses" => json!({ "addresses": state.addresses }),
        "addAddress" => {
            let mut address = body["address"].clone();
            let id = i64::try_from(state.addresses.len()).unwrap_or(i64::MAX) + 100;
            address["id"] = json!(id);
            state.addresses.push(address);
            Value::Null
        }
        "applyCoupon" => {
            let code = body["couponCode"].as_str().unwrap_or_default();
            match state.coupons.get(code) {
                Some((id, kind)) => {
                    json!({ "isApplicable": true, "couponId": id, "couponType": kind })
                }
                None => json!({ "isApplicable": false, "couponType": 0 }),
            }
        }
        "checkOut" => Value::Null,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(json!({ "response": 200, "data": data })).into_response()
}

async fn payu_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    lock(&state).requests.push(RecordedRequest {
        path: "api/v2_1/orders".to_string(),
        body: body.clone(),
    });

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {PAYU_TOKEN}"));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": { "statusCode": "UNAUTHORIZED" } })),
        )
            .into_response();
    }

    (
        StatusCode::FOUND,
        Json(json!({
            "status": { "statusCode": "SUCCESS" },
            "redirectUri": format!("https://merch-prod.snd.payu.com/pay/?orderId={PAYU_ORDER_ID}"),
            "orderId": PAYU_ORDER_ID,
            "extOrderId": body["extOrderId"],
        })),
    )
        .into_response()
}

/// A cart line as the backend sends it.
#[must_use]
pub fn product(id: i64, name: &str, net_price: f64, quantity: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "netPrice": net_price,
        "quantity": quantity,
        "isFavourite": false
    })
}

/// A saved address as the backend sends it, numbers as JSON numbers.
#[must_use]
pub fn address(id: i64, city: &str) -> Value {
    json!({
        "id": id,
        "addressLine1": "12 Temple Street",
        "addressLine2": "Near Bus Stand",
        "city": city,
        "state": "Tamil Nadu",
        "pinCode": 626_123,
        "contactNo": 9_876_543_210_u64,
        "alternateContact": 9_123_456_780_u64
    })
}

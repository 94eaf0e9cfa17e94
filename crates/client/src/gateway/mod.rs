//! Remote service gateway for the store backend.
//!
//! # Protocol
//!
//! Every endpoint is a JSON `POST` that answers with an envelope:
//!
//! ```json
//! { "response": 200, "data": { ... } }
//! ```
//!
//! `response == 200` means success. Any other value, a non-2xx HTTP status
//! or a transport failure is an error. The [`StoreGateway`] trait is the seam
//! between the checkout flow and the network; [`HttpGateway`] is the real
//! implementation.
//!
//! # Endpoints
//!
//! | Method | Path | Request | `data` |
//! |--------|------|---------|--------|
//! | `get_cart_items` | `store/getCartItems` | `{ uid }` | `{ products: CartItem[] }` |
//! | `get_addresses` | `store/getAddresses` | `{ uid }` | `{ addresses: Address[] }` |
//! | `add_address` | `store/addAddress` | `{ uid, address }` | - |
//! | `apply_coupon` | `store/applyCoupon` | `{ uid, couponCode }` | `{ isApplicable, couponType, couponId }` |
//! | `check_out` | `store/checkOut` | `{ uid, addressId, paymentMode, couponId, couponType }` | - |

mod http;

pub use http::HttpGateway;

use core::fmt;

use cracker_cart_core::{Address, CartItem, CouponCode, CouponVerdict, NewAddress, OrderRequest, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Success value of the envelope `response` field.
pub const RESPONSE_OK: i64 = 200;

/// Errors that can occur when talking to the store backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: Endpoint, status: u16 },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The envelope carried a non-200 `response` code.
    #[error("{endpoint} rejected the request (response {code})")]
    Rejected { endpoint: Endpoint, code: i64 },

    /// A successful envelope without the expected payload.
    #[error("{0} response is missing its data")]
    MissingData(Endpoint),
}

impl GatewayError {
    /// Whether the failure happened below the application protocol.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

/// Store backend endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetCartItems,
    GetAddresses,
    AddAddress,
    ApplyCoupon,
    CheckOut,
}

impl Endpoint {
    /// Path relative to the store base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::GetCartItems => "store/getCartItems",
            Self::GetAddresses => "store/getAddresses",
            Self::AddAddress => "store/addAddress",
            Self::ApplyCoupon => "store/applyCoupon",
            Self::CheckOut => "store/checkOut",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())
    }
}

/// Operations the checkout flow needs from the store backend.
pub trait StoreGateway {
    /// Fetch the user's cart lines.
    async fn get_cart_items(&self, uid: UserId) -> Result<Vec<CartItem>, GatewayError>;

    /// Fetch the user's saved delivery addresses.
    async fn get_addresses(&self, uid: UserId) -> Result<Vec<Address>, GatewayError>;

    /// Save a new delivery address.
    async fn add_address(&self, uid: UserId, address: &NewAddress) -> Result<(), GatewayError>;

    /// Ask whether a coupon code applies to the user's cart.
    async fn apply_coupon(
        &self,
        uid: UserId,
        code: &CouponCode,
    ) -> Result<CouponVerdict, GatewayError>;

    /// Place a cash-on-delivery order.
    async fn check_out(&self, order: &OrderRequest) -> Result<(), GatewayError>;
}

// =============================================================================
// Wire Types
// =============================================================================

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope {
    pub response: i64,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Unwrap the payload of a successful envelope.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` when `response` is not 200.
    pub fn into_data(self, endpoint: Endpoint) -> Result<Option<serde_json::Value>, GatewayError> {
        if self.response == RESPONSE_OK {
            Ok(self.data.filter(|d| !d.is_null()))
        } else {
            Err(GatewayError::Rejected {
                endpoint,
                code: self.response,
            })
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UidRequest {
    pub uid: UserId,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddAddressRequest<'a> {
    pub uid: UserId,
    pub address: &'a NewAddress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplyCouponRequest<'a> {
    pub uid: UserId,
    pub coupon_code: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsData {
    pub products: Vec<CartItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddressesData {
    pub addresses: Vec<Address>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok_returns_data() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"response":200,"data":{"addresses":[]}}"#).unwrap();
        let data = envelope.into_data(Endpoint::GetAddresses).unwrap().unwrap();
        let parsed: AddressesData = serde_json::from_value(data).unwrap();
        assert!(parsed.addresses.is_empty());
    }

    #[test]
    fn test_envelope_without_data() {
        let envelope: Envelope = serde_json::from_str(r#"{"response":200}"#).unwrap();
        assert!(envelope.into_data(Endpoint::AddAddress).unwrap().is_none());

        let envelope: Envelope = serde_json::from_str(r#"{"response":200,"data":null}"#).unwrap();
        assert!(envelope.into_data(Endpoint::AddAddress).unwrap().is_none());
    }

    #[test]
    fn test_envelope_non_200_is_rejected() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"response":500,"data":"boom"}"#).unwrap();
        let err = envelope.into_data(Endpoint::CheckOut).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Rejected {
                endpoint: Endpoint::CheckOut,
                code: 500
            }
        ));
        assert_eq!(
            err.to_string(),
            "/store/checkOut rejected the request (response 500)"
        );
        assert!(!err.is_transport());
    }

    #[test]
    fn test_request_bodies_use_wire_names() {
        let body = serde_json::to_value(ApplyCouponRequest {
            uid: UserId::new(4),
            coupon_code: "DIWALI",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "uid": 4, "couponCode": "DIWALI" }));
    }

    #[test]
    fn test_missing_data_display() {
        assert_eq!(
            GatewayError::MissingData(Endpoint::GetCartItems).to_string(),
            "/store/getCartItems response is missing its data"
        );
    }
}

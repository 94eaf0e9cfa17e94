//! Online payment through the PayU REST API.
//!
//! Orders are built from the real checkout state: the cart lines, the
//! selected delivery address and the signed-in user. Credentials come from
//! [`PayuConfig`]; without them the online path is unavailable.
//!
//! PayU answers a successful order creation with `302 Found` and a JSON body
//! carrying the `redirectUri` the customer must visit, so redirects are not
//! followed.

use reqwest::StatusCode;
use reqwest::redirect::Policy;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use cracker_cart_core::{Address, Cart, Price, Session};

use crate::config::PayuConfig;

/// Path of the order creation endpoint.
const ORDERS_PATH: &str = "api/v2_1/orders";

/// Description attached to every order.
const ORDER_DESCRIPTION: &str = "Cracker Cart order";

/// Errors that can occur when creating an online payment.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Online payment credentials are not configured.
    #[error("online payment is not configured")]
    NotConfigured,

    /// There is nothing to pay for.
    #[error("cannot pay for an empty cart")]
    EmptyCart,

    /// An amount does not fit in the gateway's integer minor units.
    #[error("amount out of range: {0}")]
    AmountOutOfRange(Price),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Buyer details sent with an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayuBuyer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub language: String,
}

/// One order line. Amounts are minor units encoded as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayuProduct {
    pub name: String,
    pub unit_price: String,
    pub quantity: String,
}

/// Body of an order creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayuOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    pub customer_ip: String,
    pub merchant_pos_id: String,
    pub description: String,
    pub currency_code: String,
    pub total_amount: String,
    pub ext_order_id: String,
    pub buyer: PayuBuyer,
    pub products: Vec<PayuProduct>,
}

impl PayuOrder {
    /// Build an order from the current checkout state.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` for an empty cart and `AmountOutOfRange` if an
    /// amount cannot be expressed in minor units.
    pub fn from_checkout(
        config: &PayuConfig,
        cart: &Cart,
        address: &Address,
        session: &Session,
    ) -> Result<Self, PaymentError> {
        if cart.is_empty() {
            return Err(PaymentError::EmptyCart);
        }

        // The charged total is the sum of the listed lines, so the gateway's
        // own product check always agrees with it.
        let mut total: i64 = 0;
        let mut products = Vec::with_capacity(cart.len());
        for item in cart.items() {
            let unit = item
                .net_price
                .to_minor_units()
                .ok_or(PaymentError::AmountOutOfRange(item.net_price))?;
            total = unit
                .checked_mul(i64::from(item.cart_quantity))
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| PaymentError::AmountOutOfRange(cart.grand_total()))?;
            products.push(PayuProduct {
                name: item.name.clone(),
                unit_price: unit.to_string(),
                quantity: item.cart_quantity.to_string(),
            });
        }

        Ok(Self {
            notify_url: config.notify_url.clone(),
            customer_ip: config.customer_ip.clone(),
            merchant_pos_id: config.merchant_pos_id.clone(),
            description: ORDER_DESCRIPTION.to_string(),
            currency_code: config.currency_code.clone(),
            total_amount: total.to_string(),
            ext_order_id: Uuid::new_v4().simple().to_string(),
            buyer: PayuBuyer {
                phone: Some(address.contact_no.clone()).filter(|p| !p.is_empty()),
                first_name: session.user_name.clone(),
                language: "en".to_string(),
            },
            products,
        })
    }
}

/// Status block of a gateway response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayuStatus {
    status_code: String,
    #[serde(default)]
    status_desc: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayuOrderResponse {
    status: PayuStatus,
    #[serde(default)]
    redirect_uri: Option<String>,
    #[serde(default)]
    order_id: Option<String>,
}

/// A created online order awaiting customer payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayuOrderCreated {
    /// Gateway order id.
    pub order_id: String,
    /// Our own order reference.
    pub ext_order_id: String,
    /// Where to send the customer to pay.
    pub redirect_uri: Option<String>,
}

/// Client for the PayU order API.
#[derive(Clone)]
pub struct PayuClient {
    client: reqwest::Client,
    config: PayuConfig,
}

impl std::fmt::Debug for PayuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayuClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PayuClient {
    /// Create a new payment client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: PayuConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn config(&self) -> &PayuConfig {
        &self.config
    }

    /// Create an order and return where the customer should pay.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the gateway rejects the order.
    #[instrument(skip(self, order), fields(ext_order_id = %order.ext_order_id, total = %order.total_amount))]
    pub async fn create_order(&self, order: &PayuOrder) -> Result<PayuOrderCreated, PaymentError> {
        let url = self.config.base_url.join(ORDERS_PATH)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.bearer_token.expose_secret())
            .json(order)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !(status.is_success() || status == StatusCode::FOUND) {
            warn!(status = %status, "Payment gateway returned error status");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        let parsed: PayuOrderResponse =
            serde_json::from_str(&text).map_err(|e| PaymentError::Parse(e.to_string()))?;

        if parsed.status.status_code != "SUCCESS" {
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: parsed
                    .status
                    .status_desc
                    .unwrap_or(parsed.status.status_code),
            });
        }

        let order_id = parsed
            .order_id
            .ok_or_else(|| PaymentError::Parse("response has no orderId".to_string()))?;
        info!(%order_id, "Online order created");

        Ok(PayuOrderCreated {
            order_id,
            ext_order_id: order.ext_order_id.clone(),
            redirect_uri: parsed.redirect_uri,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cracker_cart_core::{AddressId, CartItem, ProductId, UserId};
    use secrecy::SecretString;
    use url::Url;

    use super::*;

    fn config() -> PayuConfig {
        PayuConfig {
            base_url: Url::parse("https://secure.snd.payu.com/").unwrap(),
            bearer_token: SecretString::from("7f1c2b9e-4d83-4a6e-b5f0-2c9d81e6a3b4"),
            merchant_pos_id: "481905".to_string(),
            notify_url: Some("https://shop.example.in/notify".to_string()),
            currency_code: "INR".to_string(),
            customer_ip: "127.0.0.1".to_string(),
        }
    }

    fn address() -> Address {
        serde_json::from_value(serde_json::json!({
            "id": 4,
            "addressLine1": "12 Temple Street",
            "city": "Sivakasi",
            "state": "Tamil Nadu",
            "pinCode": 626_123,
            "contactNo": 9_876_543_210_u64
        }))
        .unwrap()
    }

    #[test]
    fn test_order_reflects_cart_and_address() {
        let cart = Cart::from_items(vec![
            CartItem::new(ProductId::new(1), "Flower Pots", Price::from_minor_units(5000), 2),
            CartItem::new(ProductId::new(2), "Sparklers", Price::from_minor_units(1999), 1),
        ]);
        let session = Session::logged_in(UserId::new(3), "Asha");
        let order = PayuOrder::from_checkout(&config(), &cart, &address(), &session).unwrap();

        assert_eq!(order.total_amount, "11999");
        assert_eq!(order.merchant_pos_id, "481905");
        assert_eq!(order.products.len(), 2);
        assert_eq!(order.products[0].unit_price, "5000");
        assert_eq!(order.products[0].quantity, "2");
        assert_eq!(order.buyer.phone.as_deref(), Some("9876543210"));
        assert_eq!(order.buyer.first_name.as_deref(), Some("Asha"));
        assert_eq!(order.ext_order_id.len(), 32);
        assert_eq!(address().id, AddressId::new(4));
    }

    #[test]
    fn test_total_matches_listed_lines() {
        let cart = Cart::from_items(vec![CartItem::new(
            ProductId::new(5),
            "Bijili",
            Price::new("0.333".parse().unwrap()),
            3,
        )]);
        let order =
            PayuOrder::from_checkout(&config(), &cart, &address(), &Session::default()).unwrap();

        assert_eq!(order.products[0].unit_price, "33");
        assert_eq!(order.total_amount, "99");
    }

    #[test]
    fn test_each_order_gets_a_fresh_reference() {
        let cart = Cart::from_items(vec![CartItem::new(
            ProductId::new(1),
            "Flower Pots",
            Price::from_minor_units(5000),
            1,
        )]);
        let session = Session::default();
        let a = PayuOrder::from_checkout(&config(), &cart, &address(), &session).unwrap();
        let b = PayuOrder::from_checkout(&config(), &cart, &address(), &session).unwrap();
        assert_ne!(a.ext_order_id, b.ext_order_id);
    }

    #[test]
    fn test_empty_cart_rejected() {
        let result =
            PayuOrder::from_checkout(&config(), &Cart::new(), &address(), &Session::default());
        assert!(matches!(result, Err(PaymentError::EmptyCart)));
    }

    #[test]
    fn test_wire_format() {
        let cart = Cart::from_items(vec![CartItem::new(
            ProductId::new(1),
            "Flower Pots",
            Price::from_minor_units(15000),
            1,
        )]);
        let order =
            PayuOrder::from_checkout(&config(), &cart, &address(), &Session::default()).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["totalAmount"], "15000");
        assert_eq!(json["merchantPosId"], "481905");
        assert_eq!(json["notifyUrl"], "https://shop.example.in/notify");
        assert_eq!(json["products"][0]["unitPrice"], "15000");
        assert!(json["buyer"].get("firstName").is_none());
    }
}

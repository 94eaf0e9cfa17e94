//! Integration tests for the HTTP store gateway.
//!
//! Each test starts its own stub backend, so they run in parallel.
//!
//! Run with: cargo test -p cracker-cart-integration-tests

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use cracker_cart_client::gateway::Endpoint;
use cracker_cart_client::{ClientConfig, GatewayError, HttpGateway, StoreGateway};
use cracker_cart_core::{AddressId, CouponCode, CouponId, CouponType, NewAddress, ProductId, UserId};
use cracker_cart_integration_tests::{StubStore, address, product};
use serde_json::json;

const UID: UserId = UserId::new(21);

async fn setup() -> (StubStore, HttpGateway) {
    let store = StubStore::spawn().await.unwrap();
    let gateway = HttpGateway::new(&store.config()).unwrap();
    (store, gateway)
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_get_cart_items_decodes_products() {
    let (store, gateway) = setup().await;
    store.state().products = vec![
        product(1, "Flower Pots", 50.0, 2),
        product(2, "Sparklers", 19.99, 1),
    ];

    let items = gateway.get_cart_items(UID).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, ProductId::new(1));
    assert_eq!(items[1].net_price.to_string(), "19.99");
    assert_eq!(store.requests_to("store/getCartItems"), vec![json!({ "uid": 21 })]);
}

#[tokio::test]
async fn test_non_200_envelope_is_rejected() {
    let (store, gateway) = setup().await;
    store.state().response_codes.insert("getCartItems".to_string(), 401);

    let err = gateway.get_cart_items(UID).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Rejected {
            endpoint: Endpoint::GetCartItems,
            code: 401
        }
    ));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_http_failure_is_transport_error() {
    let (store, gateway) = setup().await;
    store
        .state()
        .http_failures
        .insert("getCartItems".to_string(), StatusCode::INTERNAL_SERVER_ERROR);

    let err = gateway.get_cart_items(UID).await.unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 500, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_missing_data_is_an_error() {
    let (store, gateway) = setup().await;
    store.state().omit_data.push("getAddresses".to_string());

    let err = gateway.get_addresses(UID).await.unwrap_err();
    assert!(matches!(err, GatewayError::MissingData(Endpoint::GetAddresses)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let config = ClientConfig::for_store(format!("http://{addr}/").parse().unwrap());
    let gateway = HttpGateway::new(&config).unwrap();

    let err = gateway.get_cart_items(UID).await.unwrap_err();
    assert!(err.is_transport());
}

// ============================================================================
// Addresses
// ============================================================================

#[tokio::test]
async fn test_addresses_accept_numbers_or_strings() {
    let (store, gateway) = setup().await;
    let mut textual = address(2, "Madurai");
    textual["pinCode"] = json!("625001");
    store.state().addresses = vec![address(1, "Sivakasi"), textual];

    let addresses = gateway.get_addresses(UID).await.unwrap();

    assert_eq!(addresses[0].id, AddressId::new(1));
    assert_eq!(addresses[0].pin_code, "626123");
    assert_eq!(addresses[0].contact_no, "9876543210");
    assert_eq!(addresses[1].pin_code, "625001");
}

#[tokio::test]
async fn test_add_address_sends_numeric_fields() {
    let (store, gateway) = setup().await;
    let new = NewAddress {
        address_line1: "4 Car Street".to_string(),
        address_line2: "Opp. Post Office".to_string(),
        city: "Sivakasi".to_string(),
        state: "Tamil Nadu".to_string(),
        pin_code: 626_123,
        contact_no: 9_876_543_210,
        alternate_contact: 9_123_456_780,
    };

    gateway.add_address(UID, &new).await.unwrap();

    let sent = store.requests_to("store/addAddress");
    assert_eq!(
        sent,
        vec![json!({
            "uid": 21,
            "address": {
                "addressLine1": "4 Car Street",
                "addressLine2": "Opp. Post Office",
                "city": "Sivakasi",
                "state": "Tamil Nadu",
                "pinCode": 626_123,
                "contactNo": 9_876_543_210_u64,
                "alternateContact": 9_123_456_780_u64
            }
        })]
    );
    assert_eq!(store.state().addresses.len(), 1);
}

// ============================================================================
// Coupons
// ============================================================================

#[tokio::test]
async fn test_apply_coupon_verdicts() {
    let (store, gateway) = setup().await;
    store
        .state()
        .coupons
        .insert("DIWALI50".to_string(), (8, 1001));

    let code = CouponCode::parse("DIWALI50").unwrap();
    let verdict = gateway.apply_coupon(UID, &code).await.unwrap();
    assert!(verdict.is_applicable);
    assert_eq!(verdict.coupon_id, Some(CouponId::new(8)));
    assert_eq!(verdict.coupon_type, Some(CouponType::Other));

    let code = CouponCode::parse("NOPE1234").unwrap();
    let verdict = gateway.apply_coupon(UID, &code).await.unwrap();
    assert!(!verdict.is_applicable);
    assert_eq!(verdict.coupon_id, None);

    let sent = store.requests_to("store/applyCoupon");
    assert_eq!(sent[0], json!({ "uid": 21, "couponCode": "DIWALI50" }));
}

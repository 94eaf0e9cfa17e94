//! Cracker Cart client library.
//!
//! Talks to the store backend, drives the cart and checkout screen and
//! keeps the app-wide navigation shell. Domain types live in
//! `cracker-cart-core`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod error;
pub mod gateway;
pub mod loading;
pub mod notify;
pub mod payment;
pub mod shell;

pub use checkout::{CheckoutError, CheckoutFlow, CheckoutOutcome, Section};
pub use config::{ClientConfig, ConfigError, PayuConfig};
pub use error::{ClientError, Result};
pub use gateway::{GatewayError, HttpGateway, StoreGateway};
pub use loading::{Loading, LoadingGuard};
pub use notify::{Notifier, ToastSettings, TracingNotifier};
pub use payment::{PayuClient, PaymentError};
pub use shell::{AppShell, Navigation, ScreenContext};

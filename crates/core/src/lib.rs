//! Cracker Cart Core - Shared domain types and cart logic.
//!
//! This crate provides the types used across all Cracker Cart components:
//! - `client` - Remote gateway, navigation shell and checkout flow
//! - `cli` - Command-line front-end for the checkout flow
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no async. Everything here can be unit tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses, addresses, pages and session
//! - [`cart`] - Cart line items and total arithmetic
//! - [`coupon`] - Coupon code input and applicability state
//! - [`order`] - Order request construction

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod coupon;
pub mod order;
pub mod types;

pub use cart::{Cart, CartItem, Removal};
pub use coupon::{CouponCode, CouponCodeError, CouponState, CouponVerdict};
pub use order::OrderRequest;
pub use types::*;

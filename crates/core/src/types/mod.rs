//! Core types for Cracker Cart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod page;
pub mod price;
pub mod session;
pub mod status;

pub use address::{
    Address, AddressDraft, AddressField, AddressFieldError, AddressValidation, FieldCheck,
    NewAddress,
};
pub use id::*;
pub use page::{Page, UnknownPage};
pub use price::Price;
pub use session::{LoginInfo, Session};
pub use status::*;

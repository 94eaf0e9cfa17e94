//! Unified error handling with Sentry integration.
//!
//! [`ClientError`] collects every failure the client can surface. Callers
//! hand it to [`ClientError::report`], which captures the unexpected kinds to
//! Sentry and logs them, and show [`ClientError::user_message`] to the user.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::gateway::GatewayError;
use crate::payment::PaymentError;

/// Application-level error type for the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A store backend call failed outside of checkout.
    #[error("Store error: {0}")]
    Gateway(#[from] GatewayError),

    /// Online payment failed outside of checkout.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// A checkout step failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl ClientError {
    /// Whether the failure came from the network rather than the user.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        match self {
            Self::Gateway(err) | Self::Checkout(CheckoutError::Gateway(err)) => err.is_transport(),
            Self::Payment(PaymentError::Http(_))
            | Self::Checkout(CheckoutError::Payment(PaymentError::Http(_))) => true,
            _ => false,
        }
    }

    /// Whether this is worth an error report, as opposed to a user mistake.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        !matches!(
            self,
            Self::Checkout(
                CheckoutError::NotLoggedIn
                    | CheckoutError::InvalidCouponCode(_)
                    | CheckoutError::InvalidAddress(_)
                    | CheckoutError::UnknownAddress(_)
                    | CheckoutError::PlaceOrderDisabled
                    | CheckoutError::Cancelled
            )
        )
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_transport() {
            return "Could not reach the store, please try again".to_string();
        }
        match self {
            Self::Config(_) => "The app is not configured correctly".to_string(),
            Self::Gateway(_) | Self::Checkout(CheckoutError::Gateway(_)) => {
                "The store could not complete the request".to_string()
            }
            Self::Payment(PaymentError::NotConfigured)
            | Self::Checkout(CheckoutError::Payment(PaymentError::NotConfigured)) => {
                "Online payment is not available".to_string()
            }
            Self::Payment(_) | Self::Checkout(CheckoutError::Payment(_)) => {
                "Payment failed, you have not been charged".to_string()
            }
            Self::Checkout(CheckoutError::NotLoggedIn) => "Please log in first".to_string(),
            Self::Checkout(CheckoutError::InvalidAddress(_)) => {
                "Please correct the highlighted address fields".to_string()
            }
            Self::Checkout(err) => err.to_string(),
        }
    }

    /// Capture unexpected errors to Sentry and log them.
    ///
    /// Returns whether an event was captured.
    pub fn report(&self) -> bool {
        if !self.is_unexpected() {
            tracing::info!(error = %self, "Request refused");
            return false;
        }
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );
        true
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(user_id: &impl ToString, user_name: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: user_name.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a navigation step for later error reports.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

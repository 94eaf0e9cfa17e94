//! Coupon code input and applicability state.
//!
//! A coupon is only sent for validation once the code is long enough. Any
//! failure, whether an explicit rejection or a transport error, leaves the
//! state `NotApplicable` with no coupon id or type recorded.

use serde::{Deserialize, Serialize};

use crate::types::{CouponApplicability, CouponId, CouponType};

/// Minimum number of characters in a coupon code.
pub const MIN_COUPON_LENGTH: usize = 4;

/// Message shown after a coupon is accepted.
pub const COUPON_APPLIED_MESSAGE: &str = "Coupon applied successfully";
/// Message shown after a coupon is rejected for any reason.
pub const COUPON_REJECTED_MESSAGE: &str = "Sorry, this coupon code is not applicable";

/// Errors that can occur when parsing a [`CouponCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponCodeError {
    /// The code is too short to be worth checking.
    #[error("coupon code must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
}

/// A coupon code long enough to be validated remotely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    /// Parse user input into a coupon code.
    ///
    /// The input is kept exactly as typed, whitespace included.
    ///
    /// # Errors
    ///
    /// Returns `TooShort` when the input has three characters or fewer.
    pub fn parse(s: &str) -> Result<Self, CouponCodeError> {
        if s.chars().count() < MIN_COUPON_LENGTH {
            return Err(CouponCodeError::TooShort {
                min: MIN_COUPON_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CouponCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The `data` payload of an apply-coupon response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponVerdict {
    #[serde(default)]
    pub is_applicable: bool,
    #[serde(default)]
    pub coupon_type: Option<CouponType>,
    #[serde(default)]
    pub coupon_id: Option<CouponId>,
}

/// Coupon state of the checkout screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponState {
    code: Option<CouponCode>,
    applicability: CouponApplicability,
    coupon_id: Option<CouponId>,
    coupon_type: Option<CouponType>,
    message: Option<&'static str>,
}

impl CouponState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the "apply" action should be disabled for this input.
    #[must_use]
    pub fn apply_disabled(input: &str) -> bool {
        CouponCode::parse(input).is_err()
    }

    /// Record the server's verdict for `code`.
    ///
    /// A verdict without a coupon id is treated as not applicable.
    pub fn record_verdict(&mut self, code: CouponCode, verdict: &CouponVerdict) {
        match (verdict.is_applicable, verdict.coupon_id) {
            (true, Some(id)) => {
                self.code = Some(code);
                self.applicability = CouponApplicability::Applicable;
                self.coupon_id = Some(id);
                self.coupon_type = Some(verdict.coupon_type.unwrap_or_default());
                self.message = Some(COUPON_APPLIED_MESSAGE);
            }
            _ => self.reject(code),
        }
    }

    /// Mark `code` as not applicable and forget any previously applied coupon.
    pub fn reject(&mut self, code: CouponCode) {
        self.code = Some(code);
        self.applicability = CouponApplicability::NotApplicable;
        self.coupon_id = None;
        self.coupon_type = None;
        self.message = Some(COUPON_REJECTED_MESSAGE);
    }

    /// Forget everything about coupons.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn code(&self) -> Option<&CouponCode> {
        self.code.as_ref()
    }

    #[must_use]
    pub const fn applicability(&self) -> CouponApplicability {
        self.applicability
    }

    #[must_use]
    pub const fn coupon_id(&self) -> Option<CouponId> {
        self.coupon_id
    }

    #[must_use]
    pub const fn coupon_type(&self) -> Option<CouponType> {
        self.coupon_type
    }

    /// Message to show under the coupon field, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// The `(id, type)` pair to attach to an order, only while applicable.
    #[must_use]
    pub fn applied(&self) -> Option<(CouponId, CouponType)> {
        if self.applicability != CouponApplicability::Applicable {
            return None;
        }
        self.coupon_id.zip(self.coupon_type)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_codes_rejected() {
        assert_eq!(
            CouponCode::parse("AB"),
            Err(CouponCodeError::TooShort { min: 4 })
        );
        assert!(CouponCode::parse("ABC").is_err());
        assert!(CouponCode::parse(" A ").is_err());
        assert!(CouponState::apply_disabled("ABC"));
        assert!(!CouponState::apply_disabled("DIWALI"));
    }

    #[test]
    fn test_code_of_four_chars_accepted() {
        assert_eq!(CouponCode::parse("SALE").unwrap().as_str(), "SALE");
    }

    #[test]
    fn test_padded_code_counts_and_keeps_whitespace() {
        assert_eq!(CouponCode::parse("AB  ").unwrap().as_str(), "AB  ");
        assert!(!CouponState::apply_disabled("AB  "));
    }

    #[test]
    fn test_applicable_verdict() {
        let mut state = CouponState::new();
        let verdict = CouponVerdict {
            is_applicable: true,
            coupon_type: Some(CouponType::Refer),
            coupon_id: Some(CouponId::new(55)),
        };
        state.record_verdict(CouponCode::parse("REFER55").unwrap(), &verdict);
        assert_eq!(state.applicability(), CouponApplicability::Applicable);
        assert_eq!(state.applied(), Some((CouponId::new(55), CouponType::Refer)));
        assert_eq!(state.message(), Some(COUPON_APPLIED_MESSAGE));
    }

    #[test]
    fn test_not_applicable_verdict_clears_id() {
        let mut state = CouponState::new();
        state.record_verdict(
            CouponCode::parse("GOOD").unwrap(),
            &CouponVerdict {
                is_applicable: true,
                coupon_type: Some(CouponType::Other),
                coupon_id: Some(CouponId::new(1)),
            },
        );
        let verdict: CouponVerdict =
            serde_json::from_value(serde_json::json!({ "isApplicable": false })).unwrap();
        state.record_verdict(CouponCode::parse("BADCODE").unwrap(), &verdict);
        assert_eq!(state.applicability(), CouponApplicability::NotApplicable);
        assert_eq!(state.coupon_id(), None);
        assert_eq!(state.coupon_type(), None);
        assert_eq!(state.applied(), None);
        assert_eq!(state.message(), Some(COUPON_REJECTED_MESSAGE));
    }

    #[test]
    fn test_applicable_without_id_is_rejected() {
        let mut state = CouponState::new();
        let verdict = CouponVerdict {
            is_applicable: true,
            coupon_type: Some(CouponType::Other),
            coupon_id: None,
        };
        state.record_verdict(CouponCode::parse("NOID").unwrap(), &verdict);
        assert_eq!(state.applicability(), CouponApplicability::NotApplicable);
    }
}

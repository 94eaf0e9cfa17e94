//! Status and mode enums shared by the cart, coupon and checkout code.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// How an order is paid for.
///
/// The store backend identifies payment modes by numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum PaymentMode {
    /// Cash on delivery, settled with the store backend.
    CashOnDelivery,
    /// Online payment through the third-party payment gateway.
    Online,
}

impl PaymentMode {
    /// Numeric code sent in the `paymentMode` field.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::CashOnDelivery => 100,
            Self::Online => 101,
        }
    }

    /// Short name used by the UI and CLI (`cod`, `online`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cod",
            Self::Online => "online",
        }
    }
}

impl From<PaymentMode> for u16 {
    fn from(mode: PaymentMode) -> Self {
        mode.code()
    }
}

impl TryFrom<u16> for PaymentMode {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            100 => Ok(Self::CashOnDelivery),
            101 => Ok(Self::Online),
            other => Err(format!("invalid payment mode code: {other}")),
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" => Ok(Self::CashOnDelivery),
            "online" => Ok(Self::Online),
            _ => Err(format!("invalid payment mode: {s}")),
        }
    }
}

/// Kind of coupon, as reported by the coupon service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "i64", into = "i64")]
pub enum CouponType {
    #[default]
    None,
    Other,
    AckRefer,
    Refer,
    /// A code this client does not know about; passed back verbatim.
    Unknown(i64),
}

impl CouponType {
    /// Numeric code used on the wire.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Other => 1001,
            Self::AckRefer => 1002,
            Self::Refer => 1003,
            Self::Unknown(code) => code,
        }
    }
}

impl From<i64> for CouponType {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::None,
            1001 => Self::Other,
            1002 => Self::AckRefer,
            1003 => Self::Refer,
            other => Self::Unknown(other),
        }
    }
}

impl From<CouponType> for i64 {
    fn from(kind: CouponType) -> Self {
        kind.code()
    }
}

/// Result of validating a coupon code against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CouponApplicability {
    /// No code has been checked yet.
    #[default]
    Unknown,
    Applicable,
    NotApplicable,
}

impl fmt::Display for CouponApplicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Applicable => write!(f, "applicable"),
            Self::NotApplicable => write!(f, "not-applicable"),
        }
    }
}

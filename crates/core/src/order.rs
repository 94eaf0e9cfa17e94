//! Order request construction.

use serde::{Deserialize, Serialize};

use crate::coupon::CouponState;
use crate::types::{AddressId, CouponId, CouponType, PaymentMode, UserId};

/// Body of a check-out request. Built fresh for every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub uid: UserId,
    pub address_id: AddressId,
    pub payment_mode: PaymentMode,
    /// Only set while a coupon is applicable.
    pub coupon_id: Option<CouponId>,
    pub coupon_type: Option<CouponType>,
}

impl OrderRequest {
    /// Assemble an order from the current checkout selections.
    #[must_use]
    pub fn new(
        uid: UserId,
        address_id: AddressId,
        payment_mode: PaymentMode,
        coupon: &CouponState,
    ) -> Self {
        let (coupon_id, coupon_type) = coupon.applied().unzip();
        Self {
            uid,
            address_id,
            payment_mode,
            coupon_id,
            coupon_type,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::coupon::{CouponCode, CouponVerdict};

    #[test]
    fn test_cod_order_without_coupon() {
        let order = OrderRequest::new(
            UserId::new(5),
            AddressId::new(9),
            PaymentMode::CashOnDelivery,
            &CouponState::new(),
        );
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "uid": 5,
                "addressId": 9,
                "paymentMode": 100,
                "couponId": null,
                "couponType": null
            })
        );
    }

    #[test]
    fn test_order_carries_applicable_coupon() {
        let mut coupon = CouponState::new();
        coupon.record_verdict(
            CouponCode::parse("FEST10").unwrap(),
            &CouponVerdict {
                is_applicable: true,
                coupon_type: Some(CouponType::Other),
                coupon_id: Some(CouponId::new(31)),
            },
        );
        let order = OrderRequest::new(
            UserId::new(5),
            AddressId::new(9),
            PaymentMode::Online,
            &coupon,
        );
        assert_eq!(order.coupon_id, Some(CouponId::new(31)));
        assert_eq!(order.coupon_type, Some(CouponType::Other));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["paymentMode"], 101);
        assert_eq!(json["couponType"], 1001);
    }
}

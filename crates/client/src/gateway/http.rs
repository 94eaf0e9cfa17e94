//! `reqwest` implementation of [`StoreGateway`].

use std::sync::Arc;

use cracker_cart_core::{Address, CartItem, CouponCode, CouponVerdict, NewAddress, OrderRequest, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{
    AddAddressRequest, AddressesData, ApplyCouponRequest, Endpoint, Envelope, GatewayError,
    ProductsData, StoreGateway, UidRequest,
};
use crate::config::ClientConfig;

/// Store backend client over HTTPS.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<HttpGatewayInner>,
}

struct HttpGatewayInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    /// Create a gateway for the configured store backend.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpGatewayInner {
                client,
                base_url: config.store_base_url.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Post `body` to `endpoint` and unwrap the envelope.
    async fn post<B: Serialize + Sync>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<Option<serde_json::Value>, GatewayError> {
        let url = self.inner.base_url.join(endpoint.path())?;
        debug!(%endpoint, "Sending store request");

        let response = self.inner.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(
                %endpoint,
                status = %status,
                body = %text.chars().take(200).collect::<String>(),
                "Store backend returned non-success status"
            );
            return Err(GatewayError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope = serde_json::from_str(&text).map_err(|e| {
            warn!(
                %endpoint,
                error = %e,
                body = %text.chars().take(200).collect::<String>(),
                "Failed to parse store response"
            );
            GatewayError::Parse(e)
        })?;

        envelope.into_data(endpoint).inspect_err(|e| {
            warn!(%endpoint, error = %e, "Store request rejected");
        })
    }

    /// Post and decode a required payload.
    async fn post_for<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<T, GatewayError> {
        let data = self
            .post(endpoint, body)
            .await?
            .ok_or(GatewayError::MissingData(endpoint))?;
        serde_json::from_value(data).map_err(|e| {
            warn!(%endpoint, error = %e, "Store payload has unexpected shape");
            GatewayError::Parse(e)
        })
    }
}

impl StoreGateway for HttpGateway {
    #[instrument(skip(self), fields(user_id = %uid))]
    async fn get_cart_items(&self, uid: UserId) -> Result<Vec<CartItem>, GatewayError> {
        let data: ProductsData = self
            .post_for(Endpoint::GetCartItems, &UidRequest { uid })
            .await?;
        debug!(lines = data.products.len(), "Fetched cart");
        Ok(data.products)
    }

    #[instrument(skip(self), fields(user_id = %uid))]
    async fn get_addresses(&self, uid: UserId) -> Result<Vec<Address>, GatewayError> {
        let data: AddressesData = self
            .post_for(Endpoint::GetAddresses, &UidRequest { uid })
            .await?;
        debug!(count = data.addresses.len(), "Fetched addresses");
        Ok(data.addresses)
    }

    #[instrument(skip(self, address), fields(user_id = %uid))]
    async fn add_address(&self, uid: UserId, address: &NewAddress) -> Result<(), GatewayError> {
        self.post(Endpoint::AddAddress, &AddAddressRequest { uid, address })
            .await?;
        Ok(())
    }

    #[instrument(skip(self, code), fields(user_id = %uid))]
    async fn apply_coupon(
        &self,
        uid: UserId,
        code: &CouponCode,
    ) -> Result<CouponVerdict, GatewayError> {
        self.post_for(
            Endpoint::ApplyCoupon,
            &ApplyCouponRequest {
                uid,
                coupon_code: code.as_str(),
            },
        )
        .await
    }

    #[instrument(skip(self, order), fields(user_id = %order.uid, address_id = %order.address_id))]
    async fn check_out(&self, order: &OrderRequest) -> Result<(), GatewayError> {
        self.post(Endpoint::CheckOut, order).await?;
        Ok(())
    }
}

//! Cart and checkout screen.
//!
//! [`CheckoutFlow`] walks the customer through a linear sequence:
//!
//! 1. [`Section::Cart`] - review lines, change quantities, apply a coupon
//! 2. [`Section::ChooseAddress`] - pick a saved delivery address
//! 3. [`Section::NewAddress`] - optionally add one (then back to 2)
//! 4. pick a payment mode and place the order
//!
//! # Failure policy
//!
//! Every remote call holds the loading overlay and can be cancelled through
//! [`CheckoutFlow::cancellation_token`]. A failed or cancelled call leaves
//! the screen state as it was, with one exception: a coupon that could not
//! be validated for any reason is shown as not applicable. Failures are
//! logged and returned to the caller, who decides what to show.

use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use cracker_cart_core::{
    Address, AddressDraft, AddressField, AddressId, Cart, CouponApplicability, CouponCode,
    CouponCodeError, CouponState, FieldCheck, OrderRequest, Page, PaymentMode, ProductId, Removal,
    Session, UserId,
};

use crate::gateway::{GatewayError, StoreGateway};
use crate::payment::{PayuClient, PayuOrder, PayuOrderCreated, PaymentError};
use crate::shell::ScreenContext;

/// Toast shown once an order has been accepted.
pub const ORDER_PLACED_MESSAGE: &str = "Order placed successfully";

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The screen was opened without a signed-in user.
    #[error("not logged in")]
    NotLoggedIn,

    /// The store backend call failed.
    #[error("store error: {0}")]
    Gateway(#[from] GatewayError),

    /// The online payment failed.
    #[error("payment error: {0}")]
    Payment(#[from] PaymentError),

    /// The coupon code is too short to check.
    #[error("invalid coupon code: {0}")]
    InvalidCouponCode(#[from] CouponCodeError),

    /// The new-address draft has invalid fields.
    #[error("invalid address fields: {}", format_fields(.0))]
    InvalidAddress(Vec<AddressField>),

    /// The address is not one of the user's saved addresses.
    #[error("unknown address: {0}")]
    UnknownAddress(AddressId),

    /// Address or payment mode not chosen yet.
    #[error("choose a delivery address and payment mode first")]
    PlaceOrderDisabled,

    /// The call was cancelled because the screen went away.
    #[error("cancelled")]
    Cancelled,
}

fn format_fields(fields: &[AddressField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which part of the checkout screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Cart,
    ChooseAddress,
    NewAddress,
}

/// How a successful order placement ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The store accepted a cash-on-delivery order.
    OrderPlaced { navigate_to: Page },
    /// An online order was created; the customer must complete payment.
    PaymentRedirect(PayuOrderCreated),
}

/// State and actions of the cart/checkout screen.
pub struct CheckoutFlow<G> {
    session: Session,
    gateway: G,
    payu: Option<PayuClient>,
    context: ScreenContext,
    cancel: CancellationToken,

    cart: Cart,
    coupon: CouponState,
    addresses: Vec<Address>,
    selected_address: Option<AddressId>,
    draft: AddressDraft,
    payment_mode: Option<PaymentMode>,
    section: Section,
}

impl<G> std::fmt::Debug for CheckoutFlow<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("session", &self.session)
            .field("section", &self.section)
            .field("cart", &self.cart)
            .field("coupon", &self.coupon)
            .field("selected_address", &self.selected_address)
            .field("payment_mode", &self.payment_mode)
            .finish_non_exhaustive()
    }
}

impl<G: StoreGateway> CheckoutFlow<G> {
    /// Open the checkout screen for `session`.
    #[must_use]
    pub fn new(session: Session, gateway: G, context: ScreenContext) -> Self {
        Self {
            session,
            gateway,
            payu: None,
            context,
            cancel: CancellationToken::new(),
            cart: Cart::new(),
            coupon: CouponState::new(),
            addresses: Vec::new(),
            selected_address: None,
            draft: AddressDraft::new(),
            payment_mode: None,
            section: Section::Cart,
        }
    }

    /// Enable the online payment path.
    #[must_use]
    pub fn with_payment(mut self, payu: PayuClient) -> Self {
        self.payu = Some(payu);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn coupon(&self) -> &CouponState {
        &self.coupon
    }

    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    #[must_use]
    pub const fn selected_address(&self) -> Option<AddressId> {
        self.selected_address
    }

    #[must_use]
    pub const fn draft(&self) -> &AddressDraft {
        &self.draft
    }

    #[must_use]
    pub const fn payment_mode(&self) -> Option<PaymentMode> {
        self.payment_mode
    }

    #[must_use]
    pub const fn section(&self) -> Section {
        self.section
    }

    /// Token that cancels this screen's in-flight calls.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel in-flight calls; later calls fail immediately with `Cancelled`.
    pub fn dispose(&self) {
        self.cancel.cancel();
    }

    fn uid(&self) -> Result<UserId, CheckoutError> {
        self.session.user_id().ok_or(CheckoutError::NotLoggedIn)
    }

    /// Run `fut` with the overlay up, racing it against cancellation.
    async fn guarded<F: Future>(&self, fut: F) -> Result<F::Output, CheckoutError> {
        let _overlay = self.context.loading.acquire();
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(CheckoutError::Cancelled),
            output = fut => Ok(output),
        }
    }

    fn toast(&self, message: &str) {
        self.context.notifier.toast(&self.context.toast, message);
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Load the cart from the store.
    ///
    /// # Errors
    ///
    /// Returns error if not logged in or the store call fails; the current
    /// cart is kept in that case.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&mut self) -> Result<(), CheckoutError> {
        let uid = self.uid()?;
        let items = self
            .guarded(self.gateway.get_cart_items(uid))
            .await?
            .inspect_err(|e| warn!(error = %e, "Failed to fetch cart"))?;
        self.cart = Cart::from_items(items);
        info!(
            lines = self.cart.len(),
            grand_total = %self.cart.grand_total(),
            "Cart loaded"
        );
        Ok(())
    }

    /// Add one unit of a product already in the cart.
    pub fn add_item(&mut self, id: ProductId) -> bool {
        self.cart.add_item(id)
    }

    /// Remove one unit; the line disappears at zero.
    pub fn remove_item(&mut self, id: ProductId) -> Option<Removal> {
        self.cart.remove_item(id)
    }

    /// Mark a cart line as a wishlist favourite (or not).
    pub fn set_favourite(&mut self, id: ProductId, favourite: bool) -> bool {
        self.cart.set_favourite(id, favourite)
    }

    #[must_use]
    pub fn continue_disabled(&self) -> bool {
        self.cart.continue_disabled()
    }

    // =========================================================================
    // Navigation between sections
    // =========================================================================

    /// Move on to address selection and load the saved addresses.
    ///
    /// # Errors
    ///
    /// Returns error if the address list cannot be fetched.
    pub async fn on_continue(&mut self) -> Result<(), CheckoutError> {
        self.section = Section::ChooseAddress;
        self.fetch_addresses().await
    }

    pub fn on_back(&mut self) {
        self.section = Section::Cart;
    }

    pub fn on_add_new_address(&mut self) {
        self.section = Section::NewAddress;
    }

    pub fn on_back_to_choose_address(&mut self) {
        self.section = Section::ChooseAddress;
    }

    // =========================================================================
    // Coupon
    // =========================================================================

    /// Whether the "apply" button should be disabled for `input`.
    #[must_use]
    pub fn apply_coupon_disabled(input: &str) -> bool {
        CouponState::apply_disabled(input)
    }

    /// Validate a coupon code with the store.
    ///
    /// Codes of three characters or fewer are refused without a request.
    /// Any store failure marks the coupon not applicable and is returned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCouponCode` for short codes, `Gateway` when the store
    /// call failed, `Cancelled` if the screen was disposed.
    #[instrument(skip(self))]
    pub async fn apply_coupon(&mut self, input: &str) -> Result<CouponApplicability, CheckoutError> {
        let code = CouponCode::parse(input)?;
        let uid = self.uid()?;

        let verdict = self.guarded(self.gateway.apply_coupon(uid, &code)).await?;
        match verdict {
            Ok(verdict) => {
                self.coupon.record_verdict(code, &verdict);
                info!(applicability = %self.coupon.applicability(), "Coupon checked");
                Ok(self.coupon.applicability())
            }
            Err(e) => {
                warn!(error = %e, "Coupon check failed; treating as not applicable");
                self.coupon.reject(code);
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Replace the address list with the store's.
    ///
    /// A selected address that is no longer listed is deselected.
    ///
    /// # Errors
    ///
    /// Returns error if the store call fails; the old list is kept.
    #[instrument(skip(self))]
    pub async fn fetch_addresses(&mut self) -> Result<(), CheckoutError> {
        let uid = self.uid()?;
        let addresses = self
            .guarded(self.gateway.get_addresses(uid))
            .await?
            .inspect_err(|e| warn!(error = %e, "Failed to fetch addresses"))?;
        self.addresses = addresses;
        if let Some(id) = self.selected_address
            && !self.addresses.iter().any(|a| a.id == id)
        {
            self.selected_address = None;
        }
        Ok(())
    }

    /// Update one draft field and report its validity.
    pub fn set_draft_field(&mut self, field: AddressField, value: impl Into<String>) -> FieldCheck {
        self.draft.set(field, value);
        self.draft.check_field(field)
    }

    /// Discard the draft.
    pub fn reset_draft(&mut self) {
        self.draft = AddressDraft::new();
    }

    #[must_use]
    pub fn add_address_disabled(&self) -> bool {
        !self.draft.is_submittable()
    }

    /// Save the draft as a new address, then refresh the list.
    ///
    /// On success the draft is cleared and the address chooser is shown. A
    /// failed refresh afterwards is logged and leaves the old list in place;
    /// the address itself was saved.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAddress` without contacting the store if any field is
    /// invalid, or the store error if saving failed.
    #[instrument(skip(self))]
    pub async fn submit_new_address(&mut self) -> Result<(), CheckoutError> {
        let uid = self.uid()?;
        let address = self
            .draft
            .to_new_address()
            .map_err(CheckoutError::InvalidAddress)?;

        self.guarded(self.gateway.add_address(uid, &address))
            .await?
            .inspect_err(|e| warn!(error = %e, "Failed to add address"))?;

        info!("Address added");
        self.on_back_to_choose_address();
        self.reset_draft();
        if let Err(e) = self.fetch_addresses().await {
            warn!(error = %e, "Address saved but the list could not be refreshed");
        }
        Ok(())
    }

    /// Choose where the order is delivered.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAddress` if `id` is not in the current list.
    pub fn select_address(&mut self, id: AddressId) -> Result<(), CheckoutError> {
        if !self.addresses.iter().any(|a| a.id == id) {
            return Err(CheckoutError::UnknownAddress(id));
        }
        self.selected_address = Some(id);
        Ok(())
    }

    // =========================================================================
    // Payment
    // =========================================================================

    pub fn select_payment_mode(&mut self, mode: PaymentMode) {
        self.payment_mode = Some(mode);
    }

    /// "Place order" needs both an address and a payment mode.
    #[must_use]
    pub const fn place_order_disabled(&self) -> bool {
        self.selected_address.is_none() || self.payment_mode.is_none()
    }

    /// Place the order through the selected payment path.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderDisabled` if address or payment mode is missing,
    /// otherwise the store or payment error.
    #[instrument(skip(self))]
    pub async fn place_order(&mut self) -> Result<CheckoutOutcome, CheckoutError> {
        let (Some(address_id), Some(mode)) = (self.selected_address, self.payment_mode) else {
            return Err(CheckoutError::PlaceOrderDisabled);
        };
        let uid = self.uid()?;

        match mode {
            PaymentMode::CashOnDelivery => {
                let order = OrderRequest::new(uid, address_id, mode, &self.coupon);
                self.guarded(self.gateway.check_out(&order))
                    .await?
                    .inspect_err(|e| warn!(error = %e, "Cash-on-delivery checkout failed"))?;
                info!(%address_id, "Order placed");
                self.toast(ORDER_PLACED_MESSAGE);
                Ok(CheckoutOutcome::OrderPlaced {
                    navigate_to: Page::OrderHistory,
                })
            }
            PaymentMode::Online => {
                let payu = self
                    .payu
                    .as_ref()
                    .ok_or(PaymentError::NotConfigured)?;
                let address = self
                    .addresses
                    .iter()
                    .find(|a| a.id == address_id)
                    .ok_or(CheckoutError::UnknownAddress(address_id))?;
                let order = PayuOrder::from_checkout(payu.config(), &self.cart, address, &self.session)?;
                let created = self
                    .guarded(payu.create_order(&order))
                    .await?
                    .inspect_err(|e| warn!(error = %e, "Online payment failed"))?;
                self.toast(ORDER_PLACED_MESSAGE);
                Ok(CheckoutOutcome::PaymentRedirect(created))
            }
        }
    }
}

//! Subcommand implementations.
//!
//! Each command signs the user into an [`AppShell`], opens the cart page and
//! drives a [`CheckoutFlow`] the same way the screen would. Results are
//! written through `tracing`.

use std::sync::Arc;

use clap::Args;
use cracker_cart_client::{
    AppShell, CheckoutError, CheckoutFlow, CheckoutOutcome, ClientConfig, ClientError,
    HttpGateway, Loading, Navigation, PayuClient, TracingNotifier,
};
use cracker_cart_core::{AddressField, AddressId, LoginInfo, Page, PaymentMode, UserId};

/// A signed-in shopper with the cart page open.
pub struct Shopper {
    shell: AppShell,
    flow: CheckoutFlow<HttpGateway>,
}

impl Shopper {
    /// Sign `user_id` in and open the cart page.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP clients cannot be built.
    pub fn open(
        config: &ClientConfig,
        user_id: UserId,
        user_name: Option<String>,
    ) -> Result<Self, ClientError> {
        let mut shell = AppShell::new(
            Loading::default(),
            Arc::new(TracingNotifier),
            config.toast.clone(),
        );
        shell.process_login(&LoginInfo {
            dismiss_popup: true,
            user_id: Some(user_id),
            user_name,
            is_admin: false,
        });
        if shell.open_page(Page::ShoppingCart) == Navigation::LoginPrompt {
            return Err(CheckoutError::NotLoggedIn.into());
        }

        let gateway = HttpGateway::new(config)?;
        let mut flow = CheckoutFlow::new(shell.session(), gateway, shell.screen_context());
        if let Some(payu) = &config.payu {
            flow = flow.with_payment(PayuClient::new(payu.clone())?);
        }

        let token = flow.cancellation_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling");
                token.cancel();
            }
        });

        Ok(Self { shell, flow })
    }
}

/// Fields of a new delivery address.
#[derive(Args)]
pub struct AddressArgs {
    #[arg(long)]
    line1: String,
    #[arg(long)]
    line2: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    pin_code: String,
    #[arg(long)]
    contact_no: String,
    #[arg(long)]
    alternate_contact: String,
}

impl AddressArgs {
    fn fields(self) -> [(AddressField, String); 7] {
        [
            (AddressField::AddressLine1, self.line1),
            (AddressField::AddressLine2, self.line2),
            (AddressField::City, self.city),
            (AddressField::State, self.state),
            (AddressField::PinCode, self.pin_code),
            (AddressField::ContactNo, self.contact_no),
            (AddressField::AlternateContact, self.alternate_contact),
        ]
    }
}

pub async fn cart(mut shopper: Shopper) -> Result<(), ClientError> {
    shopper.flow.fetch_cart().await?;
    let cart = shopper.flow.cart();
    for item in cart.items() {
        tracing::info!(
            id = %item.id,
            quantity = item.cart_quantity,
            price = %item.net_price,
            total = %item.total_amount,
            "{}",
            item.name
        );
    }
    tracing::info!(
        lines = cart.len(),
        units = cart.unit_count(),
        "Grand total: {}",
        cart.grand_total()
    );
    Ok(())
}

pub async fn addresses(mut shopper: Shopper) -> Result<(), ClientError> {
    shopper.flow.fetch_addresses().await?;
    if shopper.flow.addresses().is_empty() {
        tracing::info!("No saved addresses");
    }
    for address in shopper.flow.addresses() {
        tracing::info!(id = %address.id, "{address}");
    }
    Ok(())
}

pub async fn coupon(mut shopper: Shopper, code: &str) -> Result<(), ClientError> {
    shopper.flow.apply_coupon(code).await?;
    let state = shopper.flow.coupon();
    tracing::info!(
        applicability = %state.applicability(),
        "{}",
        state.message().unwrap_or_default()
    );
    Ok(())
}

pub async fn add_address(mut shopper: Shopper, args: AddressArgs) -> Result<(), ClientError> {
    shopper.flow.on_continue().await?;
    shopper.flow.on_add_new_address();
    for (field, value) in args.fields() {
        let check = shopper.flow.set_draft_field(field, value);
        if let Some(error) = &check.error {
            tracing::warn!(%field, %error, "Invalid address field");
        }
    }
    shopper.flow.submit_new_address().await?;
    tracing::info!(count = shopper.flow.addresses().len(), "Address saved");
    Ok(())
}

pub async fn checkout(
    mut shopper: Shopper,
    address_id: AddressId,
    payment: PaymentMode,
    coupon: Option<&str>,
) -> Result<(), ClientError> {
    let flow = &mut shopper.flow;
    flow.fetch_cart().await?;
    if flow.continue_disabled() {
        tracing::info!("Cart is empty, nothing to order");
        return Ok(());
    }

    if let Some(code) = coupon {
        flow.apply_coupon(code).await?;
        tracing::info!(applicability = %flow.coupon().applicability(), "Coupon checked");
    }

    flow.on_continue().await?;
    flow.select_address(address_id)?;
    flow.select_payment_mode(payment);

    match flow.place_order().await? {
        CheckoutOutcome::OrderPlaced { navigate_to } => {
            shopper.shell.open_page(navigate_to);
            tracing::info!(page = %shopper.shell.current_page(), "Order placed");
        }
        CheckoutOutcome::PaymentRedirect(created) => {
            tracing::info!(
                order_id = %created.order_id,
                ext_order_id = %created.ext_order_id,
                redirect = created.redirect_uri.as_deref().unwrap_or("-"),
                "Complete the payment in your browser"
            );
        }
    }
    Ok(())
}

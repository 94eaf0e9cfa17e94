//! Navigation targets of the app shell.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A screen the shell can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    #[default]
    Home,
    Login,
    Loading,
    Listing,
    Details,
    ShoppingCart,
    OrderHistory,
    Wishlist,
    Signup,
}

impl Page {
    /// Route name used by deep links and the CLI (e.g. `shoppingCartPage`).
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::Home => "homePage",
            Self::Login => "loginPage",
            Self::Loading => "showLoading",
            Self::Listing => "listingPage",
            Self::Details => "detailsPage",
            Self::ShoppingCart => "shoppingCartPage",
            Self::OrderHistory => "orderHistoryPage",
            Self::Wishlist => "wishlistPage",
            Self::Signup => "signupPage",
        }
    }

    /// Pages that need a logged-in user.
    #[must_use]
    pub const fn requires_login(self) -> bool {
        matches!(self, Self::ShoppingCart | Self::OrderHistory | Self::Wishlist)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

/// Error returned when parsing an unknown route name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown page: {0}")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Home,
            Self::Login,
            Self::Loading,
            Self::Listing,
            Self::Details,
            Self::ShoppingCart,
            Self::OrderHistory,
            Self::Wishlist,
            Self::Signup,
        ]
        .into_iter()
        .find(|page| page.route() == s)
        .ok_or_else(|| UnknownPage(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_round_trip() {
        assert_eq!("shoppingCartPage".parse::<Page>(), Ok(Page::ShoppingCart));
        assert_eq!("showLoading".parse::<Page>(), Ok(Page::Loading));
        assert!("adminPage".parse::<Page>().is_err());
    }

    #[test]
    fn test_requires_login() {
        assert!(Page::ShoppingCart.requires_login());
        assert!(Page::OrderHistory.requires_login());
        assert!(Page::Wishlist.requires_login());
        assert!(!Page::Home.requires_login());
        assert!(!Page::Details.requires_login());
    }
}

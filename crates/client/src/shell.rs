//! Top-level navigation shell.
//!
//! [`AppShell`] owns the navigation stack, the login prompt and the
//! [`Session`]. Screens get the session passed to them explicitly or
//! [`subscribe`](AppShell::subscribe) to changes; dropping the receiver ends
//! the subscription, so a screen's subscription never outlives the screen.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use cracker_cart_core::{LoginInfo, Page, Session};

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::loading::Loading;
use crate::notify::{Notifier, ToastSettings};

/// Toast shown after signing out.
pub const LOGGED_OUT_MESSAGE: &str = "You've been Logged out :(";

/// Services every screen is constructed with.
#[derive(Clone)]
pub struct ScreenContext {
    pub loading: Loading,
    pub notifier: Arc<dyn Notifier>,
    pub toast: ToastSettings,
}

impl std::fmt::Debug for ScreenContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenContext")
            .field("loading", &self.loading)
            .field("toast", &self.toast)
            .finish_non_exhaustive()
    }
}

/// What [`AppShell::open_page`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The page was pushed on top of the stack.
    Pushed(Page),
    /// The stack was replaced with this page.
    Root(Page),
    /// The page needs a signed-in user; the login prompt is now showing.
    LoginPrompt,
}

/// App-wide navigation and session holder.
pub struct AppShell {
    stack: Vec<Page>,
    login_prompt_visible: bool,
    session: watch::Sender<Session>,
    loading: Loading,
    notifier: Arc<dyn Notifier>,
    toast: ToastSettings,
}

impl std::fmt::Debug for AppShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppShell")
            .field("stack", &self.stack)
            .field("login_prompt_visible", &self.login_prompt_visible)
            .field("session", &*self.session.borrow())
            .finish_non_exhaustive()
    }
}

impl AppShell {
    /// Start at the home page with nobody signed in.
    #[must_use]
    pub fn new(loading: Loading, notifier: Arc<dyn Notifier>, toast: ToastSettings) -> Self {
        let (session, _) = watch::channel(Session::default());
        Self {
            stack: vec![Page::Home],
            login_prompt_visible: false,
            session,
            loading,
            notifier,
            toast,
        }
    }

    /// The page on top of the stack.
    #[must_use]
    pub fn current_page(&self) -> Page {
        self.stack.last().copied().unwrap_or_default()
    }

    /// The whole navigation stack, root first.
    #[must_use]
    pub fn stack(&self) -> &[Page] {
        &self.stack
    }

    #[must_use]
    pub const fn login_prompt_visible(&self) -> bool {
        self.login_prompt_visible
    }

    /// Whether the loading overlay is up.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_visible()
    }

    /// Shared loading overlay handle for screens.
    #[must_use]
    pub const fn loading(&self) -> &Loading {
        &self.loading
    }

    /// Context handed to a screen when it is created.
    #[must_use]
    pub fn screen_context(&self) -> ScreenContext {
        ScreenContext {
            loading: self.loading.clone(),
            notifier: Arc::clone(&self.notifier),
            toast: self.toast.clone(),
        }
    }

    /// A snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Watch the session for changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Show or hide the login prompt.
    pub fn show_login_prompt(&mut self, visible: bool) {
        self.login_prompt_visible = visible;
    }

    /// Route to `page`, gating pages that need a signed-in user.
    pub fn open_page(&mut self, page: Page) -> Navigation {
        let navigation = match page {
            Page::Home => self.set_root(Page::Home),
            Page::Login => {
                self.login_prompt_visible = true;
                Navigation::LoginPrompt
            }
            gated if gated.requires_login() && !self.session.borrow().is_logged_in() => {
                self.login_prompt_visible = true;
                Navigation::LoginPrompt
            }
            other => {
                self.stack.push(other);
                Navigation::Pushed(other)
            }
        };
        debug!(?page, ?navigation, "Navigated");
        add_breadcrumb("navigation", page.route());
        navigation
    }

    /// Pop the top page. The root page is never popped.
    pub fn go_back(&mut self) -> Option<Page> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Apply the result of a login attempt.
    ///
    /// Administrators land on order history.
    pub fn process_login(&mut self, info: &LoginInfo) {
        self.login_prompt_visible = !info.dismiss_popup;
        let session = Session::from(info);
        let is_admin = session.is_admin;
        if let Some(user_id) = session.user_id() {
            info!(%user_id, is_admin, "User signed in");
            set_sentry_user(&user_id, session.user_name.as_deref());
        } else {
            clear_sentry_user();
        }
        self.session.send_replace(session);

        if is_admin {
            self.set_root(Page::OrderHistory);
        }
    }

    /// Sign out, tell the user and go home.
    pub fn logout(&mut self) {
        self.process_login(&LoginInfo::logged_out());
        self.notifier.toast(&self.toast, LOGGED_OUT_MESSAGE);
        self.open_page(Page::Home);
    }

    fn set_root(&mut self, page: Page) -> Navigation {
        self.stack.clear();
        self.stack.push(page);
        Navigation::Root(page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cracker_cart_core::UserId;

    use super::*;
    use crate::notify::RecordingNotifier;

    fn shell() -> (AppShell, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let shell = AppShell::new(
            Loading::default(),
            notifier.clone(),
            ToastSettings::default(),
        );
        (shell, notifier)
    }

    fn login(user_id: i64, is_admin: bool) -> LoginInfo {
        LoginInfo {
            dismiss_popup: true,
            user_id: Some(UserId::new(user_id)),
            user_name: Some("Asha".to_string()),
            is_admin,
        }
    }

    #[test]
    fn test_starts_at_home() {
        let (shell, _) = shell();
        assert_eq!(shell.current_page(), Page::Home);
        assert!(!shell.login_prompt_visible());
        assert!(!shell.is_loading());
    }

    #[test]
    fn test_gated_pages_prompt_login_when_signed_out() {
        let (mut shell, _) = shell();
        for page in [Page::ShoppingCart, Page::OrderHistory, Page::Wishlist] {
            assert_eq!(shell.open_page(page), Navigation::LoginPrompt);
            assert_eq!(shell.current_page(), Page::Home);
        }
        assert!(shell.login_prompt_visible());
    }

    #[test]
    fn test_gated_pages_push_when_signed_in() {
        let (mut shell, _) = shell();
        shell.process_login(&login(7, false));
        assert_eq!(
            shell.open_page(Page::ShoppingCart),
            Navigation::Pushed(Page::ShoppingCart)
        );
        assert_eq!(shell.stack(), &[Page::Home, Page::ShoppingCart]);
    }

    #[test]
    fn test_home_resets_stack() {
        let (mut shell, _) = shell();
        shell.open_page(Page::Listing);
        shell.open_page(Page::Details);
        assert_eq!(shell.open_page(Page::Home), Navigation::Root(Page::Home));
        assert_eq!(shell.stack(), &[Page::Home]);
    }

    #[test]
    fn test_go_back_keeps_root() {
        let (mut shell, _) = shell();
        shell.open_page(Page::Listing);
        assert_eq!(shell.go_back(), Some(Page::Listing));
        assert_eq!(shell.go_back(), None);
        assert_eq!(shell.current_page(), Page::Home);
    }

    #[test]
    fn test_admin_login_routes_to_order_history() {
        let (mut shell, _) = shell();
        shell.open_page(Page::Listing);
        shell.process_login(&login(1, true));
        assert_eq!(shell.stack(), &[Page::OrderHistory]);
        assert!(shell.session().is_admin);
    }

    #[test]
    fn test_logout_clears_session_and_toasts() {
        let (mut shell, notifier) = shell();
        shell.process_login(&login(7, false));
        shell.open_page(Page::Wishlist);
        shell.logout();
        assert!(!shell.session().is_logged_in());
        assert_eq!(shell.stack(), &[Page::Home]);
        assert_eq!(notifier.messages(), vec![LOGGED_OUT_MESSAGE]);
    }

    #[tokio::test]
    async fn test_subscribers_see_session_changes() {
        let (mut shell, _) = shell();
        let mut rx = shell.subscribe();
        shell.process_login(&login(9, false));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().user_id(), Some(UserId::new(9)));
    }

    #[test]
    fn test_login_prompt_toggle() {
        let (mut shell, _) = shell();
        assert_eq!(shell.open_page(Page::Login), Navigation::LoginPrompt);
        assert!(shell.login_prompt_visible());
        shell.show_login_prompt(false);
        assert!(!shell.login_prompt_visible());
    }
}

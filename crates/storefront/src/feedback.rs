//! Transient UI feedback: markers and toasts.
//!
//! Feedback never touches the cart. Each value here renders to a fragment that
//! carries its own lifetime; the htmx `remove-me` extension deletes the element
//! when it elapses, so the timer is owned by the element and dies with it if
//! the element is swapped out first.

use std::time::Duration;

use uuid::Uuid;

/// "+1" / "-1" markers next to the control that was used.
pub const MARKER_LIFETIME: Duration = Duration::from_millis(500);

/// "Added to cart" toast.
pub const ADDED_TOAST_LIFETIME: Duration = Duration::from_secs(4);

/// "Removed from cart" banner with its undo button.
pub const REMOVAL_BANNER_LIFETIME: Duration = Duration::from_secs(3);

/// Restored and informational toasts.
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(3);

/// Message shown when checkout is attempted with nothing in the cart.
pub const EMPTY_CHECKOUT_MESSAGE: &str = "Your cart is empty. Add some items before checkout.";

/// Message shown when Undo is clicked after its window closed.
pub const UNDO_EXPIRED_MESSAGE: &str = "Undo window has expired";

/// Message shown when Undo names no pending removal.
pub const NOTHING_TO_UNDO_MESSAGE: &str = "Nothing to undo";

/// Which way a quantity button moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    /// Parse the value posted by a quantity button.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "increase" | "plus" | "+" => Some(Self::Increase),
            "decrease" | "minus" | "-" => Some(Self::Decrease),
            _ => None,
        }
    }

    /// Quantity change for this direction.
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Increase => 1,
            Self::Decrease => -1,
        }
    }
}

/// Small floating marker beside a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub direction: Direction,
}

impl Marker {
    /// Marker for an "add to cart" click.
    #[must_use]
    pub const fn added() -> Self {
        Self {
            direction: Direction::Increase,
        }
    }

    #[must_use]
    pub const fn text(&self) -> &'static str {
        match self.direction {
            Direction::Increase => "+1",
            Direction::Decrease => "-1",
        }
    }

    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.direction {
            Direction::Increase => "quantity-feedback quantity-feedback--increase",
            Direction::Decrease => "quantity-feedback quantity-feedback--decrease",
        }
    }

    #[must_use]
    pub fn lifetime_ms(&self) -> u128 {
        MARKER_LIFETIME.as_millis()
    }
}

/// Kinds of toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Added,
    Removed,
    Restored,
    Notice,
}

/// A dismissible notification in the corner of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// DOM id, unique per toast.
    pub id: String,
    pub kind: ToastKind,
    pub message: String,
    /// Present on removal banners; posting it back undoes the removal.
    pub undo_token: Option<Uuid>,
    /// Optional call-to-action link `(href, label)`.
    pub link: Option<(String, String)>,
    pub lifetime: Duration,
}

impl Toast {
    fn new(kind: ToastKind, message: String, lifetime: Duration) -> Self {
        Self {
            id: format!("toast-{}", Uuid::new_v4().simple()),
            kind,
            message,
            undo_token: None,
            link: None,
            lifetime,
        }
    }

    /// "<name> added to cart!" with a link to the cart.
    #[must_use]
    pub fn added(product_name: &str) -> Self {
        let mut toast = Self::new(
            ToastKind::Added,
            format!("{product_name} added to cart!"),
            ADDED_TOAST_LIFETIME,
        );
        toast.link = Some(("/cart".to_owned(), "View Cart".to_owned()));
        toast
    }

    /// "<name> removed from cart" with an undo button.
    #[must_use]
    pub fn removed(product_name: &str, undo_token: Uuid) -> Self {
        let mut toast = Self::new(
            ToastKind::Removed,
            format!("{product_name} removed from cart"),
            REMOVAL_BANNER_LIFETIME,
        );
        toast.undo_token = Some(undo_token);
        toast
    }

    /// "<name> restored to cart".
    #[must_use]
    pub fn restored(product_name: &str) -> Self {
        Self::new(
            ToastKind::Restored,
            format!("{product_name} restored to cart"),
            NOTICE_LIFETIME,
        )
    }

    /// Plain informational message.
    #[must_use]
    pub fn notice(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Notice, message.into(), NOTICE_LIFETIME)
    }

    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            ToastKind::Added => "toast toast--added",
            ToastKind::Removed => "toast toast--removed",
            ToastKind::Restored => "toast toast--restored",
            ToastKind::Notice => "toast toast--notice",
        }
    }

    #[must_use]
    pub fn lifetime_ms(&self) -> u128 {
        self.lifetime.as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetimes() {
        assert_eq!(Marker::added().lifetime_ms(), 500);
        assert_eq!(Toast::removed("Tent", Uuid::new_v4()).lifetime_ms(), 3_000);
        assert_eq!(Toast::added("Tent").lifetime_ms(), 4_000);
    }

    #[test]
    fn test_removed_banner_carries_undo() {
        let token = Uuid::new_v4();
        let toast = Toast::removed("Ajax Tent", token);
        assert_eq!(toast.message, "Ajax Tent removed from cart");
        assert_eq!(toast.undo_token, Some(token));
        assert!(toast.link.is_none());
    }

    #[test]
    fn test_added_toast_links_to_cart() {
        let toast = Toast::added("Ajax Tent");
        assert_eq!(toast.message, "Ajax Tent added to cart!");
        assert_eq!(
            toast.link,
            Some(("/cart".to_string(), "View Cart".to_string()))
        );
    }

    #[test]
    fn test_toast_ids_are_unique() {
        assert_ne!(Toast::notice("a").id, Toast::notice("a").id);
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::parse("increase"), Some(Direction::Increase));
        assert_eq!(Direction::parse("minus"), Some(Direction::Decrease));
        assert_eq!(Direction::parse("sideways"), None);
        assert_eq!(Direction::Decrease.delta(), -1);
        assert_eq!(Marker { direction: Direction::Decrease }.text(), "-1");
    }
}

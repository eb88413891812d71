//! Post-trial offer flag.

/// Whether the post-trial offer screen should be shown.
///
/// Single-writer discipline: the trial driver raises the flag when the
/// trial ends; explicit user actions (dismissing the offer, acknowledging
/// the thanks screen, starting a new call) clear it. Both mutations are
/// idempotent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferFlag {
    visible: bool,
}

impl OfferFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the offer screen on the next render.
    pub fn raise(&mut self) {
        self.visible = true;
    }

    /// Hides the offer screen. Safe to call when already hidden.
    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_hidden() {
        assert!(!OfferFlag::new().is_visible());
    }

    #[test]
    fn test_raise_then_dismiss() {
        let mut flag = OfferFlag::new();
        flag.raise();
        assert!(flag.is_visible());
        flag.dismiss();
        assert!(!flag.is_visible());
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut flag = OfferFlag::new();
        flag.dismiss();
        assert!(!flag.is_visible());
        flag.dismiss();
        assert!(!flag.is_visible());
    }
}

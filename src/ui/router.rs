//! Screen tree selection.
//!
//! Exactly one of two disjoint trees is on screen at a time, chosen purely
//! from the gate's phase. `render` calls this every frame, so a phase
//! transition switches trees on the very next draw with nothing cached
//! across the switch.

use crate::auth::AuthPhase;

/// Which screen tree to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenTree {
    /// Boot check pending: draw nothing rather than guessing.
    Blank,
    /// The entry screen only.
    Login,
    /// Dashboard and all nested feature screens.
    Main,
}

pub fn select_tree(phase: AuthPhase) -> ScreenTree {
    match phase {
        AuthPhase::Booting => ScreenTree::Blank,
        AuthPhase::Unauthenticated => ScreenTree::Login,
        AuthPhase::Authenticated => ScreenTree::Main,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_follows_phase() {
        assert_eq!(select_tree(AuthPhase::Booting), ScreenTree::Blank);
        assert_eq!(select_tree(AuthPhase::Unauthenticated), ScreenTree::Login);
        assert_eq!(select_tree(AuthPhase::Authenticated), ScreenTree::Main);
    }
}

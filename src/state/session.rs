//! Per-connection lifecycle state.
//!
//! ```text
//! Unidentified --addUser--> Identified --disconnect--> Closed
//!      |                                                 ^
//!      +------------------disconnect---------------------+
//! ```
//!
//! There is no way back from `Closed`; a reconnecting client gets a fresh
//! connection and a fresh state machine.

/// Lifecycle state of one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Open, no identity announced yet.
    #[default]
    Unidentified,
    /// An identity has been announced on this connection.
    ///
    /// `registered` is false when the user was already online elsewhere:
    /// the registry kept the first connection and this one only claims the
    /// name.
    Identified { user_id: String, registered: bool },
    /// Terminal.
    Closed,
}

impl SessionState {
    /// The identity announced on this connection, if any.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Identified { user_id, .. } => Some(user_id),
            _ => None,
        }
    }

    /// The identity the registry holds for this connection, if any.
    pub fn registered_user_id(&self) -> Option<&str> {
        match self {
            Self::Identified {
                user_id,
                registered: true,
            } => Some(user_id),
            _ => None,
        }
    }

    /// Move from `Unidentified` to `Identified`.
    ///
    /// Returns `false` (and leaves the state untouched) from any other state.
    pub fn identify(&mut self, user_id: impl Into<String>, registered: bool) -> bool {
        if matches!(self, Self::Unidentified) {
            *self = Self::Identified {
                user_id: user_id.into(),
                registered,
            };
            true
        } else {
            false
        }
    }

    /// Enter the terminal state, returning the previous one.
    pub fn close(&mut self) -> SessionState {
        std::mem::replace(self, Self::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_once() {
        let mut state = SessionState::default();
        assert_eq!(state.user_id(), None);
        assert!(state.identify("a", true));
        assert_eq!(state.user_id(), Some("a"));
        assert!(!state.identify("b", true));
        assert_eq!(state.user_id(), Some("a"));
        assert_eq!(state.registered_user_id(), Some("a"));
    }

    #[test]
    fn test_unregistered_claim_is_not_registered_identity() {
        let mut state = SessionState::default();
        assert!(state.identify("a", false));
        assert_eq!(state.user_id(), Some("a"));
        assert_eq!(state.registered_user_id(), None);
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut state = SessionState::default();
        state.identify("a", true);
        let previous = state.close();
        assert_eq!(previous.user_id(), Some("a"));
        assert_eq!(state, SessionState::Closed);
        assert!(!state.identify("a", true));
        assert_eq!(state.user_id(), None);
    }
}

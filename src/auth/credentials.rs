//! Remembered login password in the OS keychain.
//!
//! Only the login form uses this, to prefill the password for the last
//! username. It is separate from the session store: the keychain never
//! holds the bearer token or the profile.

use keyring::Entry;
use tracing::{debug, warn};

const SERVICE_NAME: &str = "fleetwatch";

pub struct SavedLogin;

impl SavedLogin {
    /// Remember the password for a username. Best effort: a keychain that
    /// is locked or absent only costs the prefill convenience.
    pub fn remember(username: &str, password: &str) {
        let result =
            Entry::new(SERVICE_NAME, username).and_then(|entry| entry.set_password(password));
        if let Err(e) = result {
            warn!(error = %e, "Could not store password in keychain");
        }
    }

    /// The remembered password for a username, if the keychain has one.
    pub fn password_for(username: &str) -> Option<String> {
        match Entry::new(SERVICE_NAME, username).and_then(|entry| entry.get_password()) {
            Ok(password) => Some(password),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                debug!(error = %e, "Keychain lookup failed");
                None
            }
        }
    }

    /// Forget the remembered password for a username.
    pub fn forget(username: &str) {
        let result =
            Entry::new(SERVICE_NAME, username).and_then(|entry| entry.delete_credential());
        match result {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => warn!(error = %e, "Could not delete credential from keychain"),
        }
    }
}

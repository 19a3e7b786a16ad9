//! Durable persistence for the signed-in session.
//!
//! The store holds exactly two entries under fixed names in its directory:
//! the bearer token and the JSON-serialized user profile. The two are
//! written together on login and cleared together on logout; everything
//! else in the app reads them through the typed helpers here and treats a
//! missing entry as "not signed in", never as an error.

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::models::User;

/// Entry name for the bearer token
const TOKEN_ENTRY: &str = "token";

/// Entry name for the serialized user profile
const PROFILE_ENTRY: &str = "profile.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("session store i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store holds malformed data: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// One entry was cleared and the other was not. The caller must treat
    /// the session as indeterminate and force a signed-out state.
    #[error("session store only partially cleared: {0}")]
    PartialClear(std::io::Error),
}

pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write a string entry, creating the store directory on first use.
    pub fn put(&self, name: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.entry_path(name), value)?;
        Ok(())
    }

    /// Read a string entry. An entry that was never written or has been
    /// cleared reads as `None`, not as an error.
    pub fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.entry_path(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_entry(&self, name: &str) -> Result<(), std::io::Error> {
        match std::fs::remove_file(self.entry_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Clear both entries as one logical operation. Already-absent entries
    /// are fine (calling this when signed out succeeds silently); a failure
    /// on one entry is still followed by an attempt on the other, and is
    /// reported as a partial clear.
    pub fn remove_all(&self) -> Result<(), StorageError> {
        let token_result = self.remove_entry(TOKEN_ENTRY);
        let profile_result = self.remove_entry(PROFILE_ENTRY);

        match (token_result, profile_result) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), _) | (_, Err(e)) => Err(StorageError::PartialClear(e)),
        }
    }

    /// Persist a freshly established session: token and profile together.
    pub fn save_session(&self, token: &str, user: &User) -> Result<(), StorageError> {
        self.put(TOKEN_ENTRY, token)?;
        self.put(PROFILE_ENTRY, &serde_json::to_string(user)?)?;
        Ok(())
    }

    /// The stored bearer token, if present.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.get(TOKEN_ENTRY)
    }

    /// The stored user profile, if present and readable.
    pub fn user(&self) -> Result<Option<User>, StorageError> {
        match self.get(PROFILE_ENTRY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Best-effort profile read for display purposes. A corrupt profile is
    /// logged and reads as absent; authentication checks go through
    /// [`SessionStore::user`] and treat the error as signed-out instead.
    pub fn user_lossy(&self) -> Option<User> {
        match self.user() {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Unreadable stored profile");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use tempfile::tempdir;

    fn sample_user() -> User {
        User {
            id: Some(1),
            full_name: Some("Alice Prado".to_string()),
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            phone: None,
            role: Role::Admin,
        }
    }

    #[test]
    fn test_get_absent_entry_is_none() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        assert!(store.get("token").unwrap().is_none());
        assert!(store.token().unwrap().is_none());
        assert!(store.user().unwrap().is_none());
    }

    #[test]
    fn test_put_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        store.put("token", "tok123").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("tok123"));
    }

    #[test]
    fn test_save_session_persists_both_entries() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        let user = sample_user();
        store.save_session("tok123", &user).unwrap();

        assert_eq!(store.token().unwrap().as_deref(), Some("tok123"));
        assert_eq!(store.user().unwrap(), Some(user));
    }

    #[test]
    fn test_remove_all_clears_both_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        store.save_session("tok123", &sample_user()).unwrap();

        store.remove_all().unwrap();
        assert!(store.token().unwrap().is_none());
        assert!(store.user().unwrap().is_none());

        // Clearing an already-empty store succeeds silently
        store.remove_all().unwrap();
        assert!(store.token().unwrap().is_none());
    }

    #[test]
    fn test_partial_state_reads_as_token_only() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        // Simulate corruption: token written, profile missing
        store.put("token", "tok123").unwrap();

        assert!(store.token().unwrap().is_some());
        assert!(store.user().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_profile_is_an_error_but_lossy_read_is_none() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        store.put("profile.json", "not json").unwrap();

        assert!(store.user().is_err());
        assert!(store.user_lossy().is_none());
    }
}

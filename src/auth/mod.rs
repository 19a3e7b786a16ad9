//! Authentication: session persistence, session operations, and the
//! process-wide signed-in/signed-out gate.
//!
//! - `SessionStore`: the two durable entries (token + profile)
//! - `SessionClient`: login/logout/validate and the user-management calls
//! - `SessionGate`: the Booting/Unauthenticated/Authenticated state machine
//! - `SavedLogin`: keychain-remembered password for the login form

pub mod credentials;
pub mod gate;
pub mod session;
pub mod store;

pub use credentials::SavedLogin;
pub use gate::{AuthPhase, SessionGate};
pub use session::SessionClient;
pub use store::SessionStore;

//! Session token storage.
//!
//! This module provides:
//! - `TokenStore`: the single-slot contract the request builder reads from
//! - `KeyringTokenStore`: OS keychain storage via keyring
//! - `FileTokenStore`: a session file for hosts without a usable keychain
//! - `MemoryTokenStore`: an in-process slot for tests
//!
//! Tokens carry no expiry; a 401 from the API is the only invalidation signal.

pub mod credentials;
pub mod session;

pub use credentials::{KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use session::{FileTokenStore, SessionData};

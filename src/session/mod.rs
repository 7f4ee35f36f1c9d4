//! Client-side authentication and session lifecycle.
//!
//! # Features
//!
//! * **Restore**: a persisted token is validated once at boot.
//! * **Sign-in flows**: login, register with auto-login, logout, profile refresh.
//! * **Interception**: every authenticated request goes through
//!   [`SessionStore::send`], which ends the session on HTTP 401.
//! * **Persistence**: the token is the only persisted state, kept in a
//!   checksummed file.
//!
//! # Architecture
//!
//! * [`data`]: [`Session`], [`SessionPhase`], [`UserProfile`], [`Role`].
//! * [`io`]: [`TokenStore`] and its file and in-memory implementations.
//! * [`store`]: [`SessionStore`].

pub mod data;
pub mod io;
pub mod store;

pub use data::{Role, Session, SessionPhase, UserProfile};
pub use io::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError, TOKEN_KEY};
pub use store::{AuthFailure, SessionStore, LOGIN_FALLBACK, REGISTER_FALLBACK};

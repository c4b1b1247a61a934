//! Authentication
//!
//! Signed, expiring session tokens ([`token`]) and the request-level gate
//! that enforces them ([`session`]). There is no server-side session store;
//! see the token module docs for the revocation trade-off.

pub mod session;
pub mod token;

pub use session::{clear_session_cookie, session_cookie, AuthRejection, AuthSession};
pub use token::{TokenClaims, TokenCodec, TokenError};

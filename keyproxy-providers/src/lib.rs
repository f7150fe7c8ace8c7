//! Private-key delegation for RSA handshake operations.
//!
//! A [`KeyHandle`][key_handle::KeyHandle] stands in for an RSA private key whose
//! material lives behind an external trust boundary. Handshake code calls
//! `sign`/`decrypt` on the handle exactly as it would on an in-memory key, and the
//! handle forwards to the backend chosen when it was built:
//!
//! * [`CallbackBackend`][key_handle::imp::callback::CallbackBackend] for keys reached
//!   through custom platform integration code (keystores, enclaves, vendor drivers);
//! * [`TokenSessionBackend`][key_handle::imp::token_session::TokenSessionBackend] for
//!   keys on a token reached through a [`TokenSession`][token::TokenSession].

pub mod buffer;
pub mod key_handle;
pub mod token;

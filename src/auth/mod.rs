//! Authentication module
//!
//! This module turns an anonymous [`Session`](crate::session::Session) into an
//! authenticated one by replaying the site's sign-in flow:
//! - token extraction from the sign-in page markup
//! - the path-driven handshake that visits pages and posts the login form

mod handshake;
mod tokens;

pub use handshake::{
    run_handshake, AuthenticatedSession, Handshake, HandshakeState, LoginOutcome,
};
pub use tokens::{LoginTokens, Token, TokenExtractor};

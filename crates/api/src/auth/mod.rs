//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation, validation, and refresh-token helpers.
//! - [`identity`] -- Google and Apple identity-token verification against JWKS.

pub mod identity;
pub mod jwt;

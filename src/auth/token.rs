//! Issued token values and their redacted secrets.

pub mod record;
pub mod secret;

//! Scope sets and the normalized token model.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::{record::*, secret::*};

//! Provider families, configured providers, and the registry that builds them.
//!
//! `descriptor` holds endpoint templates and grant flags, `options` the per-call request
//! vocabulary, `operations` the public/private views over a configured [`Provider`], and
//! `registry` the name-to-factory mapping (with the built-in families in `builtin`).

pub mod builtin;
pub mod descriptor;
pub mod operations;
pub mod options;
pub mod registry;

pub use builtin::{CustomFactory, TemplateFactory};
pub use descriptor::*;
pub use operations::*;
pub use options::*;
pub use registry::*;

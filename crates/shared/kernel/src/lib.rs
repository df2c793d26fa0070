//! Kernel of the provider-composition model.
//!
//! * [`compose`] turns a partial configuration plus feature bundles into an ordered
//!   registration list. It is pure: nothing is instantiated.
//! * [`scope`] is a small host locator layering those lists in a scope tree.
//! * [`config`] loads partial configurations from files with environment overrides.
//!
//! ## Example
//! ```rust
//! use provis_kernel::prelude::*;
//!
//! let registrations = vec![Registration::value(Capability::new("greeting"), String::from("hi"))];
//! let tree = ScopeTree::new(registrations);
//! let greeting = tree.get::<String>(ScopeId::ROOT, &Capability::new("greeting")).unwrap();
//! assert_eq!(greeting.as_str(), "hi");
//! ```

pub mod compose;
#[cfg(feature = "config")]
pub mod config;
mod error;
pub mod feature;
pub mod prelude;
pub mod registration;
pub mod scope;

pub use crate::error::{ComposeError, ComposeErrorExt, ResolveError, ResolveErrorExt};
pub use provis_domain as domain;

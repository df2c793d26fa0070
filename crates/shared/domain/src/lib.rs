//! # Domain Models
//!
//! Pure types shared by the composer and the scope tree, with minimal dependencies
//! (`serde`, `bitflags`). No I/O and no resolution logic lives here.

pub mod capability;
pub mod features;
pub mod lookup;
pub mod provided;

pub use capability::{Capability, ScopeId};
pub use features::FeatureKind;
pub use lookup::Lookup;
pub use provided::{Instance, Provided};

pub use crate::compose::{Composable, compose, parse_kind};
pub use crate::error::{ComposeError, ComposeErrorExt, ResolveError, ResolveErrorExt};
pub use crate::feature::Feature;
pub use crate::registration::{ClassProducer, Factory, Producer, Registration};
pub use crate::scope::{Injectable, Resolver, ScopeTree};
pub use provis_domain::{Capability, FeatureKind, Instance, Lookup, Provided, ScopeId};

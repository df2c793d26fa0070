use provis_domain::{Capability, ScopeId};
use std::borrow::Cow;

/// Errors raised by the scope tree while producing instances.
#[provis_derive::provis_error]
pub enum ResolveError {
    #[error("No provider for '{capability}' visible from {scope}{}", format_context(.context))]
    NotFound { capability: Capability, scope: ScopeId, context: Option<Cow<'static, str>> },

    #[error("Provider for '{capability}' does not produce {expected}{}", format_context(.context))]
    TypeMismatch {
        capability: Capability,
        expected: &'static str,
        context: Option<Cow<'static, str>>,
    },

    /// Single and multi registrations were mixed, or accessed the wrong way.
    #[error("Provider kind mismatch for '{capability}' in {scope}{}: {message}", format_context(.context))]
    MultiMismatch {
        capability: Capability,
        scope: ScopeId,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    #[error("Cyclic dependency{}: {path}", format_context(.context))]
    Cycle { path: String, context: Option<Cow<'static, str>> },

    #[error("Unknown scope {scope}{}", format_context(.context))]
    UnknownScope { scope: ScopeId, context: Option<Cow<'static, str>> },

    /// A producer failed to build its value.
    #[error("Construction failed{}: {source}", format_context(.context))]
    Construction {
        source: Box<dyn std::error::Error + Send + Sync>,
        context: Option<Cow<'static, str>>,
    },
}

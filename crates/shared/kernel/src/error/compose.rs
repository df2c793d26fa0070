use std::borrow::Cow;

/// Errors raised while composing a registration list.
///
/// Every variant is fatal to the scope being initialized; no partial list is produced.
#[provis_derive::provis_error]
pub enum ComposeError {
    /// An exclusive feature kind appears more than once.
    #[error("Configuration conflict{}: feature '{kind}' provided {count} times", format_context(.context))]
    ConfigurationConflict {
        kind: Cow<'static, str>,
        count: usize,
        context: Option<Cow<'static, str>>,
    },

    /// A textual feature kind matches none of the supported kinds.
    #[error("Unknown feature kind{}: '{name}'", format_context(.context))]
    UnknownFeatureKind { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A feature was requested by name without the parameters its constructor needs.
    #[error("Invalid feature '{kind}'{}: {message}", format_context(.context))]
    InvalidFeature {
        kind: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },
}

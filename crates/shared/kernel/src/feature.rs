use crate::registration::Registration;
use provis_domain::FeatureKind;

/// An optional, named bundle of registrations enabling extended behavior.
///
/// Features are produced by small constructor functions, one per kind, and handed to
/// [`compose`](crate::compose::compose) together with the base configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature<K: FeatureKind> {
    kind: K,
    registrations: Vec<Registration>,
}

impl<K: FeatureKind> Feature<K> {
    #[must_use]
    pub const fn new(kind: K, registrations: Vec<Registration>) -> Self {
        Self { kind, registrations }
    }

    /// Appends one more registration to the bundle.
    #[must_use]
    pub fn with(mut self, registration: Registration) -> Self {
        self.registrations.push(registration);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> K {
        self.kind
    }

    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    #[must_use]
    pub fn into_registrations(self) -> Vec<Registration> {
        self.registrations
    }
}

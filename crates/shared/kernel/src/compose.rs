//! The configuration composer.
//!
//! `compose` is a pure function of its inputs: calling it twice with equal inputs yields equal
//! lists, and nothing is instantiated until a host locator resolves the registrations.

use crate::error::ComposeError;
use crate::feature::Feature;
use crate::registration::Registration;
use provis_domain::{Capability, FeatureKind};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::debug;

/// A configuration record that knows how to describe itself as registrations.
pub trait Composable: Any + Debug + Clone + Default + PartialEq + Send + Sync {
    /// Caller-supplied configuration where every field is optional.
    type Partial: Default;

    /// The closed set of feature kinds accepted next to this configuration.
    type Kind: FeatureKind;

    /// Capability under which the merged configuration is registered.
    const CAPABILITY: Capability;

    /// Shallow-merges `partial` over `self`; explicit fields of `partial` win.
    #[must_use]
    fn merge(self, partial: Self::Partial) -> Self;

    /// Registrations for configuration fields that select pluggable strategies.
    fn strategies(&self) -> Vec<Registration>;

    /// One registration per sink listed in the configuration.
    fn sinks(&self) -> Vec<Registration>;
}

/// Builds the registration list for one scope.
///
/// Output order: the merged configuration, its strategy registrations, one multi registration
/// per configured sink, then the registrations of every feature in caller order.
///
/// # Errors
/// Returns [`ComposeError::ConfigurationConflict`] when an exclusive feature kind appears more
/// than once. Detection does not depend on feature order: with several offending kinds, the first
/// one in declaration order is reported.
///
/// # Example
/// ```rust
/// # use provis_kernel::prelude::*;
/// # use std::{fmt, str::FromStr};
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Retry { attempts: u8 }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// enum RetryFeature { Jitter }
///
/// impl fmt::Display for RetryFeature {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("jitter") }
/// }
/// impl FromStr for RetryFeature {
///     type Err = ();
///     fn from_str(s: &str) -> Result<Self, ()> { (s == "jitter").then_some(Self::Jitter).ok_or(()) }
/// }
/// impl FeatureKind for RetryFeature {
///     fn is_exclusive(self) -> bool { true }
/// }
///
/// impl Composable for Retry {
///     type Partial = Option<u8>;
///     type Kind = RetryFeature;
///     const CAPABILITY: Capability = Capability::new("retry.config");
///     fn merge(self, partial: Option<u8>) -> Self { Self { attempts: partial.unwrap_or(self.attempts) } }
///     fn strategies(&self) -> Vec<Registration> { Vec::new() }
///     fn sinks(&self) -> Vec<Registration> { Vec::new() }
/// }
///
/// let registrations = compose::<Retry>(Some(3), []).unwrap();
/// assert_eq!(registrations, vec![Registration::value(Retry::CAPABILITY, Retry { attempts: 3 })]);
/// ```
pub fn compose<C: Composable>(
    base: C::Partial,
    features: impl IntoIterator<Item = Feature<C::Kind>>,
) -> Result<Vec<Registration>, ComposeError> {
    let features: Vec<Feature<C::Kind>> = features.into_iter().collect();
    ensure_exclusive(&features)?;

    let config = C::default().merge(base);
    let strategies = config.strategies();
    let sinks = config.sinks();

    let mut registrations = Vec::with_capacity(
        1 + strategies.len()
            + sinks.len()
            + features.iter().map(|f| f.registrations().len()).sum::<usize>(),
    );
    registrations.push(Registration::value(C::CAPABILITY, config));
    registrations.extend(strategies);
    registrations.extend(sinks.into_iter().map(Registration::multi));
    registrations.extend(features.into_iter().flat_map(Feature::into_registrations));

    debug!(
        capability = %C::CAPABILITY,
        registrations = registrations.len(),
        "Composed provider registrations"
    );

    Ok(registrations)
}

/// Parses a feature kind from its configuration name.
///
/// # Errors
/// Returns [`ComposeError::UnknownFeatureKind`] when `name` matches no supported kind.
pub fn parse_kind<K: FeatureKind>(name: &str) -> Result<K, ComposeError> {
    name.trim().parse::<K>().map_err(|_| ComposeError::UnknownFeatureKind {
        name: name.to_owned().into(),
        context: None,
    })
}

fn ensure_exclusive<K: FeatureKind>(features: &[Feature<K>]) -> Result<(), ComposeError> {
    let mut counts = BTreeMap::<K, usize>::new();
    for kind in features.iter().map(Feature::kind).filter(|kind| kind.is_exclusive()) {
        *counts.entry(kind).or_default() += 1;
    }

    match counts.into_iter().find(|&(_, count)| count > 1) {
        Some((kind, count)) => Err(ComposeError::ConfigurationConflict {
            kind: kind.to_string().into(),
            count,
            context: None,
        }),
        None => Ok(()),
    }
}

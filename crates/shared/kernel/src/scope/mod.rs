//! A minimal host locator layering composed registration lists in a tree of scopes.
//!
//! Scopes live in an arena indexed by [`ScopeId`]; every scope except the root points at its
//! parent. Lookups walk upward only, so nested scopes shadow outer ones and a parent never
//! observes its children.

mod resolver;

pub use resolver::{Injectable, Resolver};

use crate::error::ResolveError;
use crate::registration::Registration;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use provis_domain::{Capability, Instance, Lookup, ScopeId};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct ScopeNode {
    parent: Option<ScopeId>,
    registrations: FxHashMap<Capability, Vec<Registration>>,
    instances: Mutex<FxHashMap<Capability, Instance>>,
    collections: Mutex<FxHashMap<Capability, Vec<Instance>>>,
    services: Mutex<FxHashMap<TypeId, Instance>>,
}

impl ScopeNode {
    fn new(parent: Option<ScopeId>, registrations: impl IntoIterator<Item = Registration>) -> Self {
        let mut by_capability = FxHashMap::<Capability, Vec<Registration>>::default();
        for registration in registrations {
            by_capability.entry(registration.capability().clone()).or_default().push(registration);
        }
        Self { parent, registrations: by_capability, ..Self::default() }
    }

    fn provides(&self, capability: &Capability) -> bool {
        self.registrations.contains_key(capability)
    }
}

/// Arena of scopes, each holding one composed registration list.
///
/// The tree is `Send + Sync`: produced instances are cached per scope behind mutexes that are
/// never held while a producer runs. Two threads racing on the same capability may both build
/// it; the first cached instance wins.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<ScopeNode>,
}

impl ScopeTree {
    /// Creates a tree whose root scope holds `registrations`.
    pub fn new(registrations: impl IntoIterator<Item = Registration>) -> Self {
        Self { scopes: vec![ScopeNode::new(None, registrations)] }
    }

    /// Activates a nested scope below `parent`.
    ///
    /// # Errors
    /// Returns [`ResolveError::UnknownScope`] if `parent` does not belong to this tree.
    pub fn add_scope(
        &mut self,
        parent: ScopeId,
        registrations: impl IntoIterator<Item = Registration>,
    ) -> Result<ScopeId, ResolveError> {
        self.node(parent)?;
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(ScopeNode::new(Some(parent), registrations));
        debug!(%id, %parent, "Scope activated");
        Ok(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Parent of `scope`, `None` for the root or an unknown id.
    #[must_use]
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope.index()).and_then(|node| node.parent)
    }

    /// `scope` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        let start = (scope.index() < self.scopes.len()).then_some(scope);
        std::iter::successors(start, |&id| self.parent(id))
    }

    /// Whether `scope` itself registers `capability`.
    #[must_use]
    pub fn provides(&self, scope: ScopeId, capability: &Capability) -> bool {
        self.scopes.get(scope.index()).is_some_and(|node| node.provides(capability))
    }

    /// Resolves a single capability as seen from `scope`.
    ///
    /// # Errors
    /// See [`Resolver::resolve`].
    pub fn resolve<T: Any + Send + Sync>(
        &self,
        scope: ScopeId,
        capability: &Capability,
        lookup: Lookup,
    ) -> Result<Option<Arc<T>>, ResolveError> {
        self.with_resolver(scope, |r| r.resolve(capability, lookup))
    }

    /// Resolves a required capability as seen from `scope`.
    ///
    /// # Errors
    /// See [`Resolver::get`].
    pub fn get<T: Any + Send + Sync>(
        &self,
        scope: ScopeId,
        capability: &Capability,
    ) -> Result<Arc<T>, ResolveError> {
        self.with_resolver(scope, |r| r.get(capability))
    }

    /// Resolves every multi registration of `capability` in the nearest scope declaring it.
    ///
    /// # Errors
    /// See [`Resolver::resolve_all`].
    pub fn resolve_all<T: Any + Send + Sync>(
        &self,
        scope: ScopeId,
        capability: &Capability,
        lookup: Lookup,
    ) -> Result<Vec<Arc<T>>, ResolveError> {
        self.with_resolver(scope, |r| r.resolve_all(capability, lookup))
    }

    /// Instantiates (or reuses) a service anchored on a capability.
    ///
    /// # Errors
    /// See [`Resolver::inject`].
    pub fn inject<T: Injectable>(
        &self,
        scope: ScopeId,
        lookup: Lookup,
    ) -> Result<Option<Arc<T>>, ResolveError> {
        self.with_resolver(scope, |r| r.inject::<T>(lookup))
    }

    fn with_resolver<R>(
        &self,
        scope: ScopeId,
        f: impl FnOnce(&Resolver<'_>) -> Result<R, ResolveError>,
    ) -> Result<R, ResolveError> {
        self.node(scope)?;
        let path = RefCell::new(Vec::new());
        f(&Resolver::new(self, scope, &path))
    }

    fn node(&self, scope: ScopeId) -> Result<&ScopeNode, ResolveError> {
        self.scopes.get(scope.index()).ok_or(ResolveError::UnknownScope { scope, context: None })
    }
}

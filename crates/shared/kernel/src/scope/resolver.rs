use super::{ScopeNode, ScopeTree};
use crate::error::ResolveError;
use crate::registration::{Producer, Registration};
use provis_domain::{Capability, Instance, Lookup, ScopeId};
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::trace;

/// A service instantiated by the scope tree itself rather than through a registration.
///
/// The instance lives in the nearest scope registering [`Injectable::ANCHOR`], so every scope
/// that composes its own configuration gets its own service while scopes without one share
/// their ancestor's.
pub trait Injectable: Any + Send + Sync + Sized {
    const ANCHOR: Capability;

    /// Builds the service from the hosting scope.
    ///
    /// # Errors
    /// Returns a [`ResolveError`] when a dependency cannot be resolved.
    fn inject(resolver: &Resolver<'_>) -> Result<Self, ResolveError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Frame {
    scope: ScopeId,
    key: Cow<'static, str>,
}

/// Resolution context bound to one scope.
///
/// Producers receive the resolver of the scope that hosts their registration, so their
/// dependencies resolve from that scope upward and never from a descendant.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    tree: &'a ScopeTree,
    scope: ScopeId,
    path: &'a RefCell<Vec<Frame>>,
}

impl<'a> Resolver<'a> {
    pub(super) const fn new(
        tree: &'a ScopeTree,
        scope: ScopeId,
        path: &'a RefCell<Vec<Frame>>,
    ) -> Self {
        Self { tree, scope, path }
    }

    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    #[must_use]
    pub const fn tree(&self) -> &'a ScopeTree {
        self.tree
    }

    /// Resolves a single capability.
    ///
    /// The nearest scope registering `capability` (per `lookup`) hosts the instance; the last
    /// registration of that scope wins.
    ///
    /// # Errors
    /// * [`ResolveError::NotFound`] when nothing is visible and `lookup` is not optional.
    /// * [`ResolveError::MultiMismatch`] when the hosting scope holds multi registrations.
    /// * [`ResolveError::TypeMismatch`] when the instance is not a `T`.
    /// * [`ResolveError::Cycle`] when resolution re-enters itself.
    pub fn resolve<T: Any + Send + Sync>(
        &self,
        capability: &Capability,
        lookup: Lookup,
    ) -> Result<Option<Arc<T>>, ResolveError> {
        self.resolve_instance(capability, lookup)?
            .map(|instance| downcast::<T>(capability, instance))
            .transpose()
    }

    /// Resolves a capability that must be visible.
    ///
    /// # Errors
    /// See [`Resolver::resolve`].
    pub fn get<T: Any + Send + Sync>(&self, capability: &Capability) -> Result<Arc<T>, ResolveError> {
        self.resolve::<T>(capability, Lookup::empty())?.ok_or_else(|| self.not_found(capability))
    }

    /// Resolves every multi registration of the nearest scope declaring `capability`.
    ///
    /// Outer scopes are not merged in: a nested scope listing its own entries replaces the
    /// collection. An invisible capability yields an empty list when `lookup` is optional.
    ///
    /// # Errors
    /// * [`ResolveError::NotFound`] when nothing is visible and `lookup` is not optional.
    /// * [`ResolveError::MultiMismatch`] when the hosting scope holds a single registration.
    /// * [`ResolveError::TypeMismatch`] when an entry is not a `T`.
    pub fn resolve_all<T: Any + Send + Sync>(
        &self,
        capability: &Capability,
        lookup: Lookup,
    ) -> Result<Vec<Arc<T>>, ResolveError> {
        let Some(host) = self.locate(lookup, |node| node.provides(capability)) else {
            return if lookup.is_optional() { Ok(Vec::new()) } else { Err(self.not_found(capability)) };
        };

        let node = self.tree.node(host)?;
        let cached = node.collections.lock().get(capability).cloned();
        let instances = match cached {
            Some(instances) => instances,
            None => {
                let entries = multi_registrations(node, host, capability)?;
                let at = self.at(host);
                let mut produced = Vec::with_capacity(entries.len());
                for (index, entry) in entries.iter().enumerate() {
                    let key = format!("{capability}[{index}]");
                    produced.push(at.enter(key.into(), || at.produce(entry))?);
                }
                node.collections.lock().entry(capability.clone()).or_insert(produced).clone()
            },
        };

        instances.into_iter().map(|instance| downcast::<T>(capability, instance)).collect()
    }

    /// Instantiates (or reuses) an [`Injectable`] service.
    ///
    /// With [`Lookup::SKIP_SELF`] the search starts at the parent of this resolver's scope,
    /// which is how a service delegates to the nearest enclosing instance of itself.
    ///
    /// # Errors
    /// * [`ResolveError::NotFound`] when no scope registers the anchor and `lookup` is not
    ///   optional.
    /// * Any error raised by [`Injectable::inject`].
    pub fn inject<T: Injectable>(&self, lookup: Lookup) -> Result<Option<Arc<T>>, ResolveError> {
        let Some(host) = self.locate(lookup, |node| node.provides(&T::ANCHOR)) else {
            return if lookup.is_optional() { Ok(None) } else { Err(self.not_found(&T::ANCHOR)) };
        };

        let node = self.tree.node(host)?;
        let cached = node.services.lock().get(&TypeId::of::<T>()).cloned();
        let instance = match cached {
            Some(instance) => instance,
            None => {
                let at = self.at(host);
                let service = at.enter(std::any::type_name::<T>().into(), || T::inject(&at))?;
                trace!(scope = %host, service = std::any::type_name::<T>(), "Service injected");
                let service: Instance = Arc::new(service);
                node.services.lock().entry(TypeId::of::<T>()).or_insert(service).clone()
            },
        };

        downcast::<T>(&T::ANCHOR, instance).map(Some)
    }

    fn resolve_instance(
        &self,
        capability: &Capability,
        lookup: Lookup,
    ) -> Result<Option<Instance>, ResolveError> {
        let Some(host) = self.locate(lookup, |node| node.provides(capability)) else {
            return if lookup.is_optional() { Ok(None) } else { Err(self.not_found(capability)) };
        };

        let node = self.tree.node(host)?;
        if let Some(instance) = node.instances.lock().get(capability).cloned() {
            return Ok(Some(instance));
        }

        let registration = single_registration(node, host, capability)?;
        let at = self.at(host);
        let instance =
            at.enter(capability.name().to_owned().into(), || at.produce(&registration))?;
        trace!(scope = %host, %capability, "Instance produced");

        let instance = node.instances.lock().entry(capability.clone()).or_insert(instance).clone();
        Ok(Some(instance))
    }

    fn produce(&self, registration: &Registration) -> Result<Instance, ResolveError> {
        match registration.producer() {
            Producer::Class(class) => class.construct(self),
            Producer::Value(value) => Ok(value.instance()),
            Producer::Factory(factory) => factory.produce(self),
            Producer::Existing(target) => self
                .resolve_instance(target, Lookup::empty())?
                .ok_or_else(|| self.not_found(target)),
        }
    }

    /// Finds the scope hosting a capability according to `lookup`.
    fn locate(&self, lookup: Lookup, provides: impl Fn(&ScopeNode) -> bool) -> Option<ScopeId> {
        let start = if lookup.skips_self() { self.tree.parent(self.scope)? } else { self.scope };
        let limit = if lookup.self_only() { 1 } else { usize::MAX };

        self.tree
            .ancestors(start)
            .take(limit)
            .find(|&id| self.tree.node(id).is_ok_and(|node| provides(node)))
    }

    fn enter<R>(
        &self,
        key: Cow<'static, str>,
        f: impl FnOnce() -> Result<R, ResolveError>,
    ) -> Result<R, ResolveError> {
        let frame = Frame { scope: self.scope, key };
        {
            let mut path = self.path.borrow_mut();
            if path.contains(&frame) {
                let chain = path
                    .iter()
                    .chain(std::iter::once(&frame))
                    .map(|step| format!("{}@{}", step.key, step.scope))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(ResolveError::Cycle { path: chain, context: None });
            }
            path.push(frame);
        }

        let result = f();
        self.path.borrow_mut().pop();
        result
    }

    const fn at(&self, scope: ScopeId) -> Self {
        Self { tree: self.tree, scope, path: self.path }
    }

    fn not_found(&self, capability: &Capability) -> ResolveError {
        ResolveError::NotFound { capability: capability.clone(), scope: self.scope, context: None }
    }
}

fn single_registration(
    node: &ScopeNode,
    scope: ScopeId,
    capability: &Capability,
) -> Result<Registration, ResolveError> {
    let entries = node.registrations.get(capability).map(Vec::as_slice).unwrap_or_default();
    if entries.iter().any(Registration::is_multi) {
        return Err(ResolveError::MultiMismatch {
            capability: capability.clone(),
            scope,
            message: "capability holds multi registrations; resolve it as a collection".into(),
            context: None,
        });
    }

    entries.last().cloned().ok_or_else(|| ResolveError::NotFound {
        capability: capability.clone(),
        scope,
        context: None,
    })
}

fn multi_registrations(
    node: &ScopeNode,
    scope: ScopeId,
    capability: &Capability,
) -> Result<Vec<Registration>, ResolveError> {
    let entries = node.registrations.get(capability).cloned().unwrap_or_default();
    if entries.iter().all(Registration::is_multi) {
        Ok(entries)
    } else {
        Err(ResolveError::MultiMismatch {
            capability: capability.clone(),
            scope,
            message: "single and multi registrations cannot be mixed".into(),
            context: None,
        })
    }
}

fn downcast<T: Any + Send + Sync>(
    capability: &Capability,
    instance: Instance,
) -> Result<Arc<T>, ResolveError> {
    instance.downcast::<T>().map_err(|_| ResolveError::TypeMismatch {
        capability: capability.clone(),
        expected: std::any::type_name::<T>(),
        context: None,
    })
}

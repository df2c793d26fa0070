//! Registrations: instructions telling a host locator how to supply a capability.

use crate::error::ResolveError;
use crate::scope::Resolver;
use provis_domain::{Capability, Instance, Provided};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Constructor used by class registrations. Receives a resolver bound to the hosting scope.
pub type Construct = fn(&Resolver<'_>) -> Result<Instance, ResolveError>;

/// Produces a value by constructing a known type.
///
/// Two class producers are equal when they build the same type.
#[derive(Clone, Copy)]
pub struct ClassProducer {
    type_id: TypeId,
    type_name: &'static str,
    construct: Construct,
}

impl ClassProducer {
    /// Declares that `T` is built by `construct`.
    ///
    /// The produced instance does not have to be a `T` itself; trait-object capabilities
    /// usually box `T` into their shared handle type.
    #[must_use]
    pub fn of<T: Any>(construct: Construct) -> Self {
        Self { type_id: TypeId::of::<T>(), type_name: std::any::type_name::<T>(), construct }
    }

    /// Runs the constructor.
    ///
    /// # Errors
    /// Propagates whatever the constructor reports.
    pub fn construct(&self, resolver: &Resolver<'_>) -> Result<Instance, ResolveError> {
        (self.construct)(resolver)
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ClassProducer {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for ClassProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Class").field(&self.type_name).finish()
    }
}

/// A computed producer: a value-carrying object that builds an instance on demand.
pub trait Factory: Any + fmt::Debug + Send + Sync {
    /// Builds the instance.
    ///
    /// # Errors
    /// Returns a [`ResolveError`] when dependencies are missing or construction fails.
    fn produce(&self, resolver: &Resolver<'_>) -> Result<Instance, ResolveError>;
}

/// Shared, comparable handle around a [`Factory`].
#[derive(Clone)]
pub struct FactoryProducer {
    factory: Arc<dyn Factory>,
    erased: Arc<dyn Any + Send + Sync>,
    eq: fn(&dyn Any, &dyn Any) -> bool,
}

impl FactoryProducer {
    pub fn new<F: Factory + PartialEq>(factory: F) -> Self {
        let shared = Arc::new(factory);
        Self { factory: Arc::clone(&shared) as Arc<dyn Factory>, erased: shared, eq: factory_eq::<F> }
    }

    /// # Errors
    /// Propagates the factory's error.
    pub fn produce(&self, resolver: &Resolver<'_>) -> Result<Instance, ResolveError> {
        self.factory.produce(resolver)
    }
}

impl PartialEq for FactoryProducer {
    fn eq(&self, other: &Self) -> bool {
        (self.eq)(&*self.erased, &*other.erased)
    }
}

impl fmt::Debug for FactoryProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.factory, f)
    }
}

fn factory_eq<F: Factory + PartialEq>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<F>(), b.downcast_ref::<F>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// How a registration supplies its capability.
#[derive(Debug, Clone, PartialEq)]
pub enum Producer {
    /// Construct a type.
    Class(ClassProducer),
    /// Hand out a ready value.
    Value(Provided),
    /// Run a computed factory.
    Factory(FactoryProducer),
    /// Alias another capability visible from the same scope.
    Existing(Capability),
}

/// An instruction mapping a capability to a producer.
///
/// `multi` registrations accumulate into a collection instead of replacing each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    capability: Capability,
    producer: Producer,
    multi: bool,
}

impl Registration {
    #[must_use]
    pub const fn new(capability: Capability, producer: Producer) -> Self {
        Self { capability, producer, multi: false }
    }

    pub fn value<T>(capability: Capability, value: T) -> Self
    where
        T: Any + fmt::Debug + PartialEq + Send + Sync,
    {
        Self::new(capability, Producer::Value(Provided::new(value)))
    }

    #[must_use]
    pub const fn class(capability: Capability, class: ClassProducer) -> Self {
        Self::new(capability, Producer::Class(class))
    }

    pub fn factory<F: Factory + PartialEq>(capability: Capability, factory: F) -> Self {
        Self::new(capability, Producer::Factory(FactoryProducer::new(factory)))
    }

    #[must_use]
    pub const fn existing(capability: Capability, target: Capability) -> Self {
        Self::new(capability, Producer::Existing(target))
    }

    /// Marks the registration as one entry of a collection.
    #[must_use]
    pub const fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    #[must_use]
    pub const fn capability(&self) -> &Capability {
        &self.capability
    }

    #[must_use]
    pub const fn producer(&self) -> &Producer {
        &self.producer
    }

    #[must_use]
    pub const fn is_multi(&self) -> bool {
        self.multi
    }
}

//! Type-erased values handed to a host locator.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A produced instance as stored by a host locator.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A ready value registered for a capability.
///
/// Keeps the value erased while preserving structural equality and `Debug` output of the
/// concrete type, so registration lists built from equal inputs compare equal.
#[derive(Clone)]
pub struct Provided {
    value: Instance,
    type_id: TypeId,
    type_name: &'static str,
    eq: fn(&dyn Any, &dyn Any) -> bool,
    debug: fn(&dyn Any, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl Provided {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + fmt::Debug + PartialEq + Send + Sync,
    {
        Self {
            value: Arc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            eq: erased_eq::<T>,
            debug: erased_debug::<T>,
        }
    }

    /// The shared instance, ready to be downcast by the consumer.
    #[must_use]
    pub fn instance(&self) -> Instance {
        Arc::clone(&self.value)
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let value: &dyn Any = &*self.value;
        value.downcast_ref::<T>()
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for Provided {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && (self.eq)(&*self.value, &*other.value)
    }
}

impl fmt::Debug for Provided {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.debug)(&*self.value, f)
    }
}

fn erased_eq<T: Any + PartialEq>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn erased_debug<T: Any + fmt::Debug>(value: &dyn Any, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => fmt::Debug::fmt(value, f),
        None => f.write_str("<erased>"),
    }
}

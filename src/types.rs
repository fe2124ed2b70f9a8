use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

/// Errors reported by provider factories must be Send + Sync
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Instances are shared behind an `Arc` and may be handed across threads,
/// so anything produced by the container needs `Send + Sync + 'static`.
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type name and type id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// A value produced by a provider factory
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    pub value: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub fn new<T: Injectable>(value: T) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.value.clone()) {
            Ok(value) => Ok(value),
            Err(_) => Err(self.info.type_name),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Factory producing an [`Instance`], invoked positionally with one
/// resolved argument per declared dependency. An argument is `None` only
/// when the dependency was optional and had no binding.
pub type ProviderFactory =
    Arc<dyn Fn(Vec<Option<Instance>>) -> Result<Instance, DynError> + Send + Sync>;

// cache.rs - Per-class binding publication
//
// Each class gets one OnceCell. Concurrent first requests race on the cell,
// so at most one ClassBinding is ever published per class; losers receive
// the winner's Arc. A failed build leaves the cell empty.

use crate::binding::{
    ClassBinding, ClassDescriptorBuilder, ClassRef, CollisionPolicy, HostClass,
    InterceptionStrategy, ProxyMode, ProxyPolicy, RegistryError,
};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::any::TypeId;
use std::sync::Arc;

type Slot = Arc<OnceCell<Arc<ClassBinding>>>;

#[derive(Default)]
pub struct BindingCache {
    entries: DashMap<TypeId, Slot>,
}

impl BindingCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Published binding for `class`, if any.
    pub fn get(&self, class: &ClassRef) -> Option<Arc<ClassBinding>> {
        self.entries
            .get(&class.type_id())
            .and_then(|slot| slot.get().cloned())
    }

    /// Return the published binding, running `build` only if none exists yet.
    pub fn get_or_publish<F>(
        &self,
        class: &ClassRef,
        build: F,
    ) -> Result<Arc<ClassBinding>, RegistryError>
    where
        F: FnOnce() -> Result<ClassBinding, RegistryError>,
    {
        // Clone the slot out so the shard lock is not held while building.
        let slot: Slot = self.entries.entry(class.type_id()).or_default().clone();
        slot.get_or_try_init(|| {
            let binding = build()?;
            tracing::debug!(class = class.name(), "binding published");
            Ok(Arc::new(binding))
        })
        .cloned()
    }

    /// Bind a [`HostClass`] using its declared member table.
    ///
    /// A class-mode request is downgraded to object mode when the strategy
    /// reports that it cannot proxy the class.
    pub fn bind<T: HostClass>(
        &self,
        proxy_mode: ProxyMode,
        strategy: Arc<dyn InterceptionStrategy>,
        policy: CollisionPolicy,
    ) -> Result<Arc<ClassBinding>, RegistryError> {
        let class = T::class_ref();
        self.get_or_publish(&class, || {
            let mut builder = ClassDescriptorBuilder::new(class.clone());
            T::declare(&mut builder);
            let descriptor = builder.publish(policy)?;

            let mode = if proxy_mode == ProxyMode::Class && !strategy.is_proxyable(&class) {
                tracing::debug!(class = class.name(), "strategy cannot proxy class, using object mode");
                ProxyMode::Object
            } else {
                proxy_mode
            };
            let policy = ProxyPolicy::new(mode, descriptor.target_class().clone(), strategy);
            ClassBinding::new(policy, descriptor)
        })
    }

    /// Drop the published binding for `class`.
    pub fn evict(&self, class: &ClassRef) -> Option<Arc<ClassBinding>> {
        self.entries
            .remove(&class.type_id())
            .and_then(|(_, slot)| slot.get().cloned())
    }

    /// Number of classes with a published binding.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

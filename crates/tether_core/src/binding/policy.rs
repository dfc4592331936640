use crate::binding::{
    ClassDescriptor, ClassRef, ConversionMode, InterceptionStrategy, MemberResolver, PolicyError,
    ProxyMode, RegistryError,
};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Exposure strategy for one bound class.
///
/// The proxy mode stays mutable after publication so a session can switch
/// exposure strategy; everything else is fixed at construction.
pub struct ProxyPolicy {
    proxy_mode: AtomicU8,
    target_class: ClassRef,
    conversion_mode: ConversionMode,
    strategy: Arc<dyn InterceptionStrategy>,
}

impl ProxyPolicy {
    pub fn new(
        proxy_mode: ProxyMode,
        target_class: ClassRef,
        strategy: Arc<dyn InterceptionStrategy>,
    ) -> Self {
        let conversion_mode = target_class.conversion_mode();
        Self {
            proxy_mode: AtomicU8::new(proxy_mode as u8),
            target_class,
            conversion_mode,
            strategy,
        }
    }

    /// Build from an optional strategy, failing immediately when it is absent.
    pub fn try_new(
        proxy_mode: ProxyMode,
        target_class: ClassRef,
        strategy: Option<Arc<dyn InterceptionStrategy>>,
    ) -> Result<Self, PolicyError> {
        let strategy = strategy.ok_or(PolicyError::MissingStrategy {
            class: target_class.name(),
        })?;
        Ok(Self::new(proxy_mode, target_class, strategy))
    }

    pub fn proxy_mode(&self) -> ProxyMode {
        ProxyMode::from_u8(self.proxy_mode.load(Ordering::Acquire))
    }

    pub fn set_proxy_mode(&self, proxy_mode: ProxyMode) {
        let previous = self.proxy_mode.swap(proxy_mode as u8, Ordering::AcqRel);
        if previous != proxy_mode as u8 {
            tracing::debug!(
                class = self.target_class.name(),
                from = %ProxyMode::from_u8(previous),
                to = %proxy_mode,
                "proxy mode changed"
            );
        }
    }

    pub fn target_class(&self) -> &ClassRef {
        &self.target_class
    }

    pub fn conversion_mode(&self) -> ConversionMode {
        self.conversion_mode
    }

    pub fn strategy(&self) -> &Arc<dyn InterceptionStrategy> {
        &self.strategy
    }
}

impl fmt::Debug for ProxyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyPolicy")
            .field("proxy_mode", &self.proxy_mode())
            .field("target_class", &self.target_class)
            .field("conversion_mode", &self.conversion_mode)
            .finish_non_exhaustive()
    }
}

/// A published member table paired with the policy that exposes it.
#[derive(Debug)]
pub struct ClassBinding {
    policy: ProxyPolicy,
    descriptor: ClassDescriptor,
}

impl ClassBinding {
    pub fn new(policy: ProxyPolicy, descriptor: ClassDescriptor) -> Result<Self, RegistryError> {
        if policy.target_class() != descriptor.target_class() {
            return Err(RegistryError::ClassMismatch {
                policy: policy.target_class().name(),
                descriptor: descriptor.target_class().name(),
            });
        }
        Ok(Self { policy, descriptor })
    }

    pub fn policy(&self) -> &ProxyPolicy {
        &self.policy
    }

    pub fn descriptor(&self) -> &ClassDescriptor {
        &self.descriptor
    }

    pub fn target_class(&self) -> &ClassRef {
        self.descriptor.target_class()
    }

    pub fn resolver(&self) -> MemberResolver<'_> {
        MemberResolver::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{HostClass, PassThrough};

    struct Widget;
    crate::define_host_class!(Widget, "Widget", conversion = AllowOnly);

    #[test]
    fn test_missing_strategy_fails_fast() {
        let err = ProxyPolicy::try_new(ProxyMode::Object, Widget::class_ref(), None).unwrap_err();
        assert_eq!(err, PolicyError::MissingStrategy { class: "Widget" });
    }

    #[test]
    fn test_proxy_mode_is_mutable() {
        let policy = ProxyPolicy::new(ProxyMode::Class, Widget::class_ref(), Arc::new(PassThrough));
        assert_eq!(policy.proxy_mode(), ProxyMode::Class);
        policy.set_proxy_mode(ProxyMode::Function);
        assert_eq!(policy.proxy_mode(), ProxyMode::Function);
        assert_eq!(policy.conversion_mode(), ConversionMode::AllowOnly);
    }
}

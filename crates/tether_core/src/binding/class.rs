// class.rs - Host class identity and declaration
//
// Classes are identified by TypeId; configuration is read once from the
// HostClass impl when a ClassRef is captured, never per access.

use crate::binding::{BindingConfig, ClassDescriptorBuilder, ConversionMode};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A host type that can be bound into a script runtime.
pub trait HostClass: Any + Sized {
    /// Script-visible class name.
    const NAME: &'static str;

    /// Names of classes this one may stand in for (used by redirects).
    const SUPERTYPES: &'static [&'static str] = &[];

    /// Declared binding configuration. `None` means the transparent default.
    fn binding_config() -> Option<BindingConfig> {
        None
    }

    /// Populate the member table for this class.
    fn declare(_builder: &mut ClassDescriptorBuilder) {}

    fn class_ref() -> ClassRef {
        ClassRef::of::<Self>()
    }
}

/// Identity of a bound host type plus its resolved configuration.
#[derive(Clone)]
pub struct ClassRef {
    type_id: TypeId,
    name: &'static str,
    rust_name: &'static str,
    supertypes: &'static [&'static str],
    config: Option<BindingConfig>,
}

impl ClassRef {
    pub fn of<T: HostClass>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: T::NAME,
            rust_name: type_name::<T>(),
            supertypes: T::SUPERTYPES,
            config: T::binding_config(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn supertypes(&self) -> &'static [&'static str] {
        self.supertypes
    }

    /// The declared configuration, if the class declares one.
    pub fn binding_config(&self) -> Option<BindingConfig> {
        self.config
    }

    /// Declared conversion mode, or `Transparent` when nothing is declared.
    pub fn conversion_mode(&self) -> ConversionMode {
        self.config
            .map(|config| config.conversion_mode)
            .unwrap_or_default()
    }

    /// Whether values of this class may be used where `other` is expected.
    pub fn is_assignable_to(&self, other: &ClassRef) -> bool {
        self.type_id == other.type_id || self.supertypes.contains(&other.name)
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("name", &self.name)
            .field("type", &self.rust_name)
            .field("conversion_mode", &self.conversion_mode())
            .finish()
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Helper macro to implement the HostClass trait.
///
/// # Example
/// ```ignore
/// struct Counter { value: i64 }
///
/// define_host_class!(Counter, "Counter");
/// define_host_class!(Secret, "Secret", conversion = AllowOnly);
/// ```
#[macro_export]
macro_rules! define_host_class {
    ($ty:ty, $name:expr) => {
        impl $crate::binding::HostClass for $ty {
            const NAME: &'static str = $name;
        }
    };
    ($ty:ty, $name:expr, conversion = $mode:ident) => {
        impl $crate::binding::HostClass for $ty {
            const NAME: &'static str = $name;

            fn binding_config() -> Option<$crate::binding::BindingConfig> {
                Some($crate::binding::BindingConfig::new(
                    $crate::binding::ConversionMode::$mode,
                ))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    define_host_class!(Plain, "Plain");

    struct Guarded;
    define_host_class!(Guarded, "Guarded", conversion = BlockOnly);

    struct Derived;
    impl HostClass for Derived {
        const NAME: &'static str = "Derived";
        const SUPERTYPES: &'static [&'static str] = &["Plain"];
    }

    #[test]
    fn test_conversion_mode_defaults_to_transparent() {
        let class = ClassRef::of::<Plain>();
        assert_eq!(class.binding_config(), None);
        assert_eq!(class.conversion_mode(), ConversionMode::Transparent);
        // Pure query: repeated calls agree.
        assert_eq!(class.conversion_mode(), class.conversion_mode());
    }

    #[test]
    fn test_declared_conversion_mode_is_returned() {
        let class = ClassRef::of::<Guarded>();
        assert_eq!(class.conversion_mode(), ConversionMode::BlockOnly);
    }

    #[test]
    fn test_assignability() {
        let plain = Plain::class_ref();
        let derived = Derived::class_ref();
        assert!(derived.is_assignable_to(&plain));
        assert!(!plain.is_assignable_to(&derived));
        assert!(plain.is_assignable_to(&plain));
        assert_ne!(plain, derived);
    }
}

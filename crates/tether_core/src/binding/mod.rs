//! Host class binding.
//!
//! A host type is described once by a [`ClassDescriptor`]: its fields,
//! methods, named accessors, generic accessors, constructors and apply
//! functions. Descriptors are accumulated in a [`ClassDescriptorBuilder`]
//! and frozen by `publish`. A [`ProxyPolicy`] decides how the class is
//! exposed (proxy mode, conversion mode, interception strategy), and the
//! pair is published as a [`ClassBinding`] through the [`BindingCache`].

mod builder;
mod cache;
mod class;
mod descriptor;
mod error;
mod intercept;
mod member;
mod mode;
mod policy;
mod resolver;

pub use builder::{ClassDescriptorBuilder, Collision, CollisionPolicy, MemberKind, Registration};
pub use cache::BindingCache;
pub use class::{ClassRef, HostClass};
pub use descriptor::ClassDescriptor;
pub use error::{InvokeError, PolicyError, RegistryError};
pub use intercept::{AccessKind, InterceptionStrategy, MemberAccess, PassThrough};
pub use member::{
    arg, arg_f64, arg_i64, arg_str, Arity, ConstructorDescriptor, FieldDescriptor, GenericGetter,
    GenericSetter, HostObject, MethodDescriptor,
};
pub use mode::{BindingConfig, ConversionMode, Exposure, ProxyMode};
pub use policy::{ClassBinding, ProxyPolicy};
pub use resolver::{Lookup, MemberResolver};

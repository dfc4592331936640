use crate::binding::{
    ClassRef, Collision, ConstructorDescriptor, ConversionMode, FieldDescriptor, GenericGetter,
    GenericSetter, MethodDescriptor,
};
use indexmap::{IndexMap, IndexSet};

/// Published, read-only member table for one host class.
///
/// Produced by [`ClassDescriptorBuilder::publish`](super::ClassDescriptorBuilder::publish).
/// Nothing mutates a descriptor after publication, so it can be shared
/// across script contexts without locking.
#[derive(Debug)]
pub struct ClassDescriptor {
    pub(crate) target_class: ClassRef,
    pub(crate) conversion_mode: ConversionMode,
    pub(crate) constructors: Vec<ConstructorDescriptor>,
    pub(crate) field_map: IndexMap<String, FieldDescriptor>,
    pub(crate) methods_map: IndexMap<String, Vec<MethodDescriptor>>,
    pub(crate) getters_map: IndexMap<String, Vec<MethodDescriptor>>,
    pub(crate) setters_map: IndexMap<String, Vec<MethodDescriptor>>,
    pub(crate) generic_getters: Vec<GenericGetter>,
    pub(crate) generic_setters: Vec<GenericSetter>,
    pub(crate) apply_functions: Vec<MethodDescriptor>,
    pub(crate) unique_key_set: IndexSet<String>,
    pub(crate) collisions: Vec<Collision>,
}

impl ClassDescriptor {
    pub fn target_class(&self) -> &ClassRef {
        &self.target_class
    }

    /// Conversion mode resolved from the class's declared configuration.
    pub fn conversion_mode(&self) -> ConversionMode {
        self.conversion_mode
    }

    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    pub fn field_map(&self) -> &IndexMap<String, FieldDescriptor> {
        &self.field_map
    }

    pub fn methods_map(&self) -> &IndexMap<String, Vec<MethodDescriptor>> {
        &self.methods_map
    }

    pub fn getters_map(&self) -> &IndexMap<String, Vec<MethodDescriptor>> {
        &self.getters_map
    }

    pub fn setters_map(&self) -> &IndexMap<String, Vec<MethodDescriptor>> {
        &self.setters_map
    }

    pub fn generic_getters(&self) -> &[GenericGetter] {
        &self.generic_getters
    }

    pub fn generic_setters(&self) -> &[GenericSetter] {
        &self.generic_setters
    }

    pub fn apply_functions(&self) -> &[MethodDescriptor] {
        &self.apply_functions
    }

    pub fn unique_key_set(&self) -> &IndexSet<String> {
        &self.unique_key_set
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.unique_key_set.contains(name)
    }

    /// Collisions retained under `CollisionPolicy::Allow`.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Whether any instance-callable apply function was registered.
    pub fn is_invocable(&self) -> bool {
        !self.apply_functions.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
            && self.field_map.is_empty()
            && self.methods_map.is_empty()
            && self.getters_map.is_empty()
            && self.setters_map.is_empty()
            && self.generic_getters.is_empty()
            && self.generic_setters.is_empty()
            && self.apply_functions.is_empty()
    }
}

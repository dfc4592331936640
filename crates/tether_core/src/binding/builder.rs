use crate::binding::{
    ClassDescriptor, ClassRef, ConstructorDescriptor, ConversionMode, Exposure, FieldDescriptor,
    GenericGetter, GenericSetter, MethodDescriptor, RegistryError,
};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category under which a member name is claimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Getter,
    Setter,
    Method,
    GenericGetter,
    GenericSetter,
}

impl MemberKind {
    /// Whether two claims on the same name can coexist.
    ///
    /// Getter/setter pairs form one property; repeated methods, getters and
    /// setters are overloads. Everything else conflicts.
    pub fn is_compatible_with(self, other: MemberKind) -> bool {
        use MemberKind::*;
        matches!(
            (self, other),
            (Getter, Setter)
                | (Setter, Getter)
                | (Getter, Getter)
                | (Setter, Setter)
                | (Method, Method)
                | (GenericGetter, GenericGetter)
                | (GenericSetter, GenericSetter)
        )
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberKind::Field => "field",
            MemberKind::Getter => "getter",
            MemberKind::Setter => "setter",
            MemberKind::Method => "method",
            MemberKind::GenericGetter => "generic getter",
            MemberKind::GenericSetter => "generic setter",
        };
        f.write_str(name)
    }
}

/// Two incompatible claims on one member name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collision {
    pub name: String,
    pub existing: MemberKind,
    pub incoming: MemberKind,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' claimed as {} and {}",
            self.name, self.existing, self.incoming
        )
    }
}

/// Outcome of adding one member to the builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// The claim conflicts with an earlier one. Both claims are recorded.
    Collided(Collision),
    /// The class's conversion mode does not admit the member's exposure.
    Skipped,
}

/// What `publish` does with recorded collisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Refuse to publish a descriptor with any collision.
    #[default]
    Reject,
    /// Publish anyway; resolver precedence decides which claim is served.
    Allow,
}

/// Mutable accumulation phase of a class's member table.
///
/// The scanner appends here, then [`publish`](Self::publish) freezes the
/// table into an immutable [`ClassDescriptor`].
#[derive(Debug)]
pub struct ClassDescriptorBuilder {
    target_class: ClassRef,
    conversion_mode: ConversionMode,
    constructors: Vec<ConstructorDescriptor>,
    field_map: IndexMap<String, FieldDescriptor>,
    methods_map: IndexMap<String, Vec<MethodDescriptor>>,
    getters_map: IndexMap<String, Vec<MethodDescriptor>>,
    setters_map: IndexMap<String, Vec<MethodDescriptor>>,
    generic_getters: Vec<GenericGetter>,
    generic_setters: Vec<GenericSetter>,
    apply_functions: Vec<MethodDescriptor>,
    unique_key_set: IndexSet<String>,
    claims: IndexMap<String, Vec<MemberKind>>,
    collisions: Vec<Collision>,
}

impl ClassDescriptorBuilder {
    /// Create an empty builder. The conversion mode is resolved here, once.
    pub fn new(target_class: ClassRef) -> Self {
        let conversion_mode = target_class.conversion_mode();
        Self {
            target_class,
            conversion_mode,
            constructors: Vec::new(),
            field_map: IndexMap::new(),
            methods_map: IndexMap::new(),
            getters_map: IndexMap::new(),
            setters_map: IndexMap::new(),
            generic_getters: Vec::new(),
            generic_setters: Vec::new(),
            apply_functions: Vec::new(),
            unique_key_set: IndexSet::new(),
            claims: IndexMap::new(),
            collisions: Vec::new(),
        }
    }

    pub fn target_class(&self) -> &ClassRef {
        &self.target_class
    }

    pub fn conversion_mode(&self) -> ConversionMode {
        self.conversion_mode
    }

    /// Rebind the table to a compatible class before publication.
    ///
    /// Members registered afterwards are admitted under the new class's
    /// conversion mode.
    pub fn redirect(&mut self, target_class: ClassRef) -> Result<(), RegistryError> {
        let compatible = target_class.is_assignable_to(&self.target_class)
            || self.target_class.is_assignable_to(&target_class);
        if !compatible {
            return Err(RegistryError::IncompatibleRedirect {
                from: self.target_class.name(),
                to: target_class.name(),
            });
        }
        tracing::debug!(
            from = self.target_class.name(),
            to = target_class.name(),
            "redirecting class descriptor"
        );
        self.conversion_mode = target_class.conversion_mode();
        self.target_class = target_class;
        Ok(())
    }

    pub fn add_constructor(&mut self, constructor: ConstructorDescriptor) -> Registration {
        if !self.admits(constructor.exposure()) {
            return Registration::Skipped;
        }
        self.constructors.push(constructor);
        Registration::Added
    }

    /// Add a field. A second field with the same name is recorded as a
    /// collision and the first one stays in the field map.
    pub fn add_field(&mut self, field: FieldDescriptor) -> Registration {
        if !self.admits(field.exposure()) {
            return Registration::Skipped;
        }
        let name = field.name().to_string();
        let outcome = self.claim(&name, MemberKind::Field);
        if !self.field_map.contains_key(&name) {
            self.unique_key_set.insert(name.clone());
            self.field_map.insert(name, field);
        }
        outcome
    }

    pub fn add_method(&mut self, method: MethodDescriptor) -> Registration {
        self.add_named(method, MemberKind::Method)
    }

    /// Register a named getter under its script-visible property name.
    pub fn add_getter(&mut self, getter: MethodDescriptor) -> Registration {
        self.add_named(getter, MemberKind::Getter)
    }

    pub fn add_setter(&mut self, setter: MethodDescriptor) -> Registration {
        self.add_named(setter, MemberKind::Setter)
    }

    pub fn add_generic_getter(&mut self, getter: GenericGetter) -> Registration {
        if !self.admits(getter.exposure()) {
            return Registration::Skipped;
        }
        let outcome = self.claim(getter.name(), MemberKind::GenericGetter);
        self.generic_getters.push(getter);
        outcome
    }

    pub fn add_generic_setter(&mut self, setter: GenericSetter) -> Registration {
        if !self.admits(setter.exposure()) {
            return Registration::Skipped;
        }
        let outcome = self.claim(setter.name(), MemberKind::GenericSetter);
        self.generic_setters.push(setter);
        outcome
    }

    /// Make instances callable. Apply functions claim no member name.
    pub fn add_apply_function(&mut self, function: MethodDescriptor) -> Registration {
        if !self.admits(function.exposure()) {
            return Registration::Skipped;
        }
        self.apply_functions.push(function);
        Registration::Added
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

    /// Names registered across fields, getters, setters and methods.
    pub fn unique_key_set(&self) -> &IndexSet<String> {
        &self.unique_key_set
    }

    /// O(1) check against the unique key set.
    pub fn contains_key(&self, name: &str) -> bool {
        self.unique_key_set.contains(name)
    }

    /// Every category that has claimed `name`, in registration order.
    pub fn claims_of(&self, name: &str) -> &[MemberKind] {
        self.claims.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Freeze the table.
    pub fn publish(self, policy: CollisionPolicy) -> Result<ClassDescriptor, RegistryError> {
        if policy == CollisionPolicy::Reject && !self.collisions.is_empty() {
            for collision in &self.collisions {
                tracing::warn!(class = self.target_class.name(), %collision, "member collision");
            }
            return Err(RegistryError::Collisions {
                class: self.target_class.name(),
                collisions: self.collisions,
            });
        }

        tracing::debug!(
            class = self.target_class.name(),
            fields = self.field_map.len(),
            methods = self.methods_map.len(),
            getters = self.getters_map.len(),
            setters = self.setters_map.len(),
            collisions = self.collisions.len(),
            "published class descriptor"
        );

        Ok(ClassDescriptor {
            target_class: self.target_class,
            conversion_mode: self.conversion_mode,
            constructors: self.constructors,
            field_map: self.field_map,
            methods_map: self.methods_map,
            getters_map: self.getters_map,
            setters_map: self.setters_map,
            generic_getters: self.generic_getters,
            generic_setters: self.generic_setters,
            apply_functions: self.apply_functions,
            unique_key_set: self.unique_key_set,
            collisions: self.collisions,
        })
    }

    fn admits(&self, exposure: Exposure) -> bool {
        self.conversion_mode.admits(exposure)
    }

    fn add_named(&mut self, member: MethodDescriptor, kind: MemberKind) -> Registration {
        if !self.admits(member.exposure()) {
            return Registration::Skipped;
        }
        let name = member.name().to_string();
        let outcome = self.claim(&name, kind);
        let map = match kind {
            MemberKind::Getter => &mut self.getters_map,
            MemberKind::Setter => &mut self.setters_map,
            _ => &mut self.methods_map,
        };
        map.entry(name.clone()).or_default().push(member);
        self.unique_key_set.insert(name);
        outcome
    }

    fn claim(&mut self, name: &str, kind: MemberKind) -> Registration {
        let existing = self.claims.entry(name.to_string()).or_default();
        let conflict = existing
            .iter()
            .copied()
            .find(|prior| !prior.is_compatible_with(kind));
        existing.push(kind);

        match conflict {
            Some(prior) => {
                let collision = Collision {
                    name: name.to_string(),
                    existing: prior,
                    incoming: kind,
                };
                tracing::debug!(class = self.target_class.name(), %collision, "member collision recorded");
                self.collisions.push(collision.clone());
                Registration::Collided(collision)
            }
            None => Registration::Added,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Arity, HostClass};
    use crate::value::ScriptValue;

    struct Sprite {
        x: f64,
        y: f64,
    }
    crate::define_host_class!(Sprite, "Sprite");

    struct Guarded;
    crate::define_host_class!(Guarded, "Guarded", conversion = AllowOnly);

    struct Shielded;
    crate::define_host_class!(Shielded, "Shielded", conversion = BlockOnly);

    struct Base;
    crate::define_host_class!(Base, "Base");

    struct Derived;
    impl HostClass for Derived {
        const NAME: &'static str = "Derived";
        const SUPERTYPES: &'static [&'static str] = &["Base"];
    }

    fn x_field() -> FieldDescriptor {
        FieldDescriptor::readonly::<Sprite, _>("x", |s| s.x.into())
    }

    fn noop(name: &str) -> MethodDescriptor {
        MethodDescriptor::new::<Sprite, _>(name, Arity::Exact(0), |_, _| Ok(ScriptValue::Undefined))
    }

    #[test]
    fn test_new_builder_is_empty() {
        let builder = ClassDescriptorBuilder::new(Sprite::class_ref());
        assert!(builder.constructors().is_empty());
        assert!(builder.field_map().is_empty());
        assert!(builder.methods_map().is_empty());
        assert!(builder.getters_map().is_empty());
        assert!(builder.setters_map().is_empty());
        assert!(builder.generic_getters().is_empty());
        assert!(builder.generic_setters().is_empty());
        assert!(builder.apply_functions().is_empty());
        assert!(builder.unique_key_set().is_empty());

        let descriptor = builder.publish(CollisionPolicy::Reject).unwrap();
        assert!(descriptor.is_empty());
        assert_eq!(descriptor.target_class(), &Sprite::class_ref());
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut builder = ClassDescriptorBuilder::new(Sprite::class_ref());
        for name in ["zeta", "alpha", "mid", "beta"] {
            assert_eq!(builder.add_method(noop(name)), Registration::Added);
        }
        builder.add_field(FieldDescriptor::readonly::<Sprite, _>("y", |s| s.y.into()));
        builder.add_field(x_field());

        let methods: Vec<_> = builder.methods_map().keys().map(String::as_str).collect();
        assert_eq!(methods, ["zeta", "alpha", "mid", "beta"]);
        let fields: Vec<_> = builder.field_map().keys().map(String::as_str).collect();
        assert_eq!(fields, ["y", "x"]);
        let keys: Vec<_> = builder.unique_key_set().iter().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid", "beta", "y", "x"]);
    }

    #[test]
    fn test_unique_key_set_is_union_of_named_members() {
        let mut builder = ClassDescriptorBuilder::new(Sprite::class_ref());
        builder.add_field(x_field());
        builder.add_getter(MethodDescriptor::getter::<Sprite, _>("width", |_| 10.into()));
        builder.add_setter(MethodDescriptor::setter::<Sprite, _>("height", |_, _| Ok(())));
        builder.add_method(noop("move"));
        builder.add_generic_getter(GenericGetter::new::<Sprite, _>("lookup", |_, _| None));
        builder.add_apply_function(noop("call"));

        let union: IndexSet<String> = builder
            .field_map()
            .keys()
            .chain(builder.getters_map().keys())
            .chain(builder.setters_map().keys())
            .chain(builder.methods_map().keys())
            .cloned()
            .collect();
        assert_eq!(union.len(), builder.unique_key_set().len());
        assert!(union.iter().all(|key| builder.contains_key(key)));
        assert!(!builder.contains_key("lookup"));
        assert!(!builder.contains_key("call"));
    }

    #[test]
    fn test_getter_setter_pair_and_overloads_do_not_collide() {
        let mut builder = ClassDescriptorBuilder::new(Sprite::class_ref());
        builder.add_getter(MethodDescriptor::getter::<Sprite, _>("x", |s| s.x.into()));
        builder.add_setter(MethodDescriptor::setter::<Sprite, _>("x", |s, v| {
            s.x = v.as_f64().unwrap_or_default();
            Ok(())
        }));
        builder.add_method(noop("scale"));
        builder.add_method(MethodDescriptor::new::<Sprite, _>("scale", Arity::Exact(1), |_, _| {
            Ok(ScriptValue::Undefined)
        }));

        assert!(builder.collisions().is_empty());
        assert_eq!(builder.methods_map()["scale"].len(), 2);
        assert_eq!(builder.claims_of("x"), [MemberKind::Getter, MemberKind::Setter]);
    }

    #[test]
    fn test_field_and_generic_getter_collision_is_observable() {
        let mut builder = ClassDescriptorBuilder::new(Sprite::class_ref());
        builder.add_field(FieldDescriptor::readonly::<Sprite, _>("get", |s| s.x.into()));
        let outcome =
            builder.add_generic_getter(GenericGetter::new::<Sprite, _>("get", |_, _| None));

        let expected = Collision {
            name: "get".into(),
            existing: MemberKind::Field,
            incoming: MemberKind::GenericGetter,
        };
        assert_eq!(outcome, Registration::Collided(expected.clone()));
        assert_eq!(builder.claims_of("get"), [MemberKind::Field, MemberKind::GenericGetter]);
        assert_eq!(builder.collisions(), [expected]);
    }

    #[test]
    fn test_duplicate_field_keeps_first() {
        let mut builder = ClassDescriptorBuilder::new(Sprite::class_ref());
        builder.add_field(x_field());
        let outcome = builder.add_field(FieldDescriptor::readonly::<Sprite, _>("x", |_| 0.into()));
        assert!(matches!(outcome, Registration::Collided(_)));
        assert_eq!(builder.field_map().len(), 1);

        let descriptor = builder.publish(CollisionPolicy::Allow).unwrap();
        let sprite = Sprite { x: 7.0, y: 0.0 };
        assert_eq!(descriptor.field_map()["x"].get(&sprite).unwrap(), ScriptValue::Float(7.0));
    }

    #[test]
    fn test_publish_policy() {
        let colliding = || {
            let mut builder = ClassDescriptorBuilder::new(Sprite::class_ref());
            builder.add_field(x_field());
            builder.add_method(noop("x"));
            builder
        };

        let err = colliding().publish(CollisionPolicy::Reject).unwrap_err();
        match err {
            RegistryError::Collisions { class, collisions } => {
                assert_eq!(class, "Sprite");
                assert_eq!(collisions.len(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        let descriptor = colliding().publish(CollisionPolicy::Allow).unwrap();
        assert_eq!(descriptor.collisions().len(), 1);
        assert!(descriptor.contains_key("x"));
    }

    #[test]
    fn test_allow_only_admits_marked_members() {
        let mut builder = ClassDescriptorBuilder::new(Guarded::class_ref());
        let plain = MethodDescriptor::new::<Guarded, _>("hidden", Arity::Exact(0), |_, _| {
            Ok(ScriptValue::Undefined)
        });
        let marked = MethodDescriptor::new::<Guarded, _>("open", Arity::Exact(0), |_, _| {
            Ok(ScriptValue::Undefined)
        })
        .with_exposure(Exposure::Allow);

        assert_eq!(builder.add_method(plain), Registration::Skipped);
        assert_eq!(builder.add_method(marked), Registration::Added);
        assert!(!builder.contains_key("hidden"));
        assert!(builder.contains_key("open"));
    }

    #[test]
    fn test_block_only_skips_blocked_members() {
        let mut builder = ClassDescriptorBuilder::new(Shielded::class_ref());
        let blocked = MethodDescriptor::new::<Shielded, _>("secret", Arity::Exact(0), |_, _| {
            Ok(ScriptValue::Undefined)
        })
        .with_exposure(Exposure::Block);
        let plain = MethodDescriptor::new::<Shielded, _>("visible", Arity::Exact(0), |_, _| {
            Ok(ScriptValue::Undefined)
        });

        assert_eq!(builder.add_method(blocked), Registration::Skipped);
        assert_eq!(builder.add_method(plain), Registration::Added);
        assert_eq!(builder.unique_key_set().len(), 1);
    }

    #[test]
    fn test_redirect() {
        let mut builder = ClassDescriptorBuilder::new(Derived::class_ref());
        builder.redirect(Base::class_ref()).unwrap();
        assert_eq!(builder.target_class(), &Base::class_ref());

        let err = builder.redirect(Sprite::class_ref()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::IncompatibleRedirect { from: "Base", to: "Sprite" }
        ));

        let mut guarded = ClassDescriptorBuilder::new(Guarded::class_ref());
        assert_eq!(guarded.conversion_mode(), ConversionMode::AllowOnly);
        assert!(guarded.redirect(Sprite::class_ref()).is_err());
        assert_eq!(guarded.conversion_mode(), ConversionMode::AllowOnly);
    }
}

// resolver.rs - Member resolution against a published binding
//
// Precedence, per access kind:
//   get:       strategy -> named getter -> field -> generic getters
//   set:       strategy -> named setter -> field -> generic setters
//   call:      strategy -> method overloads
//   construct: strategy -> constructors
// Named members always win over generic accessors. Within one category the
// first registered candidate that accepts the arguments wins.

use crate::binding::{
    AccessKind, ClassBinding, HostObject, InvokeError, MemberAccess, MethodDescriptor,
};
use crate::value::ScriptValue;
use indexmap::{IndexMap, IndexSet};
use std::any::Any;

/// Result of a lookup that may legitimately find nothing.
///
/// `Missing` is not an error here; the runtime reports it as a script-level
/// "property not found".
#[derive(Debug, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Missing,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing => None,
        }
    }
}

pub struct MemberResolver<'b> {
    binding: &'b ClassBinding,
}

impl<'b> MemberResolver<'b> {
    pub fn new(binding: &'b ClassBinding) -> Self {
        Self { binding }
    }

    fn access<'a>(&'a self, name: &'a str, kind: AccessKind) -> MemberAccess<'a> {
        MemberAccess::new(self.binding.target_class(), name, kind)
    }

    pub fn get(
        &self,
        receiver: &mut dyn Any,
        name: &str,
    ) -> Result<Lookup<ScriptValue>, InvokeError> {
        let access = self.access(name, AccessKind::Get);
        if let Some(value) = self.binding.policy().strategy().intercept_get(&access, receiver)? {
            tracing::trace!(class = access.class.name(), name, "get intercepted");
            return Ok(Lookup::Found(value));
        }

        let descriptor = self.binding.descriptor();
        if let Some(getter) = first_accepting(descriptor.getters_map().get(name), 0) {
            return getter.invoke(receiver, &[]).map(Lookup::Found);
        }
        if let Some(field) = descriptor.field_map().get(name) {
            return field.get(receiver).map(Lookup::Found);
        }
        for getter in descriptor.generic_getters() {
            if let Some(value) = getter.get(receiver, name)? {
                return Ok(Lookup::Found(value));
            }
        }
        Ok(Lookup::Missing)
    }

    pub fn set(
        &self,
        receiver: &mut dyn Any,
        name: &str,
        value: ScriptValue,
    ) -> Result<Lookup<()>, InvokeError> {
        let access = self.access(name, AccessKind::Set);
        if self
            .binding
            .policy()
            .strategy()
            .intercept_set(&access, receiver, &value)?
        {
            tracing::trace!(class = access.class.name(), name, "set intercepted");
            return Ok(Lookup::Found(()));
        }

        let descriptor = self.binding.descriptor();
        if let Some(setter) = first_accepting(descriptor.setters_map().get(name), 1) {
            return setter.invoke(receiver, &[value]).map(|_| Lookup::Found(()));
        }
        if let Some(field) = descriptor.field_map().get(name) {
            return field.set(receiver, value).map(Lookup::Found);
        }
        for setter in descriptor.generic_setters() {
            if setter.set(receiver, name, value.clone())? {
                return Ok(Lookup::Found(()));
            }
        }
        Ok(Lookup::Missing)
    }

    pub fn call(
        &self,
        receiver: &mut dyn Any,
        name: &str,
        args: &[ScriptValue],
    ) -> Result<Lookup<ScriptValue>, InvokeError> {
        let access = self.access(name, AccessKind::Call);
        if let Some(value) = self
            .binding
            .policy()
            .strategy()
            .intercept_call(&access, receiver, args)?
        {
            tracing::trace!(class = access.class.name(), name, "call intercepted");
            return Ok(Lookup::Found(value));
        }

        match self.binding.descriptor().methods_map().get(name) {
            Some(overloads) => match first_accepting(Some(overloads), args.len()) {
                Some(method) => method.invoke(receiver, args).map(Lookup::Found),
                None => Err(InvokeError::ArityMismatch {
                    member: name.to_string(),
                    count: args.len(),
                }),
            },
            None => Ok(Lookup::Missing),
        }
    }

    pub fn construct(&self, args: &[ScriptValue]) -> Result<Lookup<HostObject>, InvokeError> {
        let class_name = self.binding.target_class().name();
        let access = self.access(class_name, AccessKind::Construct);
        if let Some(instance) = self
            .binding
            .policy()
            .strategy()
            .intercept_construct(&access, args)?
        {
            return Ok(Lookup::Found(instance));
        }

        let constructors = self.binding.descriptor().constructors();
        if constructors.is_empty() {
            return Ok(Lookup::Missing);
        }
        match constructors.iter().find(|ctor| ctor.accepts(args.len())) {
            Some(ctor) => ctor.construct(args).map(Lookup::Found),
            None => Err(InvokeError::ArityMismatch {
                member: class_name.to_string(),
                count: args.len(),
            }),
        }
    }

    /// Invoke the instance itself as a function.
    pub fn apply(
        &self,
        receiver: &mut dyn Any,
        args: &[ScriptValue],
    ) -> Result<Lookup<ScriptValue>, InvokeError> {
        let functions = self.binding.descriptor().apply_functions();
        if functions.is_empty() {
            return Ok(Lookup::Missing);
        }
        match functions.iter().find(|function| function.accepts(args.len())) {
            Some(function) => function.invoke(receiver, args).map(Lookup::Found),
            None => Err(InvokeError::ArityMismatch {
                member: self.binding.target_class().name().to_string(),
                count: args.len(),
            }),
        }
    }

    /// Enumerable property names: fields, then getters, in registration order.
    pub fn keys(&self) -> Vec<&'b str> {
        let descriptor = self.binding.descriptor();
        let keys: IndexSet<&'b str> = descriptor
            .field_map()
            .keys()
            .chain(descriptor.getters_map().keys())
            .map(String::as_str)
            .collect();
        keys.into_iter().collect()
    }

    /// Read every enumerable property eagerly, in enumeration order.
    pub fn snapshot(
        &self,
        receiver: &mut dyn Any,
    ) -> Result<IndexMap<String, ScriptValue>, InvokeError> {
        let mut props = IndexMap::new();
        for key in self.keys() {
            if let Lookup::Found(value) = self.get(receiver, key)? {
                props.insert(key.to_string(), value);
            }
        }
        Ok(props)
    }
}

fn first_accepting(
    overloads: Option<&Vec<MethodDescriptor>>,
    count: usize,
) -> Option<&MethodDescriptor> {
    overloads?.iter().find(|method| method.accepts(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{
        Arity, ClassDescriptorBuilder, CollisionPolicy, ConstructorDescriptor, FieldDescriptor,
        GenericGetter, GenericSetter, HostClass, InterceptionStrategy, ProxyMode, ProxyPolicy,
        PassThrough, arg_f64,
    };
    use std::sync::Arc;

    struct Counter {
        value: i64,
        extras: IndexMap<String, ScriptValue>,
    }
    crate::define_host_class!(Counter, "Counter");

    fn counter_binding(strategy: Arc<dyn InterceptionStrategy>) -> ClassBinding {
        let mut builder = ClassDescriptorBuilder::new(Counter::class_ref());
        builder.add_constructor(ConstructorDescriptor::new::<Counter, _>(Arity::Exact(1), |args| {
            Ok(Counter {
                value: arg_f64(args, 0)? as i64,
                extras: IndexMap::new(),
            })
        }));
        builder.add_field(FieldDescriptor::writable::<Counter, _, _>(
            "value",
            |c| c.value.into(),
            |c, v| {
                c.value = v.as_i64().unwrap_or_default();
                Ok(())
            },
        ));
        builder.add_getter(MethodDescriptor::getter::<Counter, _>("doubled", |c| (c.value * 2).into()));
        builder.add_method(MethodDescriptor::new::<Counter, _>("add", Arity::Exact(1), |c, args| {
            c.value += arg_f64(args, 0)? as i64;
            Ok(c.value.into())
        }));
        builder.add_method(MethodDescriptor::new::<Counter, _>("add", Arity::Exact(2), |c, args| {
            c.value += (arg_f64(args, 0)? + arg_f64(args, 1)?) as i64;
            Ok(c.value.into())
        }));
        builder.add_generic_getter(GenericGetter::new::<Counter, _>("extra", |c, key| {
            c.extras.get(key).cloned()
        }));
        builder.add_generic_setter(GenericSetter::new::<Counter, _>("setExtra", |c, key, value| {
            c.extras.insert(key.to_string(), value);
            true
        }));
        builder.add_apply_function(MethodDescriptor::new::<Counter, _>(
            "apply",
            Arity::Exact(0),
            |c, _| Ok(c.value.into()),
        ));

        let descriptor = builder.publish(CollisionPolicy::Reject).unwrap();
        let policy = ProxyPolicy::new(ProxyMode::Object, Counter::class_ref(), strategy);
        ClassBinding::new(policy, descriptor).unwrap()
    }

    fn counter(value: i64) -> Counter {
        Counter {
            value,
            extras: IndexMap::new(),
        }
    }

    /// Serves `value` itself and swallows writes to `locked`.
    struct Override;

    impl InterceptionStrategy for Override {
        fn intercept_get(
            &self,
            access: &MemberAccess<'_>,
            _receiver: &mut dyn Any,
        ) -> Result<Option<ScriptValue>, InvokeError> {
            Ok((access.name == "value").then(|| ScriptValue::from("intercepted")))
        }

        fn intercept_set(
            &self,
            access: &MemberAccess<'_>,
            _receiver: &mut dyn Any,
            _value: &ScriptValue,
        ) -> Result<bool, InvokeError> {
            Ok(access.name == "locked")
        }
    }

    #[test]
    fn test_named_members_resolve() {
        let binding = counter_binding(Arc::new(PassThrough));
        let resolver = binding.resolver();
        let mut c = counter(3);

        assert_eq!(resolver.get(&mut c, "value").unwrap(), Lookup::Found(ScriptValue::Int(3)));
        assert_eq!(resolver.get(&mut c, "doubled").unwrap(), Lookup::Found(ScriptValue::Int(6)));
        assert_eq!(resolver.call(&mut c, "add", &[2.into()]).unwrap(), Lookup::Found(5.into()));
        assert_eq!(resolver.call(&mut c, "add", &[1.into(), 1.into()]).unwrap(), Lookup::Found(7.into()));
        assert_eq!(resolver.set(&mut c, "value", 10.into()).unwrap(), Lookup::Found(()));
        assert_eq!(c.value, 10);
    }

    #[test]
    fn test_generic_accessors_are_fallback() {
        let binding = counter_binding(Arc::new(PassThrough));
        let resolver = binding.resolver();
        let mut c = counter(0);

        assert_eq!(resolver.get(&mut c, "color").unwrap(), Lookup::Missing);
        assert_eq!(resolver.set(&mut c, "color", "red".into()).unwrap(), Lookup::Found(()));
        assert_eq!(resolver.get(&mut c, "color").unwrap(), Lookup::Found("red".into()));

        // Named field wins over the generic setter.
        resolver.set(&mut c, "value", 4.into()).unwrap();
        assert_eq!(c.value, 4);
        assert!(!c.extras.contains_key("value"));
    }

    #[test]
    fn test_missing_and_arity_errors() {
        let binding = counter_binding(Arc::new(PassThrough));
        let resolver = binding.resolver();
        let mut c = counter(0);

        assert_eq!(resolver.call(&mut c, "nope", &[]).unwrap(), Lookup::Missing);
        assert_eq!(
            resolver.call(&mut c, "add", &[]),
            Err(InvokeError::ArityMismatch { member: "add".into(), count: 0 })
        );
        assert_eq!(
            resolver.construct(&[]).map(|l| l.is_found()),
            Err(InvokeError::ArityMismatch { member: "Counter".into(), count: 0 })
        );
    }

    #[test]
    fn test_construct_and_apply() {
        let binding = counter_binding(Arc::new(PassThrough));
        let resolver = binding.resolver();

        let mut instance = resolver.construct(&[5.into()]).unwrap().into_option().unwrap();
        assert_eq!(
            resolver.apply(&mut *instance, &[]).unwrap(),
            Lookup::Found(ScriptValue::Int(5))
        );
        assert!(resolver.apply(&mut *instance, &[1.into()]).is_err());
    }

    #[test]
    fn test_strategy_is_consulted_first() {
        let binding = counter_binding(Arc::new(Override));
        let resolver = binding.resolver();
        let mut c = counter(3);

        assert_eq!(resolver.get(&mut c, "value").unwrap(), Lookup::Found("intercepted".into()));
        assert_eq!(resolver.get(&mut c, "doubled").unwrap(), Lookup::Found(6.into()));
        assert_eq!(resolver.set(&mut c, "locked", 1.into()).unwrap(), Lookup::Found(()));
        assert!(c.extras.is_empty());
    }

    #[test]
    fn test_keys_and_snapshot_follow_registration_order() {
        let binding = counter_binding(Arc::new(PassThrough));
        let resolver = binding.resolver();
        let mut c = counter(2);

        assert_eq!(resolver.keys(), ["value", "doubled"]);
        let snapshot = resolver.snapshot(&mut c).unwrap();
        assert_eq!(ScriptValue::Object(snapshot).to_string(), "{ value: 2, doubled: 4 }");
    }
}

// member.rs - Statically declared member descriptors
//
// Each descriptor wraps a typed closure behind a `dyn Any` receiver so a
// class's member table can be stored without generics. Receivers are
// downcast on every call; a mismatch is an InvokeError, never a panic.

use crate::binding::{Exposure, InvokeError};
use crate::value::ScriptValue;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Boxed host instance produced by constructors.
pub type HostObject = Box<dyn Any + Send>;

type FieldGetter = Arc<dyn Fn(&dyn Any) -> Result<ScriptValue, InvokeError> + Send + Sync>;
type FieldSetter = Arc<dyn Fn(&mut dyn Any, ScriptValue) -> Result<(), InvokeError> + Send + Sync>;
type MethodInvoker =
    Arc<dyn Fn(&mut dyn Any, &[ScriptValue]) -> Result<ScriptValue, InvokeError> + Send + Sync>;
type Factory = Arc<dyn Fn(&[ScriptValue]) -> Result<HostObject, InvokeError> + Send + Sync>;
type KeyedGetter =
    Arc<dyn Fn(&dyn Any, &str) -> Result<Option<ScriptValue>, InvokeError> + Send + Sync>;
type KeyedSetter =
    Arc<dyn Fn(&mut dyn Any, &str, ScriptValue) -> Result<bool, InvokeError> + Send + Sync>;

/// Number of arguments a callable member accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    #[inline]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

fn downcast_ref<T: Any>(receiver: &dyn Any) -> Result<&T, InvokeError> {
    receiver
        .downcast_ref::<T>()
        .ok_or(InvokeError::ReceiverMismatch {
            expected: type_name::<T>(),
        })
}

fn downcast_mut<T: Any>(receiver: &mut dyn Any) -> Result<&mut T, InvokeError> {
    receiver
        .downcast_mut::<T>()
        .ok_or(InvokeError::ReceiverMismatch {
            expected: type_name::<T>(),
        })
}

/// Fetch argument `index` or fail with a type error naming `expected`.
pub fn arg<'a>(
    args: &'a [ScriptValue],
    index: usize,
    expected: &'static str,
) -> Result<&'a ScriptValue, InvokeError> {
    args.get(index).ok_or(InvokeError::ArgumentType {
        index,
        expected,
        found: "undefined",
    })
}

pub fn arg_f64(args: &[ScriptValue], index: usize) -> Result<f64, InvokeError> {
    let value = arg(args, index, "number")?;
    value.as_f64().ok_or(InvokeError::ArgumentType {
        index,
        expected: "number",
        found: value.type_name(),
    })
}

pub fn arg_i64(args: &[ScriptValue], index: usize) -> Result<i64, InvokeError> {
    let value = arg(args, index, "integer")?;
    value.as_i64().ok_or(InvokeError::ArgumentType {
        index,
        expected: "integer",
        found: value.type_name(),
    })
}

pub fn arg_str(args: &[ScriptValue], index: usize) -> Result<&str, InvokeError> {
    let value = arg(args, index, "string")?;
    value.as_str().ok_or(InvokeError::ArgumentType {
        index,
        expected: "string",
        found: value.type_name(),
    })
}

/// A data field exposed as a script property.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    exposure: Exposure,
    getter: FieldGetter,
    setter: Option<FieldSetter>,
}

impl FieldDescriptor {
    pub fn readonly<T, G>(name: impl Into<String>, get: G) -> Self
    where
        T: Any,
        G: Fn(&T) -> ScriptValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            exposure: Exposure::Default,
            getter: Arc::new(move |receiver: &dyn Any| Ok(get(downcast_ref::<T>(receiver)?))),
            setter: None,
        }
    }

    pub fn writable<T, G, S>(name: impl Into<String>, get: G, set: S) -> Self
    where
        T: Any,
        G: Fn(&T) -> ScriptValue + Send + Sync + 'static,
        S: Fn(&mut T, ScriptValue) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        let mut field = Self::readonly::<T, G>(name, get);
        field.setter = Some(Arc::new(move |receiver: &mut dyn Any, value: ScriptValue| {
            set(downcast_mut::<T>(receiver)?, value)
        }));
        field
    }

    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn get(&self, receiver: &dyn Any) -> Result<ScriptValue, InvokeError> {
        (self.getter)(receiver)
    }

    pub fn set(&self, receiver: &mut dyn Any, value: ScriptValue) -> Result<(), InvokeError> {
        match &self.setter {
            Some(setter) => setter(receiver, value),
            None => Err(InvokeError::ReadOnly {
                name: self.name.clone(),
            }),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("exposure", &self.exposure)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// One overload of a host method. Named getters, setters and apply
/// functions are methods too.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    arity: Arity,
    exposure: Exposure,
    invoker: MethodInvoker,
}

impl MethodDescriptor {
    pub fn new<T, F>(name: impl Into<String>, arity: Arity, f: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, &[ScriptValue]) -> Result<ScriptValue, InvokeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity,
            exposure: Exposure::Default,
            invoker: Arc::new(move |receiver: &mut dyn Any, args: &[ScriptValue]| {
                f(downcast_mut::<T>(receiver)?, args)
            }),
        }
    }

    /// Zero-argument accessor registered in the getters map.
    pub fn getter<T, G>(name: impl Into<String>, get: G) -> Self
    where
        T: Any,
        G: Fn(&T) -> ScriptValue + Send + Sync + 'static,
    {
        Self::new::<T, _>(name, Arity::Exact(0), move |receiver, _| Ok(get(receiver)))
    }

    /// One-argument mutator registered in the setters map.
    pub fn setter<T, S>(name: impl Into<String>, set: S) -> Self
    where
        T: Any,
        S: Fn(&mut T, ScriptValue) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        Self::new::<T, _>(name, Arity::Exact(1), move |receiver, args| {
            let value = args.first().cloned().unwrap_or_default();
            set(receiver, value)?;
            Ok(ScriptValue::Undefined)
        })
    }

    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    pub fn accepts(&self, count: usize) -> bool {
        self.arity.accepts(count)
    }

    pub fn invoke(
        &self,
        receiver: &mut dyn Any,
        args: &[ScriptValue],
    ) -> Result<ScriptValue, InvokeError> {
        if !self.accepts(args.len()) {
            return Err(InvokeError::ArityMismatch {
                member: self.name.clone(),
                count: args.len(),
            });
        }
        (self.invoker)(receiver, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("exposure", &self.exposure)
            .finish()
    }
}

/// Constructor usable from script-side `new`.
#[derive(Clone)]
pub struct ConstructorDescriptor {
    arity: Arity,
    exposure: Exposure,
    factory: Factory,
}

impl ConstructorDescriptor {
    pub fn new<T, F>(arity: Arity, f: F) -> Self
    where
        T: Any + Send,
        F: Fn(&[ScriptValue]) -> Result<T, InvokeError> + Send + Sync + 'static,
    {
        Self {
            arity,
            exposure: Exposure::Default,
            factory: Arc::new(move |args: &[ScriptValue]| Ok(Box::new(f(args)?) as HostObject)),
        }
    }

    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    pub fn accepts(&self, count: usize) -> bool {
        self.arity.accepts(count)
    }

    pub fn construct(&self, args: &[ScriptValue]) -> Result<HostObject, InvokeError> {
        (self.factory)(args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("arity", &self.arity)
            .field("exposure", &self.exposure)
            .finish()
    }
}

/// Fallback property reader consulted when no named member matches.
///
/// The accessor returns `None` for keys it does not handle.
#[derive(Clone)]
pub struct GenericGetter {
    name: String,
    exposure: Exposure,
    getter: KeyedGetter,
}

impl GenericGetter {
    pub fn new<T, G>(name: impl Into<String>, get: G) -> Self
    where
        T: Any,
        G: Fn(&T, &str) -> Option<ScriptValue> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            exposure: Exposure::Default,
            getter: Arc::new(move |receiver: &dyn Any, key: &str| {
                Ok(get(downcast_ref::<T>(receiver)?, key))
            }),
        }
    }

    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    /// Host method name backing this accessor.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    pub fn get(&self, receiver: &dyn Any, key: &str) -> Result<Option<ScriptValue>, InvokeError> {
        (self.getter)(receiver, key)
    }
}

impl fmt::Debug for GenericGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericGetter")
            .field("name", &self.name)
            .field("exposure", &self.exposure)
            .finish()
    }
}

/// Fallback property writer; returns `false` for keys it does not handle.
#[derive(Clone)]
pub struct GenericSetter {
    name: String,
    exposure: Exposure,
    setter: KeyedSetter,
}

impl GenericSetter {
    pub fn new<T, S>(name: impl Into<String>, set: S) -> Self
    where
        T: Any,
        S: Fn(&mut T, &str, ScriptValue) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            exposure: Exposure::Default,
            setter: Arc::new(move |receiver: &mut dyn Any, key: &str, value: ScriptValue| {
                Ok(set(downcast_mut::<T>(receiver)?, key, value))
            }),
        }
    }

    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    pub fn set(
        &self,
        receiver: &mut dyn Any,
        key: &str,
        value: ScriptValue,
    ) -> Result<bool, InvokeError> {
        (self.setter)(receiver, key, value)
    }
}

impl fmt::Debug for GenericSetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericSetter")
            .field("name", &self.name)
            .field("exposure", &self.exposure)
            .finish()
    }
}

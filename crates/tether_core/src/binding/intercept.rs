//! Interception strategies
//!
//! A strategy is consulted before the member registry on every access and
//! may short-circuit resolution. Returning `Ok(None)` (or `Ok(false)` for
//! writes) falls back to the registry.

use crate::binding::{ClassRef, HostObject, InvokeError};
use crate::value::ScriptValue;
use std::any::Any;

/// Kind of member access being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Get,
    Set,
    Call,
    Construct,
}

/// What a strategy is offered for every access.
#[derive(Clone, Copy, Debug)]
pub struct MemberAccess<'a> {
    pub class: &'a ClassRef,
    pub name: &'a str,
    pub kind: AccessKind,
}

impl<'a> MemberAccess<'a> {
    pub fn new(class: &'a ClassRef, name: &'a str, kind: AccessKind) -> Self {
        Self { class, name, kind }
    }
}

pub trait InterceptionStrategy: Send + Sync {
    /// Whether this strategy can expose `class` through a class-mode proxy.
    fn is_proxyable(&self, _class: &ClassRef) -> bool {
        true
    }

    fn intercept_get(
        &self,
        _access: &MemberAccess<'_>,
        _receiver: &mut dyn Any,
    ) -> Result<Option<ScriptValue>, InvokeError> {
        Ok(None)
    }

    /// Return `true` when the write was handled.
    fn intercept_set(
        &self,
        _access: &MemberAccess<'_>,
        _receiver: &mut dyn Any,
        _value: &ScriptValue,
    ) -> Result<bool, InvokeError> {
        Ok(false)
    }

    fn intercept_call(
        &self,
        _access: &MemberAccess<'_>,
        _receiver: &mut dyn Any,
        _args: &[ScriptValue],
    ) -> Result<Option<ScriptValue>, InvokeError> {
        Ok(None)
    }

    fn intercept_construct(
        &self,
        _access: &MemberAccess<'_>,
        _args: &[ScriptValue],
    ) -> Result<Option<HostObject>, InvokeError> {
        Ok(None)
    }
}

/// Strategy that never intercepts; every access goes to the registry.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl InterceptionStrategy for PassThrough {}

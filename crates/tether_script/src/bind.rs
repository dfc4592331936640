//! Eager exposure of bound host instances
//!
//! Copies a bound instance's enumerable properties into a plain script
//! object. Later host-side changes are not reflected; use the resolver for
//! live access.

use crate::convert::to_js;
use crate::error::ScriptError;
use rquickjs::{Ctx, Object};
use std::any::Any;
use tether_core::binding::{ClassBinding, ConversionMode};
use tether_core::ScriptValue;

/// Build a script object holding a snapshot of `receiver`.
pub fn snapshot_object<'js>(
    ctx: &Ctx<'js>,
    binding: &ClassBinding,
    receiver: &mut dyn Any,
) -> Result<Object<'js>, ScriptError> {
    let mode = binding.policy().conversion_mode();
    let props = binding.resolver().snapshot(receiver)?;

    let object = Object::new(ctx.clone())?;
    for (key, value) in props {
        object.set(key.as_str(), to_js(ctx, &restrict(value, mode))?)?;
    }
    tracing::trace!(class = binding.target_class().name(), "instance snapshot created");
    Ok(object)
}

/// Properties are one level below the instance, so restricted modes leave
/// their containers opaque.
fn restrict(value: ScriptValue, mode: ConversionMode) -> ScriptValue {
    if mode.converts_nested() {
        return value;
    }
    match value {
        ScriptValue::Array(_) => ScriptValue::Opaque("Array".into()),
        ScriptValue::Object(_) => ScriptValue::Opaque("Object".into()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rquickjs::{Context, Runtime};
    use std::sync::Arc;
    use tether_core::binding::{
        ClassDescriptorBuilder, CollisionPolicy, Exposure, FieldDescriptor, HostClass, PassThrough,
        ProxyMode, ProxyPolicy,
    };

    struct Player {
        name: String,
        scores: Vec<i64>,
    }
    tether_core::define_host_class!(Player, "Player");

    struct Secret {
        code: i64,
        tags: Vec<i64>,
    }
    tether_core::define_host_class!(Secret, "Secret", conversion = AllowOnly);

    fn player_binding() -> ClassBinding {
        let mut builder = ClassDescriptorBuilder::new(Player::class_ref());
        builder.add_field(FieldDescriptor::readonly::<Player, _>("name", |p| p.name.as_str().into()));
        builder.add_field(FieldDescriptor::readonly::<Player, _>("scores", |p| {
            p.scores.iter().map(|s| ScriptValue::Int(*s)).collect::<Vec<_>>().into()
        }));
        let descriptor = builder.publish(CollisionPolicy::Reject).unwrap();
        let policy = ProxyPolicy::new(ProxyMode::Object, Player::class_ref(), Arc::new(PassThrough));
        ClassBinding::new(policy, descriptor).unwrap()
    }

    fn secret_binding() -> ClassBinding {
        let mut builder = ClassDescriptorBuilder::new(Secret::class_ref());
        builder.add_field(
            FieldDescriptor::readonly::<Secret, _>("code", |s| s.code.into())
                .with_exposure(Exposure::Allow),
        );
        builder.add_field(
            FieldDescriptor::readonly::<Secret, _>("tags", |s| {
                s.tags.iter().map(|t| ScriptValue::Int(*t)).collect::<Vec<_>>().into()
            })
            .with_exposure(Exposure::Allow),
        );
        builder.add_field(FieldDescriptor::readonly::<Secret, _>("hidden", |_| 1.into()));
        let descriptor = builder.publish(CollisionPolicy::Reject).unwrap();
        let policy = ProxyPolicy::new(ProxyMode::Object, Secret::class_ref(), Arc::new(PassThrough));
        ClassBinding::new(policy, descriptor).unwrap()
    }

    #[test]
    fn snapshot_exposes_fields_in_order() {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();
        let binding = player_binding();
        let mut player = Player {
            name: "ada".into(),
            scores: vec![3, 5],
        };

        context.with(|ctx| {
            let object = snapshot_object(&ctx, &binding, &mut player).unwrap();
            ctx.globals().set("player", object).unwrap();
            let json: String = ctx.eval("JSON.stringify(player)").unwrap();
            assert_eq!(json, r#"{"name":"ada","scores":[3,5]}"#);
        });
    }

    #[test]
    fn restricted_snapshot_hides_members_and_nesting() {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();
        let binding = secret_binding();
        let mut secret = Secret {
            code: 7,
            tags: vec![1],
        };

        context.with(|ctx| {
            let object = snapshot_object(&ctx, &binding, &mut secret).unwrap();
            ctx.globals().set("secret", object).unwrap();
            let keys: String = ctx.eval("Object.keys(secret).join(',')").unwrap();
            assert_eq!(keys, "code,tags");
            let tags_undefined: bool = ctx.eval("secret.tags === undefined").unwrap();
            assert!(tags_undefined);
        });
    }

    #[test]
    fn object_mode_exposure_is_a_snapshot() {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();
        let binding = player_binding();
        assert_eq!(binding.policy().proxy_mode(), ProxyMode::Object);
        let mut player = Player {
            name: "ada".into(),
            scores: vec![1],
        };

        context.with(|ctx| {
            let object = snapshot_object(&ctx, &binding, &mut player).unwrap();
            ctx.globals().set("player", object).unwrap();
        });
        player.name = "grace".into();

        let live = binding.resolver().snapshot(&mut player).unwrap();
        assert_eq!(live["name"], ScriptValue::from("grace"));
        context.with(|ctx| {
            let name: String = ctx.eval("player.name").unwrap();
            assert_eq!(name, "ada");
        });
    }
}

// demo.rs - Sample host class bound when no script is given

use tether_core::binding::{
    arg_f64, Arity, ClassDescriptorBuilder, ConstructorDescriptor, FieldDescriptor, HostClass,
    MethodDescriptor,
};
use tether_core::ScriptValue;

pub const SCRIPT: &str = r#"
globalThis.summary = `${origin.x},${origin.y} (length ${origin.length})`;
Promise.reject(new Error("demo rejection"));
"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

fn write_f64(target: &mut f64, value: ScriptValue) -> Result<(), tether_core::binding::InvokeError> {
    *target = arg_f64(&[value], 0)?;
    Ok(())
}

impl HostClass for Vec2 {
    const NAME: &'static str = "Vec2";

    fn declare(builder: &mut ClassDescriptorBuilder) {
        builder.add_constructor(ConstructorDescriptor::new::<Vec2, _>(Arity::Exact(2), |args| {
            Ok(Vec2 {
                x: arg_f64(args, 0)?,
                y: arg_f64(args, 1)?,
            })
        }));
        builder.add_field(FieldDescriptor::writable::<Vec2, _, _>(
            "x",
            |v| v.x.into(),
            |v, value| write_f64(&mut v.x, value),
        ));
        builder.add_field(FieldDescriptor::writable::<Vec2, _, _>(
            "y",
            |v| v.y.into(),
            |v, value| write_f64(&mut v.y, value),
        ));
        builder.add_getter(MethodDescriptor::getter::<Vec2, _>("length", |v| {
            v.x.hypot(v.y).into()
        }));
        builder.add_method(MethodDescriptor::new::<Vec2, _>("scale", Arity::Exact(1), |v, args| {
            let factor = arg_f64(args, 0)?;
            v.x *= factor;
            v.y *= factor;
            Ok(ScriptValue::Undefined)
        }));
    }
}

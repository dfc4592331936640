// convert.rs - Engine values <-> ScriptValue
//
// Transparent classes convert containers recursively. Restricted modes
// convert the top-level container only; nested containers come back opaque.
// A container already on the current path, or one past the depth or node
// limits, also comes back opaque.

use indexmap::IndexMap;
use rquickjs::{Array, Ctx, Object, Value};
use tether_core::binding::ConversionMode;
use tether_core::ScriptValue;

/// Deepest container nesting copied out of the engine.
pub const MAX_DEPTH: usize = 64;

/// Containers copied by a single conversion before the rest turn opaque.
pub const MAX_CONTAINERS: usize = 10_000;

/// Copy an engine value into a [`ScriptValue`].
pub fn from_js(value: &Value<'_>, mode: ConversionMode) -> rquickjs::Result<ScriptValue> {
    Walk {
        mode,
        path: Vec::new(),
        budget: MAX_CONTAINERS,
    }
    .convert(value)
}

/// Copy an engine value without looking inside containers.
///
/// No properties are enumerated, so no script getters run. Arrays and
/// objects come back as `Opaque("Array")` and `Opaque("Object")`.
pub fn from_js_shallow(value: &Value<'_>) -> ScriptValue {
    match scalar(value) {
        Ok(Some(converted)) => converted,
        Ok(None) if value.is_object() => ScriptValue::Opaque(container_name(value).to_string()),
        _ => ScriptValue::Opaque(value.type_name().to_string()),
    }
}

fn scalar(value: &Value<'_>) -> rquickjs::Result<Option<ScriptValue>> {
    let converted = if value.is_undefined() {
        ScriptValue::Undefined
    } else if value.is_null() {
        ScriptValue::Null
    } else if let Some(b) = value.as_bool() {
        ScriptValue::Bool(b)
    } else if let Some(i) = value.as_int() {
        ScriptValue::Int(i64::from(i))
    } else if let Some(f) = value.as_float() {
        ScriptValue::Float(f)
    } else if let Some(s) = value.as_string() {
        ScriptValue::String(s.to_string()?)
    } else if value.is_promise() {
        ScriptValue::Opaque("Promise".into())
    } else if value.is_function() {
        ScriptValue::Opaque("Function".into())
    } else if let Some(exception) = value.as_exception() {
        ScriptValue::String(exception.message().unwrap_or_default())
    } else {
        return Ok(None);
    };
    Ok(Some(converted))
}

fn container_name(value: &Value<'_>) -> &'static str {
    if value.is_array() {
        "Array"
    } else {
        "Object"
    }
}

struct Walk<'js> {
    mode: ConversionMode,
    /// Containers currently being converted, outermost first.
    path: Vec<Value<'js>>,
    budget: usize,
}

impl<'js> Walk<'js> {
    fn convert(&mut self, value: &Value<'js>) -> rquickjs::Result<ScriptValue> {
        if let Some(converted) = scalar(value)? {
            return Ok(converted);
        }
        if !value.is_object() {
            return Ok(ScriptValue::Opaque(value.type_name().to_string()));
        }

        let descend = self.path.is_empty() || self.mode.converts_nested();
        if !descend
            || self.path.len() >= MAX_DEPTH
            || self.budget == 0
            || self.path.contains(value)
        {
            return Ok(ScriptValue::Opaque(container_name(value).to_string()));
        }

        self.budget -= 1;
        self.path.push(value.clone());
        let converted = self.descend(value);
        self.path.pop();
        converted
    }

    fn descend(&mut self, value: &Value<'js>) -> rquickjs::Result<ScriptValue> {
        if let Some(array) = value.as_array() {
            let mut items = Vec::with_capacity(array.len());
            for item in array.iter::<Value>() {
                items.push(self.convert(&item?)?);
            }
            return Ok(ScriptValue::Array(items));
        }
        let mut props = IndexMap::new();
        if let Some(object) = value.as_object() {
            for prop in object.props::<String, Value>() {
                let (key, item) = prop?;
                props.insert(key, self.convert(&item)?);
            }
        }
        Ok(ScriptValue::Object(props))
    }
}

/// Create an engine value from a [`ScriptValue`].
///
/// Opaque values cannot be recreated and become `undefined`.
pub fn to_js<'js>(ctx: &Ctx<'js>, value: &ScriptValue) -> rquickjs::Result<Value<'js>> {
    let converted = match value {
        ScriptValue::Undefined | ScriptValue::Opaque(_) => Value::new_undefined(ctx.clone()),
        ScriptValue::Null => Value::new_null(ctx.clone()),
        ScriptValue::Bool(b) => Value::new_bool(ctx.clone(), *b),
        ScriptValue::Int(i) => match i32::try_from(*i) {
            Ok(small) => Value::new_int(ctx.clone(), small),
            Err(_) => Value::new_float(ctx.clone(), *i as f64),
        },
        ScriptValue::Float(f) => Value::new_float(ctx.clone(), *f),
        ScriptValue::String(s) => rquickjs::String::from_str(ctx.clone(), s)?.into_value(),
        ScriptValue::Array(items) => {
            let array = Array::new(ctx.clone())?;
            for (index, item) in items.iter().enumerate() {
                array.set(index, to_js(ctx, item)?)?;
            }
            array.into_value()
        }
        ScriptValue::Object(props) => {
            let object = Object::new(ctx.clone())?;
            for (key, item) in props {
                object.set(key.as_str(), to_js(ctx, item)?)?;
            }
            object.into_value()
        }
    };
    Ok(converted)
}

use std::collections::BTreeMap;

use rhai::{Dynamic, Scope};

use crate::error::{ScriptError, ScriptResult};

/// Named host values injected into a script's scope for one evaluation.
///
/// The map form guarantees unique names. Injection order is unspecified.
pub type ScriptBindings = BTreeMap<String, BindingValue>;

/// The closed set of host value categories a binding may carry.
///
/// Keeping the host/script boundary to a finite enum (rather than open-ended
/// reflection) keeps conversions auditable: primitives pass through,
/// structured data becomes property-bearing script maps and arrays, and
/// [`BindingValue::Dynamic`] admits pre-built script values such as
/// instances of host types registered via
/// [`HostApi::register`](crate::HostApi::register).
#[derive(Debug, Clone)]
pub enum BindingValue {
    /// The unit value.
    Unit,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(String),
    /// Structured host data, converted to script maps/arrays.
    Json(serde_json::Value),
    /// A pre-built script value.
    Dynamic(Dynamic),
}

impl BindingValue {
    fn into_dynamic(self) -> ScriptResult<Dynamic> {
        Ok(match self {
            Self::Unit => Dynamic::UNIT,
            Self::Bool(value) => value.into(),
            Self::Int(value) => value.into(),
            Self::Float(value) => value.into(),
            Self::Str(value) => value.into(),
            Self::Json(value) => rhai::serde::to_dynamic(&value).map_err(|err| {
                ScriptError::Fatal(format!("failed to convert host binding: {err}"))
            })?,
            Self::Dynamic(value) => value,
        })
    }
}

impl From<bool> for BindingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for BindingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for BindingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for BindingValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for BindingValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<serde_json::Value> for BindingValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Dynamic> for BindingValue {
    fn from(value: Dynamic) -> Self {
        Self::Dynamic(value)
    }
}

/// Define one scope variable per binding.
///
/// The scope is fresh for every evaluation, so a binding can only shadow
/// what this call itself pushed earlier; names are unique by construction.
pub(crate) fn inject(scope: &mut Scope<'_>, bindings: ScriptBindings) -> ScriptResult<()> {
    for (name, value) in bindings {
        let value = value.into_dynamic()?;
        scope.push_dynamic(name, value);
    }
    Ok(())
}

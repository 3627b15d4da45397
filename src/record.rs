//! Reading property values off records.
//!
//! A compiled filter never inspects records directly; it asks a value getter
//! for each referenced property. The getters here cover the common record
//! shapes, and any `Fn(&R, &str) -> Option<String>` can be supplied for
//! domain types.
//!
//! Values are handed to operators as strings:
//! - **Strings**: returned as-is
//! - **Numbers / booleans**: their display form (`42`, `1.5`, `true`)
//! - **Arrays / objects**: JSON text
//! - **Null / missing**: `None`

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Reads one named property off a record of type `R`.
pub type ValueGetterFn<R> = Arc<dyn Fn(&R, &str) -> Option<String> + Send + Sync>;

/// Records that can be read without a custom getter.
pub trait Record {
    fn field(&self, name: &str) -> Option<String>;
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<String> {
        self.as_object()?.get(name).and_then(json_to_string)
    }
}

impl Record for serde_json::Map<String, Value> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).and_then(json_to_string)
    }
}

impl Record for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Record for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Getter that reads through the [`Record`] implementation.
pub fn default_value_getter<R: Record + 'static>() -> ValueGetterFn<R> {
    Arc::new(|record: &R, name: &str| record.field(name))
}

/// Wrap a closure as a [`ValueGetterFn`].
///
/// ```rust
/// use ogc_filter::record::value_getter;
///
/// struct City { name: String, population: u64 }
///
/// let getter = value_getter(|city: &City, field: &str| match field {
///     "name" => Some(city.name.clone()),
///     "population" => Some(city.population.to_string()),
///     _ => None,
/// });
///
/// let city = City { name: "Lyon".into(), population: 522_000 };
/// assert_eq!(getter(&city, "population"), Some("522000".to_string()));
/// ```
pub fn value_getter<R, F>(func: F) -> ValueGetterFn<R>
where
    F: Fn(&R, &str) -> Option<String> + Send + Sync + 'static,
{
    Arc::new(func)
}

/// Getter for nested JSON records addressed with dot notation
/// (`properties.address.city`, `geometry.coordinates.0`).
///
/// A property containing a literal dot is looked up as a plain key first.
pub fn json_path_getter() -> ValueGetterFn<Value> {
    Arc::new(|record: &Value, name: &str| {
        if let Some(value) = record.as_object().and_then(|o| o.get(name)) {
            return json_to_string(value);
        }

        let mut current = record;
        for part in name.split('.') {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        json_to_string(current)
    })
}

fn json_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

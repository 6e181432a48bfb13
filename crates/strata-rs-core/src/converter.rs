//! Converters turning raw environment strings into typed directive values.

use crate::ConversionError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type ConvertFn = dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync;

/// Raw strings treated as false by [`Converter::bool_like`].
const FALSY_VALUES: &[&str] = &["false", "0", "no", "off", "disable", "disabled", ""];

/// Name reserved for the naive truthiness converter.
pub(crate) const TRUTHY_NAME: &str = "truthy";

/// Named conversion function applied to environment-sourced values.
///
/// File values and overrides are already typed and never pass through a
/// converter.
#[derive(Clone)]
pub struct Converter {
    name: String,
    func: Arc<ConvertFn>,
}

impl Converter {
    /// Wrap a custom conversion function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Keep the raw string.
    pub fn string() -> Self {
        Self::new("string", |raw| Ok(Value::String(raw.to_string())))
    }

    /// Parse a signed 64-bit integer.
    pub fn integer() -> Self {
        Self::new("integer", |raw| {
            raw.trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|err| ConversionError::new("integer", raw, err))
        })
    }

    /// Parse a finite 64-bit float.
    pub fn float() -> Self {
        Self::new("float", |raw| {
            let parsed = raw
                .trim()
                .parse::<f64>()
                .map_err(|err| ConversionError::new("float", raw, err))?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| ConversionError::new("float", raw, "value is not finite"))
        })
    }

    /// Boolean conversion that understands the usual "off" spellings.
    pub fn bool_like() -> Self {
        Self::new("bool_like", |raw| Ok(Value::Bool(bool_like(raw))))
    }

    /// Deserialize the raw string as JSON.
    pub fn json() -> Self {
        Self::new("json", |raw| {
            serde_json::from_str(raw).map_err(|err| ConversionError::new("json", raw, err))
        })
    }

    /// Treat every non-empty string as true, including the text "false".
    ///
    /// Registering a directive with this converter records a warning;
    /// prefer [`Converter::bool_like`].
    pub fn truthy() -> Self {
        Self::new(TRUTHY_NAME, |raw| Ok(Value::Bool(!raw.is_empty())))
    }

    /// Resolve a standard converter by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "string" | "str" => Some(Self::string()),
            "integer" | "int" => Some(Self::integer()),
            "float" => Some(Self::float()),
            "bool_like" | "bool" => Some(Self::bool_like()),
            "json" => Some(Self::json()),
            TRUTHY_NAME => Some(Self::truthy()),
            _ => None,
        }
    }

    /// Converter name used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the conversion.
    pub fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        (self.func)(raw)
    }

    pub(crate) fn is_truthy(&self) -> bool {
        self.name == TRUTHY_NAME
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({})", self.name)
    }
}

/// Case-insensitive boolean reading of a raw string.
pub fn bool_like(raw: &str) -> bool {
    let lowered = raw.to_lowercase();
    !FALSY_VALUES.contains(&lowered.as_str())
}

/// Turn an already parsed native value into a directive value.
///
/// This is the non-string path of JSON conversion, used for defaults and
/// overrides supplied as Rust structures. Fails when the value cannot be
/// represented as JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, ConversionError> {
    serde_json::to_value(value)
        .map_err(|err| ConversionError::new("json", std::any::type_name::<T>(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn bool_like_false_spellings() {
        for raw in ["0", "NO", "disabled", "Off", "false", "Disable", ""] {
            assert_eq!(
                Converter::bool_like().convert(raw).expect("convert"),
                json!(false),
                "{raw}"
            );
        }
    }

    #[test]
    fn bool_like_true_spellings() {
        for raw in ["1", "YES", "enabled", "True", "on"] {
            assert_eq!(
                Converter::bool_like().convert(raw).expect("convert"),
                json!(true),
                "{raw}"
            );
        }
    }

    #[test]
    fn truthy_treats_false_text_as_true() {
        for raw in ["0", "no", "disabled", "False", "enabled"] {
            assert_eq!(
                Converter::truthy().convert(raw).expect("convert"),
                json!(true)
            );
        }
        assert_eq!(Converter::truthy().convert("").expect("convert"), json!(false));
    }

    #[test]
    fn numeric_converters() {
        assert_eq!(Converter::integer().convert("42").expect("int"), json!(42));
        assert_eq!(Converter::integer().convert(" -7 ").expect("int"), json!(-7));
        assert_eq!(Converter::float().convert("1.5").expect("float"), json!(1.5));

        let err = Converter::integer().convert("abc").unwrap_err();
        assert_eq!(err.converter, "integer");
        assert_eq!(err.input, "abc");
        assert!(Converter::float().convert("inf").is_err());
    }

    #[test]
    fn json_parses_documents_and_scalars() {
        let value = Converter::json()
            .convert(r#"{"aha": [1, 1.2, false]}"#)
            .expect("json");
        assert_eq!(value, json!({"aha": [1, 1.2, false]}));
        assert_eq!(Converter::json().convert("1").expect("json"), json!(1));
        assert!(Converter::json().convert("{not json").is_err());
    }

    #[test]
    fn to_json_accepts_native_structures() {
        let mut map = BTreeMap::new();
        map.insert("hosts", vec!["a", "b"]);
        assert_eq!(to_json(&map).expect("json"), json!({"hosts": ["a", "b"]}));
    }

    #[test]
    fn to_json_rejects_non_string_map_keys() {
        let mut map = BTreeMap::new();
        map.insert((1, 2), "pair");
        let err = to_json(&map).unwrap_err();
        assert_eq!(err.converter, "json");
    }

    #[test]
    fn custom_converter_runs_closure() {
        let converter = Converter::new("ellipsis", |_| Ok(json!("...")));
        assert_eq!(converter.name(), "ellipsis");
        assert_eq!(converter.convert("42").expect("custom"), json!("..."));
    }

    #[test]
    fn by_name_resolves_standard_converters() {
        assert_eq!(Converter::by_name("int").expect("int").name(), "integer");
        assert!(Converter::by_name("truthy").expect("truthy").is_truthy());
        assert!(Converter::by_name("decimal").is_none());
    }
}

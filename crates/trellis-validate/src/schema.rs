//! Declarative payload schemas.
//!
//! A [`Schema`] describes the shape a request or response payload must have.
//! Schemas are built once at controller registration time and shared by the
//! pipeline stages that validate against them.
//!
//! # Example
//!
//! ```
//! use trellis_validate::Schema;
//!
//! let schema = Schema::object(vec![
//!     ("email", Schema::string().email().required()),
//!     ("password", Schema::string().min_length(8).required()),
//!     ("name", Schema::string()),
//! ]);
//!
//! let valid = serde_json::json!({
//!     "email": "test@gmail.com",
//!     "password": "passwo3d",
//!     "name": "Tenx"
//! });
//! assert!(schema.check(&valid).is_empty());
//! ```

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use trellis_core::FieldError;

/// Matches the practical shape of an email address; full RFC 5321 parsing is
/// out of scope for payload validation.
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles"))
}

/// A declarative schema for JSON payloads.
#[derive(Debug, Clone)]
pub enum Schema {
    /// String type.
    String {
        /// Whether this field is required.
        required: bool,
        /// Minimum length.
        min_length: Option<usize>,
        /// Maximum length.
        max_length: Option<usize>,
        /// Regex pattern the value must match.
        pattern: Option<String>,
        /// Whether the value must look like an email address.
        email: bool,
    },
    /// Integer type.
    Integer {
        /// Whether this field is required.
        required: bool,
        /// Minimum value.
        minimum: Option<i64>,
        /// Maximum value.
        maximum: Option<i64>,
    },
    /// Number (float) type.
    Number {
        /// Whether this field is required.
        required: bool,
        /// Minimum value.
        minimum: Option<f64>,
        /// Maximum value.
        maximum: Option<f64>,
    },
    /// Boolean type.
    Boolean {
        /// Whether this field is required.
        required: bool,
    },
    /// Array type.
    Array {
        /// Whether this field is required.
        required: bool,
        /// Schema for array items.
        items: Box<Schema>,
        /// Minimum number of items.
        min_items: Option<usize>,
        /// Maximum number of items.
        max_items: Option<usize>,
    },
    /// Object type. Properties keep declaration order so error lists are
    /// deterministic.
    Object {
        /// Whether this field is required.
        required: bool,
        /// Properties and their schemas, in declaration order.
        properties: Vec<(String, Schema)>,
        /// Names of required properties.
        required_properties: Vec<String>,
    },
    /// Any type (accepts anything).
    Any {
        /// Whether this field is required.
        required: bool,
    },
    /// Null type.
    Null,
}

impl Schema {
    /// Creates a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::String {
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            email: false,
        }
    }

    /// Creates an integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::Integer {
            required: false,
            minimum: None,
            maximum: None,
        }
    }

    /// Creates a number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::Number {
            required: false,
            minimum: None,
            maximum: None,
        }
    }

    /// Creates a boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::Boolean { required: false }
    }

    /// Creates an array schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::Array {
            required: false,
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// Creates an object schema from `(name, schema)` pairs.
    ///
    /// Properties marked [`required`](Self::required) become required
    /// properties of the object.
    #[must_use]
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        let required_properties: Vec<String> = properties
            .iter()
            .filter(|(_, schema)| schema.is_required())
            .map(|(name, _)| (*name).to_string())
            .collect();

        Self::Object {
            required: false,
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required_properties,
        }
    }

    /// Creates an "any" schema that accepts every value.
    #[must_use]
    pub fn any() -> Self {
        Self::Any { required: false }
    }

    /// Creates a null schema.
    #[must_use]
    pub fn null() -> Self {
        Self::Null
    }

    /// Marks this schema as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        match &mut self {
            Self::String { required, .. }
            | Self::Integer { required, .. }
            | Self::Number { required, .. }
            | Self::Boolean { required }
            | Self::Array { required, .. }
            | Self::Object { required, .. }
            | Self::Any { required } => *required = true,
            Self::Null => {}
        }
        self
    }

    /// Returns whether this schema is marked as required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        match self {
            Self::String { required, .. }
            | Self::Integer { required, .. }
            | Self::Number { required, .. }
            | Self::Boolean { required }
            | Self::Array { required, .. }
            | Self::Object { required, .. }
            | Self::Any { required } => *required,
            Self::Null => false,
        }
    }

    /// Sets the minimum length for string schemas.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let Self::String { min_length, .. } = &mut self {
            *min_length = Some(len);
        }
        self
    }

    /// Sets the maximum length for string schemas.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let Self::String { max_length, .. } = &mut self {
            *max_length = Some(len);
        }
        self
    }

    /// Sets the regex pattern for string schemas.
    #[must_use]
    pub fn pattern(mut self, source: impl Into<String>) -> Self {
        if let Self::String { pattern, .. } = &mut self {
            *pattern = Some(source.into());
        }
        self
    }

    /// Requires string values to look like an email address.
    #[must_use]
    pub fn email(mut self) -> Self {
        if let Self::String { email, .. } = &mut self {
            *email = true;
        }
        self
    }

    /// Sets the minimum value for integer schemas.
    #[must_use]
    pub fn minimum_int(mut self, min: i64) -> Self {
        if let Self::Integer { minimum, .. } = &mut self {
            *minimum = Some(min);
        }
        self
    }

    /// Sets the maximum value for integer schemas.
    #[must_use]
    pub fn maximum_int(mut self, max: i64) -> Self {
        if let Self::Integer { maximum, .. } = &mut self {
            *maximum = Some(max);
        }
        self
    }

    /// Sets the minimum item count for array schemas.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        if let Self::Array { min_items, .. } = &mut self {
            *min_items = Some(min);
        }
        self
    }

    /// Sets the maximum item count for array schemas.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        if let Self::Array { max_items, .. } = &mut self {
            *max_items = Some(max);
        }
        self
    }

    /// Validates a value, collecting every field-level failure in order.
    ///
    /// An empty result means the value conforms.
    #[must_use]
    pub fn check(&self, value: &Value) -> Vec<FieldError> {
        let mut errors = Vec::new();
        self.check_at_path(value, "$", &mut errors);
        errors
    }

    fn check_at_path(&self, value: &Value, path: &str, errors: &mut Vec<FieldError>) {
        if value.is_null() {
            if self.is_required() && !matches!(self, Self::Null) {
                errors.push(FieldError::new(path, "required field is null"));
            }
            return;
        }

        match self {
            Self::String {
                min_length,
                max_length,
                pattern,
                email,
                ..
            } => {
                let Some(s) = value.as_str() else {
                    errors.push(FieldError::new(
                        path,
                        format!("expected string, got {}", value_type_name(value)),
                    ));
                    return;
                };

                if let Some(min) = min_length {
                    if s.len() < *min {
                        errors.push(FieldError::new(
                            path,
                            format!("string length {} is less than minimum {}", s.len(), min),
                        ));
                    }
                }
                if let Some(max) = max_length {
                    if s.len() > *max {
                        errors.push(FieldError::new(
                            path,
                            format!("string length {} is greater than maximum {}", s.len(), max),
                        ));
                    }
                }
                if *email && !email_regex().is_match(s) {
                    errors.push(FieldError::new(path, "must be an email address"));
                }
                if let Some(source) = pattern {
                    // Patterns are authored at registration time; a pattern
                    // that does not compile is a configuration mistake and
                    // is surfaced as a validation failure.
                    match Regex::new(source) {
                        Ok(re) => {
                            if !re.is_match(s) {
                                errors.push(FieldError::new(
                                    path,
                                    format!("value does not match pattern '{source}'"),
                                ));
                            }
                        }
                        Err(_) => errors.push(FieldError::new(
                            path,
                            format!("schema pattern '{source}' is not a valid regex"),
                        )),
                    }
                }
            }

            Self::Integer {
                minimum, maximum, ..
            } => {
                let Some(n) = value.as_i64() else {
                    errors.push(FieldError::new(
                        path,
                        format!("expected integer, got {}", value_type_name(value)),
                    ));
                    return;
                };
                if let Some(min) = minimum {
                    if n < *min {
                        errors.push(FieldError::new(
                            path,
                            format!("value {n} is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        errors.push(FieldError::new(
                            path,
                            format!("value {n} is greater than maximum {max}"),
                        ));
                    }
                }
            }

            Self::Number {
                minimum, maximum, ..
            } => {
                let Some(n) = value.as_f64() else {
                    errors.push(FieldError::new(
                        path,
                        format!("expected number, got {}", value_type_name(value)),
                    ));
                    return;
                };
                if let Some(min) = minimum {
                    if n < *min {
                        errors.push(FieldError::new(
                            path,
                            format!("value {n} is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        errors.push(FieldError::new(
                            path,
                            format!("value {n} is greater than maximum {max}"),
                        ));
                    }
                }
            }

            Self::Boolean { .. } => {
                if !value.is_boolean() {
                    errors.push(FieldError::new(
                        path,
                        format!("expected boolean, got {}", value_type_name(value)),
                    ));
                }
            }

            Self::Array {
                items,
                min_items,
                max_items,
                ..
            } => {
                let Some(arr) = value.as_array() else {
                    errors.push(FieldError::new(
                        path,
                        format!("expected array, got {}", value_type_name(value)),
                    ));
                    return;
                };
                if let Some(min) = min_items {
                    if arr.len() < *min {
                        errors.push(FieldError::new(
                            path,
                            format!("array length {} is less than minimum {}", arr.len(), min),
                        ));
                    }
                }
                if let Some(max) = max_items {
                    if arr.len() > *max {
                        errors.push(FieldError::new(
                            path,
                            format!("array length {} is greater than maximum {}", arr.len(), max),
                        ));
                    }
                }
                for (idx, item) in arr.iter().enumerate() {
                    items.check_at_path(item, &format!("{path}[{idx}]"), errors);
                }
            }

            Self::Object {
                properties,
                required_properties,
                ..
            } => {
                let Some(obj) = value.as_object() else {
                    errors.push(FieldError::new(
                        path,
                        format!("expected object, got {}", value_type_name(value)),
                    ));
                    return;
                };
                for required in required_properties {
                    if !obj.contains_key(required) {
                        errors.push(FieldError::new(
                            format!("{path}.{required}"),
                            format!("missing required property '{required}'"),
                        ));
                    }
                }
                for (key, prop_schema) in properties {
                    if let Some(prop_value) = obj.get(key) {
                        prop_schema.check_at_path(prop_value, &format!("{path}.{key}"), errors);
                    }
                }
            }

            Self::Any { .. } => {}

            Self::Null => {
                if !value.is_null() {
                    errors.push(FieldError::new(
                        path,
                        format!("expected null, got {}", value_type_name(value)),
                    ));
                }
            }
        }
    }

    /// Projects a value onto the declared shape, dropping undeclared object
    /// fields recursively. Non-object values pass through unchanged.
    #[must_use]
    pub fn project(&self, value: &Value) -> Value {
        match (self, value) {
            (Self::Object { properties, .. }, Value::Object(obj)) => {
                let mut out = Map::new();
                for (key, prop_schema) in properties {
                    if let Some(prop_value) = obj.get(key) {
                        out.insert(key.clone(), prop_schema.project(prop_value));
                    }
                }
                Value::Object(out)
            }
            (Self::Array { items, .. }, Value::Array(arr)) => {
                Value::Array(arr.iter().map(|item| items.project(item)).collect())
            }
            _ => value.clone(),
        }
    }

    /// Collects the paths of object fields the schema does not declare.
    #[must_use]
    pub fn undeclared_fields(&self, value: &Value) -> Vec<String> {
        let mut found = Vec::new();
        self.undeclared_at_path(value, "$", &mut found);
        found
    }

    fn undeclared_at_path(&self, value: &Value, path: &str, found: &mut Vec<String>) {
        match (self, value) {
            (Self::Object { properties, .. }, Value::Object(obj)) => {
                for (key, prop_value) in obj {
                    match properties.iter().find(|(name, _)| name == key) {
                        Some((_, prop_schema)) => {
                            prop_schema.undeclared_at_path(
                                prop_value,
                                &format!("{path}.{key}"),
                                found,
                            );
                        }
                        None => found.push(format!("{path}.{key}")),
                    }
                }
            }
            (Self::Array { items, .. }, Value::Array(arr)) => {
                for (idx, item) in arr.iter().enumerate() {
                    items.undeclared_at_path(item, &format!("{path}[{idx}]"), found);
                }
            }
            _ => {}
        }
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

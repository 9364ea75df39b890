//! Output schemas for structured model calls.
//!
//! An [`OutputSchema`] is rendered into the prompt as JSON Schema and then used to
//! validate and coerce whatever object the model sends back.

use serde_json::{json, Map, Value};

use super::LlmError;

/// Value type of one schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    StringList,
}

impl FieldType {
    fn json_type(&self) -> Value {
        match self {
            FieldType::String => json!({"type": "string"}),
            FieldType::Integer => json!({"type": "integer"}),
            FieldType::StringList => json!({"type": "array", "items": {"type": "string"}}),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldType,
    pub required: bool,
    pub description: String,
    pub enum_values: Option<Vec<String>>,
}

impl SchemaField {
    fn new(name: &str, kind: FieldType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            description: description.to_string(),
            enum_values: None,
        }
    }

    pub fn string(name: &str, description: &str) -> Self {
        Self::new(name, FieldType::String, description)
    }

    pub fn integer(name: &str, description: &str) -> Self {
        Self::new(name, FieldType::Integer, description)
    }

    pub fn string_list(name: &str, description: &str) -> Self {
        Self::new(name, FieldType::StringList, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts a string field to the given values (matched case-insensitively).
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

/// JSON-schema-like descriptor for a structured call.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    fields: Vec<SchemaField>,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// JSON Schema object for the prompt.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for f in &self.fields {
            let mut prop = f.kind.json_type();
            if let Value::Object(ref mut obj) = prop {
                obj.insert("description".into(), Value::String(f.description.clone()));
                if let Some(values) = &f.enum_values {
                    obj.insert("enum".into(), json!(values));
                }
            }
            properties.insert(f.name.clone(), prop);
            if f.required {
                required.push(Value::String(f.name.clone()));
            }
        }
        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Validates `value` against the schema and returns only the declared fields.
    ///
    /// `null` counts as absent. Integers may arrive as numeric strings, lists as a
    /// comma-separated string. Unknown keys are dropped.
    pub fn coerce(&self, value: Value) -> Result<Map<String, Value>, LlmError> {
        let Value::Object(mut obj) = value else {
            return Err(violation(&self.name, "expected a JSON object"));
        };
        let mut out = Map::new();
        for f in &self.fields {
            let raw = obj.remove(&f.name).unwrap_or(Value::Null);
            if raw.is_null() {
                if f.required {
                    return Err(violation(&self.name, &format!("missing field `{}`", f.name)));
                }
                continue;
            }
            let coerced = coerce_field(f, raw)
                .map_err(|reason| violation(&self.name, &format!("field `{}`: {}", f.name, reason)))?;
            out.insert(f.name.clone(), coerced);
        }
        Ok(out)
    }
}

fn violation(schema: &str, reason: &str) -> LlmError {
    LlmError::SchemaViolation(format!("{}: {}", schema, reason))
}

fn coerce_field(field: &SchemaField, raw: Value) -> Result<Value, String> {
    match field.kind {
        FieldType::String => {
            let s = scalar_to_string(&raw).ok_or_else(|| format!("expected string, got {}", raw))?;
            if let Some(values) = &field.enum_values {
                let hit = values.iter().find(|v| v.eq_ignore_ascii_case(s.trim()));
                return match hit {
                    Some(v) => Ok(Value::String(v.clone())),
                    None => Err(format!("`{}` is not one of {:?}", s, values)),
                };
            }
            Ok(Value::String(s))
        }
        FieldType::Integer => match &raw {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(json!(i))
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 => Ok(json!(f as i64)),
                        _ => Err(format!("expected integer, got {}", n)),
                    }
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(|i| json!(i))
                .map_err(|_| format!("expected integer, got \"{}\"", s)),
            other => Err(format!("expected integer, got {}", other)),
        },
        FieldType::StringList => match raw {
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    if item.is_null() {
                        continue;
                    }
                    let s = scalar_to_string(&item)
                        .ok_or_else(|| format!("expected string item, got {}", item))?;
                    list.push(Value::String(s));
                }
                Ok(Value::Array(list))
            }
            Value::String(s) => Ok(Value::Array(
                s.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(|p| Value::String(p.to_string()))
                    .collect(),
            )),
            other => Err(format!("expected list of strings, got {}", other)),
        },
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

use serde_json::{json, Map, Value};

/// JSON type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    pub fn json_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// One declared parameter of a registry function.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
            default: None,
        }
    }

    pub fn optional(
        name: &'static str,
        kind: ParamType,
        description: &'static str,
        default: Value,
    ) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: Some(default),
        }
    }
}

/// Declared parameters of a registry function.
#[derive(Debug, Clone, Default)]
pub struct ParameterSchema {
    pub params: Vec<ParamSpec>,
}

impl ParameterSchema {
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// The JSON schema advertised to the model.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            let mut prop = json!({
                "type": p.kind.json_name(),
                "description": p.description,
            });
            if let Some(default) = &p.default {
                prop["default"] = default.clone();
            }
            properties.insert(p.name.to_string(), prop);
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        });
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// Checks `args` against the declared parameters.
    ///
    /// Required parameters must be present and non-null. Values are coerced
    /// to the declared type where that is unambiguous (numeric strings,
    /// `"true"`/`"false"`, numbers given for strings). Missing optional
    /// parameters take their default. Undeclared keys are dropped.
    pub fn validate(&self, args: &Value) -> Result<Map<String, Value>, String> {
        let empty = Map::new();
        let given = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => return Err("Arguments must be a JSON object".to_string()),
        };

        let mut out = Map::new();
        for p in &self.params {
            match given.get(p.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    out.insert(p.name.to_string(), coerce(p, value)?);
                }
                None if p.required => {
                    return Err(format!("Missing required parameter: {}", p.name));
                }
                None => {
                    if let Some(default) = &p.default {
                        out.insert(p.name.to_string(), default.clone());
                    }
                }
            }
        }
        Ok(out)
    }
}

fn coerce(spec: &ParamSpec, value: &Value) -> Result<Value, String> {
    let coerced = match (spec.kind, value) {
        (ParamType::String, Value::String(_)) => Some(value.clone()),
        (ParamType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (ParamType::Number, Value::Number(n)) => n.as_f64().map(normalize_number),
        (ParamType::Number, Value::String(s)) => s.trim().parse::<f64>().ok().map(normalize_number),
        (ParamType::Boolean, Value::Bool(_)) => Some(value.clone()),
        (ParamType::Boolean, Value::String(s)) => match s.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    coerced.ok_or_else(|| {
        format!(
            "Parameter '{}' must be a {}",
            spec.name,
            spec.kind.json_name()
        )
    })
}

/// Whole numbers become JSON integers so they deserialize into integer fields.
fn normalize_number(n: f64) -> Value {
    if n.fract() == 0.0 && n.is_finite() {
        if n >= 0.0 && n <= u64::MAX as f64 {
            return Value::from(n as u64);
        }
        if n < 0.0 && n >= i64::MIN as f64 {
            return Value::from(n as i64);
        }
    }
    Value::from(n)
}

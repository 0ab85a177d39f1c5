//! Request body validation
//!
//! Turns a JSON body into `NewPet` / `PetPatch`, collecting every field
//! error instead of stopping at the first one. The error object mirrors
//! the body: `{"field": ["message", ...]}`, with nested objects for
//! `group` and a per-item list for `traits`.

use kennel_domain::{NewGroup, NewPet, NewTrait, PetPatch, Sex};
use serde::Serialize;
use serde_json::{Map, Value};

pub const PET_NAME_MAX: usize = 50;
pub const SCIENTIFIC_NAME_MAX: usize = 50;
pub const TRAIT_NAME_MAX: usize = 20;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";

/// Structured field errors, serialized as the 400 response body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Map<String, Value>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors for a body that isn't an object at all
    pub fn not_an_object(got: &Value) -> Self {
        let mut errors = Self::new();
        errors.add(
            "non_field_errors",
            format!("Invalid data. Expected a dictionary, but got {}.", type_name(got)),
        );
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let entry = self
            .0
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(messages) = entry {
            messages.push(Value::String(message.into()));
        }
    }

    /// Attach a pre-built nested error value (object or list)
    pub fn nest(&mut self, field: &str, errors: Value) {
        self.0.insert(field.to_string(), errors);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn take<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        result.map_err(|msg| self.add(field, msg)).ok()
    }

    fn take_nested<T>(&mut self, field: &str, result: Result<T, Value>) -> Option<T> {
        result.map_err(|errors| self.nest(field, errors)).ok()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Look up `key`, recording required / null errors
fn field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<&'a Value> {
    match obj.get(key) {
        None => {
            if required {
                errors.add(key, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add(key, NOT_NULL);
            None
        }
        Some(v) => Some(v),
    }
}

// ========== Scalar fields ==========

fn char_field(value: &Value, max_len: usize) -> Result<String, String> {
    let s = match value {
        Value::String(s) => s.trim(),
        _ => return Err("Not a valid string.".to_string()),
    };
    if s.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    if s.chars().count() > max_len {
        return Err(format!(
            "Ensure this field has no more than {max_len} characters."
        ));
    }
    Ok(s.to_string())
}

fn age_field(value: &Value) -> Result<u32, String> {
    const INVALID: &str = "A valid integer is required.";
    let n: i64 = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
            _ => return Err(INVALID.to_string()),
        },
        Value::String(s) => s.trim().parse().map_err(|_| INVALID.to_string())?,
        _ => return Err(INVALID.to_string()),
    };
    if n < 0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    u32::try_from(n).map_err(|_| format!("Ensure this value is less than or equal to {}.", u32::MAX))
}

fn weight_field(value: &Value) -> Result<f64, String> {
    const INVALID: &str = "A valid number is required.";
    let w = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| INVALID.to_string())?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| INVALID.to_string())?,
        _ => return Err(INVALID.to_string()),
    };
    if !w.is_finite() {
        return Err(INVALID.to_string());
    }
    if w < 0.0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    Ok(w)
}

fn sex_field(value: &Value) -> Result<Sex, String> {
    match value {
        Value::String(s) => {
            Sex::from_label(s).ok_or_else(|| format!("\"{s}\" is not a valid choice."))
        }
        other => Err(format!("\"{other}\" is not a valid choice.")),
    }
}

// ========== Nested fields ==========

fn nested_object(value: &Value) -> Result<&Map<String, Value>, Value> {
    value
        .as_object()
        .ok_or_else(|| FieldErrors::not_an_object(value).into_value())
}

fn group_field(value: &Value) -> Result<NewGroup, Value> {
    let obj = nested_object(value)?;
    let mut errors = FieldErrors::new();
    let name = field(obj, "scientific_name", true, &mut errors)
        .and_then(|v| errors.take("scientific_name", char_field(v, SCIENTIFIC_NAME_MAX)));
    match name {
        Some(name) if errors.is_empty() => Ok(NewGroup::new(name)),
        _ => Err(errors.into_value()),
    }
}

fn trait_item(value: &Value) -> Result<NewTrait, Value> {
    let obj = nested_object(value)?;
    let mut errors = FieldErrors::new();
    let name = field(obj, "name", true, &mut errors)
        .and_then(|v| errors.take("name", char_field(v, TRAIT_NAME_MAX)));
    match name {
        Some(name) if errors.is_empty() => Ok(NewTrait::new(name)),
        _ => Err(errors.into_value()),
    }
}

/// Each item gets its own slot in the error list; valid items get `{}`
fn traits_field(value: &Value) -> Result<Vec<NewTrait>, Value> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            let mut errors = FieldErrors::new();
            errors.add(
                "non_field_errors",
                format!("Expected a list of items but got type \"{}\".", type_name(other)),
            );
            return Err(errors.into_value());
        }
    };

    let mut traits = Vec::with_capacity(items.len());
    let mut item_errors = Vec::with_capacity(items.len());
    let mut failed = false;
    for item in items {
        match trait_item(item) {
            Ok(t) => {
                traits.push(t);
                item_errors.push(Value::Object(Map::new()));
            }
            Err(e) => {
                failed = true;
                item_errors.push(e);
            }
        }
    }

    if failed {
        Err(Value::Array(item_errors))
    } else {
        Ok(traits)
    }
}

// ========== Entry points ==========

fn parse_fields(body: &Value, partial: bool) -> Result<PetPatch, FieldErrors> {
    let obj = body.as_object().ok_or_else(|| FieldErrors::not_an_object(body))?;
    let required = !partial;
    let mut errors = FieldErrors::new();

    let name = field(obj, "name", required, &mut errors)
        .and_then(|v| errors.take("name", char_field(v, PET_NAME_MAX)));
    let age = field(obj, "age", required, &mut errors).and_then(|v| errors.take("age", age_field(v)));
    let weight = field(obj, "weight", required, &mut errors)
        .and_then(|v| errors.take("weight", weight_field(v)));
    let sex = field(obj, "sex", false, &mut errors).and_then(|v| errors.take("sex", sex_field(v)));
    let group = field(obj, "group", required, &mut errors)
        .and_then(|v| errors.take_nested("group", group_field(v)));
    let traits = field(obj, "traits", required, &mut errors)
        .and_then(|v| errors.take_nested("traits", traits_field(v)));

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(PetPatch {
        name,
        age,
        weight,
        sex,
        group,
        traits,
    })
}

/// Validate a creation body; every field but `sex` is required
pub fn parse_new_pet(body: &Value) -> Result<NewPet, FieldErrors> {
    let fields = parse_fields(body, false)?;
    match fields {
        PetPatch {
            name: Some(name),
            age: Some(age),
            weight: Some(weight),
            sex,
            group: Some(group),
            traits: Some(traits),
        } => Ok(NewPet {
            name,
            age,
            weight,
            sex: sex.unwrap_or_default(),
            group,
            traits,
        }),
        // parse_fields already reported every missing required field
        _ => {
            let mut errors = FieldErrors::new();
            errors.add("non_field_errors", "Invalid data.");
            Err(errors)
        }
    }
}

/// Validate a partial-update body; any subset of fields may be present
pub fn parse_pet_patch(body: &Value) -> Result<PetPatch, FieldErrors> {
    parse_fields(body, true)
}

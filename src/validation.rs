// Request body validation
// Mutation endpoints accept raw JSON so that unknown vehicle attributes pass
// through to the store. Required fields are checked here before anything
// touches the catalog, and a failed check maps to a 400 response.

use serde_json::{Map, Value};

use crate::types::Vehicle;

/// Validation failures with the field that caused them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("\"{0}\" is required")]
    Required(&'static str),
    #[error("\"{0}\" is not allowed to be empty")]
    Empty(&'static str),
    #[error("\"{0}\" must be a {1}")]
    WrongType(&'static str, &'static str),
}

/// Check a vehicle body: `name` and `description` must be non-empty strings,
/// `releaseYear` must be a number. Everything else is carried along untouched.
pub fn validate_vehicle(body: &Value) -> Result<Vehicle, ValidationError> {
    let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let name = require_string(obj, "name")?.to_owned();
    let description = require_string(obj, "description")?.to_owned();
    let release_year = match obj.get("releaseYear") {
        None | Some(Value::Null) => return Err(ValidationError::Required("releaseYear")),
        Some(year @ Value::Number(_)) => year.clone(),
        Some(_) => return Err(ValidationError::WrongType("releaseYear", "number")),
    };

    let mut extra = obj.clone();
    extra.remove("name");
    extra.remove("description");
    extra.remove("releaseYear");

    Ok(Vehicle {
        name,
        description,
        release_year,
        extra,
    })
}

/// Check a `{ "name": ... }` body, used by the category and type endpoints.
pub fn validate_name(body: &Value) -> Result<String, ValidationError> {
    let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;
    Ok(require_string(obj, "name")?.to_owned())
}

fn require_string<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Required(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::Empty(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ValidationError::WrongType(field, "string")),
    }
}

//! Request validation for device and rule payloads.

use crate::error::AppError;
use crate::models::{Device, Presence, Rule, Updatable};
use crate::sql::ID_COLUMN;
use crate::value::{Fields, Scalar};
use serde_json::Value;

pub struct RequestValidator;

impl RequestValidator {
    /// A device needs its business key, state, status and at least one complete property.
    pub fn device(device: &Device) -> Result<(), AppError> {
        require("referenceId", &device.reference_id)?;
        require("state", &device.state)?;
        require("status", &device.status)?;
        if device.properties.is_empty() {
            return Err(AppError::Validation("properties is required".into()));
        }
        for (i, p) in device.properties.iter().enumerate() {
            let at = |field: &str| format!("properties[{}].{}", i, field);
            require(&at("referenceId"), &p.reference_id)?;
            require(&at("name"), &p.name)?;
            require(&at("state"), &p.state)?;
            require(&at("status"), &p.status)?;
            require(&at("threshold"), &p.threshold)?;
        }
        Ok(())
    }

    /// A rule needs name, severity and status; each condition its position and type.
    pub fn rule(rule: &Rule) -> Result<(), AppError> {
        require("name", &rule.name)?;
        require("severity", &rule.severity)?;
        require("status", &rule.status)?;
        for (i, c) in rule.conditions.iter().enumerate() {
            require(&format!("condition[{}].position", i), &c.position)?;
            require(&format!("condition[{}].type", i), &c.condition_type)?;
        }
        Ok(())
    }

    /// Map a partial-update body onto code-controlled columns. `allowed` pairs an API field
    /// name with its column and what the column accepts. The identity is ignored; anything
    /// else unknown is rejected.
    pub fn patch(body: &Value, allowed: &[Updatable]) -> Result<Fields, AppError> {
        let Value::Object(map) = body else {
            return Err(AppError::Validation("body must be a JSON object".into()));
        };
        let mut fields = Fields::with_capacity(map.len());
        for (key, value) in map {
            if key == ID_COLUMN {
                continue;
            }
            let (column, presence) = allowed
                .iter()
                .find(|(field, _, _)| field == key)
                .map(|(_, column, presence)| (*column, *presence))
                .ok_or_else(|| AppError::Validation(format!("{} cannot be updated", key)))?;
            let value = Scalar::from_json(key, value)?;
            match presence {
                Presence::Required => {
                    require(key, value.to_text().as_deref().unwrap_or_default())?;
                }
                Presence::NotNull if value.is_null() => {
                    return Err(AppError::Validation(format!("{} must not be null", key)));
                }
                _ => {}
            }
            fields.push((column, value));
        }
        if fields.is_empty() {
            return Err(AppError::Validation("no updatable fields in body".into()));
        }
        Ok(fields)
    }
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

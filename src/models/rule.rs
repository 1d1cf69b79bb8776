//! Rule and its ordered conditions.

use crate::error::AppError;
use crate::flatten::Joined;
use super::{Presence, Updatable};
use crate::value::{Fields, Record, Scalar};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub severity: String,
    pub status: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    /// Evaluation order follows `position`.
    #[serde(rename = "condition")]
    pub conditions: Vec<Condition>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Condition {
    pub id: String,
    pub position: String,
    #[serde(rename = "type")]
    pub condition_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

pub const CONDITION_PREFIX: &str = "condition_";

/// `type` and `description` may be blank, as on create, but their columns are NOT NULL.
pub const RULE_UPDATABLE: &[Updatable] = &[
    ("name", "name", Presence::Required),
    ("severity", "severity", Presence::Required),
    ("status", "status", Presence::Required),
    ("type", "type", Presence::NotNull),
    ("description", "description", Presence::NotNull),
    ("createdAt", "created_at", Presence::Required),
    ("updatedAt", "updated_at", Presence::Required),
];

impl Rule {
    pub fn fields(&self) -> Fields {
        vec![
            ("name", Scalar::from(self.name.as_str())),
            ("severity", Scalar::from(self.severity.as_str())),
            ("status", Scalar::from(self.status.as_str())),
            ("type", Scalar::from(self.rule_type.as_str())),
            ("description", Scalar::from(self.description.as_str())),
            ("created_at", Scalar::from(self.created_at.as_str())),
            ("updated_at", Scalar::from(self.updated_at.as_str())),
        ]
    }
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_ref().filter(|s| !s.is_empty()).cloned()
}

impl Condition {
    /// Empty optional references read back as absent, so store them that way.
    pub fn normalized(mut self) -> Self {
        self.device_id = non_empty(&self.device_id);
        self.device_name = non_empty(&self.device_name);
        self.property_id = non_empty(&self.property_id);
        self.property_name = non_empty(&self.property_name);
        self.operator_id = non_empty(&self.operator_id);
        self.operator_symbol = non_empty(&self.operator_symbol);
        self.value = non_empty(&self.value);
        self
    }

    pub fn fields(&self, rule_id: &str) -> Fields {
        vec![
            ("position", Scalar::from(self.position.as_str())),
            ("type", Scalar::from(self.condition_type.as_str())),
            ("device_id", Scalar::from(self.device_id.clone())),
            ("device_name", Scalar::from(self.device_name.clone())),
            ("property_id", Scalar::from(self.property_id.clone())),
            ("property_name", Scalar::from(self.property_name.clone())),
            ("operator_id", Scalar::from(self.operator_id.clone())),
            ("operator_symbol", Scalar::from(self.operator_symbol.clone())),
            ("value", Scalar::from(self.value.clone())),
            ("rule_id", Scalar::from(rule_id)),
        ]
    }
}

impl Joined for Rule {
    type Child = Condition;

    const CHILD_ID: &'static str = "condition_id";

    fn parent_from_row(row: &Record) -> Result<Self, AppError> {
        Ok(Rule {
            id: row.text("id")?,
            name: row.text_or_empty("name")?,
            severity: row.text_or_empty("severity")?,
            status: row.text_or_empty("status")?,
            rule_type: row.text_or_empty("type")?,
            description: row.text_or_empty("description")?,
            created_at: row.text_or_empty("created_at")?,
            updated_at: row.text_or_empty("updated_at")?,
            conditions: Vec::new(),
        })
    }

    fn child_from_row(row: &Record) -> Result<Condition, AppError> {
        let col = |name: &str| format!("{}{}", CONDITION_PREFIX, name);
        Ok(Condition {
            id: row.text(&col("id"))?,
            position: row.text_or_empty(&col("position"))?,
            condition_type: row.text_or_empty(&col("type"))?,
            device_id: row.opt_text(&col("device_id"))?,
            device_name: row.opt_text(&col("device_name"))?,
            property_id: row.opt_text(&col("property_id"))?,
            property_name: row.opt_text(&col("property_name"))?,
            operator_id: row.opt_text(&col("operator_id"))?,
            operator_symbol: row.opt_text(&col("operator_symbol"))?,
            value: row.opt_text(&col("value"))?,
        })
    }

    fn with_children(mut self, children: Vec<Condition>) -> Self {
        self.conditions = children;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_travel_under_condition_key() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "name": "High Temp",
            "severity": "critical",
            "status": "enabled",
            "condition": [{
                "position": "1", "type": "threshold", "deviceId": "d1", "propertyId": "p1",
                "operatorId": "gt", "operatorSymbol": ">", "value": "80"
            }]
        }))
        .unwrap();
        assert_eq!(rule.conditions.len(), 1);
        assert_eq!(rule.conditions[0].operator_symbol.as_deref(), Some(">"));

        let v = serde_json::to_value(&rule).unwrap();
        assert_eq!(v["condition"][0]["type"], "threshold");
        assert!(v["condition"][0].get("deviceName").is_none());
    }

    #[test]
    fn normalized_drops_empty_references() {
        let c = Condition {
            device_id: Some(String::new()),
            value: Some("80".into()),
            ..Condition::default()
        }
        .normalized();
        assert_eq!(c.device_id, None);
        assert_eq!(c.value.as_deref(), Some("80"));
    }

    #[test]
    fn condition_fields_bind_absent_references_as_null() {
        let f = Condition::default().fields("r1");
        let device_id = f.iter().find(|(c, _)| *c == "device_id").unwrap();
        assert!(device_id.1.is_null());
        assert_eq!(f.last(), Some(&("rule_id", Scalar::from("r1"))));
    }
}

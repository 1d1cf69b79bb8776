//! Device and its owned properties.

use crate::error::AppError;
use crate::flatten::Joined;
use super::{Presence, Updatable};
use crate::value::{Fields, Record, Scalar};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    pub id: String,
    pub reference_id: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub device_name: String,
    pub created_at: String,
    pub state: String,
    pub location: String,
    pub status: String,
    pub customer: String,
    pub site: String,
    pub properties: Vec<Property>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    pub id: String,
    pub reference_id: String,
    pub name: String,
    pub unit: String,
    pub state: String,
    pub status: String,
    pub data_type: String,
    pub value: String,
    pub threshold: String,
}

/// Alias prefix for property columns in the device join.
pub const PROPERTY_PREFIX: &str = "property_";

/// API field name to device column, for partial updates.
pub const DEVICE_UPDATABLE: &[Updatable] = &[
    ("referenceId", "reference_id", Presence::Required),
    ("type", "type", Presence::Optional),
    ("deviceName", "device_name", Presence::Optional),
    ("createdAt", "created_at", Presence::Optional),
    ("state", "state", Presence::Required),
    ("location", "location", Presence::Optional),
    ("status", "status", Presence::Required),
    ("customer", "customer", Presence::Optional),
    ("site", "site", Presence::Optional),
];

impl Device {
    /// Parent columns to insert, without identity.
    pub fn fields(&self) -> Fields {
        vec![
            ("reference_id", Scalar::from(self.reference_id.as_str())),
            ("type", Scalar::from(self.device_type.as_str())),
            ("device_name", Scalar::from(self.device_name.as_str())),
            ("created_at", Scalar::from(self.created_at.as_str())),
            ("state", Scalar::from(self.state.as_str())),
            ("location", Scalar::from(self.location.as_str())),
            ("status", Scalar::from(self.status.as_str())),
            ("customer", Scalar::from(self.customer.as_str())),
            ("site", Scalar::from(self.site.as_str())),
        ]
    }
}

impl Property {
    /// Columns to insert under `device_id`, without identity.
    pub fn fields(&self, device_id: &str) -> Fields {
        vec![
            ("reference_id", Scalar::from(self.reference_id.as_str())),
            ("name", Scalar::from(self.name.as_str())),
            ("unit", Scalar::from(self.unit.as_str())),
            ("state", Scalar::from(self.state.as_str())),
            ("status", Scalar::from(self.status.as_str())),
            ("data_type", Scalar::from(self.data_type.as_str())),
            ("value", Scalar::from(self.value.as_str())),
            ("threshold", Scalar::from(self.threshold.as_str())),
            ("device_id", Scalar::from(device_id)),
        ]
    }

    /// Decode from columns named `{prefix}{column}`; an empty prefix reads the plain table.
    pub fn from_row(row: &Record, prefix: &str) -> Result<Self, AppError> {
        let col = |name: &str| format!("{}{}", prefix, name);
        Ok(Property {
            id: row.text(&col("id"))?,
            reference_id: row.text_or_empty(&col("reference_id"))?,
            name: row.text_or_empty(&col("name"))?,
            unit: row.text_or_empty(&col("unit"))?,
            state: row.text_or_empty(&col("state"))?,
            status: row.text_or_empty(&col("status"))?,
            data_type: row.text_or_empty(&col("data_type"))?,
            value: row.text_or_empty(&col("value"))?,
            threshold: row.text_or_empty(&col("threshold"))?,
        })
    }
}

impl Joined for Device {
    type Child = Property;

    const CHILD_ID: &'static str = "property_id";

    fn parent_from_row(row: &Record) -> Result<Self, AppError> {
        Ok(Device {
            id: row.text("id")?,
            reference_id: row.text_or_empty("reference_id")?,
            device_type: row.text_or_empty("type")?,
            device_name: row.text_or_empty("device_name")?,
            created_at: row.text_or_empty("created_at")?,
            state: row.text_or_empty("state")?,
            location: row.text_or_empty("location")?,
            status: row.text_or_empty("status")?,
            customer: row.text_or_empty("customer")?,
            site: row.text_or_empty("site")?,
            properties: Vec::new(),
        })
    }

    fn child_from_row(row: &Record) -> Result<Property, AppError> {
        Property::from_row(row, PROPERTY_PREFIX)
    }

    fn with_children(mut self, children: Vec<Property>) -> Self {
        self.properties = children;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;

    #[test]
    fn deserializes_camel_case_with_missing_fields_defaulted() {
        let d: Device = serde_json::from_value(serde_json::json!({
            "referenceId": "ref-1",
            "type": "PLC",
            "state": "Active",
            "status": "Operational",
            "properties": [{
                "referenceId": "t1", "name": "temp",
                "state": "Active", "status": "Operational", "threshold": "80"
            }]
        }))
        .unwrap();
        assert_eq!(d.reference_id, "ref-1");
        assert_eq!(d.device_type, "PLC");
        assert_eq!(d.site, "");
        assert_eq!(d.properties[0].threshold, "80");
    }

    #[test]
    fn serializes_type_and_camel_case_keys() {
        let v = serde_json::to_value(Device {
            device_type: "PLC".into(),
            device_name: "press".into(),
            ..Device::default()
        })
        .unwrap();
        assert_eq!(v["type"], "PLC");
        assert_eq!(v["deviceName"], "press");
        assert!(v["properties"].as_array().unwrap().is_empty());
    }

    #[test]
    fn joined_rows_keep_device_and_property_state_apart() {
        let row = |pid: &str, pstate: &str| {
            Record::new()
                .with("id", "d1")
                .with("reference_id", "ref-1")
                .with("type", "PLC")
                .with("device_name", "press")
                .with("created_at", "")
                .with("state", "Active")
                .with("location", Scalar::Null)
                .with("status", "Operational")
                .with("customer", "acme")
                .with("site", "north")
                .with("property_id", pid)
                .with("property_reference_id", "t")
                .with("property_name", "temp")
                .with("property_unit", "C")
                .with("property_state", pstate)
                .with("property_status", "Operational")
                .with("property_data_type", "float")
                .with("property_value", Scalar::Int(21))
                .with("property_threshold", "80")
        };
        let device: Device = flatten(&[row("p1", "Inactive"), row("p2", "Active")])
            .unwrap()
            .unwrap();
        assert_eq!(device.state, "Active");
        assert_eq!(device.location, "");
        assert_eq!(device.properties.len(), 2);
        assert_eq!(device.properties[0].state, "Inactive");
        assert_eq!(device.properties[0].value, "21");
    }

    #[test]
    fn property_fields_carry_foreign_key_last() {
        let f = Property::default().fields("d1");
        assert_eq!(f.last(), Some(&("device_id", Scalar::from("d1"))));
        assert!(f.iter().all(|(c, _)| *c != "id"));
    }
}

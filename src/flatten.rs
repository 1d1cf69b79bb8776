//! Rebuild one parent with its ordered children from a LEFT JOIN result, where every
//! row repeats the parent columns and carries at most one child.

use crate::error::AppError;
use crate::value::Record;
use std::collections::HashSet;

/// A parent entity that can be reassembled from joined rows.
pub trait Joined: Sized {
    type Child;

    /// Column holding the child identity. Null on the single row of a childless parent.
    const CHILD_ID: &'static str;

    fn parent_from_row(row: &Record) -> Result<Self, AppError>;

    fn child_from_row(row: &Record) -> Result<Self::Child, AppError>;

    fn with_children(self, children: Vec<Self::Child>) -> Self;
}

/// `None` when there are no rows (parent not found). Parent scalars come from the first
/// row only; children are collected in row order, skipping null and repeated child ids.
pub fn flatten<P: Joined>(rows: &[Record]) -> Result<Option<P>, AppError> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };
    let parent = P::parent_from_row(first)?;
    let mut seen = HashSet::new();
    let mut children = Vec::with_capacity(rows.len());
    for row in rows {
        if row.is_null(P::CHILD_ID) {
            continue;
        }
        if !seen.insert(row.text(P::CHILD_ID)?) {
            continue;
        }
        children.push(P::child_from_row(row)?);
    }
    Ok(Some(parent.with_children(children)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Device, Rule};
    use crate::value::Scalar;

    fn rule_row(condition: Option<(&str, &str)>) -> Record {
        let base = Record::new()
            .with("id", "r1")
            .with("name", "High Temp")
            .with("severity", "critical")
            .with("status", "enabled")
            .with("type", "")
            .with("description", "")
            .with("created_at", "2024-05-01T00:00:00Z")
            .with("updated_at", "2024-05-01T00:00:00Z");
        match condition {
            Some((id, position)) => base
                .with("condition_id", id)
                .with("condition_position", position)
                .with("condition_type", "threshold")
                .with("condition_device_id", "d1")
                .with("condition_device_name", Scalar::Null)
                .with("condition_property_id", "p1")
                .with("condition_property_name", Scalar::Null)
                .with("condition_operator_id", "gt")
                .with("condition_operator_symbol", ">")
                .with("condition_value", "80"),
            None => [
                "condition_id",
                "condition_position",
                "condition_type",
                "condition_device_id",
                "condition_device_name",
                "condition_property_id",
                "condition_property_name",
                "condition_operator_id",
                "condition_operator_symbol",
                "condition_value",
            ]
            .into_iter()
            .fold(base, |r, c| r.with(c, Scalar::Null)),
        }
    }

    #[test]
    fn three_rows_make_one_rule_with_three_conditions_in_row_order() {
        let rows = vec![
            rule_row(Some(("c1", "1"))),
            rule_row(Some(("c2", "2"))),
            rule_row(Some(("c3", "3"))),
        ];
        let rule: Rule = flatten(&rows).unwrap().unwrap();
        assert_eq!(rule.id, "r1");
        assert_eq!(rule.name, "High Temp");
        let ids: Vec<&str> = rule.conditions.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert_eq!(rule.conditions[0].operator_symbol.as_deref(), Some(">"));
        assert_eq!(rule.conditions[0].device_name, None);
    }

    #[test]
    fn null_child_means_empty_children() {
        let rule: Rule = flatten(&[rule_row(None)]).unwrap().unwrap();
        assert_eq!(rule.id, "r1");
        assert!(rule.conditions.is_empty());
    }

    #[test]
    fn no_rows_means_not_found() {
        assert!(flatten::<Rule>(&[]).unwrap().is_none());
        assert!(flatten::<Device>(&[]).unwrap().is_none());
    }

    #[test]
    fn repeated_child_rows_are_collapsed() {
        let rows = vec![
            rule_row(Some(("c1", "1"))),
            rule_row(Some(("c1", "1"))),
            rule_row(Some(("c2", "2"))),
        ];
        let rule: Rule = flatten(&rows).unwrap().unwrap();
        assert_eq!(rule.conditions.len(), 2);
    }

    #[test]
    fn malformed_parent_row_is_a_query_error() {
        let row = Record::new().with("id", Scalar::Null).with("condition_id", Scalar::Null);
        assert!(matches!(flatten::<Rule>(&[row]), Err(AppError::Query(_))));
    }
}

//! Rule operations. Conditions come back ordered by position.

use super::{now_rfc3339, RequestValidator};
use crate::error::AppError;
use crate::flatten::flatten;
use crate::models::rule::RULE_UPDATABLE;
use crate::models::Rule;
use crate::repository::TableRepository;
use crate::sql::{Table, ID_COLUMN};
use crate::store::{finish, QueryExecutor, Store};
use crate::value::Scalar;
use serde_json::Value;
use std::sync::Arc;

const NO_RULE: &str = "No rule found";

/// `position` is text; shorter strings first gives natural order for numeric positions.
const RULE_WITH_CONDITIONS: &str = "SELECT r.id, r.name, r.severity, r.status, r.type, \
     r.description, r.created_at, r.updated_at, \
     c.id AS condition_id, c.position AS condition_position, c.type AS condition_type, \
     c.device_id AS condition_device_id, c.device_name AS condition_device_name, \
     c.property_id AS condition_property_id, c.property_name AS condition_property_name, \
     c.operator_id AS condition_operator_id, c.operator_symbol AS condition_operator_symbol, \
     c.value AS condition_value \
     FROM rules r LEFT JOIN conditions c ON c.rule_id = r.id \
     WHERE r.id = $1 ORDER BY LENGTH(c.position), c.position, c.id";

#[derive(Clone)]
pub struct RuleService {
    store: Arc<dyn Store>,
}

impl RuleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Rule>, AppError> {
        let rows = TableRepository::get_all(&*self.store, Table::Rules).await?;
        let mut rules = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(rule) = self.find(&row.text(ID_COLUMN)?).await? {
                rules.push(rule);
            }
        }
        Ok(rules)
    }

    pub async fn get(&self, id: &str) -> Result<Rule, AppError> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_RULE.into()))
    }

    async fn find(&self, id: &str) -> Result<Option<Rule>, AppError> {
        let params = [Scalar::from(id)];
        let rows =
            TableRepository::execute_query(&*self.store, RULE_WITH_CONDITIONS, &params).await?;
        flatten(&rows)
    }

    pub async fn create(&self, mut rule: Rule) -> Result<Rule, AppError> {
        RequestValidator::rule(&rule)?;
        let now = now_rfc3339();
        if rule.created_at.trim().is_empty() {
            rule.created_at = now.clone();
        }
        if rule.updated_at.trim().is_empty() {
            rule.updated_at = now;
        }
        rule.conditions = rule.conditions.into_iter().map(|c| c.normalized()).collect();

        let tx = self.store.begin().await?;
        let result = insert_rule(&*tx, rule).await;
        let rule = finish(tx, result).await?;
        tracing::info!(id = %rule.id, conditions = rule.conditions.len(), "rule created");
        Ok(rule)
    }

    /// Partial update of rule scalars. `updatedAt` is stamped unless the body sets it.
    pub async fn update(&self, id: &str, body: &Value) -> Result<Rule, AppError> {
        let mut fields = RequestValidator::patch(body, RULE_UPDATABLE)?;
        if !fields.iter().any(|(col, _)| *col == "updated_at") {
            fields.push(("updated_at", Scalar::Text(now_rfc3339())));
        }
        let affected = TableRepository::update(&*self.store, Table::Rules, id, &fields).await?;
        if affected == 0 {
            return Err(AppError::NotFound(NO_RULE.into()));
        }
        tracing::info!(id = %id, "rule updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let tx = self.store.begin().await?;
        let result = delete_rule(&*tx, id).await;
        finish(tx, result).await?;
        tracing::info!(id = %id, "rule deleted");
        Ok(())
    }
}

async fn insert_rule<E>(exec: &E, mut rule: Rule) -> Result<Rule, AppError>
where
    E: QueryExecutor + ?Sized,
{
    rule.id = TableRepository::create(exec, Table::Rules, rule.fields()).await?;
    for condition in &mut rule.conditions {
        let fields = condition.fields(&rule.id);
        condition.id = TableRepository::create(exec, Table::Conditions, fields).await?;
    }
    Ok(rule)
}

async fn delete_rule<E>(exec: &E, id: &str) -> Result<(), AppError>
where
    E: QueryExecutor + ?Sized,
{
    if !TableRepository::check_exists(exec, Table::Rules, ID_COLUMN, id).await? {
        return Err(AppError::NotFound("Rule not found".into()));
    }
    TableRepository::delete(exec, Table::Conditions, "rule_id", id).await?;
    TableRepository::delete(exec, Table::Rules, ID_COLUMN, id).await?;
    Ok(())
}

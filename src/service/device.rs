//! Device operations. Writes that touch a device and its properties run in one transaction.

use super::{conflict_on_unique, now_rfc3339, RequestValidator};
use crate::error::AppError;
use crate::flatten::flatten;
use crate::models::device::DEVICE_UPDATABLE;
use crate::models::{Device, Property};
use crate::repository::TableRepository;
use crate::sql::{Table, ID_COLUMN};
use crate::store::{finish, QueryExecutor, Store};
use crate::value::Scalar;
use serde_json::Value;
use std::sync::Arc;

const DEVICE_EXISTS: &str = "Device already exists";
const NO_DEVICE: &str = "No device found";

const DEVICE_WITH_PROPERTIES: &str = "SELECT d.id, d.reference_id, d.type, d.device_name, \
     d.created_at, d.state, d.location, d.status, d.customer, d.site, \
     p.id AS property_id, p.reference_id AS property_reference_id, p.name AS property_name, \
     p.unit AS property_unit, p.state AS property_state, p.status AS property_status, \
     p.data_type AS property_data_type, p.value AS property_value, \
     p.threshold AS property_threshold \
     FROM devices d LEFT JOIN properties p ON p.device_id = d.id \
     WHERE d.id = $1 ORDER BY p.seq";

const PROPERTIES_OF_DEVICE: &str = "SELECT id, reference_id, name, unit, state, status, \
     data_type, value, threshold FROM properties WHERE device_id = $1 ORDER BY seq";

#[derive(Clone)]
pub struct DeviceService {
    store: Arc<dyn Store>,
}

impl DeviceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Every device with its properties. Devices removed between the listing and the
    /// per-device fetch are skipped.
    pub async fn list(&self) -> Result<Vec<Device>, AppError> {
        let rows = TableRepository::get_all(&*self.store, Table::Devices).await?;
        let mut devices = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = row.text(ID_COLUMN)?;
            if let Some(device) = self.find(&id).await? {
                devices.push(device);
            }
        }
        Ok(devices)
    }

    pub async fn get(&self, id: &str) -> Result<Device, AppError> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_DEVICE.into()))
    }

    async fn find(&self, id: &str) -> Result<Option<Device>, AppError> {
        let params = [Scalar::from(id)];
        let rows =
            TableRepository::execute_query(&*self.store, DEVICE_WITH_PROPERTIES, &params).await?;
        flatten(&rows)
    }

    /// Validate, then insert the device and its properties under fresh ids.
    pub async fn create(&self, mut device: Device) -> Result<Device, AppError> {
        RequestValidator::device(&device)?;
        if device.created_at.trim().is_empty() {
            device.created_at = now_rfc3339();
        }
        let tx = self.store.begin().await?;
        let result = insert_device(&*tx, device).await;
        let device = finish(tx, result)
            .await
            .map_err(|e| conflict_on_unique(e, DEVICE_EXISTS))?;
        tracing::info!(
            id = %device.id,
            reference_id = %device.reference_id,
            properties = device.properties.len(),
            "device created"
        );
        Ok(device)
    }

    /// Apply a partial update and return the device as stored afterwards.
    pub async fn update(&self, id: &str, body: &Value) -> Result<Device, AppError> {
        let fields = RequestValidator::patch(body, DEVICE_UPDATABLE)?;
        let affected = TableRepository::update(&*self.store, Table::Devices, id, &fields)
            .await
            .map_err(|e| conflict_on_unique(e, DEVICE_EXISTS))?;
        if affected == 0 {
            return Err(AppError::NotFound(NO_DEVICE.into()));
        }
        tracing::info!(id = %id, columns = fields.len(), "device updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let tx = self.store.begin().await?;
        let result = delete_device(&*tx, id).await;
        finish(tx, result).await?;
        tracing::info!(id = %id, "device deleted");
        Ok(())
    }

    /// Properties of one device in insertion order.
    pub async fn properties(&self, device_id: &str) -> Result<Vec<Property>, AppError> {
        let device = TableRepository::get(&*self.store, Table::Devices, device_id).await?;
        if device.is_none() {
            return Err(AppError::NotFound(NO_DEVICE.into()));
        }
        let params = [Scalar::from(device_id)];
        let rows =
            TableRepository::execute_query(&*self.store, PROPERTIES_OF_DEVICE, &params).await?;
        rows.iter().map(|row| Property::from_row(row, "")).collect()
    }
}

async fn insert_device<E>(exec: &E, mut device: Device) -> Result<Device, AppError>
where
    E: QueryExecutor + ?Sized,
{
    let reference_id = device.reference_id.as_str();
    if TableRepository::check_exists(exec, Table::Devices, "reference_id", reference_id).await? {
        return Err(AppError::Conflict(DEVICE_EXISTS.into()));
    }
    device.id = TableRepository::create(exec, Table::Devices, device.fields()).await?;
    for property in &mut device.properties {
        let fields = property.fields(&device.id);
        property.id = TableRepository::create(exec, Table::Properties, fields).await?;
    }
    Ok(device)
}

async fn delete_device<E>(exec: &E, id: &str) -> Result<(), AppError>
where
    E: QueryExecutor + ?Sized,
{
    if !TableRepository::check_exists(exec, Table::Devices, ID_COLUMN, id).await? {
        return Err(AppError::NotFound("Device not found".into()));
    }
    TableRepository::delete(exec, Table::Properties, "device_id", id).await?;
    TableRepository::delete(exec, Table::Devices, ID_COLUMN, id).await?;
    Ok(())
}

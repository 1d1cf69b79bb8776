//! Kepware discovery: read the exported channel file and present it as devices.

use crate::error::AppError;
use crate::models::{Channel, Device, Property};
use std::path::PathBuf;
use uuid::Uuid;

const ACTIVE: &str = "Active";
const OPERATIONAL: &str = "Operational";

#[derive(Clone, Debug)]
pub struct DiscoveryService {
    kepware_file: PathBuf,
}

impl DiscoveryService {
    pub fn new(kepware_file: impl Into<PathBuf>) -> Self {
        Self {
            kepware_file: kepware_file.into(),
        }
    }

    /// Devices found in the discovery file. Nothing is persisted.
    pub async fn kepware_devices(&self) -> Result<Vec<Device>, AppError> {
        let path = self.kepware_file.display().to_string();
        let raw = tokio::fs::read(&self.kepware_file)
            .await
            .map_err(|e| AppError::Discovery(format!("read {}: {}", path, e)))?;
        let channels: Vec<Channel> = serde_json::from_slice(&raw)
            .map_err(|e| AppError::Discovery(format!("parse {}: {}", path, e)))?;
        let devices = normalize(channels);
        tracing::debug!(file = %path, devices = devices.len(), "kepware discovery");
        Ok(devices)
    }
}

/// One device per channel device, typed by its channel; tags become properties.
pub fn normalize(channels: Vec<Channel>) -> Vec<Device> {
    channels
        .into_iter()
        .flat_map(|channel| {
            let channel_name = channel.channel_name;
            channel.devices.into_iter().map(move |d| Device {
                id: Uuid::new_v4().to_string(),
                reference_id: Uuid::new_v4().to_string(),
                device_type: channel_name.clone(),
                device_name: d.device_name,
                state: ACTIVE.into(),
                status: OPERATIONAL.into(),
                properties: d
                    .tags
                    .into_iter()
                    .map(|tag| Property {
                        id: Uuid::new_v4().to_string(),
                        reference_id: tag.tag_id,
                        name: tag.tag_name,
                        state: ACTIVE.into(),
                        status: OPERATIONAL.into(),
                        threshold: "0".into(),
                        ..Property::default()
                    })
                    .collect(),
                ..Device::default()
            })
        })
        .collect()
}

//! Kepware channel export as found in the discovery file.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Channel {
    pub channel_name: String,
    #[serde(default)]
    pub devices: Vec<KepwareDevice>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct KepwareDevice {
    pub device_name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Tag {
    #[serde(rename = "TagName")]
    pub tag_name: String,
    #[serde(rename = "TagId")]
    pub tag_id: String,
}

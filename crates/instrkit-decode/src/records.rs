use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Record shapes known to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Process,
    Application,
    DeviceInfo,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Process => "process",
            RecordKind::Application => "application",
            RecordKind::DeviceInfo => "device-info",
        };
        f.write_str(name)
    }
}

/// A typed record decodable from a flat key/value mapping.
///
/// Fields without `#[serde(default)]` are required: their absence fails the
/// record. Unknown keys are ignored.
pub trait Record: DeserializeOwned {
    const KIND: RecordKind;
}

/// Process start time as reported by the device.
///
/// Depending on the codec, dates arrive either as seconds since the Unix
/// epoch or as preformatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartDate {
    EpochSeconds(f64),
    Text(String),
}

/// A running process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub pid: i64,
    pub name: String,
    #[serde(rename = "isApplication", default)]
    pub is_application: bool,
    #[serde(rename = "realAppName", default)]
    pub real_app_name: String,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<StartDate>,
}

impl Record for Process {
    const KIND: RecordKind = RecordKind::Process;
}

/// An installed application, app extension or plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "CFBundleIdentifier")]
    pub bundle_identifier: String,
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "Type")]
    pub app_type: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Restricted")]
    pub restricted: i64,
    #[serde(rename = "BundlePath")]
    pub bundle_path: String,
    #[serde(rename = "ExecutableName", default)]
    pub executable_name: String,
    #[serde(rename = "AppExtensionUUIDs", default)]
    pub app_extension_uuids: Vec<String>,
    #[serde(rename = "ContainerBundleIdentifier", default)]
    pub container_bundle_identifier: String,
    #[serde(rename = "ContainerBundlePath", default)]
    pub container_bundle_path: String,
    #[serde(rename = "Placeholder", default)]
    pub placeholder: bool,
    #[serde(rename = "PluginIdentifier", default)]
    pub plugin_identifier: String,
    #[serde(rename = "PluginUUID", default)]
    pub plugin_uuid: String,
}

impl Record for Application {
    const KIND: RecordKind = RecordKind::Application;
}

/// Device description returned by `systemInformation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "_deviceDescription")]
    pub description: String,
    #[serde(rename = "_deviceDisplayName")]
    pub display_name: String,
    #[serde(rename = "_deviceIdentifier")]
    pub identifier: String,
    #[serde(rename = "_deviceVersion")]
    pub version: String,
    #[serde(rename = "_productType")]
    pub product_type: String,
    #[serde(rename = "_productVersion")]
    pub product_version: String,
    /// Absent on older devices.
    #[serde(rename = "_xrdeviceClassName", default)]
    pub xr_device_class_name: String,
}

impl Record for DeviceInfo {
    const KIND: RecordKind = RecordKind::DeviceInfo;
}

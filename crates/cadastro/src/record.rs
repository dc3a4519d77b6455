//! Record types persisted in the document store.
//!
//! Field names on the wire are camelCase (`sistemaOperacional`,
//! `numeroSerie`, `dataRegistro`, `userId`) so documents written here read
//! the same as the ones the web forms produced.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A store-assigned record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an identifier produced by a store.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named collection in the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Registered devices.
    Devices,
    /// Profile form submissions.
    Formularios,
}

impl Collection {
    /// Every collection the application writes to.
    pub const ALL: [Collection; 2] = [Collection::Devices, Collection::Formularios];

    /// The collection's name in the store.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Devices => "devices",
            Self::Formularios => "formularios",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A document as returned by a store query: identifier plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// The stored payload.
    pub data: serde_json::Value,
}

impl Document {
    /// Decode the payload into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDocument`] if the payload doesn't match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.data.clone()).map_err(|e| Error::MalformedDocument {
            id: self.id.to_string(),
            message: e.to_string(),
        })
    }
}

/// Kind of device being registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// A phone.
    #[default]
    Smartphone,
    /// A tablet.
    Tablet,
    /// A laptop.
    Laptop,
    /// A desktop computer.
    Desktop,
    /// A watch.
    Smartwatch,
    /// Anything else.
    Outros,
}

impl DeviceType {
    /// All device types, in the order the form offers them.
    pub const ALL: [DeviceType; 6] = [
        DeviceType::Smartphone,
        DeviceType::Tablet,
        DeviceType::Laptop,
        DeviceType::Desktop,
        DeviceType::Smartwatch,
        DeviceType::Outros,
    ];

    /// The stored value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smartphone => "smartphone",
            Self::Tablet => "tablet",
            Self::Laptop => "laptop",
            Self::Desktop => "desktop",
            Self::Smartwatch => "smartwatch",
            Self::Outros => "outros",
        }
    }

    /// The glyph shown on a device card.
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Smartphone | Self::Outros => "📱",
            Self::Tablet => "📟",
            Self::Laptop => "💻",
            Self::Desktop => "🖥️",
            Self::Smartwatch => "⌚",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidField {
                field: format!("tipo={s}"),
            })
    }
}

/// Operating system of a registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperatingSystem {
    /// Android.
    #[default]
    Android,
    /// iOS.
    #[serde(rename = "iOS")]
    Ios,
    /// Windows.
    Windows,
    /// macOS.
    #[serde(rename = "macOS")]
    MacOs,
    /// Linux.
    Linux,
    /// Anything else.
    #[serde(rename = "outros")]
    Outros,
}

impl OperatingSystem {
    /// All operating systems, in the order the form offers them.
    pub const ALL: [OperatingSystem; 6] = [
        OperatingSystem::Android,
        OperatingSystem::Ios,
        OperatingSystem::Windows,
        OperatingSystem::MacOs,
        OperatingSystem::Linux,
        OperatingSystem::Outros,
    ];

    /// The stored value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Android => "Android",
            Self::Ios => "iOS",
            Self::Windows => "Windows",
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Outros => "outros",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatingSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|os| os.as_str() == s)
            .ok_or_else(|| Error::InvalidField {
                field: format!("sistemaOperacional={s}"),
            })
    }
}

/// A registered device, as stored in the `devices` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Display name chosen by the user.
    pub nome: String,
    /// Kind of device.
    pub tipo: DeviceType,
    /// Manufacturer.
    pub marca: String,
    /// Model name.
    pub modelo: String,
    /// Operating system.
    pub sistema_operacional: OperatingSystem,
    /// Operating system version.
    #[serde(default)]
    pub versao: String,
    /// IMEI, for mobile devices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imei: Option<String>,
    /// Serial number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_serie: Option<String>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
    /// Owner of the record.
    pub user_id: String,
    /// When the record was submitted.
    pub data_registro: DateTime<Utc>,
}

/// A device record together with its store identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDevice {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// The record body.
    pub record: DeviceRecord,
}

impl TryFrom<&Document> for StoredDevice {
    type Error = Error;

    fn try_from(doc: &Document) -> Result<Self> {
        Ok(Self {
            id: doc.id.clone(),
            record: doc.decode()?,
        })
    }
}

/// A profile form submission, as stored in the `formularios` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSubmission {
    /// Full name.
    pub nome: String,
    /// Email address, taken from the session.
    pub email: String,
    /// Phone number.
    pub telefone: String,
    /// Age, as typed.
    pub idade: String,
    /// Profession.
    pub profissao: String,
    /// Free-form message.
    pub mensagem: String,
    /// Owner of the record.
    pub user_id: String,
    /// When the record was submitted.
    pub timestamp: DateTime<Utc>,
}

/// Turn an empty string into `None`.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

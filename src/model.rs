//! Input records as they come out of the record store.
//!
//! Field names follow the store's JSON (`picName`, `unitName`, `filePath`, ...)
//! so snapshots can be deserialized directly.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinuteStatus {
    #[default]
    Draft,
    Final,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceState {
    #[serde(rename = "hadir")]
    Present,
    #[serde(rename = "tidak_hadir")]
    Absent,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgendaItem {
    #[serde(default)]
    pub topic: String,
    /// Rich text (HTML from the editor).
    #[serde(default)]
    pub decision: String,
    /// Rich text (HTML from the editor).
    #[serde(default)]
    pub action: String,
    #[serde(default, rename = "pic")]
    pub executor: String,
    #[serde(default, rename = "monitoring")]
    pub monitoring_note: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// Unit name captured when the participant was added; may be stale.
    #[serde(default, rename = "unitName")]
    pub cached_unit_label: Option<String>,
    #[serde(rename = "attendance")]
    pub attendance_state: AttendanceState,
    /// Data URL. Only meaningful while `attendance_state` is `Present`.
    #[serde(default, rename = "signature")]
    pub signature_image: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    /// Data URL for uploaded content, otherwise an opaque storage reference.
    #[serde(rename = "filePath")]
    pub payload: String,
    #[serde(default)]
    pub uploaded_at: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
    /// `HH:mm`.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "picId")]
    pub responsible_party_id: String,
    #[serde(default, rename = "picName")]
    pub responsible_party_name: String,
    #[serde(default, rename = "picSignature")]
    pub responsible_party_signature: Option<String>,
    #[serde(default, rename = "items")]
    pub agenda_items: Vec<AgendaItem>,
    #[serde(default)]
    pub status: MinuteStatus,
    #[serde(default)]
    pub unit_id: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

impl UnitRecord {
    /// Abbreviation when present and non-empty, otherwise the full name.
    pub fn display_label(&self) -> &str {
        match self.abbreviation.as_deref() {
            Some(abbr) if !abbr.is_empty() => abbr,
            _ => &self.name,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub unit_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BrandingAssets {
    #[serde(default, rename = "logoBase64")]
    pub document_logo: Option<String>,
    #[serde(default, rename = "sidebarLogoBase64")]
    pub sidebar_logo: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Permission level of the acting user inside its organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn can_edit(&self) -> bool {
        *self >= Role::Editor
    }
}

/// The user on whose behalf a library operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInUser {
    pub user_id: i64,
    pub org_id: i64,
    pub login: String,
    pub avatar_url: String,
    pub role: Role,
}

impl SignedInUser {
    pub fn new(user_id: i64, org_id: i64, login: impl Into<String>, role: Role) -> Self {
        let login = login.into();
        Self {
            avatar_url: format!("/avatar/{login}"),
            user_id,
            org_id,
            login,
            role,
        }
    }

    pub fn as_panel_user(&self) -> PanelUser {
        PanelUser {
            id: self.user_id,
            name: self.login.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// User reference recorded in panel metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelUser {
    pub id: i64,
    pub name: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPanelMeta {
    pub can_edit: bool,
    pub connected_dashboards: usize,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub created_by: PanelUser,
    pub updated_by: PanelUser,
}

/// A reusable panel definition shared between dashboards.
///
/// `model` is the panel JSON as the dashboard stores it. Its `title` always
/// mirrors `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPanel {
    pub id: i64,
    pub org_id: i64,
    pub folder_id: i64,
    pub uid: String,
    pub name: String,
    pub model: Map<String, Value>,
    pub meta: LibraryPanelMeta,
}

impl LibraryPanel {
    /// Panel plugin type from the model, if present (`"timeseries"`, `"text"`, ...).
    pub fn panel_type(&self) -> Option<&str> {
        self.model.get("type").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLibraryPanelCommand {
    /// Caller-chosen uid; one is generated when absent.
    #[serde(default)]
    pub uid: Option<String>,
    pub folder_id: i64,
    pub name: String,
    #[serde(default)]
    pub model: Map<String, Value>,
}

/// Partial update. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchLibraryPanelCommand {
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_order_by_privilege() {
        assert!(!Role::Viewer.can_edit());
        assert!(Role::Editor.can_edit());
        assert!(Role::Admin.can_edit());
    }

    #[test]
    fn patch_command_fields_default_to_keep() {
        let cmd: PatchLibraryPanelCommand = serde_json::from_str(r#"{"name":"X"}"#).unwrap();
        assert_eq!(cmd.folder_id, None);
        assert_eq!(cmd.name.as_deref(), Some("X"));
        assert!(cmd.model.is_none());
    }
}

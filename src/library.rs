//! In-memory store of library panels.
//!
//! Panels are scoped by organization: a panel in another org behaves exactly like
//! an unknown uid. Within an org, a name is unique per folder. The panel model's
//! `title` always follows the panel name.
//!
//! ```
//! use vizlegend::library::LibraryPanelService;
//! use vizlegend::models::{CreateLibraryPanelCommand, Role, SignedInUser};
//!
//! let mut svc = LibraryPanelService::new();
//! let admin = SignedInUser::new(1, 1, "admin", Role::Admin);
//! let panel = svc.create(&admin, CreateLibraryPanelCommand {
//!     uid: None,
//!     folder_id: 1,
//!     name: "CPU usage".into(),
//!     model: serde_json::Map::new(),
//! })?;
//! assert_eq!(panel.model["title"], "CPU usage");
//! # Ok::<(), vizlegend::error::LibraryError>(())
//! ```

use chrono::Utc;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use uuid::Uuid;

use crate::error::{LegendError, LibraryError};
use crate::legend::VizLegendOptions;
use crate::models::{
    CreateLibraryPanelCommand, LibraryPanel, LibraryPanelMeta, PatchLibraryPanelCommand,
    SignedInUser,
};

static UID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_]{1,40}$").expect("valid uid pattern"));

pub type Result<T> = std::result::Result<T, LibraryError>;

/// `panel.meta.connected_dashboards` mirrors `dashboards.len()`; `panel.meta.can_edit`
/// holds the last writer's permission, which is always an editor's. Both are
/// recomputed for the reader in [`LibraryPanelService::get`] and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredPanel {
    panel: LibraryPanel,
    dashboards: BTreeSet<i64>,
}

/// Library panel store. Serializable so [`crate::storage`] can snapshot it.
///
/// Uids are unique across all organizations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryPanelService {
    next_id: i64,
    panels: BTreeMap<String, StoredPanel>,
}

fn ensure_editor(user: &SignedInUser) -> Result<()> {
    if user.role.can_edit() {
        Ok(())
    } else {
        warn!("user {} ({:?}) tried to modify a library panel", user.user_id, user.role);
        Err(LibraryError::Forbidden(user.user_id))
    }
}

fn sync_title(model: &mut Map<String, Value>, name: &str) {
    model.insert("title".into(), Value::String(name.to_string()));
}

impl LibraryPanelService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of panels across all organizations.
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    fn view(&self, stored: &StoredPanel, user: &SignedInUser) -> LibraryPanel {
        let mut panel = stored.panel.clone();
        panel.meta.can_edit = user.role.can_edit();
        panel.meta.connected_dashboards = stored.dashboards.len();
        panel
    }

    fn stored_mut(&mut self, user: &SignedInUser, uid: &str) -> Result<&mut StoredPanel> {
        match self.panels.get_mut(uid) {
            Some(s) if s.panel.org_id == user.org_id => Ok(s),
            _ => Err(LibraryError::NotFound(uid.to_string())),
        }
    }

    fn stored(&self, user: &SignedInUser, uid: &str) -> Result<&StoredPanel> {
        match self.panels.get(uid) {
            Some(s) if s.panel.org_id == user.org_id => Ok(s),
            _ => Err(LibraryError::NotFound(uid.to_string())),
        }
    }

    fn name_taken(&self, org_id: i64, folder_id: i64, name: &str, except_uid: &str) -> bool {
        self.panels.values().any(|s| {
            s.panel.uid != except_uid
                && s.panel.org_id == org_id
                && s.panel.folder_id == folder_id
                && s.panel.name == name
        })
    }

    pub fn create(
        &mut self,
        user: &SignedInUser,
        cmd: CreateLibraryPanelCommand,
    ) -> Result<LibraryPanel> {
        ensure_editor(user)?;
        let name = cmd.name.trim().to_string();
        if name.is_empty() {
            return Err(LibraryError::InvalidName);
        }
        let uid = match cmd.uid {
            Some(uid) if !UID_PATTERN.is_match(&uid) => return Err(LibraryError::InvalidUid(uid)),
            Some(uid) if self.panels.contains_key(&uid) => {
                return Err(LibraryError::UidExists(uid));
            }
            Some(uid) => uid,
            None => Uuid::new_v4().simple().to_string(),
        };
        if self.name_taken(user.org_id, cmd.folder_id, &name, "") {
            return Err(LibraryError::NameExists {
                name,
                folder_id: cmd.folder_id,
            });
        }

        let mut model = cmd.model;
        sync_title(&mut model, &name);
        let now = Utc::now();
        self.next_id += 1;
        let panel = LibraryPanel {
            id: self.next_id,
            org_id: user.org_id,
            folder_id: cmd.folder_id,
            uid: uid.clone(),
            name,
            model,
            meta: LibraryPanelMeta {
                can_edit: true,
                connected_dashboards: 0,
                created: now,
                updated: now,
                created_by: user.as_panel_user(),
                updated_by: user.as_panel_user(),
            },
        };
        debug!("created library panel {} ({:?})", uid, panel.name);
        let stored = StoredPanel {
            panel,
            dashboards: BTreeSet::new(),
        };
        let view = self.view(&stored, user);
        self.panels.insert(uid, stored);
        Ok(view)
    }

    pub fn get(&self, user: &SignedInUser, uid: &str) -> Result<LibraryPanel> {
        let stored = self.stored(user, uid)?;
        Ok(self.view(stored, user))
    }

    /// Panels of the user's org, ordered by name then uid.
    pub fn list(&self, user: &SignedInUser) -> Vec<LibraryPanel> {
        let mut out: Vec<LibraryPanel> = self
            .panels
            .values()
            .filter(|s| s.panel.org_id == user.org_id)
            .map(|s| self.view(s, user))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.uid.cmp(&b.uid)));
        out
    }

    /// Apply a partial update.
    ///
    /// - `folder_id` moves the panel.
    /// - `name` renames it and retitles the model.
    /// - `model` replaces the whole model; its `title` is then forced to the panel name.
    ///
    /// The (org, folder, name) uniqueness check runs against the final state; on
    /// failure nothing is changed.
    pub fn patch(
        &mut self,
        user: &SignedInUser,
        uid: &str,
        cmd: PatchLibraryPanelCommand,
    ) -> Result<LibraryPanel> {
        let current = self.stored(user, uid)?;
        ensure_editor(user)?;

        let folder_id = cmd.folder_id.unwrap_or(current.panel.folder_id);
        let name = match cmd.name {
            Some(n) => {
                let n = n.trim().to_string();
                if n.is_empty() {
                    return Err(LibraryError::InvalidName);
                }
                n
            }
            None => current.panel.name.clone(),
        };
        if self.name_taken(user.org_id, folder_id, &name, uid) {
            warn!("patch of {uid} rejected: name {name:?} taken in folder {folder_id}");
            return Err(LibraryError::NameExists { name, folder_id });
        }

        let stored = self.stored_mut(user, uid)?;
        let panel = &mut stored.panel;
        if let Some(model) = cmd.model {
            panel.model = model;
        }
        sync_title(&mut panel.model, &name);
        panel.folder_id = folder_id;
        panel.name = name;
        panel.meta.updated = Utc::now();
        panel.meta.updated_by = user.as_panel_user();
        debug!("patched library panel {uid}");

        let stored = self.stored(user, uid)?;
        Ok(self.view(stored, user))
    }

    /// Record that `dashboard_id` uses the panel. Connecting twice is a no-op.
    pub fn connect(
        &mut self,
        user: &SignedInUser,
        uid: &str,
        dashboard_id: i64,
    ) -> Result<LibraryPanel> {
        self.stored(user, uid)?;
        ensure_editor(user)?;
        let stored = self.stored_mut(user, uid)?;
        if stored.dashboards.insert(dashboard_id) {
            stored.panel.meta.connected_dashboards = stored.dashboards.len();
            debug!("connected library panel {uid} to dashboard {dashboard_id}");
        }
        let stored = self.stored(user, uid)?;
        Ok(self.view(stored, user))
    }

    pub fn disconnect(
        &mut self,
        user: &SignedInUser,
        uid: &str,
        dashboard_id: i64,
    ) -> Result<LibraryPanel> {
        self.stored(user, uid)?;
        ensure_editor(user)?;
        let stored = self.stored_mut(user, uid)?;
        if !stored.dashboards.remove(&dashboard_id) {
            return Err(LibraryError::NotConnected {
                uid: uid.to_string(),
                dashboard_id,
            });
        }
        stored.panel.meta.connected_dashboards = stored.dashboards.len();
        debug!("disconnected library panel {uid} from dashboard {dashboard_id}");
        let stored = self.stored(user, uid)?;
        Ok(self.view(stored, user))
    }

    /// Dashboards currently using the panel, ascending.
    pub fn connected_dashboards(&self, user: &SignedInUser, uid: &str) -> Result<Vec<i64>> {
        Ok(self.stored(user, uid)?.dashboards.iter().copied().collect())
    }

    pub fn delete(&mut self, user: &SignedInUser, uid: &str) -> Result<LibraryPanel> {
        let stored = self.stored(user, uid)?;
        ensure_editor(user)?;
        if !stored.dashboards.is_empty() {
            return Err(LibraryError::HasConnectedDashboards {
                uid: uid.to_string(),
                count: stored.dashboards.len(),
            });
        }
        let view = self.view(stored, user);
        self.panels.remove(uid);
        debug!("deleted library panel {uid}");
        Ok(view)
    }

    /// Legend options stored under `model.options.legend`, if any.
    pub fn legend_options(
        &self,
        user: &SignedInUser,
        uid: &str,
    ) -> Result<Option<VizLegendOptions>> {
        let stored = self.stored(user, uid)?;
        legend_from_model(&stored.panel.model).map_err(LibraryError::from)
    }

    pub fn set_legend_options(
        &mut self,
        user: &SignedInUser,
        uid: &str,
        legend: &VizLegendOptions,
    ) -> Result<LibraryPanel> {
        self.stored(user, uid)?;
        ensure_editor(user)?;
        let value = serde_json::to_value(legend).map_err(LegendError::from)?;

        let stored = self.stored_mut(user, uid)?;
        let options = stored
            .panel
            .model
            .entry("options")
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(options) = options else {
            return Err(LibraryError::ModelNotObject);
        };
        options.insert("legend".into(), value);
        stored.panel.meta.updated = Utc::now();
        stored.panel.meta.updated_by = user.as_panel_user();
        debug!(
            "set legend of {uid} to {} at {}",
            legend.display_mode, legend.placement
        );

        let stored = self.stored(user, uid)?;
        Ok(self.view(stored, user))
    }
}

/// Read `options.legend` out of a panel model.
///
/// `Ok(None)` when the model has no legend; an error when one is present but does
/// not match [`VizLegendOptions`].
pub fn legend_from_model(
    model: &Map<String, Value>,
) -> std::result::Result<Option<VizLegendOptions>, LegendError> {
    match model.get("options").and_then(|o| o.get("legend")) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => Ok(Some(serde_json::from_value(v.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use serde_json::json;

    fn admin() -> SignedInUser {
        SignedInUser::new(1, 1, "admin", Role::Admin)
    }

    fn create(svc: &mut LibraryPanelService, folder_id: i64, name: &str) -> LibraryPanel {
        svc.create(
            &admin(),
            CreateLibraryPanelCommand {
                uid: None,
                folder_id,
                name: name.into(),
                model: Map::new(),
            },
        )
        .unwrap()
    }

    #[test]
    fn ids_increase_and_uids_are_generated() {
        let mut svc = LibraryPanelService::new();
        let a = create(&mut svc, 1, "A");
        let b = create(&mut svc, 1, "B");
        assert_eq!(a.id + 1, b.id);
        assert_ne!(a.uid, b.uid);
        assert!(UID_PATTERN.is_match(&a.uid));
    }

    #[test]
    fn same_name_allowed_in_other_folder() {
        let mut svc = LibraryPanelService::new();
        create(&mut svc, 1, "A");
        let other = create(&mut svc, 2, "A");
        assert_eq!(other.folder_id, 2);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut svc = LibraryPanelService::new();
        let err = svc
            .create(
                &admin(),
                CreateLibraryPanelCommand {
                    uid: None,
                    folder_id: 1,
                    name: "   ".into(),
                    model: Map::new(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, LibraryError::InvalidName));
    }

    #[test]
    fn legend_round_trips_through_model() {
        let mut svc = LibraryPanelService::new();
        let p = create(&mut svc, 1, "A");
        assert_eq!(svc.legend_options(&admin(), &p.uid).unwrap(), None);

        let legend = VizLegendOptions::new(
            ["min", "max"],
            crate::legend::LegendDisplayMode::Table,
            crate::legend::LegendPlacement::Right,
        );
        let updated = svc.set_legend_options(&admin(), &p.uid, &legend).unwrap();
        assert_eq!(
            updated.model["options"]["legend"],
            json!({"calcs": ["min", "max"], "displayMode": "table", "placement": "right"})
        );
        assert_eq!(
            svc.legend_options(&admin(), &p.uid).unwrap(),
            Some(legend)
        );
    }

    #[test]
    fn malformed_legend_is_an_error() {
        let mut model = Map::new();
        model.insert("options".into(), json!({"legend": {"displayMode": "grid"}}));
        assert!(legend_from_model(&model).is_err());
    }

    #[test]
    fn non_object_options_cannot_hold_a_legend() {
        let mut svc = LibraryPanelService::new();
        let mut model = Map::new();
        model.insert("options".into(), json!([1, 2]));
        let p = svc
            .create(
                &admin(),
                CreateLibraryPanelCommand {
                    uid: None,
                    folder_id: 1,
                    name: "A".into(),
                    model,
                },
            )
            .unwrap();
        let err = svc
            .set_legend_options(&admin(), &p.uid, &VizLegendOptions::default())
            .unwrap_err();
        assert!(matches!(err, LibraryError::ModelNotObject));
    }
}

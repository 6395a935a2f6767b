//! Error types shared by the legend contract and the library panel store.

use thiserror::Error;

/// Errors raised while parsing or validating legend options.
#[derive(Debug, Error)]
pub enum LegendError {
    #[error("unknown legend placement `{0}` (expected `bottom` or `right`)")]
    UnknownPlacement(String),

    #[error("unknown legend display mode `{0}` (expected `hidden`, `list` or `table`)")]
    UnknownDisplayMode(String),

    #[error("unknown calculation id(s): {}", .0.join(", "))]
    UnknownCalcs(Vec<String>),

    #[error("calculation `{0}` listed more than once")]
    DuplicateCalc(String),

    #[error("invalid legend options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by [`crate::library::LibraryPanelService`].
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("library panel `{0}` not found")]
    NotFound(String),

    #[error("a library panel named `{name}` already exists in folder {folder_id}")]
    NameExists { name: String, folder_id: i64 },

    #[error("invalid library panel uid `{0}`")]
    InvalidUid(String),

    #[error("library panel uid `{0}` is not available")]
    UidExists(String),

    #[error("library panel name must not be empty")]
    InvalidName,

    #[error("user {0} is not allowed to modify library panels")]
    Forbidden(i64),

    #[error("library panel `{uid}` is still connected to {count} dashboard(s)")]
    HasConnectedDashboards { uid: String, count: usize },

    #[error("library panel `{uid}` is not connected to dashboard {dashboard_id}")]
    NotConnected { uid: String, dashboard_id: i64 },

    #[error("library panel model must be a JSON object")]
    ModelNotObject,

    #[error(transparent)]
    Legend(#[from] LegendError),
}

impl LibraryError {
    /// HTTP-like status code for front-ends that report errors that way.
    pub fn status(&self) -> u16 {
        match self {
            LibraryError::NotFound(_) => 404,
            LibraryError::Forbidden(_) => 403,
            LibraryError::NameExists { .. }
            | LibraryError::InvalidUid(_)
            | LibraryError::UidExists(_)
            | LibraryError::InvalidName
            | LibraryError::HasConnectedDashboards { .. }
            | LibraryError::NotConnected { .. }
            | LibraryError::ModelNotObject
            | LibraryError::Legend(_) => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(LibraryError::NotFound("x".into()).status(), 404);
        assert_eq!(LibraryError::Forbidden(3).status(), 403);
        assert_eq!(
            LibraryError::NameExists {
                name: "a".into(),
                folder_id: 1
            }
            .status(),
            400
        );
    }

    #[test]
    fn unknown_calcs_message_lists_all_ids() {
        let e = LegendError::UnknownCalcs(vec!["avg".into(), "p0".into()]);
        assert_eq!(e.to_string(), "unknown calculation id(s): avg, p0");
    }
}

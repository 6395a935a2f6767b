use crate::legend::VizLegendOptions;
use crate::library::{LibraryPanelService, legend_from_model};
use crate::models::LibraryPanel;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn defuse(cell: &str) -> String {
    if cell.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        format!("'{cell}")
    } else {
        cell.to_string()
    }
}

/// Save a panel listing as CSV with header.
///
/// Legend columns are empty for panels without `options.legend`, and read
/// `invalid` when the stored legend does not parse.
pub fn save_csv<P: AsRef<Path>>(panels: &[LibraryPanel], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record([
        "uid",
        "name",
        "folder_id",
        "org_id",
        "connected_dashboards",
        "legend_display_mode",
        "legend_placement",
        "legend_calcs",
        "updated",
    ])?;
    for p in panels {
        let (mode, placement, calcs) = match legend_from_model(&p.model) {
            Ok(Some(VizLegendOptions {
                calcs,
                display_mode,
                placement,
            })) => (
                display_mode.to_string(),
                placement.to_string(),
                calcs.join(";"),
            ),
            Ok(None) => (String::new(), String::new(), String::new()),
            Err(_) => ("invalid".to_string(), String::new(), String::new()),
        };
        wtr.write_record([
            defuse(&p.uid),
            defuse(&p.name),
            p.folder_id.to_string(),
            p.org_id.to_string(),
            p.meta.connected_dashboards.to_string(),
            mode,
            placement,
            defuse(&calcs),
            p.meta.updated.to_rfc3339(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the whole store as pretty JSON.
///
/// Written to a temporary file next to `path` and renamed into place, so a crash
/// never leaves a truncated store behind.
pub fn save_json<P: AsRef<Path>>(service: &LibraryPanelService, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    let s = serde_json::to_string_pretty(service)?;
    tmp.write_all(s.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    debug!("saved {} library panel(s) to {}", service.len(), path.display());
    Ok(())
}

/// Load a store saved by [`save_json`]. A missing file yields an empty store.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<LibraryPanelService> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("{} does not exist, starting empty", path.display());
        return Ok(LibraryPanelService::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let service: LibraryPanelService =
        serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateLibraryPanelCommand, Role, SignedInUser};
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("nested").join("x.json");
        let user = SignedInUser::new(1, 1, "admin", Role::Admin);
        let mut svc = LibraryPanelService::new();
        svc.create(
            &user,
            CreateLibraryPanelCommand {
                uid: Some("abc".into()),
                folder_id: 0,
                name: "Alpha".into(),
                model: serde_json::Map::new(),
            },
        )
        .unwrap();
        save_csv(&svc.list(&user), &csvp).unwrap();
        save_json(&svc, &jsonp).unwrap();
        assert!(csvp.exists());
        assert!(jsonp.exists());
    }

    #[test]
    fn defuse_only_touches_formula_starters() {
        assert_eq!(defuse("=1+1"), "'=1+1");
        assert_eq!(defuse("-x"), "'-x");
        assert_eq!(defuse("\t=1"), "'\t=1");
        assert_eq!(defuse("\rcmd"), "'\rcmd");
        assert_eq!(defuse("plain"), "plain");
    }
}

//! External display detection via the DRM connector state in sysfs.
//!
//! When an external monitor is attached the laptop is usually docked at a
//! desk, and the model can pin the baseline to the configured docked
//! brightness instead of tracking the sun. Detection reads
//! `/sys/class/drm/card*-*/status`, which the kernel keeps current without
//! any helper process.

use std::path::Path;

/// Internal panel connector prefixes, excluded from "external" detection.
const INTERNAL_CONNECTOR_PREFIXES: &[&str] = &["eDP", "LVDS", "DSI"];

/// Check whether any external display connector reports "connected".
///
/// Scans the default sysfs DRM tree. Errors (no DRM subsystem, permission
/// problems) are treated as "no external display" - wrong docked detection
/// only means the baseline tracks the sun, which is the safe fallback.
pub fn external_display_connected() -> bool {
    external_display_connected_in(Path::new("/sys/class/drm"))
}

/// Testable core of the connector scan, rooted at an arbitrary directory.
fn external_display_connected_in(drm_root: &Path) -> bool {
    let entries = match std::fs::read_dir(drm_root) {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();

        // Connector directories look like "card0-HDMI-A-1"; skip the bare
        // "card0" device nodes and anything that is not a connector.
        let Some((_, connector)) = name.split_once('-') else {
            continue;
        };
        if INTERNAL_CONNECTOR_PREFIXES
            .iter()
            .any(|prefix| connector.starts_with(prefix))
        {
            continue;
        }

        let status_path = entry.path().join("status");
        if let Ok(status) = std::fs::read_to_string(&status_path) {
            if status.trim() == "connected" {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn add_connector(root: &Path, name: &str, status: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("status"), format!("{}\n", status)).unwrap();
    }

    #[test]
    fn detects_connected_hdmi() {
        let dir = tempdir().unwrap();
        add_connector(dir.path(), "card0-eDP-1", "connected");
        add_connector(dir.path(), "card0-HDMI-A-1", "connected");
        assert!(external_display_connected_in(dir.path()));
    }

    #[test]
    fn ignores_internal_panel_and_disconnected_connectors() {
        let dir = tempdir().unwrap();
        add_connector(dir.path(), "card0-eDP-1", "connected");
        add_connector(dir.path(), "card0-HDMI-A-1", "disconnected");
        add_connector(dir.path(), "card0-DP-1", "disconnected");
        assert!(!external_display_connected_in(dir.path()));
    }

    #[test]
    fn missing_drm_tree_means_no_external_display() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(!external_display_connected_in(&missing));
    }

    #[test]
    fn bare_card_nodes_are_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("card0")).unwrap();
        add_connector(dir.path(), "card0-DP-2", "connected");
        assert!(external_display_connected_in(dir.path()));
    }
}

//! Panel status vocabulary migration
//!
//! Schemas before 20221222 reported a panel that was executing as `ready`.

use super::error::{EventFamily, MigrationError};
use super::version::SchemaVersion;
use crate::panels::{PanelDefinition, PanelStatus, PanelsMap};

/// Migrate one panel's status from the given source version string
pub fn migrate_panel_status(
    panel: &PanelDefinition,
    source_version: &str,
) -> Result<PanelDefinition, MigrationError> {
    let version = SchemaVersion::parse_for(source_version, EventFamily::Panel)?;
    Ok(migrate_panel_status_from(panel, version))
}

/// Migrate one panel's status from a known source version
pub fn migrate_panel_status_from(panel: &PanelDefinition, version: SchemaVersion) -> PanelDefinition {
    match version {
        SchemaVersion::V20220614 | SchemaVersion::V20220929 => {
            let mut migrated = panel.clone();
            if migrated.status == Some(PanelStatus::Ready) {
                migrated.status = Some(PanelStatus::Running);
            }
            migrated
        }
        SchemaVersion::V20221222 => panel.clone(),
    }
}

/// Migrate every panel in the map, returning a new map
pub fn migrate_panel_statuses(panels: &PanelsMap, version: SchemaVersion) -> PanelsMap {
    panels
        .iter()
        .map(|(name, panel)| (name.clone(), migrate_panel_status_from(panel, version)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn panel(status: PanelStatus) -> PanelDefinition {
        PanelDefinition::new("x.chart.a", "chart").with_status(status)
    }

    #[test]
    fn test_ready_becomes_running_for_old_versions() {
        for version in ["20220614", "20220929"] {
            let migrated = migrate_panel_status(&panel(PanelStatus::Ready), version).unwrap();
            assert_eq!(migrated.status, Some(PanelStatus::Running));
        }
    }

    #[test]
    fn test_other_statuses_unchanged_for_old_versions() {
        for status in [
            PanelStatus::Initialized,
            PanelStatus::Blocked,
            PanelStatus::Complete,
            PanelStatus::Error,
        ] {
            let migrated = migrate_panel_status(&panel(status), "20220614").unwrap();
            assert_eq!(migrated.status, Some(status));
        }
    }

    #[test]
    fn test_latest_is_identity() {
        let source = panel(PanelStatus::Ready);
        let migrated = migrate_panel_status(&source, "20221222").unwrap();
        assert_eq!(migrated, source);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let err = migrate_panel_status(&panel(PanelStatus::Ready), "20200101").unwrap_err();
        assert_matches!(err, MigrationError::UnsupportedSchemaVersion { ref version, .. } if version == "20200101");
    }

    #[test]
    fn test_map_migration_leaves_input_untouched() {
        let mut panels = PanelsMap::new();
        panels.insert("a".into(), panel(PanelStatus::Ready));
        panels.insert("b".into(), panel(PanelStatus::Complete));

        let migrated = migrate_panel_statuses(&panels, SchemaVersion::V20220929);

        assert_eq!(migrated["a"].status, Some(PanelStatus::Running));
        assert_eq!(migrated["b"].status, Some(PanelStatus::Complete));
        assert_eq!(panels["a"].status, Some(PanelStatus::Ready));
    }
}

//! Per-panel status history

use super::types::{PanelLogEntry, PanelsLog};
use chrono::{DateTime, Utc};
use dash_schema::config::compile_time::state::MAX_PANEL_LOG_ENTRIES;
use dash_schema::panels::{PanelDefinition, PanelsMap};

/// Append a log entry for `panel` if its status changed since the last entry.
///
/// Returns whether an entry was appended.
pub fn record_panel_status(
    log: &mut PanelsLog,
    panel: &PanelDefinition,
    timestamp: DateTime<Utc>,
) -> bool {
    let Some(status) = panel.status else {
        return false;
    };

    let entries = log.entry(panel.name.clone()).or_default();
    if entries.last().map(|entry| entry.status) == Some(status) {
        return false;
    }

    let execution_time_ms = if status.is_finished() {
        entries
            .first()
            .map(|first| (timestamp - first.timestamp).num_milliseconds())
    } else {
        None
    };

    entries.push(PanelLogEntry {
        status,
        timestamp,
        title: panel.display_title().to_string(),
        error: panel.error.clone(),
        execution_time_ms,
    });

    // The first entry anchors execution time, so trimming starts after it
    if entries.len() > MAX_PANEL_LOG_ENTRIES {
        let excess = entries.len() - MAX_PANEL_LOG_ENTRIES;
        entries.drain(1..=excess);
    }

    true
}

/// Log every panel's initial status
pub fn initial_panels_log(panels: &PanelsMap, timestamp: DateTime<Utc>) -> PanelsLog {
    let mut log = PanelsLog::new();
    for panel in panels.values() {
        record_panel_status(&mut log, panel, timestamp);
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use dash_schema::panels::PanelStatus;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 12, 22, 10, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn panel(status: PanelStatus) -> PanelDefinition {
        PanelDefinition::new("x.chart.a", "chart")
            .with_title("Chart A")
            .with_status(status)
    }

    #[test]
    fn test_repeated_status_is_not_logged() {
        let mut log = PanelsLog::new();

        assert!(record_panel_status(&mut log, &panel(PanelStatus::Running), at(0)));
        assert!(!record_panel_status(&mut log, &panel(PanelStatus::Running), at(1)));
        assert!(record_panel_status(&mut log, &panel(PanelStatus::Complete), at(3)));

        let entries = &log["x.chart.a"];
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Chart A");
        assert_eq!(entries[0].execution_time_ms, None);
        assert_eq!(entries[1].execution_time_ms, Some(3000));
    }

    #[test]
    fn test_error_entry_carries_message() {
        let mut log = PanelsLog::new();
        record_panel_status(&mut log, &panel(PanelStatus::Running), at(0));
        record_panel_status(
            &mut log,
            &panel(PanelStatus::Error).with_error("relation does not exist"),
            at(2),
        );

        let last = log["x.chart.a"].last().unwrap();
        assert_eq!(last.error.as_deref(), Some("relation does not exist"));
        assert_eq!(last.execution_time_ms, Some(2000));
    }

    #[test]
    fn test_panels_without_status_are_skipped() {
        let mut panels = PanelsMap::new();
        panels.insert("a".into(), PanelDefinition::new("a", "text"));
        panels.insert("b".into(), PanelDefinition::new("b", "chart").with_status(PanelStatus::Blocked));

        let log = initial_panels_log(&panels, at(0));

        assert!(!log.contains_key("a"));
        assert_eq!(log["b"].len(), 1);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = PanelsLog::new();
        for i in 0..(MAX_PANEL_LOG_ENTRIES as i64 + 10) {
            let status = if i % 2 == 0 {
                PanelStatus::Running
            } else {
                PanelStatus::Blocked
            };
            record_panel_status(&mut log, &panel(status), at(i));
        }
        let entries = &log["x.chart.a"];
        assert_eq!(entries.len(), MAX_PANEL_LOG_ENTRIES);
        assert_eq!(entries[0].timestamp, at(0));
        assert_eq!(entries[1].timestamp, at(11));
    }

    #[test]
    fn test_execution_time_survives_trimming() {
        let mut log = PanelsLog::new();
        let transitions = MAX_PANEL_LOG_ENTRIES as i64 + 20;
        for i in 0..transitions {
            let status = if i % 2 == 0 {
                PanelStatus::Running
            } else {
                PanelStatus::Blocked
            };
            record_panel_status(&mut log, &panel(status), at(i));
        }
        record_panel_status(&mut log, &panel(PanelStatus::Complete), at(transitions));

        let entries = &log["x.chart.a"];
        assert_eq!(entries.len(), MAX_PANEL_LOG_ENTRIES);
        assert_eq!(
            entries.last().and_then(|entry| entry.execution_time_ms),
            Some(transitions * 1000)
        );
    }
}

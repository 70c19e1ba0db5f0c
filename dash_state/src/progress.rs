//! Execution progress

use dash_schema::panels::PanelsMap;

/// Percentage of data panels that have completed or errored, rounded up.
///
/// Dashboards, containers and benchmarks only group other panels and are not
/// counted. A dashboard with no data panels is fully complete.
pub fn calculate_progress(panels: &PanelsMap) -> u8 {
    let (total, finished) = panels
        .values()
        .filter(|panel| !panel.panel_type.is_structural())
        .fold((0usize, 0usize), |(total, finished), panel| {
            let done = panel.status.is_some_and(|status| status.is_finished());
            (total + 1, finished + usize::from(done))
        });

    if total == 0 {
        return 100;
    }

    (100 * finished).div_ceil(total).min(100) as u8
}

//! Flattening a benchmark run into check results

use super::types::{
    CheckBenchmarkRef, CheckControlRef, CheckDimension, CheckResult, CheckResultStatus,
    CheckResultType, CheckSeverity,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Run state of a single control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlRunStatus {
    Initialized,
    Ready,
    Started,
    Running,
    Complete,
    Error,
}

impl ControlRunStatus {
    pub fn is_pending(&self) -> bool {
        !matches!(self, ControlRunStatus::Complete | ControlRunStatus::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRunResult {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub resource: String,
    pub status: CheckResultStatus,
    #[serde(default)]
    pub dimensions: Vec<CheckDimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRun {
    pub control_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub run_status: ControlRunStatus,
    #[serde(default)]
    pub run_error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<ControlRunResult>>,
}

/// Benchmark run tree as exported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub group_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub groups: Vec<BenchmarkRun>,
    #[serde(default)]
    pub controls: Vec<ControlRun>,
}

/// Flatten `run` into one check result per control result.
///
/// Controls without rows still produce one synthetic result: loading while
/// pending, error when the run failed, empty once complete.
pub fn collect_check_results(run: &BenchmarkRun) -> Vec<CheckResult> {
    let mut results = Vec::new();
    collect(run, 0, &mut Vec::new(), &BTreeMap::new(), &mut results);
    results
}

fn collect(
    run: &BenchmarkRun,
    position: usize,
    trunk: &mut Vec<CheckBenchmarkRef>,
    inherited_tags: &BTreeMap<String, String>,
    results: &mut Vec<CheckResult>,
) {
    trunk.push(CheckBenchmarkRef {
        name: run.group_id.clone(),
        title: run.title.clone().unwrap_or_else(|| run.group_id.clone()),
        description: run.description.clone(),
        sort: sort_key(position, run.title.as_deref(), &run.group_id),
    });

    let mut tags = inherited_tags.clone();
    tags.extend(run.tags.iter().map(|(k, v)| (k.clone(), v.clone())));

    for (index, group) in run.groups.iter().enumerate() {
        collect(group, index, trunk, &tags, results);
    }

    for (index, control) in run.controls.iter().enumerate() {
        collect_control(control, index, trunk, &tags, results);
    }

    trunk.pop();
}

fn collect_control(
    control: &ControlRun,
    position: usize,
    trunk: &[CheckBenchmarkRef],
    benchmark_tags: &BTreeMap<String, String>,
    results: &mut Vec<CheckResult>,
) {
    let mut tags = benchmark_tags.clone();
    tags.extend(control.tags.iter().map(|(k, v)| (k.clone(), v.clone())));

    let control_ref = CheckControlRef {
        name: control.control_id.clone(),
        title: control
            .title
            .clone()
            .unwrap_or_else(|| control.control_id.clone()),
        description: control.description.clone(),
        severity: control.severity.as_deref().and_then(CheckSeverity::parse),
        tags: control.tags.clone(),
        sort: sort_key(position, control.title.as_deref(), &control.control_id),
    };

    let synthetic = |result_type, status| CheckResult {
        result_type,
        status,
        reason: String::new(),
        resource: String::new(),
        dimensions: Vec::new(),
        tags: tags.clone(),
        error: control.run_error.clone(),
        control: control_ref.clone(),
        benchmark_trunk: trunk.to_vec(),
    };

    let rows = control.results.as_deref().unwrap_or_default();

    if control.run_status == ControlRunStatus::Error {
        results.push(synthetic(CheckResultType::Error, CheckResultStatus::Error));
        return;
    }

    if rows.is_empty() {
        let result_type = if control.run_status.is_pending() {
            CheckResultType::Loading
        } else {
            CheckResultType::Empty
        };
        results.push(synthetic(result_type, CheckResultStatus::Skip));
        return;
    }

    results.extend(rows.iter().map(|row| CheckResult {
        result_type: CheckResultType::Result,
        status: row.status,
        reason: row.reason.clone(),
        resource: row.resource.clone(),
        dimensions: row.dimensions.clone(),
        tags: tags.clone(),
        error: None,
        control: control_ref.clone(),
        benchmark_trunk: trunk.to_vec(),
    }));
}

/// Titles sort alphabetically; siblings without one keep their position
fn sort_key(position: usize, title: Option<&str>, name: &str) -> String {
    match title {
        Some(title) => title.to_lowercase(),
        None => format!("{:08}-{}", position, name),
    }
}

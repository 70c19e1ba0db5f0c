//! # Check Result Types
//!
//! Flattened benchmark results, one record per control result, each carrying
//! enough of its control and benchmark ancestry to be grouped in any order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Outcome of a single control result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckResultStatus {
    Alarm,
    Ok,
    Info,
    Skip,
    Error,
}

impl CheckResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckResultStatus::Alarm => "alarm",
            CheckResultStatus::Ok => "ok",
            CheckResultStatus::Info => "info",
            CheckResultStatus::Skip => "skip",
            CheckResultStatus::Error => "error",
        }
    }
}

impl fmt::Display for CheckResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a check result record stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckResultType {
    /// Control is still running and has produced nothing yet
    Loading,
    /// Control failed to run
    Error,
    /// Control ran and produced no rows
    Empty,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckSeverity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl CheckSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckSeverity::None => "none",
            CheckSeverity::Low => "low",
            CheckSeverity::Medium => "medium",
            CheckSeverity::High => "high",
            CheckSeverity::Critical => "critical",
        }
    }

    /// Lenient parse used for run payloads; unrecognised values yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" => Some(CheckSeverity::None),
            "low" => Some(CheckSeverity::Low),
            "medium" => Some(CheckSeverity::Medium),
            "high" => Some(CheckSeverity::High),
            "critical" => Some(CheckSeverity::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDimension {
    pub key: String,
    pub value: String,
}

/// Benchmark in a result's ancestry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckBenchmarkRef {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sort: String,
}

/// Control that produced a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckControlRef {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<CheckSeverity>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub sort: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub result_type: CheckResultType,

    pub status: CheckResultStatus,

    #[serde(default)]
    pub reason: String,

    #[serde(default)]
    pub resource: String,

    #[serde(default)]
    pub dimensions: Vec<CheckDimension>,

    /// Benchmark tags overlaid with the control's own tags
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub control: CheckControlRef,

    /// Ancestor benchmarks, root first
    pub benchmark_trunk: Vec<CheckBenchmarkRef>,
}

impl CheckResult {
    pub fn dimension(&self, key: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.key == key)
            .map(|dimension| dimension.value.as_str())
    }
}

/// Result counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub alarm: u32,
    pub ok: u32,
    pub info: u32,
    pub skip: u32,
    pub error: u32,
}

impl CheckSummary {
    pub fn of(status: CheckResultStatus) -> Self {
        let mut summary = Self::default();
        summary.record(status);
        summary
    }

    pub fn record(&mut self, status: CheckResultStatus) {
        match status {
            CheckResultStatus::Alarm => self.alarm += 1,
            CheckResultStatus::Ok => self.ok += 1,
            CheckResultStatus::Info => self.info += 1,
            CheckResultStatus::Skip => self.skip += 1,
            CheckResultStatus::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.alarm + self.ok + self.info + self.skip + self.error
    }
}

impl Add for CheckSummary {
    type Output = CheckSummary;

    fn add(self, other: CheckSummary) -> CheckSummary {
        CheckSummary {
            alarm: self.alarm + other.alarm,
            ok: self.ok + other.ok,
            info: self.info + other.info,
            skip: self.skip + other.skip,
            error: self.error + other.error,
        }
    }
}

impl AddAssign for CheckSummary {
    fn add_assign(&mut self, other: CheckSummary) {
        *self = *self + other;
    }
}

impl Sum for CheckSummary {
    fn sum<I: Iterator<Item = CheckSummary>>(iter: I) -> Self {
        iter.fold(CheckSummary::default(), Add::add)
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "alarm={} ok={} info={} skip={} error={}",
            self.alarm, self.ok, self.info, self.skip, self.error
        )
    }
}

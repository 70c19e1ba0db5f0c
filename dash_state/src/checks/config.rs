//! Grouping configuration
//!
//! Written as comma separated `type` or `type|value` tokens, for example
//! `benchmark,tag|service,control,result`.

use super::error::CheckGroupingError;
use dash_schema::config::compile_time::grouping::MAX_GROUPING_DEPTH;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One grouping level as supplied by the caller, not yet validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckGroupSpec {
    #[serde(rename = "type")]
    pub group_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl CheckGroupSpec {
    pub fn new(group_type: impl Into<String>) -> Self {
        Self {
            group_type: group_type.into(),
            value: None,
        }
    }

    pub fn with_value(group_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group_type: group_type.into(),
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for CheckGroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}|{}", self.group_type, value),
            None => f.write_str(&self.group_type),
        }
    }
}

/// A validated grouping level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckGrouping {
    Benchmark,
    Control,
    Dimension(String),
    Tag(String),
    Reason,
    Resource,
    Severity,
    Status,
    /// Leaf level; adds no group node
    Result,
}

impl CheckGrouping {
    pub fn type_name(&self) -> &'static str {
        match self {
            CheckGrouping::Benchmark => "benchmark",
            CheckGrouping::Control => "control",
            CheckGrouping::Dimension(_) => "dimension",
            CheckGrouping::Tag(_) => "tag",
            CheckGrouping::Reason => "reason",
            CheckGrouping::Resource => "resource",
            CheckGrouping::Severity => "severity",
            CheckGrouping::Status => "status",
            CheckGrouping::Result => "result",
        }
    }

    /// Dimension or tag key, for the levels that take one
    pub fn key(&self) -> Option<&str> {
        match self {
            CheckGrouping::Dimension(key) | CheckGrouping::Tag(key) => Some(key),
            _ => None,
        }
    }
}

impl TryFrom<&CheckGroupSpec> for CheckGrouping {
    type Error = CheckGroupingError;

    fn try_from(spec: &CheckGroupSpec) -> Result<Self, Self::Error> {
        let keyed = |build: fn(String) -> CheckGrouping| match spec.value.as_deref() {
            Some(value) if !value.is_empty() => Ok(build(value.to_string())),
            _ => Err(CheckGroupingError::MissingGroupingValue {
                group_type: spec.group_type.clone(),
            }),
        };

        match spec.group_type.as_str() {
            "benchmark" => Ok(CheckGrouping::Benchmark),
            "control" => Ok(CheckGrouping::Control),
            "dimension" => keyed(CheckGrouping::Dimension),
            "tag" => keyed(CheckGrouping::Tag),
            "reason" => Ok(CheckGrouping::Reason),
            "resource" => Ok(CheckGrouping::Resource),
            "severity" => Ok(CheckGrouping::Severity),
            "status" => Ok(CheckGrouping::Status),
            "result" => Ok(CheckGrouping::Result),
            other => Err(CheckGroupingError::UnknownGroupingType {
                group_type: other.to_string(),
            }),
        }
    }
}

/// Split grouping tokens into specs; types are checked later by [`validate_grouping`]
pub fn parse_grouping_config(tokens: &str) -> Result<Vec<CheckGroupSpec>, CheckGroupingError> {
    tokens
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let (group_type, value) = match token.split_once('|') {
                Some((group_type, value)) => {
                    let value = value.trim();
                    (group_type.trim(), (!value.is_empty()).then(|| value.to_string()))
                }
                None => (token, None),
            };

            if group_type.is_empty() {
                return Err(CheckGroupingError::InvalidToken {
                    token: token.to_string(),
                });
            }

            Ok(CheckGroupSpec {
                group_type: group_type.to_string(),
                value,
            })
        })
        .collect()
}

pub fn format_grouping_config(specs: &[CheckGroupSpec]) -> String {
    specs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Validate every level and the overall depth
pub fn validate_grouping(specs: &[CheckGroupSpec]) -> Result<Vec<CheckGrouping>, CheckGroupingError> {
    if specs.len() > MAX_GROUPING_DEPTH {
        return Err(CheckGroupingError::GroupingTooDeep {
            depth: specs.len(),
            max_depth: MAX_GROUPING_DEPTH,
        });
    }
    specs.iter().map(CheckGrouping::try_from).collect()
}

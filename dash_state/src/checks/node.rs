//! # Check Node Tree
//!
//! Group nodes (root, benchmark, control, key/value) hold children; terminal
//! nodes (result, error, running, empty) stand for exactly one check result.
//! Summaries and status are folded from the leaves on demand.

use super::types::{CheckResult, CheckSeverity, CheckSummary};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckNodeStatus {
    Running,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckNodeKind {
    Root,
    Benchmark,
    Control {
        #[serde(skip_serializing_if = "Option::is_none")]
        severity: Option<CheckSeverity>,
    },
    KeyValuePair {
        group_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        value: String,
    },
    Result {
        result: Box<CheckResult>,
    },
    Error {
        message: String,
    },
    Running,
    EmptyResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckNode {
    pub sort: String,
    pub name: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: CheckNodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CheckNode>,
}

impl CheckNode {
    pub fn root() -> Self {
        Self {
            sort: String::new(),
            name: ROOT_NODE_NAME.to_string(),
            title: ROOT_NODE_NAME.to_string(),
            kind: CheckNodeKind::Root,
            children: Vec::new(),
        }
    }

    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        sort: impl Into<String>,
        kind: CheckNodeKind,
    ) -> Self {
        Self {
            sort: sort.into(),
            name: name.into(),
            title: title.into(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: CheckNode) -> Self {
        self.children.push(child);
        self
    }

    /// Terminal nodes stand for a single result and are never merged
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            CheckNodeKind::Result { .. }
                | CheckNodeKind::Error { .. }
                | CheckNodeKind::Running
                | CheckNodeKind::EmptyResult
        )
    }

    /// This node's own contribution, excluding children
    fn own_summary(&self) -> CheckSummary {
        match &self.kind {
            CheckNodeKind::Result { result } => CheckSummary::of(result.status),
            CheckNodeKind::Error { .. } => CheckSummary {
                error: 1,
                ..CheckSummary::default()
            },
            _ => CheckSummary::default(),
        }
    }

    pub fn summary(&self) -> CheckSummary {
        self.own_summary() + self.children.iter().map(CheckNode::summary).sum::<CheckSummary>()
    }

    pub fn status(&self) -> CheckNodeStatus {
        let running = matches!(self.kind, CheckNodeKind::Running)
            || self
                .children
                .iter()
                .any(|child| child.status() == CheckNodeStatus::Running);
        if running {
            CheckNodeStatus::Running
        } else {
            CheckNodeStatus::Complete
        }
    }

    /// Depth-first visit of every node, including this one
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a CheckNode, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a CheckNode, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }

    pub fn find(&self, name: &str) -> Option<&CheckNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

pub const ROOT_NODE_NAME: &str = "root";

//! # Check Result Grouping
//!
//! Each result is turned into a single chain of group nodes, one per
//! grouping level, ending in its terminal node. Chains are then merged into
//! the tree: a group node joins an existing sibling with the same name,
//! terminal nodes are always appended.

use super::config::{validate_grouping, CheckGroupSpec, CheckGrouping};
use super::error::CheckGroupingError;
use super::node::{CheckNode, CheckNodeKind, ROOT_NODE_NAME};
use super::types::{CheckResult, CheckResultType};
use dash_schema::logging::codes;
use dash_schema::{log_debug, log_success};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Group key used when a result has no value for the grouping level
pub const OTHER_GROUP: &str = "Other";

/// Expand/collapse state of one group node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckNodeState {
    pub expanded: bool,
}

/// Expand/collapse state of group nodes, keyed by node name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckNodeStates {
    nodes: BTreeMap<String, CheckNodeState>,
}

impl CheckNodeStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<CheckNodeState> {
        self.nodes.get(name).copied()
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.get(name).is_some_and(|state| state.expanded)
    }

    pub fn set_expanded(&mut self, name: &str, expanded: bool) {
        self.nodes
            .insert(name.to_string(), CheckNodeState { expanded });
    }

    /// Flip a known node; unknown names are ignored
    pub fn toggle(&mut self, name: &str) {
        if let Some(state) = self.nodes.get_mut(name) {
            state.expanded = !state.expanded;
        }
    }

    pub fn expand_all(&mut self) {
        self.nodes.values_mut().for_each(|state| state.expanded = true);
    }

    pub fn collapse_all(&mut self) {
        self.nodes.values_mut().for_each(|state| state.expanded = false);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}

/// Grouped tree plus the matching expand/collapse table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedChecks {
    pub root: CheckNode,
    pub states: CheckNodeStates,
}

/// Group `results` by `config` and carry forward expand/collapse state.
///
/// Group nodes seen in `previous` keep their state; new ones start collapsed
/// unless `expand_new_nodes` is set.
///
/// States are keyed by node name. Benchmark and control nodes are named after
/// the benchmark or control itself, so a control repeated under several
/// key/value buckets shares a single state entry. Key/value nodes embed their
/// parent's name and are distinct per bucket.
pub fn group_check_results(
    results: &[CheckResult],
    config: &[CheckGroupSpec],
    previous: &CheckNodeStates,
    expand_new_nodes: bool,
) -> Result<GroupedChecks, CheckGroupingError> {
    let levels = validate_grouping(config)?;

    let mut root = CheckNode::root();
    for (index, result) in results.iter().enumerate() {
        let chain = result_chain(result, index, &levels);
        merge_child(&mut root.children, chain);
    }
    sort_groups(&mut root);

    let mut states = CheckNodeStates::new();
    root.walk(&mut |node, _| {
        if node.is_leaf() || matches!(node.kind, CheckNodeKind::Root) {
            return;
        }
        let state = previous.get(&node.name).unwrap_or(CheckNodeState {
            expanded: expand_new_nodes,
        });
        states.nodes.insert(node.name.clone(), state);
    });

    log_success!(codes::success::GROUPING_COMPLETE, "Grouped check results",
        "results" => results.len(),
        "levels" => levels.len(),
        "group_nodes" => states.len()
    );

    Ok(GroupedChecks { root, states })
}

/// Build the chain of nodes for one result, outermost first, nested
fn result_chain(result: &CheckResult, index: usize, levels: &[CheckGrouping]) -> CheckNode {
    let mut groups: Vec<CheckNode> = Vec::new();
    let mut parent = ROOT_NODE_NAME.to_string();

    for level in levels {
        if *level == CheckGrouping::Result {
            break;
        }
        for node in level_nodes(result, level, &parent) {
            parent = node.name.clone();
            groups.push(node);
        }
    }

    let leaf = terminal_node(result, index);
    groups
        .into_iter()
        .rev()
        .fold(leaf, |child, group| group.with_child(child))
}

/// Group nodes one grouping level contributes for a result
fn level_nodes(result: &CheckResult, level: &CheckGrouping, parent: &str) -> Vec<CheckNode> {
    match level {
        CheckGrouping::Benchmark => result
            .benchmark_trunk
            .iter()
            .skip(1)
            .map(|benchmark| {
                CheckNode::new(
                    &benchmark.name,
                    &benchmark.title,
                    &benchmark.sort,
                    CheckNodeKind::Benchmark,
                )
            })
            .collect(),
        CheckGrouping::Control => vec![CheckNode::new(
            &result.control.name,
            &result.control.title,
            &result.control.sort,
            CheckNodeKind::Control {
                severity: result.control.severity,
            },
        )],
        CheckGrouping::Result => Vec::new(),
        other => {
            let value = group_value(result, other);
            vec![key_value_node(parent, other, value)]
        }
    }
}

/// Value a result is grouped under for a key/value level
fn group_value(result: &CheckResult, level: &CheckGrouping) -> String {
    let or_other = |value: Option<&str>| -> String {
        value
            .filter(|value| !value.is_empty())
            .unwrap_or(OTHER_GROUP)
            .to_string()
    };

    match level {
        CheckGrouping::Dimension(key) => or_other(result.dimension(key)),
        CheckGrouping::Tag(key) => or_other(result.tags.get(key).map(String::as_str)),
        CheckGrouping::Reason => or_other(Some(result.reason.as_str())),
        CheckGrouping::Resource => or_other(Some(result.resource.as_str())),
        CheckGrouping::Severity => or_other(result.control.severity.map(|s| s.as_str())),
        CheckGrouping::Status => match result.result_type {
            CheckResultType::Loading => "running".to_string(),
            CheckResultType::Empty => "empty".to_string(),
            CheckResultType::Error | CheckResultType::Result => result.status.as_str().to_string(),
        },
        CheckGrouping::Benchmark | CheckGrouping::Control | CheckGrouping::Result => {
            OTHER_GROUP.to_string()
        }
    }
}

fn key_value_node(parent: &str, level: &CheckGrouping, value: String) -> CheckNode {
    let token = match level.key() {
        Some(key) => format!("{}|{}", level.type_name(), key),
        None => level.type_name().to_string(),
    };
    CheckNode::new(
        format!("{}/{}={}", parent, token, value),
        value.clone(),
        value.clone(),
        CheckNodeKind::KeyValuePair {
            group_type: level.type_name().to_string(),
            key: level.key().map(str::to_string),
            value,
        },
    )
}

fn terminal_node(result: &CheckResult, index: usize) -> CheckNode {
    let name = format!("{}/result-{}", result.control.name, index);
    let sort = format!("{:08}", index);
    match result.result_type {
        CheckResultType::Loading => {
            CheckNode::new(name, &result.control.title, sort, CheckNodeKind::Running)
        }
        CheckResultType::Error => CheckNode::new(
            name,
            &result.control.title,
            sort,
            CheckNodeKind::Error {
                message: result.error.clone().unwrap_or_default(),
            },
        ),
        CheckResultType::Empty => {
            CheckNode::new(name, &result.control.title, sort, CheckNodeKind::EmptyResult)
        }
        CheckResultType::Result => CheckNode::new(
            name,
            &result.reason,
            sort,
            CheckNodeKind::Result {
                result: Box::new(result.clone()),
            },
        ),
    }
}

/// Merge a chain into `children`, joining group nodes by name
fn merge_child(children: &mut Vec<CheckNode>, node: CheckNode) {
    if node.is_leaf() {
        children.push(node);
        return;
    }

    match children
        .iter_mut()
        .find(|existing| !existing.is_leaf() && existing.name == node.name)
    {
        Some(existing) => {
            log_debug!("Merging group node", "name" => &node.name);
            for child in node.children {
                merge_child(&mut existing.children, child);
            }
        }
        None => children.push(node),
    }
}

/// Order group nodes by sort key ahead of terminal nodes, which keep their input order
fn sort_groups(node: &mut CheckNode) {
    node.children.sort_by(|a, b| match (a.is_leaf(), b.is_leaf()) {
        (false, false) => a.sort.cmp(&b.sort),
        (true, true) => Ordering::Equal,
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
    });
    for child in &mut node.children {
        sort_groups(child);
    }
}

//! # Panel Model
//!
//! Panels are the named nodes of a dashboard execution tree. Only the fields
//! the core reasons about are typed; every other property a panel carries
//! (sql, data, properties, dependencies, ...) is preserved verbatim in
//! [`PanelDefinition::properties`] so events round-trip without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Panels keyed by panel name
pub type PanelsMap = BTreeMap<String, PanelDefinition>;

/// Kind of panel. Unknown kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PanelType {
    Dashboard,
    Container,
    Benchmark,
    Control,
    Card,
    Chart,
    Table,
    Text,
    Image,
    Input,
    Flow,
    Graph,
    Hierarchy,
    Other(String),
}

impl PanelType {
    pub fn as_str(&self) -> &str {
        match self {
            PanelType::Dashboard => "dashboard",
            PanelType::Container => "container",
            PanelType::Benchmark => "benchmark",
            PanelType::Control => "control",
            PanelType::Card => "card",
            PanelType::Chart => "chart",
            PanelType::Table => "table",
            PanelType::Text => "text",
            PanelType::Image => "image",
            PanelType::Input => "input",
            PanelType::Flow => "flow",
            PanelType::Graph => "graph",
            PanelType::Hierarchy => "hierarchy",
            PanelType::Other(name) => name,
        }
    }

    /// Structural panels group other panels and never produce data themselves
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PanelType::Dashboard | PanelType::Container | PanelType::Benchmark
        )
    }
}

impl From<String> for PanelType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "dashboard" => PanelType::Dashboard,
            "container" => PanelType::Container,
            "benchmark" => PanelType::Benchmark,
            "control" => PanelType::Control,
            "card" => PanelType::Card,
            "chart" => PanelType::Chart,
            "table" => PanelType::Table,
            "text" => PanelType::Text,
            "image" => PanelType::Image,
            "input" => PanelType::Input,
            "flow" => PanelType::Flow,
            "graph" => PanelType::Graph,
            "hierarchy" => PanelType::Hierarchy,
            _ => PanelType::Other(value),
        }
    }
}

impl From<&str> for PanelType {
    fn from(value: &str) -> Self {
        PanelType::from(value.to_string())
    }
}

impl From<PanelType> for String {
    fn from(value: PanelType) -> Self {
        match value {
            PanelType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PanelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Panel run status.
///
/// `Ready` only appears in events from the 20220614 and 20220929 schemas,
/// where it meant what `Running` means today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Ready,
    Initialized,
    Blocked,
    Running,
    Cancelled,
    Error,
    Complete,
}

impl PanelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelStatus::Ready => "ready",
            PanelStatus::Initialized => "initialized",
            PanelStatus::Blocked => "blocked",
            PanelStatus::Running => "running",
            PanelStatus::Cancelled => "cancelled",
            PanelStatus::Error => "error",
            PanelStatus::Complete => "complete",
        }
    }

    /// Whether the panel has finished, successfully or not
    pub fn is_finished(&self) -> bool {
        matches!(self, PanelStatus::Complete | PanelStatus::Error)
    }
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelDefinition {
    pub name: String,

    pub panel_type: PanelType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PanelStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// All remaining panel properties, untouched
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl PanelDefinition {
    pub fn new(name: impl Into<String>, panel_type: impl Into<PanelType>) -> Self {
        Self {
            name: name.into(),
            panel_type: panel_type.into(),
            title: None,
            status: None,
            error: None,
            properties: Map::new(),
        }
    }

    pub fn with_status(mut self, status: PanelStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Overlay the fields present in `update` onto this panel
    pub fn merged_with(&self, update: &PanelDefinition) -> PanelDefinition {
        let mut merged = self.clone();
        merged.panel_type = update.panel_type.clone();
        if update.title.is_some() {
            merged.title = update.title.clone();
        }
        if update.status.is_some() {
            merged.status = update.status;
        }
        if update.error.is_some() {
            merged.error = update.error.clone();
        }
        for (key, value) in &update.properties {
            merged.properties.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Title when set, otherwise the panel name
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// Node of the dashboard layout tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub name: String,

    pub panel_type: PanelType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutNode>,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl LayoutNode {
    pub fn new(name: impl Into<String>, panel_type: impl Into<PanelType>) -> Self {
        Self {
            name: name.into(),
            panel_type: panel_type.into(),
            children: Vec::new(),
            properties: Map::new(),
        }
    }

    pub fn with_child(mut self, child: LayoutNode) -> Self {
        self.children.push(child);
        self
    }

    /// Names of every node in the tree, depth first
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        for child in &self.children {
            names.extend(child.names());
        }
        names
    }
}

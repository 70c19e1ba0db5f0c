//! Consolidated log codes and classification system
//!
//! Single source of truth for every code emitted by the dashboard core, together
//! with the metadata used to classify and render it.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_INVALID: Code = Code::new("ERR003");
}

/// Schema migration error codes
pub mod schema {
    use super::Code;

    pub const UNSUPPORTED_SCHEMA_VERSION: Code = Code::new("E100");
    pub const INVALID_EVENT_PAYLOAD: Code = Code::new("E101");
    pub const MIGRATION_STEP_MISMATCH: Code = Code::new("E102");
}

/// Event reduction codes
pub mod events {
    use super::Code;

    pub const UNKNOWN_ACTION: Code = Code::new("E200");
    pub const STALE_EXECUTION: Code = Code::new("E201");
    pub const EXECUTION_FAILED: Code = Code::new("E202");
    pub const WORKSPACE_ERROR: Code = Code::new("E203");
}

/// Snapshot loader codes
pub mod loader {
    use super::Code;

    pub const SNAPSHOT_NOT_FOUND: Code = Code::new("E300");
    pub const INVALID_EXTENSION: Code = Code::new("E301");
    pub const SNAPSHOT_TOO_LARGE: Code = Code::new("E302");
    pub const SNAPSHOT_PARSE_FAILED: Code = Code::new("E303");
    pub const IO_ERROR: Code = Code::new("E304");
}

/// Check grouping codes
pub mod grouping {
    use super::Code;

    pub const UNKNOWN_GROUPING_TYPE: Code = Code::new("E400");
    pub const MISSING_GROUPING_VALUE: Code = Code::new("E401");
    pub const GROUPING_TOO_DEEP: Code = Code::new("E402");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const MIGRATION_COMPLETE: Code = Code::new("I100");
    pub const EXECUTION_STARTED: Code = Code::new("I200");
    pub const EXECUTION_COMPLETE: Code = Code::new("I201");
    pub const SNAPSHOT_LOADED: Code = Code::new("I300");
    pub const GROUPING_COMPLETE: Code = Code::new("I400");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

#[rustfmt::skip]
const METADATA: &[(&str, &str, Severity, bool, bool, &str, &str)] = &[
    ("ERR001", "System", Severity::Critical, false, true,
        "Critical internal error", "File a bug report with the failing input"),
    ("ERR002", "System", Severity::Critical, false, true,
        "Logging or configuration initialization failed", "Check environment configuration"),
    ("ERR003", "System", Severity::High, false, true,
        "Runtime configuration failed validation", "Review the configuration file and DASH_* variables"),
    ("E100", "Schema", Severity::High, false, false,
        "Event or snapshot declares an unsupported schema version", "Upgrade the viewer or re-export the data"),
    ("E101", "Schema", Severity::High, false, false,
        "Event payload does not match its declared schema", "Check the producer emits a well-formed event"),
    ("E102", "Schema", Severity::Critical, false, true,
        "Migration step received an event of the wrong version", "File a bug report; the migration table is inconsistent"),
    ("E200", "Events", Severity::Low, true, false,
        "Event action is not handled by the reducer", "Ignore, or upgrade the viewer"),
    ("E201", "Events", Severity::Low, true, false,
        "Event belongs to a superseded execution", "None; stale events are dropped"),
    ("E202", "Events", Severity::High, true, false,
        "Dashboard execution reported an error", "Inspect the execution error message"),
    ("E203", "Events", Severity::Medium, true, false,
        "Workspace reported an error", "Inspect the workspace error message"),
    ("E300", "Loader", Severity::Medium, true, false,
        "Snapshot file not found", "Verify the snapshot path"),
    ("E301", "Loader", Severity::Medium, true, false,
        "Snapshot file has an unexpected extension", "Use a .sps file or relax require_sps_extension"),
    ("E302", "Loader", Severity::High, true, false,
        "Snapshot file exceeds the maximum size", "Split or trim the snapshot"),
    ("E303", "Loader", Severity::Medium, true, false,
        "Snapshot file could not be parsed", "Check the file is a JSON snapshot"),
    ("E304", "Loader", Severity::Medium, true, false,
        "I/O error while reading a snapshot", "Check permissions and disk state"),
    ("E400", "Grouping", Severity::Medium, true, false,
        "Unknown check grouping type", "Use one of benchmark, control, dimension, tag, reason, resource, severity, status, result"),
    ("E401", "Grouping", Severity::Medium, true, false,
        "Grouping type requires a key", "Write the grouping as type|key"),
    ("E402", "Grouping", Severity::Medium, true, false,
        "Grouping configuration is nested too deeply", "Reduce the number of grouping levels"),
    ("I001", "System", Severity::Low, true, false,
        "Logging system initialized", "None"),
    ("I100", "Schema", Severity::Low, true, false,
        "Event migrated to the latest schema", "None"),
    ("I200", "Events", Severity::Low, true, false,
        "Dashboard execution started", "None"),
    ("I201", "Events", Severity::Low, true, false,
        "Dashboard execution completed", "None"),
    ("I300", "Loader", Severity::Low, true, false,
        "Snapshot loaded", "None"),
    ("I400", "Grouping", Severity::Low, true, false,
        "Check results grouped", "None"),
];

static CODE_REGISTRY: OnceLock<HashMap<&'static str, CodeMetadata>> = OnceLock::new();

fn get_code_registry() -> &'static HashMap<&'static str, CodeMetadata> {
    CODE_REGISTRY.get_or_init(|| {
        METADATA
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        CodeMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_code_metadata(code: &str) -> Option<&'static CodeMetadata> {
    get_code_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

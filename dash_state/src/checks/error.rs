use dash_schema::logging::{codes, Code};

/// Check grouping errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckGroupingError {
    #[error("Unknown grouping type: {group_type}")]
    UnknownGroupingType { group_type: String },

    #[error("Grouping type {group_type} requires a value")]
    MissingGroupingValue { group_type: String },

    #[error("Grouping has {depth} levels (max: {max_depth})")]
    GroupingTooDeep { depth: usize, max_depth: usize },

    #[error("Invalid grouping token: {token:?}")]
    InvalidToken { token: String },
}

impl CheckGroupingError {
    pub fn error_code(&self) -> Code {
        match self {
            CheckGroupingError::UnknownGroupingType { .. } | CheckGroupingError::InvalidToken { .. } => {
                codes::grouping::UNKNOWN_GROUPING_TYPE
            }
            CheckGroupingError::MissingGroupingValue { .. } => codes::grouping::MISSING_GROUPING_VALUE,
            CheckGroupingError::GroupingTooDeep { .. } => codes::grouping::GROUPING_TOO_DEEP,
        }
    }
}

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoCurrentTask,
    NoCurrentProject,
    IndexOutOfRange,
    InvalidValue,
    CycleDetected,
    StorageError,
    IoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCurrentTask => "NO_CURRENT_TASK",
            Self::NoCurrentProject => "NO_CURRENT_PROJECT",
            Self::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            Self::InvalidValue => "INVALID_VALUE",
            Self::CycleDetected => "CYCLE_DETECTED",
            Self::StorageError => "STORAGE_ERROR",
            Self::IoError => "IO_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct CloError {
    pub code: ErrorCode,
    pub message: String,
}

impl CloError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn no_current_task() -> Self {
        Self::new(
            ErrorCode::NoCurrentTask,
            "No current task. Add one with `a <description>` or pick one with `sc <index>`.",
        )
    }

    pub fn no_current_project() -> Self {
        Self::new(
            ErrorCode::NoCurrentProject,
            "No current project. Add one with `a <description>` or pick one with `sc <index>`.",
        )
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::new(
            ErrorCode::IndexOutOfRange,
            format!("Index {index} is out of range (have {len})"),
        )
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidValue, message)
    }

    pub fn cycle_detected() -> Self {
        Self::new(ErrorCode::CycleDetected, "Subtask cycle detected")
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }
}

impl From<rusqlite::Error> for CloError {
    fn from(e: rusqlite::Error) -> Self {
        Self::storage(e.to_string())
    }
}

impl From<serde_json::Error> for CloError {
    fn from(e: serde_json::Error) -> Self {
        Self::storage(e.to_string())
    }
}

impl From<std::io::Error> for CloError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

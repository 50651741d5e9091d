use modelsync_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the structured `ExError`
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and external reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,

    // Ledger lifecycle
    /// A transition was requested that the change's current state forbids
    IllegalState,
    /// An applied version lower than the one already recorded
    VersionRegression,

    // Reconciliation
    /// The store does not hold what a removal expected (fatal only under fail-fast)
    InconsistencyDetected,
    /// A change payload could not be decoded into a statement diff
    InvalidChangeData,
    /// Validation findings blocked a deployment
    ValidationFailed,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    /// The RDF repository collaborator failed
    Repository,
    Configuration,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::IllegalState => "ERR_ILLEGAL_STATE",
            ExErrorKind::VersionRegression => "ERR_VERSION_REGRESSION",
            ExErrorKind::InconsistencyDetected => "ERR_INCONSISTENCY_DETECTED",
            ExErrorKind::InvalidChangeData => "ERR_INVALID_CHANGE_DATA",
            ExErrorKind::ValidationFailed => "ERR_VALIDATION_FAILED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Repository => "ERR_REPOSITORY",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (change id, node id, ...)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for ledger and reconciliation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    // ===== Ledger Errors =====
    /// Change not found in the ledger
    #[error("Model change not found: {change_id}")]
    ChangeNotFound { change_id: u64 },

    /// Change was already deployed and cannot be re-applied
    #[error("Model change {change_id} is already deployed")]
    AlreadyDeployed { change_id: u64 },

    /// Applied version would move backwards
    #[error("Model change {change_id}: applied version {requested} is lower than {current}")]
    VersionRegression {
        change_id: u64,
        current: u64,
        requested: u64,
    },

    /// Lifecycle transition is not allowed from the current state
    #[error("Model change {change_id}: cannot {transition} from state {state}")]
    InvalidTransition {
        change_id: u64,
        transition: &'static str,
        state: &'static str,
    },

    /// Path or other input is empty or malformed
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // ===== Reconciliation Errors =====
    /// Store content does not match what a removal expected
    #[error("Inconsistent store state for ({subject}, {predicate}): {reason}")]
    Inconsistency {
        subject: String,
        predicate: String,
        reason: String,
    },

    /// Change payload could not be decoded
    #[error("Invalid change data for change {change_id}: {reason}")]
    InvalidChangeData { change_id: u64, reason: String },

    /// Store state drifted from what the change expects and warnings block
    #[error("Model change {change_id}: {count} validation warning(s) block deployment")]
    ValidationBlocked { change_id: u64, count: usize },

    // ===== Generic Errors =====
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<SyncError> for ExError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::ChangeNotFound { change_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(change_id.to_string())
                .with_message("Model change not found"),

            SyncError::AlreadyDeployed { change_id } => ExError::new(ExErrorKind::IllegalState)
                .with_entity_id(change_id.to_string())
                .with_message("Model change is already deployed"),

            SyncError::VersionRegression {
                change_id,
                current,
                requested,
            } => ExError::new(ExErrorKind::VersionRegression)
                .with_entity_id(change_id.to_string())
                .with_message(format!(
                    "Applied version {} is lower than recorded version {}",
                    requested, current
                )),

            SyncError::InvalidTransition {
                change_id,
                transition,
                state,
            } => ExError::new(ExErrorKind::IllegalState)
                .with_entity_id(change_id.to_string())
                .with_message(format!("Cannot {} from state {}", transition, state)),

            SyncError::InvalidInput { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }

            SyncError::Inconsistency {
                subject,
                predicate,
                reason,
            } => ExError::new(ExErrorKind::InconsistencyDetected)
                .with_entity_id(subject)
                .with_message(format!("{}: {}", predicate, reason)),

            SyncError::InvalidChangeData { change_id, reason } => {
                ExError::new(ExErrorKind::InvalidChangeData)
                    .with_entity_id(change_id.to_string())
                    .with_message(reason)
            }

            SyncError::ValidationBlocked { change_id, count } => {
                ExError::new(ExErrorKind::ValidationFailed)
                    .with_entity_id(change_id.to_string())
                    .with_message(format!("{} validation warning(s) block deployment", count))
            }

            SyncError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            ExErrorKind::InvalidInput,
            ExErrorKind::NotFound,
            ExErrorKind::IllegalState,
            ExErrorKind::VersionRegression,
            ExErrorKind::InconsistencyDetected,
            ExErrorKind::InvalidChangeData,
            ExErrorKind::ValidationFailed,
            ExErrorKind::Io,
            ExErrorKind::Serialization,
            ExErrorKind::Persistence,
            ExErrorKind::Repository,
            ExErrorKind::Configuration,
            ExErrorKind::Internal,
        ];
        let mut codes: Vec<&str> = kinds.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_display_includes_code_op_and_entity() {
        let err = ExError::new(ExErrorKind::Persistence)
            .with_op("mark_deployed")
            .with_entity_id("42")
            .with_message("disk full");
        let s = err.to_string();
        assert!(s.starts_with("[ERR_PERSISTENCE]"));
        assert!(s.contains("mark_deployed"));
        assert!(s.contains("disk full"));
        assert!(s.contains("42"));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        use std::error::Error;
        let inner = ExError::new(ExErrorKind::Repository).with_message("connection reset");
        let outer = ExError::new(ExErrorKind::Internal).with_source(inner);
        assert!(outer.source().is_some());
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Repository)
        );
    }
}

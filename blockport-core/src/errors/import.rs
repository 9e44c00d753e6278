//! Partial import error types
//!
//! Every failure inside the import pipeline is fatal for the whole import: the
//! enclosing transaction is dropped and nothing is retried here. Errors raised
//! inside a stage are wrapped with [`ImportError::Stage`] so callers can report
//! which stage, and which entity, failed.
//!
//! # Examples
//!
//! ```rust
//! use blockport::errors::{ImportError, ImportStage};
//!
//! let err = ImportError::NotFound {
//!     entity: "plugin".to_string(),
//!     id: "restapi-plugin".to_string(),
//! }
//! .in_stage(ImportStage::Actions, Some("Query1".to_string()));
//!
//! assert_eq!(err.error_code(), "RESOURCE_NOT_FOUND");
//! assert!(err.is_client_error());
//! ```

use std::fmt;

use thiserror::Error;

/// Pipeline stage an error was raised in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImportStage {
    Validation,
    TargetResolution,
    CollisionSeed,
    Plugins,
    Datasources,
    JsLibraries,
    Rescope,
    Actions,
    ActionCollections,
    WidgetNames,
    ReferenceRewrite,
    ApplicationUpdate,
    OnLoadResolution,
}

impl ImportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStage::Validation => "validation",
            ImportStage::TargetResolution => "target_resolution",
            ImportStage::CollisionSeed => "collision_seed",
            ImportStage::Plugins => "plugins",
            ImportStage::Datasources => "datasources",
            ImportStage::JsLibraries => "js_libraries",
            ImportStage::Rescope => "rescope",
            ImportStage::Actions => "actions",
            ImportStage::ActionCollections => "action_collections",
            ImportStage::WidgetNames => "widget_names",
            ImportStage::ReferenceRewrite => "reference_rewrite",
            ImportStage::ApplicationUpdate => "application_update",
            ImportStage::OnLoadResolution => "on_load_resolution",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial import errors
#[derive(Error, Debug)]
pub enum ImportError {
    /// Fragment is not a partial-import unit or breaks an identifier invariant
    #[error("Malformed fragment: {0}")]
    MalformedFragment(String),

    /// Target or referenced resource cannot be resolved under the required permission
    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    /// Actor lacks a capability on the target scope
    #[error("Permission denied: '{action}' on {scope}")]
    PermissionDenied { scope: String, action: String },

    /// Layout document is not well-formed structured data
    #[error("Invalid document: {0}")]
    Format(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// IO error while reading a fragment document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised inside a pipeline stage
    #[error("{stage} failed{}: {source}", .entity.as_ref().map(|e| format!(" for '{}'", e)).unwrap_or_default())]
    Stage {
        stage: ImportStage,
        entity: Option<String>,
        #[source]
        source: Box<ImportError>,
    },
}

impl ImportError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ImportError::MalformedFragment(message.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        ImportError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Attach stage context. Errors that already carry a stage keep the innermost one.
    pub fn in_stage(self, stage: ImportStage, entity: Option<String>) -> Self {
        match self {
            ImportError::Stage { .. } => self,
            other => ImportError::Stage {
                stage,
                entity,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with stage wrappers removed.
    pub fn root(&self) -> &ImportError {
        match self {
            ImportError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn stage(&self) -> Option<ImportStage> {
        match self {
            ImportError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn entity(&self) -> Option<&str> {
        match self {
            ImportError::Stage { entity, .. } => entity.as_deref(),
            _ => None,
        }
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.root(),
            ImportError::MalformedFragment(_)
                | ImportError::NotFound { .. }
                | ImportError::PermissionDenied { .. }
                | ImportError::Format(_)
        )
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self.root() {
            ImportError::MalformedFragment(_) => "MALFORMED_FRAGMENT",
            ImportError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            ImportError::PermissionDenied { .. } => "PERMISSION_DENIED",
            ImportError::Format(_) => "FORMAT_ERROR",
            ImportError::Database(_) => "DATABASE_ERROR",
            ImportError::Io(_) => "IO_ERROR",
            ImportError::Stage { .. } => "IMPORT_FAILED",
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Format(err.to_string())
    }
}

/// Extension for tagging results with the stage they ran in.
pub trait StageResultExt<T> {
    fn stage(self, stage: ImportStage) -> Result<T, ImportError>;
    fn stage_entity(self, stage: ImportStage, entity: &str) -> Result<T, ImportError>;
}

impl<T, E> StageResultExt<T> for Result<T, E>
where
    E: Into<ImportError>,
{
    fn stage(self, stage: ImportStage) -> Result<T, ImportError> {
        self.map_err(|e| e.into().in_stage(stage, None))
    }

    fn stage_entity(self, stage: ImportStage, entity: &str) -> Result<T, ImportError> {
        self.map_err(|e| e.into().in_stage(stage, Some(entity.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_follow_root_cause() {
        assert_eq!(
            ImportError::malformed("two pages").error_code(),
            "MALFORMED_FRAGMENT"
        );
        assert_eq!(
            ImportError::not_found("page", 3).error_code(),
            "RESOURCE_NOT_FOUND"
        );
        assert_eq!(
            ImportError::Format("trailing comma".into())
                .in_stage(ImportStage::ReferenceRewrite, None)
                .error_code(),
            "FORMAT_ERROR"
        );
    }

    #[test]
    fn innermost_stage_wins() {
        let err = ImportError::malformed("bad id")
            .in_stage(ImportStage::Rescope, Some("Query1".into()))
            .in_stage(ImportStage::Actions, None);
        assert_eq!(err.stage(), Some(ImportStage::Rescope));
        assert_eq!(err.entity(), Some("Query1"));
    }

    #[test]
    fn stage_message_names_entity() {
        let err = ImportError::not_found("datasource", "Users DB")
            .in_stage(ImportStage::Actions, Some("Query1".into()));
        assert_eq!(
            err.to_string(),
            "actions failed for 'Query1': datasource 'Users DB' not found"
        );
    }

    #[test]
    fn database_errors_are_server_errors() {
        let err = ImportError::Database(sea_orm::DbErr::Custom("boom".into()));
        assert!(!err.is_client_error());
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}

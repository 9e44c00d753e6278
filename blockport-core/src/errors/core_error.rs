use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use crate::common::db_errors::DbErrorKind;

use super::ImportError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreErrorKind {
    NotFound,
    Validation,
    Conflict,
    Forbidden,
    Unauthorized,
    Unavailable,
    Internal,
}

#[derive(Debug)]
pub struct CoreError {
    kind: CoreErrorKind,
    message: String,
    fields: Option<BTreeMap<String, String>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
            source: None,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("entity".to_string(), entity.into());
        fields.insert("id".to_string(), id.into());

        Self {
            kind: CoreErrorKind::NotFound,
            message: "Resource not found".to_string(),
            fields: Some(fields),
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Validation, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Forbidden, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Internal, message)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> CoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        self.fields.as_ref()
    }

    /// Stable error code when the error originated in the import pipeline.
    pub fn code(&self) -> Option<&str> {
        self.fields
            .as_ref()
            .and_then(|fields| fields.get("code"))
            .map(String::as_str)
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::internal(format!("Unhandled error: {}", err))
    }
}

impl From<sea_orm::DbErr> for CoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        CoreError::from(ImportError::Database(err))
    }
}

impl From<ImportError> for CoreError {
    fn from(err: ImportError) -> Self {
        let kind = match err.root() {
            ImportError::MalformedFragment(_) | ImportError::Format(_) => {
                CoreErrorKind::Validation
            }
            ImportError::NotFound { .. } => CoreErrorKind::NotFound,
            ImportError::PermissionDenied { .. } => CoreErrorKind::Forbidden,
            ImportError::Database(db_err) if DbErrorKind::from_db_err(db_err).is_retryable() => {
                CoreErrorKind::Unavailable
            }
            _ => CoreErrorKind::Internal,
        };

        let mut core = CoreError::new(kind, err.to_string()).with_field("code", err.error_code());
        if let Some(stage) = err.stage() {
            core = core.with_field("stage", stage.as_str());
        }
        if let Some(entity) = err.entity() {
            core = core.with_field("entity", entity);
        }
        core.with_source(err)
    }
}

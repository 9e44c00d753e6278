use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{ImportError, ImportResult};
use crate::partial_import::Fragment;

/// Where building blocks are fetched from, keyed by template id.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch_fragment(&self, template_id: &str) -> ImportResult<Fragment>;
}

/// Reads `<template_id>.json` documents from a directory.
pub struct DirectoryTemplateSource {
    root: PathBuf,
}

impl DirectoryTemplateSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn is_valid_id(template_id: &str) -> bool {
        !template_id.is_empty()
            && template_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

#[async_trait]
impl TemplateSource for DirectoryTemplateSource {
    async fn fetch_fragment(&self, template_id: &str) -> ImportResult<Fragment> {
        if !Self::is_valid_id(template_id) {
            return Err(ImportError::not_found("template", template_id));
        }

        let path = self.root.join(format!("{}.json", template_id));
        debug!("Loading building block from {}", path.display());
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ImportError::not_found("template", template_id));
            }
            Err(e) => return Err(e.into()),
        };

        Fragment::from_slice(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_path_like_ids() {
        let source = DirectoryTemplateSource::new("/nonexistent");
        let err = source.fetch_fragment("../secrets").await.unwrap_err();
        assert_eq!(err.error_code(), "RESOURCE_NOT_FOUND");
    }

    #[tokio::test]
    async fn missing_template_is_not_found() {
        let source = DirectoryTemplateSource::new(std::env::temp_dir());
        let err = source
            .fetch_fragment("blockport-missing-template")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "RESOURCE_NOT_FOUND");
    }
}

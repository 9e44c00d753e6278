use std::path::PathBuf;

const DEFAULT_COPY_SUFFIX: &str = "Copy";
const DEFAULT_MAX_RENAME_ATTEMPTS: u32 = 1000;
const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Tunables for the partial import pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSettings {
    /// Appended to a colliding name, then followed by a counter (`Query1Copy`, `Query1Copy2`).
    pub copy_suffix: String,
    pub max_rename_attempts: u32,
    /// Directory holding `<template_id>.json` building blocks.
    pub templates_dir: PathBuf,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
            max_rename_attempts: DEFAULT_MAX_RENAME_ATTEMPTS,
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
        }
    }
}

impl ImportSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            copy_suffix: lookup("BLOCKPORT_COPY_SUFFIX")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.copy_suffix),
            max_rename_attempts: lookup("BLOCKPORT_MAX_RENAME_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_rename_attempts),
            templates_dir: lookup("BLOCKPORT_TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.templates_dir),
        }
    }

    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }
}

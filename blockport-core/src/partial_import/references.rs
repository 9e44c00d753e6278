use std::collections::HashMap;

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::errors::{ImportError, ImportResult};

use super::layout::LayoutDocument;

/// Whole-token substitution of renamed entities.
///
/// All renames are compiled into one alternation and applied in a single pass,
/// so a replaced name is never matched again.
pub struct ReferenceRewriter {
    pattern: Option<Regex>,
    replacements: HashMap<String, String>,
}

impl ReferenceRewriter {
    pub fn new(rename_table: &IndexMap<String, String>) -> ImportResult<Self> {
        let replacements: HashMap<String, String> = rename_table
            .iter()
            .filter(|(original, renamed)| original != renamed)
            .map(|(original, renamed)| (original.clone(), renamed.clone()))
            .collect();

        if replacements.is_empty() {
            return Ok(Self {
                pattern: None,
                replacements,
            });
        }

        let mut originals: Vec<&str> = replacements.keys().map(String::as_str).collect();
        originals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = originals
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternation))
            .map_err(|e| ImportError::Format(format!("cannot compile rename pattern: {}", e)))?;

        Ok(Self {
            pattern: Some(pattern),
            replacements,
        })
    }

    /// `None` when the text holds no renamed token.
    pub fn rewrite_text(&self, text: &str) -> Option<String> {
        let pattern = self.pattern.as_ref()?;
        if !pattern.is_match(text) {
            return None;
        }
        let rewritten = pattern.replace_all(text, |caps: &Captures| {
            let matched = &caps[0];
            self.replacements
                .get(matched)
                .cloned()
                .unwrap_or_else(|| matched.to_string())
        });
        Some(rewritten.into_owned())
    }

    pub fn rewrite(&self, layout: LayoutDocument) -> LayoutDocument {
        if self.pattern.is_none() {
            return layout;
        }
        layout.map_strings(|text| self.rewrite_text(text))
    }
}

pub fn rewrite_references(
    layout: LayoutDocument,
    rename_table: &IndexMap<String, String>,
) -> ImportResult<LayoutDocument> {
    Ok(ReferenceRewriter::new(rename_table)?.rewrite(layout))
}

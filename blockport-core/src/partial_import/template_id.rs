use std::collections::HashSet;
use std::fmt;

use crate::errors::{ImportError, ImportResult};

pub const SCOPE_DELIMITER: char = '_';

/// Fragment-local identifier of the shape `<scope>_<local>`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TemplateId {
    scope: String,
    local: String,
}

impl TemplateId {
    /// Parse an identifier carrying exactly one scope delimiter.
    pub fn parse(raw: &str) -> ImportResult<Self> {
        let delimiters = raw.matches(SCOPE_DELIMITER).count();
        if delimiters != 1 {
            return Err(ImportError::malformed(format!(
                "template identifier '{}' must contain exactly one '{}', found {}",
                raw, SCOPE_DELIMITER, delimiters
            )));
        }

        let (scope, local) = raw
            .split_once(SCOPE_DELIMITER)
            .ok_or_else(|| ImportError::malformed(format!("template identifier '{}'", raw)))?;
        if scope.is_empty() || local.is_empty() {
            return Err(ImportError::malformed(format!(
                "template identifier '{}' has an empty scope or local part",
                raw
            )));
        }

        Ok(Self {
            scope: scope.to_string(),
            local: local.to_string(),
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    /// Reject scope tokens that would not parse back as part of an identifier.
    pub fn check_scope(scope: &str) -> ImportResult<()> {
        if scope.is_empty() || scope.contains(SCOPE_DELIMITER) {
            return Err(ImportError::malformed(format!(
                "page name '{}' cannot scope template identifiers: it must be non-empty and free of '{}'",
                scope, SCOPE_DELIMITER
            )));
        }
        Ok(())
    }

    /// Same local part under a different scope token.
    pub fn rescoped(&self, scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            local: self.local.clone(),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scope, SCOPE_DELIMITER, self.local)
    }
}

/// Claim a template id that no other entity in the page uses.
///
/// `candidate` is kept when free. Otherwise the local part is replaced by the
/// entity's final name (delimiters removed) and a counter is appended until
/// the id is unused.
pub fn claim_template_id(
    candidate: &str,
    scope: &str,
    final_name: &str,
    taken: &mut HashSet<String>,
) -> String {
    if taken.insert(candidate.to_string()) {
        return candidate.to_string();
    }

    let mut local: String = final_name
        .chars()
        .filter(|c| *c != SCOPE_DELIMITER)
        .collect();
    if local.is_empty() {
        local = candidate
            .split_once(SCOPE_DELIMITER)
            .map(|(_, local)| local.to_string())
            .unwrap_or_else(|| candidate.to_string());
    }

    let base = format!("{}{}{}", scope, SCOPE_DELIMITER, local);
    if taken.insert(base.clone()) {
        return base;
    }

    let mut counter = 2;
    loop {
        let next = format!("{}{}", base, counter);
        if taken.insert(next.clone()) {
            return next;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scope_and_local() {
        let id = TemplateId::parse("tmpl_abc").unwrap();
        assert_eq!(id.scope(), "tmpl");
        assert_eq!(id.local(), "abc");
        assert_eq!(id.rescoped("Page1").to_string(), "Page1_abc");
    }

    #[test]
    fn rejects_wrong_delimiter_count() {
        for raw in ["tmplabc", "tmpl_a_b", "_abc", "tmpl_", ""] {
            let err = TemplateId::parse(raw).unwrap_err();
            assert_eq!(err.error_code(), "MALFORMED_FRAGMENT", "{}", raw);
        }
    }

    #[test]
    fn claim_falls_back_to_final_name_then_counter() {
        let mut taken: HashSet<String> = ["Page1_abc".to_string(), "Page1_Query1Copy".to_string()]
            .into_iter()
            .collect();

        assert_eq!(
            claim_template_id("Page1_abc", "Page1", "Query1Copy", &mut taken),
            "Page1_Query1Copy2"
        );
        assert_eq!(
            claim_template_id("Page1_xyz", "Page1", "Query2", &mut taken),
            "Page1_xyz"
        );
        assert!(taken.contains("Page1_Query1Copy2"));
    }

    #[test]
    fn claimed_ids_keep_a_single_delimiter() {
        let mut taken: HashSet<String> = ["Home_getusers".to_string()].into_iter().collect();

        let claimed = claim_template_id("Home_getusers", "Home", "get_usersCopy", &mut taken);
        assert_eq!(claimed, "Home_getusersCopy");
        assert!(TemplateId::parse(&claimed).is_ok());
    }

    #[test]
    fn scope_tokens_must_not_contain_delimiter() {
        assert!(TemplateId::check_scope("Home").is_ok());
        for scope in ["Order_List", ""] {
            let err = TemplateId::check_scope(scope).unwrap_err();
            assert_eq!(err.error_code(), "MALFORMED_FRAGMENT", "{}", scope);
        }
    }
}

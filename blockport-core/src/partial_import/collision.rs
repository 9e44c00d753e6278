use std::collections::{BTreeSet, HashSet};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use serde_json::Value;
use tracing::warn;

use crate::config::ImportSettings;
use crate::database::entities::{action_collections, actions, pages};
use crate::errors::{ImportError, ImportResult};

use super::context::ResolutionContext;
use super::layout::LayoutDocument;

/// Every name bound in the target page: widgets in its layout plus page-level
/// actions and action collections.
pub async fn existing_entity_names<C>(conn: &C, page: &pages::Model) -> ImportResult<BTreeSet<String>>
where
    C: ConnectionTrait,
{
    let mut names = BTreeSet::new();

    match serde_json::from_str::<Value>(&page.dsl)
        .map_err(ImportError::from)
        .and_then(LayoutDocument::from_value)
    {
        Ok(layout) => names.extend(layout.widget_names()),
        Err(e) => warn!("Skipping widget names of page {}: {}", page.id, e),
    }

    let action_names: Vec<String> = actions::Entity::find()
        .select_only()
        .column(actions::Column::Name)
        .filter(actions::Column::PageId.eq(page.id))
        .filter(actions::Column::CollectionId.is_null())
        .into_tuple()
        .all(conn)
        .await?;
    names.extend(action_names);

    let collection_names: Vec<String> = action_collections::Entity::find()
        .select_only()
        .column(action_collections::Column::Name)
        .filter(action_collections::Column::PageId.eq(page.id))
        .into_tuple()
        .all(conn)
        .await?;
    names.extend(collection_names);

    Ok(names)
}

/// `original` when free, else `<original><suffix>`, `<original><suffix>2`, ...
pub fn refactor_name(
    original: &str,
    taken: &HashSet<String>,
    settings: &ImportSettings,
) -> ImportResult<String> {
    if !taken.contains(original) {
        return Ok(original.to_string());
    }

    let base = format!("{}{}", original, settings.copy_suffix);
    if !taken.contains(&base) {
        return Ok(base);
    }

    for counter in 2..=settings.max_rename_attempts {
        let candidate = format!("{}{}", base, counter);
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
    }

    Err(ImportError::malformed(format!(
        "no free name for '{}' after {} attempts",
        original, settings.max_rename_attempts
    )))
}

/// Give every widget of the incoming layout a name that does not shadow the page.
pub fn reconcile_widget_names(
    context: &mut ResolutionContext,
    layout: &LayoutDocument,
    settings: &ImportSettings,
) -> ImportResult<()> {
    for name in layout.widget_names() {
        context.reserve_name(&name, settings)?;
    }
    Ok(())
}

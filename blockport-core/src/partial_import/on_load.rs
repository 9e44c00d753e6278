use indexmap::IndexMap;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::database::entities::{action_collections, actions};
use crate::errors::{ImportError, ImportResult};

use super::context::ResolutionContext;
use super::template_id::TemplateId;

const QUALIFIER_DELIMITER: char = '.';

/// One entry of a layout's precomputed load order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnLoadActionRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_in_millisecond: Option<u64>,
}

/// Resolved load order, batch structure preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OnLoadManifest {
    batches: Vec<Vec<OnLoadActionRef>>,
}

impl OnLoadManifest {
    pub fn batches(&self) -> &[Vec<OnLoadActionRef>] {
        &self.batches
    }

    pub fn flatten(&self) -> Vec<&OnLoadActionRef> {
        self.batches.iter().flatten().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedAction {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedCollection {
    pub id: i32,
    pub name: String,
    pub member_names: Vec<String>,
}

/// Actions and collections written by one import, as read back from the store.
#[derive(Clone, Debug, Default)]
pub struct PersistedEntities {
    pub actions: Vec<PersistedAction>,
    pub collections: Vec<PersistedCollection>,
}

impl PersistedEntities {
    pub async fn load<C>(conn: &C, context: &ResolutionContext) -> ImportResult<Self>
    where
        C: ConnectionTrait,
    {
        let action_ids: Vec<i32> = context.action_outcome().actions().iter().map(|a| a.id).collect();
        let collection_ids: Vec<i32> = context.collections().iter().map(|c| c.id).collect();

        let rows = if action_ids.is_empty() {
            Vec::new()
        } else {
            actions::Entity::find()
                .filter(actions::Column::Id.is_in(action_ids))
                .order_by_asc(actions::Column::Id)
                .all(conn)
                .await?
        };

        let mut collections = Vec::new();
        if !collection_ids.is_empty() {
            let models = action_collections::Entity::find()
                .filter(action_collections::Column::Id.is_in(collection_ids))
                .order_by_asc(action_collections::Column::Id)
                .all(conn)
                .await?;
            for model in models {
                let member_names = rows
                    .iter()
                    .filter(|a| a.collection_id == Some(model.id))
                    .map(|a| a.name.clone())
                    .collect();
                collections.push(PersistedCollection {
                    id: model.id,
                    name: model.name,
                    member_names,
                });
            }
        }

        let actions = rows
            .into_iter()
            .filter(|a| a.collection_id.is_none())
            .map(|a| PersistedAction {
                id: a.id,
                name: a.name,
            })
            .collect();

        Ok(Self {
            actions,
            collections,
        })
    }

    fn collection(&self, name: &str) -> Option<&PersistedCollection> {
        self.collections.iter().find(|c| c.name == name)
    }

    fn action(&self, name: &str) -> Option<&PersistedAction> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// Split `JSObject1.run` into qualifier and member.
fn split_reference_name(name: &str) -> ImportResult<(&str, Option<&str>)> {
    let dots = name.matches(QUALIFIER_DELIMITER).count();
    if dots > 1 {
        return Err(ImportError::malformed(format!(
            "on-load reference '{}' has more than one '{}'",
            name, QUALIFIER_DELIMITER
        )));
    }

    match name.split_once(QUALIFIER_DELIMITER) {
        Some((qualifier, member)) if qualifier.is_empty() || member.is_empty() => Err(
            ImportError::malformed(format!("on-load reference '{}' is incomplete", name)),
        ),
        Some((qualifier, member)) => Ok((qualifier, Some(member))),
        None if name.is_empty() => Err(ImportError::malformed("on-load reference has an empty name")),
        None => Ok((name, None)),
    }
}

fn renamed<'a>(rename_table: &'a IndexMap<String, String>, name: &'a str) -> &'a str {
    rename_table.get(name).map(String::as_str).unwrap_or(name)
}

fn bind_to_collection(
    mut reference: OnLoadActionRef,
    collection: Option<&PersistedCollection>,
    member: &str,
) -> OnLoadActionRef {
    match collection {
        Some(collection) if collection.member_names.iter().any(|m| m == member) => {
            let id = collection.id.to_string();
            reference.id = Some(id.clone());
            reference.collection_id = Some(id);
        }
        _ => warn!(
            "On-load reference '{}' does not match an imported collection member",
            reference.name.as_deref().unwrap_or_default()
        ),
    }
    reference
}

fn resolve_reference(
    mut reference: OnLoadActionRef,
    name: &str,
    rename_table: &IndexMap<String, String>,
    persisted: &PersistedEntities,
) -> ImportResult<OnLoadActionRef> {
    let (qualifier, member) = split_reference_name(name)?;
    let collection_scope = reference
        .collection_id
        .as_deref()
        .map(TemplateId::parse)
        .transpose()?;

    if let Some(member) = member {
        let collection_name = renamed(rename_table, qualifier);
        reference.name = Some(format!("{}{}{}", collection_name, QUALIFIER_DELIMITER, member));
        return Ok(bind_to_collection(
            reference,
            persisted.collection(collection_name),
            member,
        ));
    }

    if let Some(scope) = collection_scope {
        let collection_name = renamed(rename_table, scope.local());
        return Ok(bind_to_collection(
            reference,
            persisted.collection(collection_name),
            qualifier,
        ));
    }

    let action_name = renamed(rename_table, qualifier).to_string();
    match persisted.action(&action_name) {
        Some(action) => reference.id = Some(action.id.to_string()),
        None => debug!("On-load reference '{}' is not part of this import", action_name),
    }
    reference.name = Some(action_name);
    Ok(reference)
}

/// Point the fragment's load order at the entities this import persisted.
///
/// References without a name are dropped. References that match nothing
/// imported keep their original id.
pub fn resolve_on_load_actions(
    batches: &[Vec<OnLoadActionRef>],
    rename_table: &IndexMap<String, String>,
    persisted: &PersistedEntities,
) -> ImportResult<OnLoadManifest> {
    let mut resolved = Vec::with_capacity(batches.len());
    for batch in batches {
        let mut entries = Vec::with_capacity(batch.len());
        for reference in batch {
            let Some(name) = reference.name.clone() else {
                continue;
            };
            entries.push(resolve_reference(
                reference.clone(),
                &name,
                rename_table,
                persisted,
            )?);
        }
        if !entries.is_empty() {
            resolved.push(entries);
        }
    }
    Ok(OnLoadManifest { batches: resolved })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted() -> PersistedEntities {
        PersistedEntities {
            actions: vec![PersistedAction {
                id: 11,
                name: "Query1Copy".into(),
            }],
            collections: vec![PersistedCollection {
                id: 20,
                name: "JSObj1".into(),
                member_names: vec!["run".into(), "reset".into()],
            }],
        }
    }

    fn reference(name: &str, collection_id: Option<&str>) -> OnLoadActionRef {
        OnLoadActionRef {
            id: Some(format!("tmpl_{}", name)),
            name: Some(name.into()),
            collection_id: collection_id.map(String::from),
            ..Default::default()
        }
    }

    fn renames() -> IndexMap<String, String> {
        [("Query1", "Query1Copy"), ("Query9", "Query9")]
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn dotted_reference_resolves_to_collection() {
        let manifest = resolve_on_load_actions(
            &[vec![reference("JSObj1.run", Some("tmpl_JSObj1"))]],
            &renames(),
            &persisted(),
        )
        .unwrap();

        let entry = manifest.flatten()[0].clone();
        assert_eq!(entry.id.as_deref(), Some("20"));
        assert_eq!(entry.collection_id.as_deref(), Some("20"));
    }

    #[test]
    fn bare_member_with_collection_scope_resolves_to_collection() {
        let manifest = resolve_on_load_actions(
            &[vec![reference("reset", Some("tmpl_JSObj1"))]],
            &renames(),
            &persisted(),
        )
        .unwrap();
        assert_eq!(manifest.flatten()[0].id.as_deref(), Some("20"));
    }

    #[test]
    fn renamed_action_resolves_to_new_id() {
        let manifest = resolve_on_load_actions(
            &[vec![reference("Query1", None)], vec![reference("Query9", None)]],
            &renames(),
            &persisted(),
        )
        .unwrap();

        assert_eq!(manifest.batches().len(), 2);
        let entries = manifest.flatten();
        assert_eq!(entries[0].name.as_deref(), Some("Query1Copy"));
        assert_eq!(entries[0].id.as_deref(), Some("11"));
        assert_eq!(entries[1].id.as_deref(), Some("tmpl_Query9"));
    }

    #[test]
    fn nameless_references_are_dropped() {
        let manifest = resolve_on_load_actions(
            &[vec![OnLoadActionRef::default()]],
            &renames(),
            &persisted(),
        )
        .unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn delimiter_violations_are_malformed() {
        for (name, collection) in [
            ("JSObj1.run.now", None),
            ("JSObj1.", None),
            ("run", Some("tmpl_JS_Obj1")),
        ] {
            let err = resolve_on_load_actions(
                &[vec![reference(name, collection)]],
                &renames(),
                &persisted(),
            )
            .unwrap_err();
            assert_eq!(err.error_code(), "MALFORMED_FRAGMENT", "{}", name);
        }
    }

    #[test]
    fn manifest_serializes_as_nested_batches() {
        let manifest = resolve_on_load_actions(
            &[vec![reference("Query1", None)]],
            &renames(),
            &persisted(),
        )
        .unwrap();
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json[0][0]["id"], "11");
        assert_eq!(json[0][0]["name"], "Query1Copy");
    }
}

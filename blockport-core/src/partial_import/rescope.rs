use crate::errors::{ImportError, ImportResult};

use super::fragment::Fragment;
use super::template_id::TemplateId;

fn parse_for(entity: &str, raw: &str) -> ImportResult<TemplateId> {
    TemplateId::parse(raw).map_err(|e| match e {
        ImportError::MalformedFragment(message) => {
            ImportError::malformed(format!("{} ({})", message, entity))
        }
        other => other,
    })
}

/// Move every action and collection identifier into the target page's scope
/// and drop sync identifiers inherited from the template.
///
/// All identifiers are validated before any is rewritten, so a malformed id
/// leaves the fragment untouched. The page name becomes the scope token and
/// must not contain the scope delimiter itself.
pub fn rescope(fragment: &mut Fragment, target_page_name: &str) -> ImportResult<()> {
    if fragment.action_list.is_empty() && fragment.action_collection_list.is_empty() {
        return Ok(());
    }
    TemplateId::check_scope(target_page_name)?;

    let mut action_ids = Vec::with_capacity(fragment.action_list.len());
    for action in &fragment.action_list {
        let id = parse_for(&action.name, &action.id)?;
        let collection_id = action
            .collection_id
            .as_deref()
            .map(|raw| parse_for(&action.name, raw))
            .transpose()?;
        action_ids.push((id, collection_id));
    }

    let mut collection_ids = Vec::with_capacity(fragment.action_collection_list.len());
    for collection in &fragment.action_collection_list {
        collection_ids.push(parse_for(&collection.name, &collection.id)?);
    }

    for (action, (id, collection_id)) in fragment.action_list.iter_mut().zip(action_ids) {
        action.id = id.rescoped(target_page_name).to_string();
        action.collection_id = collection_id.map(|c| c.rescoped(target_page_name).to_string());
        action.page_id = Some(target_page_name.to_string());
        action.git_sync_id = None;
    }

    for (collection, id) in fragment
        .action_collection_list
        .iter_mut()
        .zip(collection_ids)
    {
        collection.id = id.rescoped(target_page_name).to_string();
        collection.page_id = Some(target_page_name.to_string());
        collection.git_sync_id = None;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partial_import::fragment::{FragmentAction, FragmentActionCollection};

    fn fragment() -> Fragment {
        Fragment {
            action_list: vec![
                FragmentAction {
                    id: "tmpl_abc".into(),
                    name: "Query1".into(),
                    plugin_id: "postgres-plugin".into(),
                    git_sync_id: Some("lineage-1".into()),
                    ..Default::default()
                },
                FragmentAction {
                    id: "tmpl_run".into(),
                    name: "run".into(),
                    plugin_id: "js-plugin".into(),
                    collection_id: Some("tmpl_JSObj1".into()),
                    ..Default::default()
                },
            ],
            action_collection_list: vec![FragmentActionCollection {
                id: "tmpl_JSObj1".into(),
                name: "JSObj1".into(),
                git_sync_id: Some("lineage-2".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn rewrites_scope_and_strips_sync_ids() {
        let mut fragment = fragment();
        rescope(&mut fragment, "Home").unwrap();

        assert_eq!(fragment.action_list[0].id, "Home_abc");
        assert_eq!(fragment.action_list[0].git_sync_id, None);
        assert_eq!(fragment.action_list[0].page_id.as_deref(), Some("Home"));
        assert_eq!(fragment.action_list[1].id, "Home_run");
        assert_eq!(fragment.action_list[1].collection_id.as_deref(), Some("Home_JSObj1"));
        assert_eq!(fragment.action_collection_list[0].id, "Home_JSObj1");
        assert_eq!(fragment.action_collection_list[0].git_sync_id, None);
    }

    #[test]
    fn malformed_id_fails_without_partial_rewrite() {
        let mut fragment = fragment();
        fragment.action_collection_list[0].id = "tmpl_JS_Obj1".into();

        let err = rescope(&mut fragment, "Home").unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_FRAGMENT");
        assert!(err.to_string().contains("JSObj1"));
        assert_eq!(fragment.action_list[0].id, "tmpl_abc");
    }

    #[test]
    fn page_names_with_delimiter_are_rejected() {
        let mut fragment = fragment();

        let err = rescope(&mut fragment, "Order_List").unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_FRAGMENT");
        assert!(err.to_string().contains("Order_List"));
        assert_eq!(fragment.action_list[0].id, "tmpl_abc");
    }

    #[test]
    fn fragments_without_entities_ignore_page_name() {
        let mut fragment = Fragment::default();
        assert!(rescope(&mut fragment, "Order_List").is_ok());
    }
}

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::config::ImportSettings;
use crate::database::entities::pages;
use crate::errors::ImportResult;

use super::collision::refactor_name;

/// An action persisted by the current import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedAction {
    pub id: i32,
    pub name: String,
    pub original_name: String,
    /// Rescoped template id of the owning collection, for JS functions
    pub collection_template_id: Option<String>,
}

/// An action collection persisted by the current import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedCollection {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct ActionImportOutcome {
    actions: Vec<ImportedAction>,
}

impl ActionImportOutcome {
    pub fn record(&mut self, action: ImportedAction) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[ImportedAction] {
        &self.actions
    }

    pub fn members_of<'a>(
        &'a self,
        collection_template_id: &'a str,
    ) -> impl Iterator<Item = &'a ImportedAction> + 'a {
        self.actions
            .iter()
            .filter(move |a| a.collection_template_id.as_deref() == Some(collection_template_id))
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// State owned by a single import, threaded explicitly through every stage.
#[derive(Debug)]
pub struct ResolutionContext {
    rename_table: IndexMap<String, String>,
    taken_names: HashSet<String>,
    installed_js_libs: IndexSet<String>,
    plugin_ids: HashMap<String, i32>,
    datasource_ids: HashMap<String, i32>,
    action_outcome: ActionImportOutcome,
    collections: Vec<ImportedCollection>,
    page_context: HashMap<String, pages::Model>,
}

impl ResolutionContext {
    /// Seed the rename table with every name already bound in the target page.
    pub fn seeded<I>(existing_names: I, page: pages::Model) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut rename_table = IndexMap::new();
        let mut taken_names = HashSet::new();
        for name in existing_names {
            taken_names.insert(name.clone());
            rename_table.insert(name.clone(), name);
        }

        let mut page_context = HashMap::new();
        page_context.insert(page.name.clone(), page);

        Self {
            rename_table,
            taken_names,
            installed_js_libs: IndexSet::new(),
            plugin_ids: HashMap::new(),
            datasource_ids: HashMap::new(),
            action_outcome: ActionImportOutcome::default(),
            collections: Vec::new(),
            page_context,
        }
    }

    pub fn rename_table(&self) -> &IndexMap<String, String> {
        &self.rename_table
    }

    pub fn into_rename_table(self) -> IndexMap<String, String> {
        self.rename_table
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken_names.contains(name)
    }

    /// Issue the final name for a fragment entity and record it in the rename table.
    pub fn reserve_name(&mut self, original: &str, settings: &ImportSettings) -> ImportResult<String> {
        let final_name = refactor_name(original, &self.taken_names, settings)?;
        if final_name != original {
            debug!("Renaming '{}' to '{}' to avoid a collision", original, final_name);
        }
        self.taken_names.insert(final_name.clone());
        self.rename_table
            .insert(original.to_string(), final_name.clone());
        Ok(final_name)
    }

    pub fn page(&self, name: &str) -> Option<&pages::Model> {
        self.page_context.get(name)
    }

    pub fn install_js_lib(&mut self, uid: impl Into<String>) {
        self.installed_js_libs.insert(uid.into());
    }

    pub fn installed_js_libs(&self) -> &IndexSet<String> {
        &self.installed_js_libs
    }

    pub fn set_plugin_id(&mut self, package_name: impl Into<String>, id: i32) {
        self.plugin_ids.insert(package_name.into(), id);
    }

    pub fn plugin_id(&self, package_name: &str) -> Option<i32> {
        self.plugin_ids.get(package_name).copied()
    }

    pub fn set_datasource_id(&mut self, fragment_name: impl Into<String>, id: i32) {
        self.datasource_ids.insert(fragment_name.into(), id);
    }

    pub fn datasource_id(&self, fragment_name: &str) -> Option<i32> {
        self.datasource_ids.get(fragment_name).copied()
    }

    pub fn action_outcome(&self) -> &ActionImportOutcome {
        &self.action_outcome
    }

    pub fn record_action(&mut self, action: ImportedAction) {
        self.action_outcome.record(action);
    }

    pub fn record_collection(&mut self, collection: ImportedCollection) {
        self.collections.push(collection);
    }

    pub fn collections(&self) -> &[ImportedCollection] {
        &self.collections
    }
}

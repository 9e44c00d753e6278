use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use indexmap::{IndexMap, IndexSet};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, IntoActiveModel, Set,
    TransactionTrait,
};
use tracing::{debug, info};

use crate::auth::{Actor, Authorizer};
use crate::config::ImportSettings;
use crate::database::entities::{applications, pages};
use crate::errors::{ImportResult, ImportStage, StageResultExt};
use crate::partial_import::importable::{
    ActionCollectionImporter, ActionImporter, DatasourceImporter, ImportScope, ImportableEntity,
    JsLibImporter, PluginImporter,
};
use crate::partial_import::{
    existing_entity_names, reconcile_widget_names, rescope, resolve_on_load_actions,
    resolve_target, rewrite_references, Fragment, LayoutDocument, OnLoadManifest, PageTarget,
    PersistedEntities, ResolutionContext,
};

/// Result of merging one fragment into a page.
#[derive(Clone, Debug)]
pub struct PartialImportOutcome {
    pub application: applications::Model,
    pub page: pages::Model,
    /// Fragment layout with renamed references, ready to paste into the page
    pub widget_layout: Option<LayoutDocument>,
    pub rename_table: IndexMap<String, String>,
    pub on_page_load_actions: OnLoadManifest,
}

fn log_stage(stage: ImportStage, started: Instant) {
    debug!(
        stage = stage.as_str(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Import stage finished"
    );
}

/// Merges exported fragments into existing pages.
///
/// Every import runs in one transaction that is committed only once the
/// response is assembled; any error drops it and nothing is persisted.
pub struct PartialImportService {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
    settings: ImportSettings,
}

impl PartialImportService {
    pub fn new(
        db: DatabaseConnection,
        authorizer: Arc<dyn Authorizer>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            db,
            authorizer,
            settings,
        }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub async fn import_fragment(
        &self,
        actor: &Actor,
        target: &PageTarget,
        fragment: Fragment,
    ) -> ImportResult<PartialImportOutcome> {
        let started = Instant::now();
        fragment.ensure_partial().stage(ImportStage::Validation)?;

        let txn = self.db.begin().await?;
        let outcome = self.run_pipeline(&txn, actor, target, fragment).await?;
        txn.commit().await?;

        info!(
            page_id = outcome.page.id,
            renamed = outcome
                .rename_table
                .iter()
                .filter(|(original, renamed)| original != renamed)
                .count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Imported fragment into page '{}'",
            outcome.page.name
        );
        Ok(outcome)
    }

    async fn run_pipeline(
        &self,
        txn: &DatabaseTransaction,
        actor: &Actor,
        target: &PageTarget,
        mut fragment: Fragment,
    ) -> ImportResult<PartialImportOutcome> {
        let started = Instant::now();
        let resolved = resolve_target(txn, self.authorizer.as_ref(), actor, target)
            .await
            .stage(ImportStage::TargetResolution)?;
        log_stage(ImportStage::TargetResolution, started);

        let started = Instant::now();
        let existing_names = existing_entity_names(txn, &resolved.page)
            .await
            .stage(ImportStage::CollisionSeed)?;
        let mut context = ResolutionContext::seeded(existing_names, resolved.page.clone());
        log_stage(ImportStage::CollisionSeed, started);

        let scope = ImportScope {
            txn,
            actor,
            authorizer: self.authorizer.as_ref(),
            settings: &self.settings,
            workspace: &resolved.workspace,
            application: &resolved.application,
            page: &resolved.page,
        };

        let shared_importers: [&dyn ImportableEntity; 3] =
            [&PluginImporter, &DatasourceImporter, &JsLibImporter];
        for importer in shared_importers {
            let started = Instant::now();
            importer
                .import_entities(&scope, &mut context, &fragment)
                .await
                .stage(importer.stage())?;
            log_stage(importer.stage(), started);
        }

        let started = Instant::now();
        rescope(&mut fragment, &resolved.page.name).stage(ImportStage::Rescope)?;
        log_stage(ImportStage::Rescope, started);

        let page_importers: [&dyn ImportableEntity; 2] =
            [&ActionImporter, &ActionCollectionImporter];
        for importer in page_importers {
            let started = Instant::now();
            importer
                .import_entities(&scope, &mut context, &fragment)
                .await
                .stage(importer.stage())?;
            log_stage(importer.stage(), started);
        }

        let started = Instant::now();
        let layout = fragment
            .widget_layout()
            .stage(ImportStage::ReferenceRewrite)?;
        if let Some(layout) = &layout {
            reconcile_widget_names(&mut context, layout, &self.settings)
                .stage(ImportStage::WidgetNames)?;
        }
        log_stage(ImportStage::WidgetNames, started);

        let started = Instant::now();
        let widget_layout = layout
            .map(|layout| rewrite_references(layout, context.rename_table()))
            .transpose()
            .stage(ImportStage::ReferenceRewrite)?;
        log_stage(ImportStage::ReferenceRewrite, started);

        let started = Instant::now();
        let application = install_js_libs(txn, &resolved.application, &context)
            .await
            .stage(ImportStage::ApplicationUpdate)?;
        log_stage(ImportStage::ApplicationUpdate, started);

        let started = Instant::now();
        let persisted = PersistedEntities::load(txn, &context)
            .await
            .stage(ImportStage::OnLoadResolution)?;
        let on_page_load_actions =
            resolve_on_load_actions(fragment.on_load_batches(), context.rename_table(), &persisted)
                .stage(ImportStage::OnLoadResolution)?;
        log_stage(ImportStage::OnLoadResolution, started);

        Ok(PartialImportOutcome {
            application,
            page: resolved.page,
            widget_layout,
            rename_table: context.into_rename_table(),
            on_page_load_actions,
        })
    }
}

/// Union the libraries used by the fragment into the application's installed set.
async fn install_js_libs(
    txn: &DatabaseTransaction,
    application: &applications::Model,
    context: &ResolutionContext,
) -> ImportResult<applications::Model> {
    let mut installed: IndexSet<String> =
        application.installed_js_lib_uids()?.into_iter().collect();
    let before = installed.len();
    installed.extend(context.installed_js_libs().iter().cloned());

    if installed.len() == before {
        return Ok(application.clone());
    }

    let mut active = application.clone().into_active_model();
    active.installed_js_libs = Set(serde_json::to_string(&installed)?);
    active.updated_at = Set(Utc::now());
    let updated = active.update(txn).await?;
    debug!(
        "Installed {} JS librar(ies) into application {}",
        installed.len() - before,
        updated.id
    );
    Ok(updated)
}

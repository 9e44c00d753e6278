use std::time::Instant;

use tracing::debug;

use super::{AppContext, ApplicationSummary, BuildingBlockRequest, BuildingBlockResponse};
use crate::auth::Actor;
use crate::errors::{CoreResult, ImportStage, StageResultExt};
use crate::partial_import::{Fragment, LayoutDocument, PageTarget};

impl AppContext {
    // ----- Partial import helpers ------------------------------------------

    /// Merge an exported fragment document into an existing page.
    pub async fn import_resource_in_page(
        &self,
        actor: &Actor,
        target: PageTarget,
        document: &[u8],
    ) -> CoreResult<ApplicationSummary> {
        let fragment = Fragment::from_slice(document).stage(ImportStage::Validation)?;
        let outcome = self
            .partial_import_service
            .import_fragment(actor, &target, fragment)
            .await?;
        Ok(ApplicationSummary::try_from(outcome.application).stage(ImportStage::ApplicationUpdate)?)
    }

    /// Fetch a building block by template id and merge it into a page.
    pub async fn import_building_block(
        &self,
        actor: &Actor,
        request: BuildingBlockRequest,
        branch_name: Option<String>,
    ) -> CoreResult<BuildingBlockResponse> {
        let started = Instant::now();
        let fragment = self
            .template_source
            .fetch_fragment(&request.template_id)
            .await
            .stage(ImportStage::Validation)?;
        debug!(
            template_id = %request.template_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched building block"
        );

        let target = PageTarget {
            workspace_id: request.workspace_id,
            application_id: request.application_id,
            page_id: request.page_id,
            branch_name,
        };
        let outcome = self
            .partial_import_service
            .import_fragment(actor, &target, fragment)
            .await?;

        Ok(BuildingBlockResponse {
            widget_layout: outcome.widget_layout.map(LayoutDocument::into_value),
            on_page_load_actions: outcome.on_page_load_actions,
            refactored_name_map: outcome.rename_table,
        })
    }
}

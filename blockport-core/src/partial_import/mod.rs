mod collision;
mod context;
mod fragment;
mod layout;
mod on_load;
mod references;
mod rescope;
mod target;
mod template_id;

pub mod importable;

pub use collision::{existing_entity_names, reconcile_widget_names, refactor_name};
pub use context::{ActionImportOutcome, ImportedAction, ImportedCollection, ResolutionContext};
pub use fragment::{
    Fragment, FragmentAction, FragmentActionCollection, FragmentDatasource, FragmentJsLib,
    FragmentLayout, FragmentPage, FragmentPlugin,
};
pub use layout::LayoutDocument;
pub use on_load::{
    resolve_on_load_actions, OnLoadActionRef, OnLoadManifest, PersistedAction,
    PersistedCollection, PersistedEntities,
};
pub use references::{rewrite_references, ReferenceRewriter};
pub use rescope::rescope;
pub use target::{find_application, find_page, find_workspace, resolve_target, PageTarget, ResolvedTarget};
pub use template_id::{claim_template_id, TemplateId, SCOPE_DELIMITER};

use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::auth::{Actor, Authorizer, Scope, ACTION_EDIT, ACTION_READ};
use crate::database::entities::{applications, pages, workspaces};
use crate::errors::{ImportError, ImportResult};

/// Page a fragment is merged into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTarget {
    pub workspace_id: i32,
    pub application_id: i32,
    pub page_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedTarget {
    pub workspace: workspaces::Model,
    pub application: applications::Model,
    pub page: pages::Model,
}

/// Lookups that fail the permission check look exactly like missing rows.
fn visible<T>(
    found: Option<T>,
    authorizer: &dyn Authorizer,
    actor: &Actor,
    scope: Scope,
    action: &str,
    entity: &str,
    id: i32,
) -> ImportResult<T> {
    match found {
        Some(model) if authorizer.is_allowed(actor, &scope, action) => Ok(model),
        _ => Err(ImportError::not_found(entity, id)),
    }
}

pub async fn find_workspace<C: ConnectionTrait>(
    conn: &C,
    authorizer: &dyn Authorizer,
    actor: &Actor,
    workspace_id: i32,
) -> ImportResult<workspaces::Model> {
    let found = workspaces::Entity::find_by_id(workspace_id).one(conn).await?;
    visible(
        found,
        authorizer,
        actor,
        Scope::Workspace(workspace_id),
        ACTION_READ,
        "workspace",
        workspace_id,
    )
}

pub async fn find_application<C: ConnectionTrait>(
    conn: &C,
    authorizer: &dyn Authorizer,
    actor: &Actor,
    application_id: i32,
    branch_name: Option<&str>,
) -> ImportResult<applications::Model> {
    let query = applications::Entity::find();
    let found = match branch_name {
        None => query
            .filter(applications::Column::Id.eq(application_id))
            .one(conn)
            .await?,
        Some(branch) => query
            .filter(
                Condition::any()
                    .add(applications::Column::BaseApplicationId.eq(application_id))
                    .add(applications::Column::Id.eq(application_id)),
            )
            .filter(applications::Column::BranchName.eq(branch))
            .one(conn)
            .await?,
    };

    let scope = Scope::Application(found.as_ref().map(|a| a.id).unwrap_or(application_id));
    visible(
        found,
        authorizer,
        actor,
        scope,
        ACTION_EDIT,
        "application",
        application_id,
    )
}

pub async fn find_page<C: ConnectionTrait>(
    conn: &C,
    authorizer: &dyn Authorizer,
    actor: &Actor,
    page_id: i32,
    branch_name: Option<&str>,
) -> ImportResult<pages::Model> {
    let query = pages::Entity::find();
    let found = match branch_name {
        None => query.filter(pages::Column::Id.eq(page_id)).one(conn).await?,
        Some(branch) => query
            .filter(
                Condition::any()
                    .add(pages::Column::BasePageId.eq(page_id))
                    .add(pages::Column::Id.eq(page_id)),
            )
            .filter(pages::Column::BranchName.eq(branch))
            .one(conn)
            .await?,
    };

    let scope = Scope::Page(found.as_ref().map(|p| p.id).unwrap_or(page_id));
    visible(found, authorizer, actor, scope, ACTION_EDIT, "page", page_id)
}

/// Resolve the workspace, application and page, checking they nest.
pub async fn resolve_target<C: ConnectionTrait>(
    conn: &C,
    authorizer: &dyn Authorizer,
    actor: &Actor,
    target: &PageTarget,
) -> ImportResult<ResolvedTarget> {
    let branch = target.branch_name.as_deref();
    let workspace = find_workspace(conn, authorizer, actor, target.workspace_id).await?;

    let application =
        find_application(conn, authorizer, actor, target.application_id, branch).await?;
    if application.workspace_id != workspace.id {
        return Err(ImportError::not_found("application", target.application_id));
    }

    let page = find_page(conn, authorizer, actor, target.page_id, branch).await?;
    if page.application_id != application.id {
        return Err(ImportError::not_found("page", target.page_id));
    }

    Ok(ResolvedTarget {
        workspace,
        application,
        page,
    })
}

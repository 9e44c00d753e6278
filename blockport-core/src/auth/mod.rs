use std::collections::BTreeSet;
use std::fmt;

use crate::errors::CoreError;

pub const ROLE_ADMIN: &str = "admin";

pub const ACTION_READ: &str = "read";
pub const ACTION_EDIT: &str = "edit";
pub const ACTION_CREATE_DATASOURCE: &str = "create_datasource";
pub const ACTION_CREATE_ACTION: &str = "create_action";
pub const ACTION_CREATE_COLLECTION: &str = "create_collection";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub user_id: Option<i32>,
    roles: BTreeSet<String>,
    scopes: BTreeSet<String>,
    is_system: bool,
}

impl Actor {
    pub fn user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            roles: BTreeSet::new(),
            scopes: BTreeSet::new(),
            is_system: false,
        }
    }

    pub fn system() -> Self {
        Self {
            user_id: None,
            roles: BTreeSet::new(),
            scopes: BTreeSet::new(),
            is_system: true,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.insert(scope.into());
        self
    }

    /// Grant `action` on `scope`, e.g. `application:3:edit`.
    pub fn with_permission(self, scope: Scope, action: &str) -> Self {
        self.with_scope(scope.permission(action))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }

    pub fn label(&self) -> String {
        match self.user_id {
            Some(id) => format!("user:{}", id),
            None => "system".to_string(),
        }
    }
}

/// Resource a permission is checked against.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Scope {
    Workspace(i32),
    Application(i32),
    Page(i32),
}

impl Scope {
    pub fn permission(&self, action: &str) -> String {
        format!("{}:{}", self, action)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Workspace(id) => write!(f, "workspace:{}", id),
            Scope::Application(id) => write!(f, "application:{}", id),
            Scope::Page(id) => write!(f, "page:{}", id),
        }
    }
}

pub trait Authorizer: Send + Sync {
    fn authorize(&self, actor: &Actor, scope: &Scope, action: &str) -> Result<(), CoreError>;

    fn is_allowed(&self, actor: &Actor, scope: &Scope, action: &str) -> bool {
        self.authorize(actor, scope, action).is_ok()
    }
}

pub struct AllowAllAuthorizer;

impl Authorizer for AllowAllAuthorizer {
    fn authorize(&self, _actor: &Actor, _scope: &Scope, _action: &str) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Grants system actors and admins everything; other actors need the exact
/// `<scope>:<action>` entry in their scope set.
pub struct ScopeAuthorizer;

impl Authorizer for ScopeAuthorizer {
    fn authorize(&self, actor: &Actor, scope: &Scope, action: &str) -> Result<(), CoreError> {
        if actor.is_system() || actor.has_role(ROLE_ADMIN) {
            return Ok(());
        }

        if actor.has_scope(&scope.permission(action)) {
            return Ok(());
        }

        Err(CoreError::forbidden(format!(
            "Access denied: {} requires '{}' on {}",
            actor.label(),
            action,
            scope
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_actor_is_always_allowed() {
        let authorizer = ScopeAuthorizer;
        assert!(authorizer.is_allowed(
            &Actor::system(),
            &Scope::Page(1),
            ACTION_CREATE_ACTION
        ));
    }

    #[test]
    fn user_needs_matching_scope() {
        let authorizer = ScopeAuthorizer;
        let actor = Actor::user(5).with_permission(Scope::Application(3), ACTION_EDIT);

        assert!(authorizer.is_allowed(&actor, &Scope::Application(3), ACTION_EDIT));
        assert!(!authorizer.is_allowed(&actor, &Scope::Application(4), ACTION_EDIT));
        assert!(!authorizer.is_allowed(&actor, &Scope::Application(3), ACTION_READ));
    }

    #[test]
    fn admin_role_bypasses_scopes() {
        let authorizer = ScopeAuthorizer;
        let actor = Actor::user(9).with_role(ROLE_ADMIN);
        assert!(authorizer.is_allowed(&actor, &Scope::Workspace(1), ACTION_CREATE_DATASOURCE));
    }

    #[test]
    fn scope_strings_are_stable() {
        assert_eq!(Scope::Page(12).permission(ACTION_EDIT), "page:12:edit");
    }
}

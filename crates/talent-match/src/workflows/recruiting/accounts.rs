use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{Actor, Role, User, UserDraft, UserId};
use super::policy::{self, Mutation, PolicyTarget};
use super::repository::{RepositoryError, UserRepository};
use super::service::ServiceError;

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("user-{id:06}"))
}

/// User administration: registration, lookup and role changes.
pub struct AccountService<U> {
    users: Arc<U>,
}

impl<U> AccountService<U>
where
    U: UserRepository + 'static,
{
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    fn load_user(&self, id: &UserId) -> Result<User, ServiceError> {
        self.users.fetch(id)?.ok_or_else(|| ServiceError::NotFound {
            entity: "user",
            id: id.0.clone(),
        })
    }

    /// Users visible to the actor, newest first. Non-admins only see themselves.
    pub fn list_users(&self, actor: &Actor) -> Result<Vec<User>, ServiceError> {
        let mut users: Vec<User> = self
            .users
            .list()?
            .into_iter()
            .filter(|user| policy::can_view(actor, PolicyTarget::User(user)))
            .collect();
        users.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(users)
    }

    pub fn get_user(&self, actor: &Actor, id: &UserId) -> Result<User, ServiceError> {
        let user = self.load_user(id)?;
        policy::ensure_visible(actor, PolicyTarget::User(&user))?;
        Ok(user)
    }

    /// Register an account. E-mails are trimmed, lower-cased and must be unique.
    pub fn create_user(&self, actor: &Actor, draft: UserDraft) -> Result<User, ServiceError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("name must not be empty".to_string()));
        }
        let email = draft.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(ServiceError::Validation(format!(
                "'{email}' is not an e-mail address"
            )));
        }

        let user = User {
            id: next_user_id(),
            name: name.to_string(),
            email,
            role: draft.role,
            created_at: Utc::now(),
        };
        policy::authorize(actor, PolicyTarget::User(&user), Mutation::Create)?;

        if self.users.list()?.iter().any(|known| known.email == user.email) {
            return Err(RepositoryError::Conflict.into());
        }

        let stored = self.users.insert(user)?;
        info!(user_id = %stored.id, role = stored.role.label(), "user registered");
        Ok(stored)
    }

    /// Change a user's role. Only admins may do this, including for themselves.
    pub fn update_user_role(
        &self,
        actor: &Actor,
        id: &UserId,
        role: Role,
    ) -> Result<User, ServiceError> {
        let mut user = self.load_user(id)?;
        policy::authorize(actor, PolicyTarget::User(&user), Mutation::Edit)?;

        if user.role == role {
            debug!(user_id = %user.id, role = role.label(), "role unchanged");
            return Ok(user);
        }
        if user.id == actor.id && actor.is_admin() {
            warn!(user_id = %user.id, to = role.label(), "admin changing their own role");
        }

        let previous = user.role;
        user.role = role;
        self.users.update(user.clone())?;
        info!(
            user_id = %user.id,
            from = previous.label(),
            to = role.label(),
            "user role changed"
        );
        Ok(user)
    }
}

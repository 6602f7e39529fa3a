use std::sync::Arc;

use anyhow::Result;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHashString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use axum::async_trait;
use axum_login::{AuthUser, AuthnBackend, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::ContentStore;

/// Community member shown in the feed and in search results.
#[derive(Clone, Serialize, Debug)]
pub struct Member {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar: String,
    pub verified: bool,
    pub badge: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
        }
    }
}

/// Panel operator account. Deletion is soft so the users table can still show
/// inactive rows.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AdminUser {
    pub id: Uuid,
    pub login_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    pub fn new(
        login_name: impl Into<String>,
        password_hash: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            login_name: login_name.into(),
            password_hash: password_hash.into(),
            display_name: display_name.into(),
            email: email.into(),
            role,
            deleted_at: None,
            updated_at: now,
            created_at: now,
        }
    }

    pub fn verify_password(&self, password: &str) -> Result<(), argon2::password_hash::Error> {
        let argon2 = Argon2::default();
        let pwstr = PasswordHashString::new(&self.password_hash)?;
        let password_hash = pwstr.password_hash();
        argon2.verify_password(password.as_bytes(), &password_hash)
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

pub struct AdminUserDraft {
    pub login_name: String,
    pub password_hash: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

impl AdminUserDraft {
    pub fn new(
        login_name: String,
        password: String,
        display_name: String,
        email: String,
        role: Role,
    ) -> Result<Self> {
        if password.len() < 8 {
            return Err(anyhow::anyhow!("password must be at least 8 characters"));
        }

        Ok(Self {
            login_name,
            password_hash: hash_password(&password)?,
            display_name,
            email,
            role,
        })
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)?
        .serialize()
        .to_string())
}

pub async fn list_members(store: &ContentStore) -> Vec<Member> {
    store.members.read().await.clone()
}

pub async fn list_admin_users(store: &ContentStore) -> Vec<AdminUser> {
    store.admin_users.read().await.clone()
}

pub async fn find_admin_user_by_id(store: &ContentStore, id: Uuid) -> Option<AdminUser> {
    store
        .admin_users
        .read()
        .await
        .iter()
        .find(|user| user.id == id)
        .cloned()
}

pub async fn find_admin_user_by_login(store: &ContentStore, login_name: &str) -> Option<AdminUser> {
    store
        .admin_users
        .read()
        .await
        .iter()
        .find(|user| user.login_name == login_name)
        .cloned()
}

pub async fn create_admin_user(store: &ContentStore, draft: AdminUserDraft) -> Result<AdminUser> {
    let mut users = store.admin_users.write().await;
    if users.iter().any(|user| user.login_name == draft.login_name) {
        return Err(anyhow::anyhow!(
            "login name {} is already taken",
            draft.login_name
        ));
    }

    let user = AdminUser::new(
        draft.login_name,
        draft.password_hash,
        draft.display_name,
        draft.email,
        draft.role,
    );
    users.push(user.clone());

    Ok(user)
}

pub async fn update_admin_user(
    store: &ContentStore,
    id: Uuid,
    display_name: String,
    email: String,
    role: Role,
) -> Result<AdminUser> {
    let mut users = store.admin_users.write().await;
    let user = users
        .iter_mut()
        .find(|user| user.id == id)
        .ok_or_else(|| anyhow::anyhow!("admin user not found"))?;

    user.display_name = display_name;
    user.email = email;
    user.role = role;
    user.updated_at = Utc::now();

    Ok(user.clone())
}

/// Soft delete; the row stays visible as inactive.
pub async fn delete_admin_user(store: &ContentStore, id: Uuid) -> Result<AdminUser> {
    let mut users = store.admin_users.write().await;
    let user = users
        .iter_mut()
        .find(|user| user.id == id)
        .ok_or_else(|| anyhow::anyhow!("admin user not found"))?;

    user.deleted_at = Some(Utc::now());
    user.updated_at = Utc::now();

    Ok(user.clone())
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub login_name: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Backend {
    pub store: Arc<ContentStore>,
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = AdminUser;
    type Credentials = Credentials;
    type Error = std::convert::Infallible;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let user = find_admin_user_by_login(&self.store, &creds.login_name).await;

        Ok(user.filter(|user| user.is_active() && user.verify_password(&creds.password).is_ok()))
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        Ok(find_admin_user_by_id(&self.store, *user_id)
            .await
            .filter(AdminUser::is_active))
    }
}

impl AuthUser for AdminUser {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.id.as_bytes()
    }
}

pub type AuthSession = axum_login::AuthSession<Backend>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn soft_delete_keeps_the_row() {
        let store = ContentStore::seeded(AdminUser::new(
            "root",
            "unset",
            "Root",
            "root@example.com",
            Role::Admin,
        ));

        let draft = AdminUserDraft::new(
            "temp".to_string(),
            "password123".to_string(),
            "Temp".to_string(),
            "temp@example.com".to_string(),
            Role::Editor,
        )
        .unwrap();
        let user = create_admin_user(&store, draft).await.unwrap();

        delete_admin_user(&store, user.id).await.unwrap();

        let reloaded = find_admin_user_by_id(&store, user.id).await.unwrap();
        assert!(!reloaded.is_active());
        assert!(list_admin_users(&store)
            .await
            .iter()
            .any(|u| u.id == user.id));
    }

    #[tokio::test]
    async fn duplicate_login_names_are_rejected() {
        let store = ContentStore::seeded(AdminUser::new(
            "root",
            "unset",
            "Root",
            "root@example.com",
            Role::Admin,
        ));

        let draft = AdminUserDraft::new(
            "root".to_string(),
            "password123".to_string(),
            "Other".to_string(),
            "other@example.com".to_string(),
            Role::Editor,
        )
        .unwrap();

        assert!(create_admin_user(&store, draft).await.is_err());
    }

    #[tokio::test]
    async fn password_round_trips_through_the_hash() {
        let draft = AdminUserDraft::new(
            "checker".to_string(),
            "correct horse".to_string(),
            "Checker".to_string(),
            "checker@example.com".to_string(),
            Role::Admin,
        )
        .unwrap();
        let user = AdminUser::new(
            draft.login_name,
            draft.password_hash,
            draft.display_name,
            draft.email,
            draft.role,
        );

        assert!(user.verify_password("correct horse").is_ok());
        assert!(user.verify_password("wrong horse").is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        let draft = AdminUserDraft::new(
            "short".to_string(),
            "1234567".to_string(),
            "Short".to_string(),
            "short@example.com".to_string(),
            Role::Editor,
        );
        assert!(draft.is_err());
    }
}

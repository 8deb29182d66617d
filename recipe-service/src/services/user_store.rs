use crate::{
    models::User,
    services::{Database, ServiceError},
    utils::{hash_password, normalize_email, password_matches, Password},
};

/// Fields accepted when creating a user. Staff and superuser flags are only
/// granted through [`UserStore::create_superuser`] and
/// [`UserStore::grant_admin_flags`].
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub password: Option<Password>,
    pub name: String,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Some(Password::new(password)),
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<Password>,
}

#[derive(Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create and persist a user.
    ///
    /// The email's domain is lowercased and the password hashed before
    /// storage. Without a password the account cannot log in.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, ServiceError> {
        let email = normalize_email(&new_user.email);
        if email.is_empty() {
            return Err(ServiceError::MissingEmail);
        }

        if self.db.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let password_hash = match new_user.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };

        let user = self
            .db
            .insert_user(&email, new_user.name.trim(), password_hash.as_deref())
            .await
            .map_err(|e| {
                let err = ServiceError::Database(e);
                // Lost a race with a concurrent registration
                if err.is_unique_violation() {
                    ServiceError::EmailAlreadyRegistered
                } else {
                    err
                }
            })?;

        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Create a user with both staff and superuser flags set.
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let user = self.create_user(NewUser::new(email, password)).await?;
        let user = self.set_flags(user.id, true, true).await?;
        tracing::info!(user_id = user.id, "Superuser created");
        Ok(user)
    }

    /// Check credentials. Unknown email, wrong password, an unusable password
    /// and an inactive account all yield `None`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, ServiceError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Ok(None);
        }

        let Some(user) = self.db.find_user_by_email(&email).await? else {
            return Ok(None);
        };

        if !password_matches(&Password::new(password), user.password_hash.as_deref()) {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Ok(None);
        }

        if !user.is_active {
            tracing::debug!(user_id = user.id, "Login attempt for inactive user");
            return Ok(None);
        }

        Ok(Some(user))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.db.find_user_by_email(&normalize_email(email)).await?)
    }

    /// Apply a partial update to the user's name and password.
    pub async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<User, ServiceError> {
        let password_hash = match update.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };
        let name = update.name.as_deref().map(str::trim);

        let user = self
            .db
            .update_user_profile(user_id, name, password_hash.as_deref())
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        tracing::info!(
            user_id = user.id,
            password_changed = password_hash.is_some(),
            "Profile updated"
        );
        Ok(user)
    }

    /// Make the user staff, and superuser when `superuser` is set.
    ///
    /// Only ever adds rights: an existing superuser stays one.
    pub async fn grant_admin_flags(&self, email: &str, superuser: bool) -> Result<User, ServiceError> {
        let user = self.find_by_email(email).await?.ok_or(ServiceError::UserNotFound)?;
        let user = self
            .set_flags(user.id, true, superuser || user.is_superuser)
            .await?;
        tracing::info!(user_id = user.id, is_superuser = user.is_superuser, "Admin rights granted");
        Ok(user)
    }

    /// Activate or deactivate an account by email.
    pub async fn set_active(&self, email: &str, is_active: bool) -> Result<User, ServiceError> {
        let user = self.find_by_email(email).await?.ok_or(ServiceError::UserNotFound)?;
        let user = self
            .db
            .update_user_active(user.id, is_active)
            .await?
            .ok_or(ServiceError::UserNotFound)?;
        tracing::info!(user_id = user.id, is_active, "User activity changed");
        Ok(user)
    }

    async fn set_flags(&self, user_id: i64, is_staff: bool, is_superuser: bool) -> Result<User, ServiceError> {
        self.db
            .update_user_flags(user_id, is_staff, is_superuser)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_database;

    async fn store() -> UserStore {
        UserStore::new(test_database().await)
    }

    #[tokio::test]
    async fn create_user_with_email_successful() {
        let store = store().await;
        let user = store
            .create_user(NewUser::new("test@londonappdev.com", "Testpass123"))
            .await
            .unwrap();

        assert_eq!(user.email, "test@londonappdev.com");
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        assert_ne!(user.password_hash.as_deref(), Some("Testpass123"));
        assert!(store
            .authenticate("test@londonappdev.com", "Testpass123")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn new_user_email_domain_is_normalized() {
        let store = store().await;
        let user = store
            .create_user(NewUser::new("test@LONDONAPPDEV.COM", "test123"))
            .await
            .unwrap();
        assert_eq!(user.email, "test@londonappdev.com");
    }

    #[tokio::test]
    async fn new_user_without_email_is_rejected() {
        let store = store().await;
        let err = store.create_user(NewUser::new("   ", "test123")).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingEmail));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let store = store().await;
        store
            .create_user(NewUser::new("chef@example.com", "test123"))
            .await
            .unwrap();
        let err = store
            .create_user(NewUser::new("Chef@EXAMPLE.com", "test123"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailAlreadyRegistered));
    }

    #[tokio::test]
    async fn create_superuser_sets_flags() {
        let store = store().await;
        let user = store
            .create_superuser("admin@londonappdev.com", "test123")
            .await
            .unwrap();
        assert!(user.is_staff);
        assert!(user.is_superuser);
    }

    #[tokio::test]
    async fn user_without_password_cannot_authenticate() {
        let store = store().await;
        let user = store
            .create_user(NewUser {
                email: "nopass@example.com".to_string(),
                password: None,
                name: String::new(),
            })
            .await
            .unwrap();
        assert!(!user.has_usable_password());
        assert!(store.authenticate("nopass@example.com", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_password_and_inactive_user() {
        let store = store().await;
        store
            .create_user(NewUser::new("cook@example.com", "testpass"))
            .await
            .unwrap();

        assert!(store.authenticate("cook@example.com", "wrong").await.unwrap().is_none());
        assert!(store.authenticate("other@example.com", "testpass").await.unwrap().is_none());

        store.set_active("cook@example.com", false).await.unwrap();
        assert!(store.authenticate("cook@example.com", "testpass").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_profile_changes_only_given_fields() {
        let store = store().await;
        let user = store
            .create_user(NewUser::new("cook@example.com", "testpass").with_name("Old name"))
            .await
            .unwrap();

        let updated = store
            .update_profile(
                user.id,
                ProfileUpdate {
                    name: None,
                    password: Some(Password::new("newpassword123")),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Old name");
        assert!(store
            .authenticate("cook@example.com", "newpassword123")
            .await
            .unwrap()
            .is_some());

        let renamed = store
            .update_profile(
                user.id,
                ProfileUpdate {
                    name: Some("new name".to_string()),
                    password: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "new name");
        assert_eq!(renamed.password_hash, updated.password_hash);
    }

    #[tokio::test]
    async fn admin_flags_require_existing_user() {
        let store = store().await;
        let err = store
            .grant_admin_flags("ghost@example.com", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound));
    }

    #[tokio::test]
    async fn granting_staff_keeps_existing_superuser() {
        let store = store().await;
        store
            .create_superuser("root@example.com", "testpass")
            .await
            .unwrap();

        let user = store.grant_admin_flags("root@example.com", false).await.unwrap();

        assert!(user.is_staff);
        assert!(user.is_superuser);
    }

    #[tokio::test]
    async fn granting_superuser_to_regular_user() {
        let store = store().await;
        store
            .create_user(NewUser::new("cook@example.com", "testpass"))
            .await
            .unwrap();

        let staff = store.grant_admin_flags("cook@example.com", false).await.unwrap();
        assert!(staff.is_staff);
        assert!(!staff.is_superuser);

        let superuser = store.grant_admin_flags("COOK@example.com", true).await.unwrap();
        assert!(superuser.is_staff);
        assert!(superuser.is_superuser);
    }
}

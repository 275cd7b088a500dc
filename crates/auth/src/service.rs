use app_config::PasswordConfig;
use app_database::service::DbService;
use app_error::{AppError, AppResult};
use app_models::user::{
    AuthResponse, LoginInput, SignUpInput, USER_TABLE, UpdateUserInput, User, UserProfile,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{CredentialHasher, JwtService, validation};

/// Account operations: signup, login, fetch-self, update, delete. Composes
/// the credential hasher, the token service and the user store; mutating
/// operations enforce the ownership check before touching the store.
pub struct AccountService {
    jwt_service: Arc<JwtService>,
    hasher: Arc<CredentialHasher>,
    password_policy: PasswordConfig,
    user_db: Option<Arc<DbService<'static, User>>>,
}

impl AccountService {
    pub fn new(
        jwt_service: Arc<JwtService>,
        hasher: CredentialHasher,
        password_policy: PasswordConfig,
    ) -> Self {
        Self {
            jwt_service,
            hasher: Arc::new(hasher),
            password_policy,
            user_db: None,
        }
    }

    /// Add a database service to the account service
    pub fn with_db(mut self, user_db: Arc<DbService<'static, User>>) -> Self {
        self.user_db = Some(user_db);
        self
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt_service)
    }

    fn user_db(&self) -> AppResult<&Arc<DbService<'static, User>>> {
        self.user_db.as_ref().ok_or_else(|| {
            error!("Database not available");
            AppError::ServerError(anyhow::anyhow!("Database not available"))
        })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Vec<User>> {
        self.user_db()?
            .get_records_by_field("email", email.to_string())
            .await
    }

    fn auth_response(&self, user: &User) -> AppResult<AuthResponse> {
        let token = self.jwt_service.generate_token(&user.key())?;

        Ok(AuthResponse {
            token,
            user: UserProfile::from(user.clone()),
        })
    }

    /// The ownership check gating every mutating operation: the identity
    /// from the validated token must match the target record. Runs before
    /// any store access so a mismatch never reveals whether the target
    /// exists.
    fn check_ownership(caller: Uuid, target: Uuid) -> AppResult<()> {
        if caller != target {
            return Err(AppError::not_owner());
        }
        Ok(())
    }

    pub async fn sign_up(&self, input: SignUpInput) -> AppResult<AuthResponse> {
        let name = validation::sanitize_string(&input.name);
        let email = validation::sanitize_string(&input.email);

        validation::validate_name(&name)?;
        validation::validate_email(&email)?;

        if input.password != input.confirm_password {
            return Err(AppError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }

        validation::validate_password(&input.password, &self.password_policy)?;

        if !self.find_by_email(&email).await?.is_empty() {
            return Err(AppError::resource_exists("Account", &email));
        }

        // Only the salted hash is ever persisted
        let hashed_password = self.hasher.hash(&input.password)?;

        let user = User::new(name, email, hashed_password);

        info!("Storing new user in database: {}", user.email);
        let stored_user = self
            .user_db()?
            .create_record(user)
            .await?
            .ok_or_else(|| {
                error!("Database did not return stored user");
                AppError::DatabaseError(anyhow::anyhow!("Database did not return stored user"))
            })?;

        self.auth_response(&stored_user)
    }

    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        let email = validation::sanitize_string(&input.email);

        if email.is_empty() {
            return Err(AppError::ValidationError(
                "Email cannot be empty".to_string(),
            ));
        }

        if input.password.is_empty() {
            return Err(AppError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        let users = self.find_by_email(&email).await?;

        // Unknown email and wrong password must be indistinguishable
        let Some(user) = users.first() else {
            return Err(AppError::invalid_credentials());
        };

        if !self.hasher.verify(&input.password, &user.password) {
            return Err(AppError::invalid_credentials());
        }

        self.auth_response(user)
    }

    /// Fetch the caller's own record. A record that no longer resolves
    /// (account deleted after the token was issued) is an authentication
    /// failure, same as an invalid token.
    pub async fn get_self(&self, caller: Uuid) -> AppResult<UserProfile> {
        let key = caller.simple().to_string();

        let user = self
            .user_db()?
            .get_record_by_id(&key)
            .await?
            .ok_or_else(|| {
                AppError::AuthenticationError(
                    "This account no longer exists. Please sign up again.".to_string(),
                )
            })?;

        Ok(UserProfile::from(user))
    }

    /// Partial update of the caller's own record. Fields absent from the
    /// patch are left untouched; a supplied password is re-hashed, never
    /// stored verbatim.
    pub async fn update_user(
        &self,
        caller: Uuid,
        target: Uuid,
        input: UpdateUserInput,
    ) -> AppResult<UserProfile> {
        Self::check_ownership(caller, target)?;

        let key = target.simple().to_string();

        let existing = self
            .user_db()?
            .get_record_by_id(&key)
            .await?
            .ok_or_else(|| AppError::resource_not_found("User", &key))?;

        if input.is_empty() {
            return Ok(UserProfile::from(existing));
        }

        let mut patch = serde_json::Map::new();

        if let Some(name) = &input.name {
            let name = validation::sanitize_string(name);
            validation::validate_name(&name)?;
            patch.insert("name".to_string(), serde_json::Value::String(name));
        }

        if let Some(email) = &input.email {
            let email = validation::sanitize_string(email);
            validation::validate_email(&email)?;

            let holders = self.find_by_email(&email).await?;
            if holders.iter().any(|u| u.key() != key) {
                return Err(AppError::resource_exists("Account", &email));
            }

            patch.insert("email".to_string(), serde_json::Value::String(email));
        }

        if let Some(password) = &input.password {
            validation::validate_password(password, &self.password_policy)?;
            let hashed = self.hasher.hash(password)?;
            patch.insert("password".to_string(), serde_json::Value::String(hashed));
        }

        patch.insert(
            "updated_at".to_string(),
            serde_json::to_value(chrono::Utc::now()).map_err(|e| {
                AppError::ServerError(anyhow::anyhow!("Failed to serialize timestamp: {}", e))
            })?,
        );

        let updated = self
            .user_db()?
            .merge_record(&key, serde_json::Value::Object(patch))
            .await?
            .ok_or_else(|| AppError::resource_not_found("User", &key))?;

        info!("Updated user record: {}", key);
        Ok(UserProfile::from(updated))
    }

    /// Delete the caller's own record.
    pub async fn delete_user(&self, caller: Uuid, target: Uuid) -> AppResult<()> {
        Self::check_ownership(caller, target)?;

        let key = target.simple().to_string();

        self.user_db()?
            .delete_record(&key)
            .await?
            .ok_or_else(|| AppError::resource_not_found("User", &key))?;

        info!("Deleted user record: {}", key);
        Ok(())
    }
}

use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use chrono::Utc;
use configs::CatalogConfig;
use models::enums::UserRole;
use models::{office, user, user_credentials};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::notifier::{CredentialDelivery, CredentialNotifier};
use crate::errors::ServiceError;
use crate::identity::Principal;

const PASSWORD_ALGORITHM: &str = "argon2";

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionOutcome {
    pub user: user::Model,
    /// `false` when an existing admin had its password reset.
    pub created: bool,
    pub delivered: bool,
    /// Present only when delivery failed.
    pub password: Option<String>,
}

/// Creates the single `OFFICE_ADMIN` account of an office, or resets it.
pub struct OfficeAdminProvisioner {
    db: DatabaseConnection,
    notifier: Arc<dyn CredentialNotifier>,
    cfg: CatalogConfig,
}

impl OfficeAdminProvisioner {
    pub fn new(db: DatabaseConnection, notifier: Arc<dyn CredentialNotifier>, cfg: CatalogConfig) -> Self {
        Self { db, notifier, cfg }
    }

    /// Provision credentials and try to deliver them.
    ///
    /// The plaintext password leaves this function only when the notifier reports failure.
    #[instrument(skip(self, principal, email, name))]
    pub async fn provision_office_admin(&self, principal: &Principal, office_id: Uuid, email: &str, name: &str) -> Result<ProvisionOutcome, ServiceError> {
        principal.require_admin()?;
        let email = email.trim().to_lowercase();
        office::validate_email(&email)?;
        if name.trim().is_empty() {
            return Err(ServiceError::validation("admin name required"));
        }

        let txn = self.db.begin().await?;
        let office = office::Entity::find_by_id(office_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("office"))?;
        let by_email = user::Entity::find().filter(user::Column::Email.eq(email.clone())).one(&txn).await?;
        let current = user::Entity::find().filter(user::Column::OfficeId.eq(office_id)).one(&txn).await?;
        if let Some(other) = &by_email {
            if current.as_ref().map(|c| c.id) != Some(other.id) {
                return Err(ServiceError::conflict(format!("email {email} is already used by another account")));
            }
        }

        let now = Utc::now();
        let (user, created) = match current {
            Some(existing) => {
                let mut am: user::ActiveModel = existing.into();
                am.email = Set(email.clone());
                am.name = Set(name.trim().to_string());
                am.role = Set(UserRole::OfficeAdmin);
                am.is_active = Set(true);
                am.updated_at = Set(now.into());
                (am.update(&txn).await?, false)
            }
            None => {
                let created = user::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    email: Set(email.clone()),
                    name: Set(name.trim().to_string()),
                    role: Set(UserRole::OfficeAdmin),
                    office_id: Set(Some(office_id)),
                    is_active: Set(true),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                }
                .insert(&txn)
                .await?;
                (created, true)
            }
        };

        let password = generate_password(self.cfg.generated_password_len);
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ServiceError::Db(format!("password hashing failed: {e}")))?
            .to_string();
        user_credentials::upsert_password(&txn, user.id, hash, PASSWORD_ALGORITHM).await?;
        txn.commit().await?;

        let delivery = CredentialDelivery {
            office_name: office.name,
            email: user.email.clone(),
            name: user.name.clone(),
            password,
        };
        let delivered = self.notifier.send_credentials(&delivery).await;
        if delivered {
            info!(user_id = %user.id, office_id = %office_id, created, "office_admin_provisioned");
        } else {
            warn!(user_id = %user.id, office_id = %office_id, "credential delivery failed, returning password inline");
        }
        Ok(ProvisionOutcome { user, created, delivered, password: (!delivered).then_some(delivery.password) })
    }

    /// The active user for `email` if `password` matches its stored hash.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<user::Model>, ServiceError> {
        let Some(found) = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .filter(user::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let ok = user_credentials::verify_password(&self.db, found.id, |hash| {
            PasswordHash::new(hash)
                .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
                .unwrap_or(false)
        })
        .await?;
        Ok(ok.then_some(found))
    }
}

/// Alphanumeric password of at least 8 characters.
pub fn generate_password(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len.max(8)).map(char::from).collect()
}

//! Office-admin provisioning: one `OFFICE_ADMIN` per office, argon2-hashed
//! generated passwords, delivery through a `CredentialNotifier`.

pub mod notifier;
pub mod service;

pub use notifier::{CredentialNotifier, DisabledNotifier};
pub use service::OfficeAdminProvisioner;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use configs::CatalogConfig;
    use models::enums::UserRole;
    use uuid::Uuid;

    use super::notifier::mock::RecordingNotifier;
    use super::*;
    use crate::errors::ServiceError;
    use crate::identity::Principal;
    use crate::test_support::{admin, get_db, office};

    #[tokio::test]
    async fn delivered_password_is_never_returned() {
        let db = get_db().await.unwrap();
        let o1 = office(&db, "O1").await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let p = OfficeAdminProvisioner::new(db.clone(), notifier.clone(), CatalogConfig::default());

        let out = p.provision_office_admin(&admin(), o1, "Admin@Ward4.gov.np", "Ward Admin").await.unwrap();
        assert!(out.created && out.delivered);
        assert!(out.password.is_none());
        assert_eq!(out.user.role, UserRole::OfficeAdmin);
        assert_eq!(out.user.office_id, Some(o1));
        assert_eq!(out.user.email, "admin@ward4.gov.np");

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].password.len(), 12);
        let user = p.verify_credentials("admin@ward4.gov.np", &sent[0].password).await.unwrap();
        assert_eq!(user.map(|u| u.id), Some(out.user.id));
        assert!(p.verify_credentials("admin@ward4.gov.np", "wrong-password").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_delivery_returns_password_and_reprovision_resets() {
        let db = get_db().await.unwrap();
        let o1 = office(&db, "O1").await.unwrap();
        let p = OfficeAdminProvisioner::new(db.clone(), Arc::new(DisabledNotifier), CatalogConfig::default());

        let first = p.provision_office_admin(&admin(), o1, "oa@example.org", "First").await.unwrap();
        let first_password = first.password.clone().unwrap();
        let second = p.provision_office_admin(&admin(), o1, "oa@example.org", "Second").await.unwrap();
        assert!(!second.created);
        assert_eq!(second.user.id, first.user.id);
        assert_eq!(second.user.name, "Second");

        assert!(p.verify_credentials("oa@example.org", &first_password).await.unwrap().is_none());
        assert!(p.verify_credentials("oa@example.org", &second.password.unwrap()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn email_of_another_office_admin_is_a_conflict() {
        let db = get_db().await.unwrap();
        let o1 = office(&db, "O1").await.unwrap();
        let o2 = office(&db, "O2").await.unwrap();
        let p = OfficeAdminProvisioner::new(db.clone(), Arc::new(DisabledNotifier), CatalogConfig::default());

        p.provision_office_admin(&admin(), o1, "shared@example.org", "One").await.unwrap();
        let err = p.provision_office_admin(&admin(), o2, "shared@example.org", "Two").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        let oa = Principal::office_admin(Uuid::new_v4(), o2);
        assert!(matches!(p.provision_office_admin(&oa, o2, "x@example.org", "X").await, Err(ServiceError::Forbidden(_))));
    }
}

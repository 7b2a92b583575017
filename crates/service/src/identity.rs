//! Authenticated principal handed to the core by the identity provider.
//!
//! Only two roles exist: `ADMIN` may do everything, `OFFICE_ADMIN` acts for one office.

use models::enums::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: UserRole,
    pub office_id: Option<Uuid>,
}

impl Principal {
    pub fn admin(user_id: Uuid) -> Self {
        Self { user_id, role: UserRole::Admin, office_id: None }
    }

    pub fn office_admin(user_id: Uuid, office_id: Uuid) -> Self {
        Self { user_id, role: UserRole::OfficeAdmin, office_id: Some(office_id) }
    }

    pub fn is_admin(&self) -> bool { self.role == UserRole::Admin }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() { Ok(()) } else { Err(ServiceError::forbidden("administrator role required")) }
    }

    /// Office administered by this principal; errors for anyone else.
    pub fn require_office_admin(&self) -> Result<Uuid, ServiceError> {
        match (self.role, self.office_id) {
            (UserRole::OfficeAdmin, Some(office_id)) => Ok(office_id),
            (UserRole::OfficeAdmin, None) => Err(ServiceError::forbidden("office admin is not linked to an office")),
            _ => Err(ServiceError::forbidden("office admin role required")),
        }
    }

    /// Admins may act for any office, office admins only for their own.
    pub fn require_office_scope(&self, office_id: Uuid) -> Result<(), ServiceError> {
        if self.is_admin() { return Ok(()); }
        if self.require_office_admin()? == office_id { Ok(()) } else {
            Err(ServiceError::forbidden("office admins may only act on their own office"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn office_scope_rules() {
        let office = Uuid::new_v4();
        let other = Uuid::new_v4();
        let admin = Principal::admin(Uuid::new_v4());
        let oa = Principal::office_admin(Uuid::new_v4(), office);

        assert!(admin.require_office_scope(other).is_ok());
        assert!(oa.require_office_scope(office).is_ok());
        assert!(matches!(oa.require_office_scope(other), Err(ServiceError::Forbidden(_))));
        assert!(matches!(oa.require_admin(), Err(ServiceError::Forbidden(_))));
        assert!(matches!(admin.require_office_admin(), Err(ServiceError::Forbidden(_))));
        assert_eq!(oa.require_office_admin().unwrap(), office);
    }
}

//! End-to-end flows across the catalog, claim ledger and request workflow.

use chrono::Utc;
use configs::CatalogConfig;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::enums::{ClaimStatus, RequestStatus};
use models::{office_category, office_service};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use service::catalog::domain::NewService;
use service::office::domain::NewOffice;
use service::requests::domain::NewServiceRequest;
use service::{CatalogService, ClaimLedger, OfficeRegistry, Principal, RequestWorkflow, ServiceError};
use uuid::Uuid;

struct Directory {
    db: DatabaseConnection,
    catalog: CatalogService,
    offices: OfficeRegistry,
    claims: ClaimLedger,
    requests: RequestWorkflow,
    admin: Principal,
}

async fn directory() -> anyhow::Result<Directory> {
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Directory {
        catalog: CatalogService::new(db.clone(), CatalogConfig::default()),
        offices: OfficeRegistry::new(db.clone()),
        claims: ClaimLedger::new(db.clone()),
        requests: RequestWorkflow::new(db.clone(), CatalogConfig::default()),
        admin: Principal::admin(Uuid::new_v4()),
        db,
    })
}

impl Directory {
    async fn office(&self, code: &str) -> anyhow::Result<Uuid> {
        let cat = office_category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("{code} category")),
            description: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;
        let input = NewOffice { office_code: code.into(), name: format!("{code} office"), category_id: cat.id, ..Default::default() };
        Ok(self.offices.create_office(&self.admin, input).await?.id)
    }

    async fn service(&self, name: &str, parent_id: Option<Uuid>) -> anyhow::Result<Uuid> {
        let input = NewService { name: name.into(), parent_id, ..Default::default() };
        Ok(self.catalog.create_service(&self.admin, input).await?.service.id)
    }
}

#[tokio::test]
async fn approved_request_becomes_a_claimed_root_service() {
    let d = directory().await.unwrap();
    let o1 = d.office("O1").await.unwrap();
    let requester = Principal::office_admin(Uuid::new_v4(), o1);
    let reviewer = Principal::admin(Uuid::new_v4());
    let existing = d.service("Vehicle Tax Renewal Fee Schedule", None).await.unwrap();

    let input = NewServiceRequest { service_name: "Vehicle Tax Renewal".into(), ..Default::default() };
    let req = d.requests.submit(&requester, input).await.unwrap();
    let outcome = d.requests.approve(&reviewer, req.id, Some("approved".into())).await.unwrap();

    assert_eq!(outcome.request.status, RequestStatus::Approved);
    assert_eq!(outcome.request.reviewed_by, Some(reviewer.user_id));
    assert!(outcome.request.reviewed_at.is_some());
    let created = d.catalog.get_service(outcome.service.id).await.unwrap();
    assert_eq!(created.service.level, 0);
    assert!(created.service.parent_id.is_none());
    assert!(created.service.slug.starts_with("vehicle-tax-renewal-"));
    assert_ne!(created.service.slug, d.catalog.get_service(existing).await.unwrap().service.slug);

    let claims = d.claims.list_claims(&requester, o1, None).await.unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].claim.service_id, outcome.service.id);
    assert_eq!(claims[0].claim.status, ClaimStatus::Claimed);
    assert!(claims[0].claim.notes.as_deref().unwrap_or_default().contains("Auto-claimed"));
}

#[tokio::test]
async fn claim_twice_revoke_and_reclaim() {
    let d = directory().await.unwrap();
    let o1 = d.office("O1").await.unwrap();
    let s1 = d.service("Citizenship Certificate", None).await.unwrap();
    let oa = Principal::office_admin(Uuid::new_v4(), o1);

    let claim = d.claims.claim(&oa, o1, s1).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Claimed);
    assert!(matches!(d.claims.claim(&oa, o1, s1).await, Err(ServiceError::Conflict(_))));

    let revoked = d.claims.revoke(&oa, o1, claim.id).await.unwrap();
    assert_eq!(revoked.status, ClaimStatus::Revoked);

    let reclaimed = d.claims.claim(&oa, o1, s1).await.unwrap();
    assert_eq!(reclaimed.status, ClaimStatus::Claimed);
    assert!(reclaimed.revoked_at.is_none());
    assert!(reclaimed.revoked_by.is_none());
    assert_eq!(office_service::Entity::find().all(&d.db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn parent_services_cannot_be_claimed() {
    let d = directory().await.unwrap();
    let o1 = d.office("O1").await.unwrap();
    let parent = d.service("Land Services", None).await.unwrap();
    d.service("Land Ownership Transfer", Some(parent)).await.unwrap();

    let err = d.claims.claim(&d.admin, o1, parent).await.unwrap_err();
    match err {
        ServiceError::Conflict(msg) => assert!(msg.contains("cannot claim a parent service")),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn branch_with_two_children_cannot_be_deleted() {
    let d = directory().await.unwrap();
    let parent = d.service("Passport Services", None).await.unwrap();
    let first = d.service("New Passport", Some(parent)).await.unwrap();
    d.service("Passport Renewal", Some(parent)).await.unwrap();

    let err = d.catalog.delete_service(&d.admin, parent).await.unwrap_err();
    match err {
        ServiceError::Conflict(msg) => assert!(msg.contains('2'), "message should carry the child count: {msg}"),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(d.catalog.list_children(Some(parent)).await.unwrap().len(), 2);

    d.catalog.delete_service(&d.admin, first).await.unwrap();
    assert_eq!(d.catalog.list_children(Some(parent)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn decided_requests_are_frozen() {
    let d = directory().await.unwrap();
    let o1 = d.office("O1").await.unwrap();
    let oa = Principal::office_admin(Uuid::new_v4(), o1);
    let input = NewServiceRequest { service_name: "Trekking Permit".into(), office_id: Some(o1), ..Default::default() };
    let req = d.requests.submit(&oa, input).await.unwrap();

    let err = d.requests.reject(&d.admin, req.id, "", None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(d.requests.get_request(&oa, req.id).await.unwrap().status, RequestStatus::Pending);

    let first = d.requests.approve(&d.admin, req.id, None).await.unwrap();
    assert!(matches!(d.requests.approve(&d.admin, req.id, None).await, Err(ServiceError::Conflict(_))));
    assert!(matches!(
        d.requests.reject(&d.admin, req.id, "Changed our minds entirely", None).await,
        Err(ServiceError::Conflict(_))
    ));

    let after = d.requests.get_request(&d.admin, req.id).await.unwrap();
    assert_eq!(after.status, RequestStatus::Approved);
    assert_eq!(after.approved_service_id, Some(first.service.id));
    assert!(after.rejection_reason.is_none());
    assert_eq!(d.catalog.list_children(None).await.unwrap().len(), 1);
}

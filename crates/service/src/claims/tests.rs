use common::pagination::Pagination;
use models::enums::ClaimStatus;
use uuid::Uuid;

use super::domain::ClaimOverrides;
use super::ClaimLedger;
use crate::errors::ServiceError;
use crate::identity::Principal;
use crate::test_support::{admin, catalog, get_db, new_service, office, service};

#[tokio::test]
async fn claim_revoke_reclaim_reuses_the_row() {
    let db = get_db().await.unwrap();
    let ledger = ClaimLedger::new(db.clone());
    let o1 = office(&db, "O1").await.unwrap();
    let s1 = service(&db, "Vital Registration", None).await.unwrap();
    let oa = Principal::office_admin(Uuid::new_v4(), o1);

    let first = ledger.claim(&oa, o1, s1).await.unwrap();
    assert_eq!(first.status, ClaimStatus::Claimed);
    assert!(matches!(ledger.claim(&oa, o1, s1).await, Err(ServiceError::Conflict(_))));

    let revoked = ledger.revoke(&oa, o1, first.id).await.unwrap();
    assert_eq!(revoked.status, ClaimStatus::Revoked);
    assert_eq!(revoked.revoked_by, Some(oa.user_id));
    assert!(revoked.revoked_at.is_some());
    assert!(matches!(ledger.revoke(&oa, o1, first.id).await, Err(ServiceError::Conflict(_))));

    let again = ledger.claim(&oa, o1, s1).await.unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.status, ClaimStatus::Claimed);
    assert!(again.revoked_by.is_none() && again.revoked_at.is_none());

    let all = ledger.list_claims(&oa, o1, None).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].service_name, "Vital Registration");
}

#[tokio::test]
async fn branches_cannot_be_claimed_and_claimed_leaves_cannot_grow() {
    let db = get_db().await.unwrap();
    let ledger = ClaimLedger::new(db.clone());
    let o1 = office(&db, "O1").await.unwrap();
    let parent = service(&db, "Education", None).await.unwrap();
    let child = service(&db, "Equivalence Certificate", Some(parent)).await.unwrap();

    let err = ledger.claim(&admin(), o1, parent).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(m) if m.contains("cannot claim a parent service")));

    ledger.claim(&admin(), o1, child).await.unwrap();
    let err = catalog(&db).create_service(&admin(), new_service("Sub", Some(child))).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn office_admins_are_confined_to_their_office() {
    let db = get_db().await.unwrap();
    let ledger = ClaimLedger::new(db.clone());
    let o1 = office(&db, "O1").await.unwrap();
    let o2 = office(&db, "O2").await.unwrap();
    let s = service(&db, "Tax Clearance", None).await.unwrap();
    let oa2 = Principal::office_admin(Uuid::new_v4(), o2);

    assert!(matches!(ledger.claim(&oa2, o1, s).await, Err(ServiceError::Forbidden(_))));
    let claim = ledger.claim(&admin(), o1, s).await.unwrap();
    assert!(matches!(ledger.revoke(&oa2, o2, claim.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(ledger.list_claims(&oa2, o1, None).await, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn overrides_are_read_merged_without_touching_the_service() {
    let db = get_db().await.unwrap();
    let ledger = ClaimLedger::new(db.clone());
    let o1 = office(&db, "O1").await.unwrap();
    let mut input = new_service("Business Registration", None);
    input.description = Some("Register a private firm".into());
    let s = catalog(&db).create_service(&admin(), input).await.unwrap().service.id;
    let claim = ledger.claim(&admin(), o1, s).await.unwrap();

    let plain = ledger.effective_service(claim.id).await.unwrap();
    assert_eq!(plain.description.as_deref(), Some("Register a private firm"));
    assert!(!plain.customized);

    let overrides = ClaimOverrides {
        custom_description: Some(Some("Walk-in on Sundays only".into())),
        custom_fees: Some(Some("NPR 100 ward recommendation".into())),
        ..Default::default()
    };
    ledger.revoke(&admin(), o1, claim.id).await.unwrap();
    let updated = ledger.update_claim(&admin(), o1, claim.id, overrides).await.unwrap();
    assert_eq!(updated.status, ClaimStatus::Revoked);

    let merged = ledger.effective_service(claim.id).await.unwrap();
    assert_eq!(merged.description.as_deref(), Some("Walk-in on Sundays only"));
    assert!(merged.customized);
    let shared = catalog(&db).get_service(s).await.unwrap();
    assert_eq!(shared.service.description.as_deref(), Some("Register a private firm"));
}

#[tokio::test]
async fn claimable_listing_excludes_branches_and_active_claims() {
    let db = get_db().await.unwrap();
    let ledger = ClaimLedger::new(db.clone());
    let o1 = office(&db, "O1").await.unwrap();
    let o2 = office(&db, "O2").await.unwrap();
    let root = service(&db, "Land", None).await.unwrap();
    let a = service(&db, "Land Transfer", Some(root)).await.unwrap();
    service(&db, "Land Valuation", Some(root)).await.unwrap();

    let claim = ledger.claim(&admin(), o1, a).await.unwrap();
    ledger.claim(&admin(), o2, a).await.unwrap();
    let page = ledger.list_claimable_services(&admin(), o1, Pagination::default()).await.unwrap();
    let names: Vec<String> = page.items.into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Land Valuation"]);

    let offices = ledger.list_service_offices(a).await.unwrap();
    assert_eq!(offices.len(), 2);

    ledger.revoke(&admin(), o1, claim.id).await.unwrap();
    assert_eq!(ledger.list_claimable_services(&admin(), o1, Pagination::default()).await.unwrap().total, 2);
    assert_eq!(ledger.list_service_offices(a).await.unwrap().len(), 1);
    let revoked = ledger.list_claims(&admin(), o1, Some(ClaimStatus::Revoked)).await.unwrap();
    assert_eq!(revoked.len(), 1);
}

#[tokio::test]
async fn deleting_a_claimed_leaf_drops_its_claims() {
    let db = get_db().await.unwrap();
    let ledger = ClaimLedger::new(db.clone());
    let o1 = office(&db, "O1").await.unwrap();
    let s = service(&db, "Driving Trial", None).await.unwrap();
    let claim = ledger.claim(&admin(), o1, s).await.unwrap();

    catalog(&db).delete_service(&admin(), s).await.unwrap();
    assert!(matches!(ledger.effective_service(claim.id).await, Err(ServiceError::NotFound(_))));
}

use common::pagination::Pagination;
use models::enums::{DocumentType, FeeType, Weekday};
use models::service_node;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use super::domain::{AuthorityContact, AuthorityInput, DocumentInput, FeeInput, ServiceUpdate, TimeRequirementInput, WorkingHoursInput};
use crate::errors::ServiceError;
use crate::identity::Principal;
use crate::test_support::{admin, catalog, get_db, new_service, office_category, service, step};

fn detailed_step(title: &str) -> super::domain::StepInput {
    let mut s = step(title);
    s.documents.push(DocumentInput {
        name: "Citizenship certificate".into(),
        name_local: None,
        document_type: DocumentType::Photocopy,
        is_mandatory: true,
        quantity: 2,
        notes: None,
    });
    s.fees.push(FeeInput {
        fee_type: FeeType::GovernmentFee,
        label: "Registration fee".into(),
        amount: 500.0,
        currency: "NPR".into(),
        is_refundable: false,
        notes: None,
    });
    s.time_requirement = Some(TimeRequirementInput { avg_duration: Some("1 day".into()), ..Default::default() });
    s.working_hours = vec![
        WorkingHoursInput { day: Weekday::Friday, open_time: Some("10:00".into()), close_time: Some("15:00".into()), is_closed: false },
        WorkingHoursInput { day: Weekday::Sunday, open_time: Some("10:00".into()), close_time: Some("17:00".into()), is_closed: false },
    ];
    s.authorities = vec![
        AuthorityInput::Responsible(AuthorityContact { position: "Section Officer".into(), ..Default::default() }),
        AuthorityInput::Complaint(AuthorityContact { position: "Chief Administrative Officer".into(), ..Default::default() }),
    ];
    s
}

#[tokio::test]
async fn create_service_persists_steps_and_levels() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let root = service(&db, "Transport", None).await.unwrap();

    let mut input = new_service("Driving License", Some(root));
    input.steps = vec![detailed_step("Apply online"), step("Biometrics"), step("Written exam")];
    let detail = svc.create_service(&admin(), input).await.unwrap();

    assert_eq!(detail.service.level, 1);
    assert_eq!(detail.service.slug, "driving-license");
    assert!(!detail.has_children);
    let numbers: Vec<i32> = detail.steps.iter().map(|s| s.step.step_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let first = &detail.steps[0];
    assert_eq!(first.documents.len(), 1);
    assert_eq!(first.documents[0].quantity, 2);
    assert_eq!(first.fees[0].amount, 500.0);
    assert!(first.time_requirement.is_some());
    assert_eq!(first.working_hours[0].day, Weekday::Sunday);
    assert_eq!(first.responsible_authorities.len(), 1);
    assert_eq!(first.complaint_authorities[0].position, "Chief Administrative Officer");

    assert!(svc.get_service(root).await.unwrap().has_children);
}

#[tokio::test]
async fn sibling_slug_collision_is_conflict_but_cousins_may_share() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let a = service(&db, "Land", None).await.unwrap();
    let b = service(&db, "Business", None).await.unwrap();

    service(&db, "Registration", Some(a)).await.unwrap();
    service(&db, "Registration", Some(b)).await.unwrap();
    let err = svc.create_service(&admin(), new_service("Registration", Some(a))).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn missing_parent_is_not_found_and_nothing_is_written() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let err = svc.create_service(&admin(), new_service("Orphan", Some(Uuid::new_v4()))).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(svc.list_children(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_office_category_rolls_back_the_whole_service() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let mut input = new_service("Passport", None);
    let mut s = step("Submit form");
    s.office_category_ids.push(Uuid::new_v4());
    input.steps = vec![step("Book appointment"), s];

    let err = svc.create_service(&admin(), input).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(svc.list_children(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_replaces_steps_from_scratch() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let cat = office_category(&db, "District Administration Office").await.unwrap();
    let mut input = new_service("Passport", None);
    input.steps = vec![detailed_step("Old one"), step("Old two")];
    let created = svc.create_service(&admin(), input).await.unwrap();
    let old_ids: Vec<Uuid> = created.steps.iter().map(|s| s.step.id).collect();

    let mut replacement = step("Only step");
    replacement.office_category_ids.push(cat.id);
    let update = ServiceUpdate {
        name: Some("Machine Readable Passport".into()),
        steps: Some(vec![replacement]),
        ..Default::default()
    };
    let updated = svc.update_service(&admin(), created.service.id, update).await.unwrap();

    assert_eq!(updated.service.name, "Machine Readable Passport");
    assert_eq!(updated.service.slug, "passport");
    assert_eq!(updated.steps.len(), 1);
    assert_eq!(updated.steps[0].step.step_number, 1);
    assert_eq!(updated.steps[0].office_category_ids, vec![cat.id]);
    assert!(!old_ids.contains(&updated.steps[0].step.id));
}

#[tokio::test]
async fn reparent_relevels_subtree_and_rejects_cycles() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let a = service(&db, "A", None).await.unwrap();
    let b = service(&db, "B", Some(a)).await.unwrap();
    let c = service(&db, "C", Some(b)).await.unwrap();
    let other = service(&db, "Other", None).await.unwrap();
    let deep = service(&db, "Deep", Some(other)).await.unwrap();

    let err = svc
        .update_service(&admin(), a, ServiceUpdate { parent_id: Some(Some(c)), ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    let err = svc
        .update_service(&admin(), a, ServiceUpdate { parent_id: Some(Some(a)), ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    svc.update_service(&admin(), b, ServiceUpdate { parent_id: Some(Some(deep)), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(svc.get_service(b).await.unwrap().service.level, 2);
    assert_eq!(svc.get_service(c).await.unwrap().service.level, 3);

    let crumbs = svc.breadcrumb(c).await.unwrap();
    let names: Vec<&str> = crumbs.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Other", "Deep", "B", "C"]);

    svc.update_service(&admin(), b, ServiceUpdate { parent_id: Some(None), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(svc.get_service(c).await.unwrap().service.level, 1);
}

#[tokio::test]
async fn remove_step_keeps_numbering_contiguous() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let mut input = new_service("Birth Registration", None);
    input.steps = vec![step("One"), detailed_step("Two"), step("Three"), step("Four")];
    let created = svc.create_service(&admin(), input).await.unwrap();

    let after = svc.remove_step(&admin(), created.service.id, 2).await.unwrap();
    let view: Vec<(i32, &str)> = after.steps.iter().map(|s| (s.step.step_number, s.step.title.as_str())).collect();
    assert_eq!(view, vec![(1, "One"), (2, "Three"), (3, "Four")]);

    let err = svc.remove_step(&admin(), created.service.id, 7).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn delete_cascades_steps_of_a_leaf() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let mut input = new_service("Marriage Registration", None);
    input.steps = vec![detailed_step("Apply")];
    let created = svc.create_service(&admin(), input).await.unwrap();

    svc.delete_service(&admin(), created.service.id).await.unwrap();
    assert!(matches!(svc.get_service(created.service.id).await, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn leaf_and_branch_lookups() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let root = service(&db, "Health", None).await.unwrap();
    let leaf = service(&db, "Vaccination", Some(root)).await.unwrap();

    assert!(svc.find_branch(root).await.unwrap().is_some());
    assert!(svc.find_leaf(root).await.unwrap().is_none());
    assert!(svc.find_leaf(leaf).await.unwrap().is_some());
    assert!(svc.find_branch(leaf).await.unwrap().is_none());
    assert!(svc.find_leaf(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn children_are_ordered_by_name_and_search_is_case_insensitive() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let root = service(&db, "Citizenship", None).await.unwrap();
    for name in ["Naturalised", "By Descent", "Honorary"] {
        service(&db, name, Some(root)).await.unwrap();
    }
    let names: Vec<String> = svc.list_children(Some(root)).await.unwrap().into_iter().map(|n| n.name).collect();
    assert_eq!(names, vec!["By Descent", "Honorary", "Naturalised"]);

    let page = svc.search_services("DESCENT", Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "By Descent");

    let page = svc.search_services("", Pagination::new(2, 3)).await.unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn categories_link_and_replace() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let transport = svc.create_category(&admin(), "Transport", None).await.unwrap();
    let revenue = svc.create_category(&admin(), "Revenue", None).await.unwrap();
    assert!(matches!(svc.create_category(&admin(), "transport", None).await, Err(ServiceError::Conflict(_))));

    let mut input = new_service("Vehicle Tax", None);
    input.category_ids = vec![transport.id, transport.id];
    let created = svc.create_service(&admin(), input).await.unwrap();
    assert_eq!(created.category_ids, vec![transport.id]);

    let updated = svc
        .update_service(&admin(), created.service.id, ServiceUpdate { category_ids: Some(vec![revenue.id]), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(updated.category_ids, vec![revenue.id]);

    svc.delete_category(&admin(), revenue.id).await.unwrap();
    assert!(svc.get_service(created.service.id).await.unwrap().category_ids.is_empty());
}

#[tokio::test]
async fn office_admins_cannot_edit_the_catalog() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let oa = Principal::office_admin(Uuid::new_v4(), Uuid::new_v4());
    let err = svc.create_service(&oa, new_service("Anything", None)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn names_without_ascii_letters_get_a_generated_slug() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let created = svc.create_service(&admin(), new_service("नागरिकता प्रमाणपत्र", None)).await.unwrap();
    assert!(created.service.slug.starts_with("service-"));
    assert_eq!(created.service.name, "नागरिकता प्रमाणपत्र");

    let cat = svc.create_category(&admin(), "यातायात", None).await.unwrap();
    assert!(cat.slug.starts_with("service-"));
}

#[tokio::test]
async fn breadcrumb_reports_a_parent_cycle_as_integrity_error() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let a = service(&db, "A", None).await.unwrap();
    let b = service(&db, "B", Some(a)).await.unwrap();

    let node = service_node::Entity::find_by_id(a).one(&db).await.unwrap().unwrap();
    let mut looped: service_node::ActiveModel = node.into();
    looped.parent_id = Set(Some(b));
    looped.update(&db).await.unwrap();

    let err = svc.breadcrumb(b).await.unwrap_err();
    assert!(matches!(err, ServiceError::Integrity(_)), "got {err:?}");
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    service(&db, "Income Tax", None).await.unwrap();
    service(&db, "Land_Record Copy", None).await.unwrap();

    let page = svc.search_services("_", Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Land_Record Copy");
    assert_eq!(svc.search_services("%", Pagination::default()).await.unwrap().total, 0);
}

#[tokio::test]
async fn repeated_office_category_on_a_step_is_stored_once() {
    let db = get_db().await.unwrap();
    let svc = catalog(&db);
    let cat = office_category(&db, "Land Revenue Office").await.unwrap();
    let mut s = step("Submit deed");
    s.office_category_ids = vec![cat.id, cat.id];
    let mut input = new_service("Land Transfer", None);
    input.steps = vec![s];

    let created = svc.create_service(&admin(), input).await.unwrap();
    assert_eq!(created.steps[0].office_category_ids, vec![cat.id]);
}

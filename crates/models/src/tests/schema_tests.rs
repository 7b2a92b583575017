use crate::db::{connect_with_config, DatabaseConfig};
use crate::enums::{ClaimStatus, ServicePriority};
use crate::{office, office_category, office_service, service_node, service_step, user, user_credentials};
use anyhow::Result;
use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn node(name: &str, parent_id: Option<Uuid>, level: i32) -> service_node::ActiveModel {
    let now = Utc::now();
    service_node::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_code: Set(format!("SRV-{}", Uuid::new_v4().simple())),
        parent_id: Set(parent_id),
        slug: Set(service_node::slugify(name)),
        name: Set(name.to_string()),
        name_local: Set(None),
        description: Set(None),
        level: Set(level),
        priority: Set(ServicePriority::High),
        is_online_available: Set(false),
        online_url: Set(None),
        eligibility: Set(None),
        validity_period: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

async fn office_fixture(db: &DatabaseConnection) -> Result<office::Model> {
    let now = Utc::now();
    let cat = office_category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("District Administration {}", Uuid::new_v4())),
        description: Set(None),
        created_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    let o = office::ActiveModel {
        id: Set(Uuid::new_v4()),
        office_code: Set(format!("OFF-{}", Uuid::new_v4().simple())),
        name: Set("DAO Kathmandu".into()),
        name_local: Set(None),
        address: Set(None),
        address_local: Set(None),
        phone: Set(None),
        email: Set(None),
        category_id: Set(cat.id),
        location_kind: Set(None),
        location_id: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(o)
}

#[tokio::test]
async fn enum_columns_round_trip() -> Result<()> {
    let db = setup_test_db().await?;
    let root = node("Transport", None, 0).insert(&db).await?;
    let found = service_node::Entity::find_by_id(root.id).one(&db).await?.unwrap();
    assert_eq!(found.priority, ServicePriority::High);

    let by_priority = service_node::Entity::find()
        .filter(service_node::Column::Priority.eq(ServicePriority::High))
        .all(&db)
        .await?;
    assert_eq!(by_priority.len(), 1);
    Ok(())
}

#[tokio::test]
async fn step_numbers_are_unique_per_service() -> Result<()> {
    let db = setup_test_db().await?;
    let svc = node("Passport", None, 0).insert(&db).await?;
    let step = |n: i32| service_step::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(svc.id),
        step_number: Set(n),
        title: Set(format!("step {n}")),
        description: Set(None),
        created_at: Set(Utc::now().into()),
    };
    step(1).insert(&db).await?;
    step(2).insert(&db).await?;
    assert!(step(2).insert(&db).await.is_err());
    Ok(())
}

#[tokio::test]
async fn claim_pair_is_unique() -> Result<()> {
    let db = setup_test_db().await?;
    let svc = node("Driving Licence", None, 0).insert(&db).await?;
    let o = office_fixture(&db).await?;
    let claim = || office_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        office_id: Set(o.id),
        service_id: Set(svc.id),
        status: Set(ClaimStatus::Claimed),
        claimed_by: Set(None),
        claimed_at: Set(None),
        revoked_by: Set(None),
        revoked_at: Set(None),
        custom_description: Set(None),
        custom_fees: Set(None),
        custom_requirements: Set(None),
        notes: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };
    claim().insert(&db).await?;
    let err = claim().insert(&db).await.unwrap_err();
    assert!(matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))));
    Ok(())
}

#[tokio::test]
async fn upsert_password_replaces_existing_hash() -> Result<()> {
    let db = setup_test_db().await?;
    let now = Utc::now();
    let u = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set("admin@dao.gov.np".into()),
        name: Set("Admin".into()),
        role: Set(crate::enums::UserRole::Admin),
        office_id: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;
    let first = user_credentials::upsert_password(&db, u.id, "hash-one".into(), "argon2").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-two".into(), "argon2").await?;
    assert_eq!(first.id, second.id);
    assert!(user_credentials::verify_password(&db, u.id, |h| h == "hash-two").await?);
    assert!(user_credentials::upsert_password(&db, u.id, "  ".into(), "argon2").await.is_err());
    Ok(())
}

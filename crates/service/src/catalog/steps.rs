//! Persistence of a service's ordered steps and their detail rows.
//!
//! Writers take any `ConnectionTrait` so the caller decides the transaction.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use models::enums::AuthorityRole;
use models::{
    office_category, service_step, step_authority, step_document, step_fee, step_office_category,
    step_time_requirement, step_working_hours,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::domain::{StepDetail, StepInput};
use crate::errors::ServiceError;

/// Insert `steps` numbered 1..=n in list order, with every nested row.
pub async fn insert_steps<C: ConnectionTrait>(db: &C, service_id: Uuid, steps: &[StepInput]) -> Result<(), ServiceError> {
    for (idx, input) in steps.iter().enumerate() {
        let step = service_step::ActiveModel {
            id: Set(Uuid::new_v4()),
            service_id: Set(service_id),
            step_number: Set(idx as i32 + 1),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description.clone()),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
        insert_step_details(db, step.id, input).await?;
    }
    Ok(())
}

async fn insert_step_details<C: ConnectionTrait>(db: &C, step_id: Uuid, input: &StepInput) -> Result<(), ServiceError> {
    for (i, doc) in input.documents.iter().enumerate() {
        step_document::ActiveModel {
            id: Set(Uuid::new_v4()),
            step_id: Set(step_id),
            name: Set(doc.name.trim().to_string()),
            name_local: Set(doc.name_local.clone()),
            document_type: Set(doc.document_type),
            is_mandatory: Set(doc.is_mandatory),
            quantity: Set(doc.quantity),
            notes: Set(doc.notes.clone()),
            sort_order: Set(i as i32),
        }
        .insert(db)
        .await?;
    }

    for (i, fee) in input.fees.iter().enumerate() {
        step_fee::ActiveModel {
            id: Set(Uuid::new_v4()),
            step_id: Set(step_id),
            fee_type: Set(fee.fee_type),
            label: Set(fee.label.trim().to_string()),
            amount: Set(fee.amount),
            currency: Set(fee.currency.clone()),
            is_refundable: Set(fee.is_refundable),
            notes: Set(fee.notes.clone()),
            sort_order: Set(i as i32),
        }
        .insert(db)
        .await?;
    }

    if let Some(tr) = &input.time_requirement {
        step_time_requirement::ActiveModel {
            id: Set(Uuid::new_v4()),
            step_id: Set(step_id),
            min_duration: Set(tr.min_duration.clone()),
            avg_duration: Set(tr.avg_duration.clone()),
            max_duration: Set(tr.max_duration.clone()),
            remarks: Set(tr.remarks.clone()),
        }
        .insert(db)
        .await?;
    }

    for wh in &input.working_hours {
        step_working_hours::ActiveModel {
            id: Set(Uuid::new_v4()),
            step_id: Set(step_id),
            day: Set(wh.day),
            open_time: Set(wh.open_time.clone()),
            close_time: Set(wh.close_time.clone()),
            is_closed: Set(wh.is_closed),
        }
        .insert(db)
        .await?;
    }

    for (i, authority) in input.authorities.iter().enumerate() {
        let contact = authority.contact();
        step_authority::ActiveModel {
            id: Set(Uuid::new_v4()),
            step_id: Set(step_id),
            role: Set(authority.role()),
            position: Set(contact.position.trim().to_string()),
            department: Set(contact.department.clone()),
            phone: Set(contact.phone.clone()),
            email: Set(contact.email.clone()),
            sort_order: Set(i as i32),
        }
        .insert(db)
        .await?;
    }

    let mut seen = HashSet::new();
    for category_id in input.office_category_ids.iter().filter(|c| seen.insert(**c)) {
        if office_category::Entity::find_by_id(*category_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("office category {category_id} not found")));
        }
        step_office_category::ActiveModel {
            step_id: Set(step_id),
            office_category_id: Set(*category_id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn delete_details_of<C: ConnectionTrait>(db: &C, step_ids: &[Uuid]) -> Result<(), ServiceError> {
    if step_ids.is_empty() { return Ok(()); }
    let ids = step_ids.to_vec();
    step_document::Entity::delete_many().filter(step_document::Column::StepId.is_in(ids.clone())).exec(db).await?;
    step_fee::Entity::delete_many().filter(step_fee::Column::StepId.is_in(ids.clone())).exec(db).await?;
    step_time_requirement::Entity::delete_many().filter(step_time_requirement::Column::StepId.is_in(ids.clone())).exec(db).await?;
    step_working_hours::Entity::delete_many().filter(step_working_hours::Column::StepId.is_in(ids.clone())).exec(db).await?;
    step_authority::Entity::delete_many().filter(step_authority::Column::StepId.is_in(ids.clone())).exec(db).await?;
    step_office_category::Entity::delete_many().filter(step_office_category::Column::StepId.is_in(ids.clone())).exec(db).await?;
    service_step::Entity::delete_many().filter(service_step::Column::Id.is_in(ids)).exec(db).await?;
    Ok(())
}

/// Remove every step of a service together with its detail rows.
pub async fn delete_steps<C: ConnectionTrait>(db: &C, service_id: Uuid) -> Result<usize, ServiceError> {
    let ids: Vec<Uuid> = service_step::Entity::find()
        .filter(service_step::Column::ServiceId.eq(service_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();
    delete_details_of(db, &ids).await?;
    Ok(ids.len())
}

/// Delete step `step_number` and shift later steps down by one so numbering stays contiguous.
pub async fn remove_step<C: ConnectionTrait>(db: &C, service_id: Uuid, step_number: i32) -> Result<(), ServiceError> {
    let target = service_step::Entity::find()
        .filter(service_step::Column::ServiceId.eq(service_id))
        .filter(service_step::Column::StepNumber.eq(step_number))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("step {step_number} not found")))?;
    delete_details_of(db, &[target.id]).await?;

    // ascending order keeps (service_id, step_number) unique at every statement
    let later = service_step::Entity::find()
        .filter(service_step::Column::ServiceId.eq(service_id))
        .filter(service_step::Column::StepNumber.gt(step_number))
        .order_by_asc(service_step::Column::StepNumber)
        .all(db)
        .await?;
    for step in later {
        let number = step.step_number;
        let mut am: service_step::ActiveModel = step.into();
        am.step_number = Set(number - 1);
        am.update(db).await?;
    }
    Ok(())
}

/// Steps of a service ordered by step number, each with its detail rows.
pub async fn load_steps<C: ConnectionTrait>(db: &C, service_id: Uuid) -> Result<Vec<StepDetail>, ServiceError> {
    let steps = service_step::Entity::find()
        .filter(service_step::Column::ServiceId.eq(service_id))
        .order_by_asc(service_step::Column::StepNumber)
        .all(db)
        .await?;
    if steps.is_empty() { return Ok(Vec::new()); }
    let ids: Vec<Uuid> = steps.iter().map(|s| s.id).collect();

    let mut documents = group(
        step_document::Entity::find()
            .filter(step_document::Column::StepId.is_in(ids.clone()))
            .order_by_asc(step_document::Column::SortOrder)
            .all(db)
            .await?,
        |d| d.step_id,
    );
    let mut fees = group(
        step_fee::Entity::find()
            .filter(step_fee::Column::StepId.is_in(ids.clone()))
            .order_by_asc(step_fee::Column::SortOrder)
            .all(db)
            .await?,
        |f| f.step_id,
    );
    let mut times: HashMap<Uuid, step_time_requirement::Model> = step_time_requirement::Entity::find()
        .filter(step_time_requirement::Column::StepId.is_in(ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.step_id, t))
        .collect();
    let mut hours = group(
        step_working_hours::Entity::find()
            .filter(step_working_hours::Column::StepId.is_in(ids.clone()))
            .all(db)
            .await?,
        |h| h.step_id,
    );
    let mut authorities = group(
        step_authority::Entity::find()
            .filter(step_authority::Column::StepId.is_in(ids.clone()))
            .order_by_asc(step_authority::Column::SortOrder)
            .all(db)
            .await?,
        |a| a.step_id,
    );
    let mut office_categories = group(
        step_office_category::Entity::find()
            .filter(step_office_category::Column::StepId.is_in(ids))
            .all(db)
            .await?,
        |c| c.step_id,
    );

    Ok(steps
        .into_iter()
        .map(|step| {
            let mut working_hours = hours.remove(&step.id).unwrap_or_default();
            working_hours.sort_by_key(|h| h.day);
            let (responsible, complaint): (Vec<_>, Vec<_>) = authorities
                .remove(&step.id)
                .unwrap_or_default()
                .into_iter()
                .partition(|a| a.role == AuthorityRole::Responsible);
            StepDetail {
                documents: documents.remove(&step.id).unwrap_or_default(),
                fees: fees.remove(&step.id).unwrap_or_default(),
                time_requirement: times.remove(&step.id),
                working_hours,
                responsible_authorities: responsible,
                complaint_authorities: complaint,
                office_category_ids: office_categories
                    .remove(&step.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| c.office_category_id)
                    .collect(),
                step,
            }
        })
        .collect())
}

fn group<T>(rows: Vec<T>, key: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut map: HashMap<Uuid, Vec<T>> = HashMap::new();
    for row in rows {
        map.entry(key(&row)).or_default().push(row);
    }
    map
}

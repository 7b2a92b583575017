//! Parent-pointer traversal helpers, usable inside or outside a transaction.

use std::collections::{HashSet, VecDeque};

use chrono::Utc;
use models::enums::ClaimStatus;
use models::{office_service, service_node};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::errors::ServiceError;

pub async fn find_node<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<service_node::Model, ServiceError> {
    service_node::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))
}

pub async fn child_count<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, ServiceError> {
    Ok(service_node::Entity::find()
        .filter(service_node::Column::ParentId.eq(id))
        .count(db)
        .await?)
}

/// The node, provided it has no children; a branch yields `Conflict`.
pub async fn require_leaf<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<service_node::Model, ServiceError> {
    let node = find_node(db, id).await?;
    if child_count(db, id).await? > 0 {
        return Err(ServiceError::conflict("cannot claim a parent service"));
    }
    Ok(node)
}

/// Walk `parent_id` pointers from `id` to its root, returning `[id, parent, ..., root]`.
/// More than `max_depth` hops is reported as an integrity error instead of looping.
pub async fn ancestors<C: ConnectionTrait>(db: &C, id: Uuid, max_depth: usize) -> Result<Vec<service_node::Model>, ServiceError> {
    let mut chain = Vec::new();
    let mut current = Some(id);
    while let Some(cid) = current {
        if chain.len() > max_depth {
            return Err(ServiceError::Integrity(format!(
                "service {id} is more than {max_depth} levels deep; the parent chain may contain a cycle"
            )));
        }
        let node = match service_node::Entity::find_by_id(cid).one(db).await? {
            Some(n) => n,
            None if chain.is_empty() => return Err(ServiceError::not_found("service")),
            None => return Err(ServiceError::Integrity(format!("service {id} has a dangling parent {cid}"))),
        };
        current = node.parent_id;
        chain.push(node);
    }
    Ok(chain)
}

/// Whether `candidate` lies in the subtree rooted at `root` (inclusive).
pub async fn is_in_subtree<C: ConnectionTrait>(db: &C, root: Uuid, candidate: Uuid, max_depth: usize) -> Result<bool, ServiceError> {
    Ok(ancestors(db, candidate, max_depth).await?.iter().any(|n| n.id == root))
}

/// Number of CLAIMED ledger rows for a service.
pub async fn active_claim_count<C: ConnectionTrait>(db: &C, service_id: Uuid) -> Result<u64, ServiceError> {
    Ok(office_service::Entity::find()
        .filter(office_service::Column::ServiceId.eq(service_id))
        .filter(office_service::Column::Status.eq(ClaimStatus::Claimed))
        .count(db)
        .await?)
}

/// A node about to gain children must not be claimed by any office.
pub async fn ensure_can_become_parent<C: ConnectionTrait>(db: &C, parent_id: Uuid) -> Result<(), ServiceError> {
    let claims = active_claim_count(db, parent_id).await?;
    if claims > 0 {
        return Err(ServiceError::conflict(format!(
            "service is claimed by {claims} office(s); revoke the claims before adding child services"
        )));
    }
    Ok(())
}

/// Rewrite `level` for every descendant of `root`, which already carries `root_level`.
pub async fn relevel_subtree<C: ConnectionTrait>(db: &C, root: Uuid, root_level: i32) -> Result<u64, ServiceError> {
    let mut queue = VecDeque::from([(root, root_level)]);
    let mut seen = HashSet::from([root]);
    let mut updated = 0u64;
    while let Some((id, level)) = queue.pop_front() {
        let children = service_node::Entity::find()
            .filter(service_node::Column::ParentId.eq(id))
            .all(db)
            .await?;
        for child in children {
            if !seen.insert(child.id) {
                return Err(ServiceError::Integrity(format!("cycle detected at service {}", child.id)));
            }
            service_node::Entity::update_many()
                .set(service_node::ActiveModel {
                    level: Set(level + 1),
                    updated_at: Set(Utc::now().into()),
                    ..Default::default()
                })
                .filter(service_node::Column::Id.eq(child.id))
                .exec(db)
                .await?;
            updated += 1;
            queue.push_back((child.id, level + 1));
        }
    }
    Ok(updated)
}

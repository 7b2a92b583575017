use async_trait::async_trait;
use models::location::{district, municipality, province, ward};
use sea_orm::{DatabaseConnection, EntityTrait};

use super::domain::{LocationChain, NamedLocation, OfficeLocation};
use crate::errors::ServiceError;

/// Read-only access to the four-level location reference data.
#[async_trait]
pub trait LocationDirectory: Send + Sync {
    async fn ward(&self, id: i32) -> Result<Option<ward::Model>, ServiceError>;
    async fn municipality(&self, id: i32) -> Result<Option<municipality::Model>, ServiceError>;
    async fn district(&self, id: i32) -> Result<Option<district::Model>, ServiceError>;
    async fn province(&self, id: i32) -> Result<Option<province::Model>, ServiceError>;

    async fn exists(&self, loc: OfficeLocation) -> Result<bool, ServiceError> {
        Ok(match loc {
            OfficeLocation::Ward(id) => self.ward(id).await?.is_some(),
            OfficeLocation::Municipality(id) => self.municipality(id).await?.is_some(),
            OfficeLocation::District(id) => self.district(id).await?.is_some(),
            OfficeLocation::Province(id) => self.province(id).await?.is_some(),
        })
    }
}

fn broken(what: &str, id: i32) -> ServiceError {
    ServiceError::Integrity(format!("location chain references missing {what} {id}"))
}

/// Walk from the attachment point up to the province.
///
/// # Examples
/// ```
/// use service::office::domain::OfficeLocation;
/// use service::office::location::{mock::InMemoryLocationDirectory, resolve_chain};
/// let dir = InMemoryLocationDirectory::default()
///     .with_province(3, "Bagmati")
///     .with_district(27, 3, "Lalitpur")
///     .with_municipality(270, 27, "Godawari")
///     .with_ward(2701, 270, 9);
/// let chain = tokio_test::block_on(resolve_chain(&dir, OfficeLocation::Ward(2701))).unwrap();
/// assert_eq!(chain.display(), "Ward 9, Godawari, Lalitpur, Bagmati");
/// ```
pub async fn resolve_chain(dir: &dyn LocationDirectory, loc: OfficeLocation) -> Result<LocationChain, ServiceError> {
    let mut ward_number = None;
    let mut municipality_id = None;
    let mut district_id = None;
    let province_id;

    match loc {
        OfficeLocation::Ward(id) => {
            let w = dir.ward(id).await?.ok_or_else(|| broken("ward", id))?;
            ward_number = Some(w.number);
            municipality_id = Some(w.municipality_id);
        }
        OfficeLocation::Municipality(id) => municipality_id = Some(id),
        OfficeLocation::District(id) => district_id = Some(id),
        OfficeLocation::Province(_) => {}
    }

    let municipality = match municipality_id {
        Some(id) => {
            let m = dir.municipality(id).await?.ok_or_else(|| broken("municipality", id))?;
            district_id = Some(m.district_id);
            Some(NamedLocation { id: m.id, name: m.name, name_local: m.name_local })
        }
        None => None,
    };
    let district = match district_id {
        Some(id) => {
            let d = dir.district(id).await?.ok_or_else(|| broken("district", id))?;
            province_id = d.province_id;
            Some(NamedLocation { id: d.id, name: d.name, name_local: d.name_local })
        }
        None => {
            province_id = loc.id();
            None
        }
    };
    let p = dir.province(province_id).await?.ok_or_else(|| broken("province", province_id))?;

    Ok(LocationChain {
        ward_number,
        municipality,
        district,
        province: NamedLocation { id: p.id, name: p.name, name_local: p.name_local },
    })
}

/// Location lookups against the reference tables.
#[derive(Clone)]
pub struct SeaOrmLocationDirectory {
    db: DatabaseConnection,
}

impl SeaOrmLocationDirectory {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl LocationDirectory for SeaOrmLocationDirectory {
    async fn ward(&self, id: i32) -> Result<Option<ward::Model>, ServiceError> {
        Ok(ward::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn municipality(&self, id: i32) -> Result<Option<municipality::Model>, ServiceError> {
        Ok(municipality::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn district(&self, id: i32) -> Result<Option<district::Model>, ServiceError> {
        Ok(district::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn province(&self, id: i32) -> Result<Option<province::Model>, ServiceError> {
        Ok(province::Entity::find_by_id(id).one(&self.db).await?)
    }
}

/// In-memory location data for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryLocationDirectory {
        wards: Mutex<HashMap<i32, ward::Model>>,
        municipalities: Mutex<HashMap<i32, municipality::Model>>,
        districts: Mutex<HashMap<i32, district::Model>>,
        provinces: Mutex<HashMap<i32, province::Model>>,
    }

    impl InMemoryLocationDirectory {
        pub fn with_province(self, id: i32, name: &str) -> Self {
            self.provinces.lock().unwrap().insert(id, province::Model { id, name: name.into(), name_local: None });
            self
        }

        pub fn with_district(self, id: i32, province_id: i32, name: &str) -> Self {
            self.districts.lock().unwrap().insert(id, district::Model { id, province_id, name: name.into(), name_local: None });
            self
        }

        pub fn with_municipality(self, id: i32, district_id: i32, name: &str) -> Self {
            self.municipalities
                .lock()
                .unwrap()
                .insert(id, municipality::Model { id, district_id, name: name.into(), name_local: None });
            self
        }

        pub fn with_ward(self, id: i32, municipality_id: i32, number: i32) -> Self {
            self.wards.lock().unwrap().insert(id, ward::Model { id, municipality_id, number });
            self
        }
    }

    #[async_trait]
    impl LocationDirectory for InMemoryLocationDirectory {
        async fn ward(&self, id: i32) -> Result<Option<ward::Model>, ServiceError> {
            Ok(self.wards.lock().unwrap().get(&id).cloned())
        }

        async fn municipality(&self, id: i32) -> Result<Option<municipality::Model>, ServiceError> {
            Ok(self.municipalities.lock().unwrap().get(&id).cloned())
        }

        async fn district(&self, id: i32) -> Result<Option<district::Model>, ServiceError> {
            Ok(self.districts.lock().unwrap().get(&id).cloned())
        }

        async fn province(&self, id: i32) -> Result<Option<province::Model>, ServiceError> {
            Ok(self.provinces.lock().unwrap().get(&id).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::InMemoryLocationDirectory;
    use super::*;

    fn directory() -> InMemoryLocationDirectory {
        InMemoryLocationDirectory::default()
            .with_province(3, "Bagmati")
            .with_district(27, 3, "Lalitpur")
            .with_municipality(270, 27, "Godawari")
            .with_ward(2701, 270, 9)
    }

    #[tokio::test]
    async fn resolves_full_chain_from_ward() {
        let chain = resolve_chain(&directory(), OfficeLocation::Ward(2701)).await.unwrap();
        assert_eq!(chain.display(), "Ward 9, Godawari, Lalitpur, Bagmati");
    }

    #[tokio::test]
    async fn resolves_partial_chain_from_district() {
        let chain = resolve_chain(&directory(), OfficeLocation::District(27)).await.unwrap();
        assert!(chain.municipality.is_none());
        assert_eq!(chain.province.name, "Bagmati");
    }

    #[tokio::test]
    async fn dangling_reference_is_integrity_error() {
        let dir = InMemoryLocationDirectory::default().with_ward(1, 99, 1);
        let err = resolve_chain(&dir, OfficeLocation::Ward(1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Integrity(_)));
        assert!(!dir.exists(OfficeLocation::Province(5)).await.unwrap());
    }
}

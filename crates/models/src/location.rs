//! Read-only location reference data: province > district > municipality > ward.
//!
//! Rows are seeded outside this workspace; ids are the reference data's own integers.

pub mod province {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "province")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub name: String,
        pub name_local: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter)]
    pub enum Relation {}

    impl RelationTrait for Relation {
        fn def(&self) -> RelationDef { panic!("no relations defined here") }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod district {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "district")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub province_id: i32,
        pub name: String,
        pub name_local: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter)]
    pub enum Relation { Province }

    impl RelationTrait for Relation {
        fn def(&self) -> RelationDef {
            match self {
                Relation::Province => Entity::belongs_to(super::province::Entity)
                    .from(Column::ProvinceId)
                    .to(super::province::Column::Id)
                    .into(),
            }
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod municipality {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "municipality")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub district_id: i32,
        pub name: String,
        pub name_local: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter)]
    pub enum Relation { District }

    impl RelationTrait for Relation {
        fn def(&self) -> RelationDef {
            match self {
                Relation::District => Entity::belongs_to(super::district::Entity)
                    .from(Column::DistrictId)
                    .to(super::district::Column::Id)
                    .into(),
            }
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod ward {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "ward")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub municipality_id: i32,
        pub number: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter)]
    pub enum Relation { Municipality }

    impl RelationTrait for Relation {
        fn def(&self) -> RelationDef {
            match self {
                Relation::Municipality => Entity::belongs_to(super::municipality::Entity)
                    .from(Column::MunicipalityId)
                    .to(super::municipality::Column::Id)
                    .into(),
            }
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

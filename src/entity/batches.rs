//! 批次实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::users::Entity")]
    Users,
    #[sea_orm(has_many = "super::assignments::Entity")]
    Assignments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_batch(self) -> crate::models::users::entities::Batch {
        use crate::models::users::entities::Batch;
        use chrono::{DateTime, Utc};

        Batch {
            id: self.id,
            name: self.name,
            start_date: self
                .start_date
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            end_date: self
                .end_date
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            is_active: self.is_active,
        }
    }
}

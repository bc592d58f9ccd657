//! 任务实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub subject: String,
    pub activation_date: Option<i64>,
    pub deadline: Option<i64>,
    pub status: String,
    pub batch_id: Option<i64>,
    pub template_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::batches::Entity",
        from = "Column::BatchId",
        to = "super::batches::Column::Id"
    )]
    Batch,
    #[sea_orm(
        belongs_to = "super::paper_templates::Entity",
        from = "Column::TemplateId",
        to = "super::paper_templates::Column::Id"
    )]
    Template,
}

impl Related<super::batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl Related<super::paper_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_assignment(self) -> crate::models::assignments::entities::Assignment {
        use crate::models::assignments::entities::{Assignment, AssignmentStatus};
        use chrono::{DateTime, Utc};

        Assignment {
            id: self.id,
            title: self.title,
            subject: self.subject,
            activation_date: self
                .activation_date
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            deadline: self
                .deadline
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            status: self
                .status
                .parse::<AssignmentStatus>()
                .unwrap_or(AssignmentStatus::Draft),
            batch_id: self.batch_id,
            template_id: self.template_id,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}

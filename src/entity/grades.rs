//! 指导老师评分实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub paper_id: i64,
    pub advisor_id: i64,
    pub content_score: f64,
    pub structure_score: f64,
    pub language_score: f64,
    pub format_score: f64,
    pub final_score: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub advisor_feedback: Option<String>,
    pub graded_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::papers::Entity",
        from = "Column::PaperId",
        to = "super::papers::Column::Id"
    )]
    Paper,
}

impl Related<super::papers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Paper.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_grade(self) -> crate::models::grades::entities::Grade {
        use crate::models::grades::entities::{Grade, RubricScores};
        use chrono::{DateTime, Utc};

        Grade {
            id: self.id,
            paper_id: self.paper_id,
            advisor_id: self.advisor_id,
            scores: RubricScores {
                content: self.content_score,
                structure: self.structure_score,
                language: self.language_score,
                format: self.format_score,
            },
            final_score: self.final_score,
            advisor_feedback: self.advisor_feedback,
            graded_at: DateTime::<Utc>::from_timestamp(self.graded_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}

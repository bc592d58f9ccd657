//! 考官评分实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "examiner_grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub paper_id: i64,
    pub examiner_id: i64,
    pub score: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
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
    pub fn into_examiner_grade(self) -> crate::models::grades::entities::ExaminerGrade {
        use crate::models::grades::entities::ExaminerGrade;
        use chrono::{DateTime, Utc};

        ExaminerGrade {
            id: self.id,
            paper_id: self.paper_id,
            examiner_id: self.examiner_id,
            score: self.score,
            feedback: self.feedback,
            graded_at: DateTime::<Utc>::from_timestamp(self.graded_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}

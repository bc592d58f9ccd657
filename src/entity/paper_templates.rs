//! 论文模板实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "paper_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    // JSON 数组，元素为 TemplateChapter
    #[sea_orm(column_type = "Text")]
    pub chapters: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub layout: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::assignments::Entity")]
    Assignments,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_template(self) -> crate::models::assignments::entities::PaperTemplate {
        use crate::models::assignments::entities::PaperTemplate;
        use chrono::{DateTime, Utc};

        PaperTemplate {
            id: self.id,
            name: self.name,
            chapters: serde_json::from_str(&self.chapters).unwrap_or_default(),
            layout: self.layout.and_then(|s| serde_json::from_str(&s).ok()),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}

//! 论文章节实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "paper_chapters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub paper_id: i64,
    pub chapter_index: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub status: String,
    // JSON 数组，元素为 FeedbackEntry
    #[sea_orm(column_type = "Text")]
    pub feedback_history: String,
    pub version: i64,
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
    pub fn into_chapter(self) -> crate::models::papers::entities::Chapter {
        use crate::models::papers::entities::{Chapter, ChapterStatus};
        use chrono::{DateTime, Utc};

        Chapter {
            index: self.chapter_index,
            title: self.title,
            content: self.content,
            status: self
                .status
                .parse::<ChapterStatus>()
                .unwrap_or(ChapterStatus::Draft),
            feedback_history: serde_json::from_str(&self.feedback_history).unwrap_or_default(),
            version: self.version,
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}

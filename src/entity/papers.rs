//! 论文实体
//!
//! 章节单独存放在 paper_chapters，每个章节有自己的版本号。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    // 不设外键，任务被删除后论文仍保留，由审计发现
    pub assignment_id: i64,
    pub title: String,
    pub subject: String,
    pub grade: Option<f64>,
    pub final_approval_status: String,
    pub final_file_name: Option<String>,
    pub final_file_url: Option<String>,
    pub final_file_size: Option<i64>,
    pub final_file_uploaded_at: Option<i64>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::paper_chapters::Entity")]
    Chapters,
    #[sea_orm(has_one = "super::grades::Entity")]
    Grade,
    #[sea_orm(has_many = "super::examiner_grades::Entity")]
    ExaminerGrades,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::paper_chapters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapters.def()
    }
}

impl Related<super::grades::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grade.def()
    }
}

impl Related<super::examiner_grades::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExaminerGrades.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 章节与派生字段由存储层补全
impl Model {
    pub fn into_paper(
        self,
        structure: Vec<crate::models::papers::entities::Chapter>,
    ) -> crate::models::papers::entities::Paper {
        use crate::models::papers::entities::{
            ContentApprovalStatus, FinalApprovalStatus, FinalFile, Paper,
        };
        use chrono::{DateTime, Utc};

        let final_file = match (self.final_file_name, self.final_file_url) {
            (Some(name), Some(url)) => Some(FinalFile {
                name,
                url,
                size: self.final_file_size.unwrap_or_default(),
                uploaded_at: self
                    .final_file_uploaded_at
                    .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
                    .unwrap_or_default(),
            }),
            _ => None,
        };

        Paper {
            id: self.id,
            student_id: self.student_id,
            assignment_id: self.assignment_id,
            title: self.title,
            subject: self.subject,
            content: String::new(),
            structure,
            grade: self.grade,
            content_approval_status: ContentApprovalStatus::Pending,
            final_approval_status: self
                .final_approval_status
                .parse::<FinalApprovalStatus>()
                .unwrap_or(FinalApprovalStatus::NotSubmitted),
            final_file,
            version: self.version,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}

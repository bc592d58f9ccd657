use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建批次表
        manager
            .create_table(
                Table::create()
                    .table(Batches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Batches::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Batches::Name).string().not_null())
                    .col(ColumnDef::new(Batches::StartDate).big_integer().null())
                    .col(ColumnDef::new(Batches::EndDate).big_integer().null())
                    .col(
                        ColumnDef::new(Batches::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::BatchId).big_integer().null())
                    .col(ColumnDef::new(Users::PembimbingId).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Users::Table, Users::BatchId)
                            .to(Batches::Table, Batches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考官分配表
        manager
            .create_table(
                Table::create()
                    .table(ExaminerAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExaminerAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExaminerAssignments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExaminerAssignments::ExaminerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExaminerAssignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExaminerAssignments::Table, ExaminerAssignments::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建论文模板表
        manager
            .create_table(
                Table::create()
                    .table(PaperTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaperTemplates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaperTemplates::Name).string().not_null())
                    .col(ColumnDef::new(PaperTemplates::Chapters).text().not_null())
                    .col(ColumnDef::new(PaperTemplates::Layout).text().null())
                    .col(
                        ColumnDef::new(PaperTemplates::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建任务表
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::Subject).string().not_null())
                    .col(
                        ColumnDef::new(Assignments::ActivationDate)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Assignments::Deadline).big_integer().null())
                    .col(ColumnDef::new(Assignments::Status).string().not_null())
                    .col(ColumnDef::new(Assignments::BatchId).big_integer().null())
                    .col(ColumnDef::new(Assignments::TemplateId).big_integer().null())
                    .col(
                        ColumnDef::new(Assignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::BatchId)
                            .to(Batches::Table, Batches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::TemplateId)
                            .to(PaperTemplates::Table, PaperTemplates::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建论文表（assignment_id 不设外键，悬空引用由审计发现）
        manager
            .create_table(
                Table::create()
                    .table(Papers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Papers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Papers::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Papers::AssignmentId).big_integer().not_null())
                    .col(ColumnDef::new(Papers::Title).string().not_null())
                    .col(ColumnDef::new(Papers::Subject).string().not_null())
                    .col(ColumnDef::new(Papers::Grade).double().null())
                    .col(
                        ColumnDef::new(Papers::FinalApprovalStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Papers::FinalFileName).string().null())
                    .col(ColumnDef::new(Papers::FinalFileUrl).string().null())
                    .col(ColumnDef::new(Papers::FinalFileSize).big_integer().null())
                    .col(
                        ColumnDef::new(Papers::FinalFileUploadedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Papers::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Papers::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Papers::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Papers::Table, Papers::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建章节表
        manager
            .create_table(
                Table::create()
                    .table(PaperChapters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaperChapters::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaperChapters::PaperId).big_integer().not_null())
                    .col(
                        ColumnDef::new(PaperChapters::ChapterIndex)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaperChapters::Title).string().not_null())
                    .col(ColumnDef::new(PaperChapters::Content).text().not_null())
                    .col(ColumnDef::new(PaperChapters::Status).string().not_null())
                    .col(
                        ColumnDef::new(PaperChapters::FeedbackHistory)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaperChapters::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PaperChapters::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PaperChapters::Table, PaperChapters::PaperId)
                            .to(Papers::Table, Papers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建指导老师评分表
        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Grades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Grades::PaperId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Grades::AdvisorId).big_integer().not_null())
                    .col(ColumnDef::new(Grades::ContentScore).double().not_null())
                    .col(ColumnDef::new(Grades::StructureScore).double().not_null())
                    .col(ColumnDef::new(Grades::LanguageScore).double().not_null())
                    .col(ColumnDef::new(Grades::FormatScore).double().not_null())
                    .col(ColumnDef::new(Grades::FinalScore).double().not_null())
                    .col(ColumnDef::new(Grades::AdvisorFeedback).text().null())
                    .col(ColumnDef::new(Grades::GradedAt).big_integer().not_null())
                    .col(ColumnDef::new(Grades::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Grades::Table, Grades::PaperId)
                            .to(Papers::Table, Papers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考官评分表
        manager
            .create_table(
                Table::create()
                    .table(ExaminerGrades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExaminerGrades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExaminerGrades::PaperId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExaminerGrades::ExaminerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExaminerGrades::Score).double().not_null())
                    .col(ColumnDef::new(ExaminerGrades::Feedback).text().null())
                    .col(
                        ColumnDef::new(ExaminerGrades::GradedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExaminerGrades::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExaminerGrades::Table, ExaminerGrades::PaperId)
                            .to(Papers::Table, Papers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建通知表
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Notifications::PaperId).big_integer().null())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        // 每个学员在每个任务下至多一篇论文
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_papers_assignment_student")
                    .table(Papers::Table)
                    .col(Papers::AssignmentId)
                    .col(Papers::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_papers_student_id")
                    .table(Papers::Table)
                    .col(Papers::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_paper_chapters_paper_index")
                    .table(PaperChapters::Table)
                    .col(PaperChapters::PaperId)
                    .col(PaperChapters::ChapterIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_examiner_grades_paper_examiner")
                    .table(ExaminerGrades::Table)
                    .col(ExaminerGrades::PaperId)
                    .col(ExaminerGrades::ExaminerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_examiner_assignments_pair")
                    .table(ExaminerAssignments::Table)
                    .col(ExaminerAssignments::StudentId)
                    .col(ExaminerAssignments::ExaminerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_batch_id")
                    .table(Users::Table)
                    .col(Users::BatchId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExaminerGrades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaperChapters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Papers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaperTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExaminerAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Batches::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Batches {
    #[sea_orm(iden = "batches")]
    Table,
    Id,
    Name,
    StartDate,
    EndDate,
    IsActive,
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Name,
    Role,
    BatchId,
    PembimbingId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ExaminerAssignments {
    #[sea_orm(iden = "examiner_assignments")]
    Table,
    Id,
    StudentId,
    ExaminerId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PaperTemplates {
    #[sea_orm(iden = "paper_templates")]
    Table,
    Id,
    Name,
    Chapters,
    Layout,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Assignments {
    #[sea_orm(iden = "assignments")]
    Table,
    Id,
    Title,
    Subject,
    ActivationDate,
    Deadline,
    Status,
    BatchId,
    TemplateId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Papers {
    #[sea_orm(iden = "papers")]
    Table,
    Id,
    StudentId,
    AssignmentId,
    Title,
    Subject,
    Grade,
    FinalApprovalStatus,
    FinalFileName,
    FinalFileUrl,
    FinalFileSize,
    FinalFileUploadedAt,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PaperChapters {
    #[sea_orm(iden = "paper_chapters")]
    Table,
    Id,
    PaperId,
    ChapterIndex,
    Title,
    Content,
    Status,
    FeedbackHistory,
    Version,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Grades {
    #[sea_orm(iden = "grades")]
    Table,
    Id,
    PaperId,
    AdvisorId,
    ContentScore,
    StructureScore,
    LanguageScore,
    FormatScore,
    FinalScore,
    AdvisorFeedback,
    GradedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExaminerGrades {
    #[sea_orm(iden = "examiner_grades")]
    Table,
    Id,
    PaperId,
    ExaminerId,
    Score,
    Feedback,
    GradedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    #[sea_orm(iden = "notifications")]
    Table,
    Id,
    UserId,
    PaperId,
    Kind,
    Message,
    IsRead,
    CreatedAt,
}

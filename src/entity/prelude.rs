//! 预导入模块，方便使用

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::batches::{ActiveModel as BatchActiveModel, Entity as Batches, Model as BatchModel};
pub use super::examiner_assignments::{
    ActiveModel as ExaminerAssignmentActiveModel, Entity as ExaminerAssignments,
    Model as ExaminerAssignmentModel,
};
pub use super::examiner_grades::{
    ActiveModel as ExaminerGradeActiveModel, Entity as ExaminerGrades, Model as ExaminerGradeModel,
};
pub use super::grades::{ActiveModel as GradeActiveModel, Entity as Grades, Model as GradeModel};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
pub use super::paper_chapters::{
    ActiveModel as PaperChapterActiveModel, Entity as PaperChapters, Model as PaperChapterModel,
};
pub use super::paper_templates::{
    ActiveModel as PaperTemplateActiveModel, Entity as PaperTemplates, Model as PaperTemplateModel,
};
pub use super::papers::{ActiveModel as PaperActiveModel, Entity as Papers, Model as PaperModel};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};

//! 论文生命周期与成绩汇总的纯逻辑
//!
//! 不依赖存储，服务层负责加载数据、调用这里的函数并写回。

pub mod approval;
pub mod capability;
pub mod chapter;
pub mod distribution;
pub mod grading;

pub use approval::{ChapterAction, content_approval_status};
pub use capability::{Operation, PaperRelation, authorize, authorize_global};
pub use grading::compute_final_score;

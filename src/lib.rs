//! SETUKPA - 学术论文写作流程核心
//!
//! 论文章节的起草、审阅与定稿流程，以及指导老师、考官评分的汇总。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `models`: 数据模型定义
//! - `notifications`: 工作流事件与通知分发
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层（带权限检查）
//! - `storage`: 数据存储层（SeaORM / 内存）
//! - `utils`: 工具函数
//! - `workflow`: 章节结构、审批状态机、成绩汇总与任务分发的纯逻辑

pub mod config;
pub mod entity;
pub mod errors;
pub mod models;
pub mod notifications;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;

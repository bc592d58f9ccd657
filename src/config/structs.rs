use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub grading: GradingConfig,
    pub workflow: WorkflowConfig,
    pub notifications: NotificationConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// 存储后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: String, // sea_orm | memory
}

/// 评分配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradingConfig {
    pub rubric: RubricConfig,
}

/// 评分细则各维度的满分
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RubricConfig {
    pub content_max: f64,
    pub structure_max: f64,
    pub language_max: f64,
    pub format_max: f64,
}

/// 论文流程配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowConfig {
    pub default_chapters: Vec<String>, // 没有模板时的默认章节
    pub final_document: FinalDocumentConfig,
}

/// 终稿文件限制
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalDocumentConfig {
    pub allowed_extensions: Vec<String>,
    pub max_size: i64, // 单文件最大字节数
}

/// 通知配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub enabled: bool,
}

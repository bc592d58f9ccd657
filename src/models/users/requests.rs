use super::entities::UserRole;
use serde::Deserialize;
use ts_rs::TS;

// 用户创建请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub name: String,
    pub role: UserRole,
    pub batch_id: Option<i64>,
    pub pembimbing_id: Option<i64>,
}

// 批次创建请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateBatchRequest {
    pub name: String,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
}

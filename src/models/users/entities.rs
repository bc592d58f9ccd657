use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    Siswa,      // 学员
    Pembimbing, // 指导老师
    Penguji,    // 考官
    Admin,      // 管理员
    SuperAdmin, // 超级管理员
    Helper,     // 助理（只读）
}

impl UserRole {
    pub const SISWA: &'static str = "SISWA";
    pub const PEMBIMBING: &'static str = "PEMBIMBING";
    pub const PENGUJI: &'static str = "PENGUJI";
    pub const ADMIN: &'static str = "ADMIN";
    pub const SUPER_ADMIN: &'static str = "SUPER_ADMIN";
    pub const HELPER: &'static str = "HELPER";

    pub fn admin_roles() -> &'static [UserRole] {
        &[UserRole::Admin, UserRole::SuperAdmin]
    }

    pub fn reviewer_roles() -> &'static [UserRole] {
        &[UserRole::Pembimbing, UserRole::Penguji]
    }

    pub fn is_admin(&self) -> bool {
        Self::admin_roles().contains(self)
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: SISWA, PEMBIMBING, PENGUJI, ADMIN, SUPER_ADMIN, HELPER"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserRole::Siswa => UserRole::SISWA,
            UserRole::Pembimbing => UserRole::PEMBIMBING,
            UserRole::Penguji => UserRole::PENGUJI,
            UserRole::Admin => UserRole::ADMIN,
            UserRole::SuperAdmin => UserRole::SUPER_ADMIN,
            UserRole::Helper => UserRole::HELPER,
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::SISWA => Ok(UserRole::Siswa),
            UserRole::PEMBIMBING => Ok(UserRole::Pembimbing),
            UserRole::PENGUJI => Ok(UserRole::Penguji),
            UserRole::ADMIN => Ok(UserRole::Admin),
            UserRole::SUPER_ADMIN => Ok(UserRole::SuperAdmin),
            UserRole::HELPER => Ok(UserRole::Helper),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub role: UserRole,
    // 所属批次（最多一个）
    pub batch_id: Option<i64>,
    // 指导老师 ID（仅学员）
    pub pembimbing_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 已认证的调用者，由外部认证层提供
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct Principal {
    pub user_id: i64,
    pub role: UserRole,
}

impl Principal {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

// 批次（Angkatan）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct Batch {
    pub id: i64,
    pub name: String,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_string() {
        for role in [
            UserRole::Siswa,
            UserRole::Pembimbing,
            UserRole::Penguji,
            UserRole::Admin,
            UserRole::SuperAdmin,
            UserRole::Helper,
        ] {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let err = serde_json::from_str::<UserRole>("\"DOSEN\"").unwrap_err();
        assert!(err.to_string().contains("DOSEN"));
        let role: UserRole = serde_json::from_str("\"SUPER_ADMIN\"").unwrap();
        assert_eq!(role, UserRole::SuperAdmin);
    }

    #[test]
    fn test_admin_roles() {
        assert!(UserRole::Admin.is_admin());
        assert!(UserRole::SuperAdmin.is_admin());
        assert!(!UserRole::Helper.is_admin());
    }
}

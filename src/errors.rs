//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 工作流相关的错误（状态迁移、版本冲突、评分越界等）与存储错误共用同一个枚举，
//! 调用方可以通过 `code()` 区分并决定是否重试。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_setukpa_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SetukpaError {
            $($variant(String),)*
        }

        impl SetukpaError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(SetukpaError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(SetukpaError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(SetukpaError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl SetukpaError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        SetukpaError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_setukpa_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    StoragePluginNotFound("E004", "Storage Plugin Not Found"),
    Serialization("E005", "Serialization Error"),
    Configuration("E006", "Configuration Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Conflict("E009", "Resource Conflict"),
    OutOfRange("E010", "Index Out Of Range"),
    InvalidTransition("E011", "Invalid Transition"),
    IncompleteContent("E012", "Incomplete Content"),
    ScoreRange("E013", "Score Out Of Range"),
    StaleWrite("E014", "Stale Write"),
    DanglingReference("E015", "Dangling Reference"),
    PermissionDenied("E016", "Permission Denied"),
    NotificationDelivery("E017", "Notification Delivery Error"),
}

impl SetukpaError {
    /// 调用方重新读取后可以重试的错误（仅乐观锁冲突）
    pub fn is_retryable(&self) -> bool {
        matches!(self, SetukpaError::StaleWrite(_))
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SetukpaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SetukpaError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SetukpaError {
    fn from(err: sea_orm::DbErr) -> Self {
        SetukpaError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SetukpaError {
    fn from(err: serde_json::Error) -> Self {
        SetukpaError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SetukpaError {
    fn from(err: config::ConfigError) -> Self {
        SetukpaError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SetukpaError>;

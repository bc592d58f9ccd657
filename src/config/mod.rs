//! 配置管理
//!
//! 默认值 -> config.toml -> config.{APP_ENV}.toml -> SETUKPA__* 环境变量，后者覆盖前者。

mod r#impl;
mod structs;

pub use structs::*;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::FinalDocumentConfig;

// 文件名不能包含路径分隔符，必须带扩展名
static FILE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^/\\\x00]+\.([A-Za-z0-9]{1,8})$").expect("Invalid file name regex")
});

/// 终稿文件校验结果
#[derive(Debug, Clone)]
pub struct FileValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl FileValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 校验终稿文件名、扩展名和大小
pub fn validate_final_file(
    name: &str,
    size: i64,
    policy: &FinalDocumentConfig,
) -> FileValidationResult {
    let mut errors = Vec::new();

    match FILE_NAME_RE.captures(name.trim()) {
        Some(caps) => {
            let ext = caps[1].to_ascii_lowercase();
            if !policy
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
            {
                errors.push(format!(
                    "不支持的文件类型 .{ext}，允许: {}",
                    policy.allowed_extensions.join(", ")
                ));
            }
        }
        None => errors.push(format!("文件名无效: {name}")),
    }

    if size <= 0 {
        errors.push("文件为空".to_string());
    } else if size > policy.max_size {
        errors.push(format!(
            "文件大小 {size} 字节超过上限 {} 字节",
            policy.max_size
        ));
    }

    FileValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

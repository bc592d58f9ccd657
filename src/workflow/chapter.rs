//! 章节结构模型
//!
//! 论文的章节按 (paper_id, index) 独立存储，每条记录有自己的版本号，
//! 因此对一个章节的写入不会覆盖其它章节。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, SetukpaError};
use crate::models::assignments::entities::PaperTemplate;
use crate::models::papers::entities::{Chapter, ChapterStatus};

/// 没有模板、且配置也为空时使用的章节骨架
pub const FALLBACK_CHAPTER_TITLES: [&str; 2] = ["BAB I PENDAHULUAN", "BAB II PEMBAHASAN"];

static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("Invalid html tag regex"));

static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Invalid blank line regex"));

fn blank_chapter(index: usize, title: &str, now: chrono::DateTime<chrono::Utc>) -> Chapter {
    Chapter {
        index: index as i32,
        title: title.trim().to_string(),
        content: String::new(),
        status: ChapterStatus::Draft,
        feedback_history: Vec::new(),
        version: 0,
        updated_at: now,
    }
}

/// 根据模板生成初始章节结构
///
/// 模板缺失或模板中没有章节时使用 `default_titles`，两者都为空时退回内置骨架。
/// 生成的章节全部处于 DRAFT，内容和审阅记录为空。
pub fn initialize_structure(
    template: Option<&PaperTemplate>,
    default_titles: &[String],
) -> Vec<Chapter> {
    let now = chrono::Utc::now();

    let from_template: Vec<&str> = template
        .map(|t| t.chapters.iter().map(|c| c.title.as_str()).collect())
        .unwrap_or_default();

    let titles: Vec<&str> = if !from_template.is_empty() {
        from_template
    } else if !default_titles.is_empty() {
        default_titles.iter().map(String::as_str).collect()
    } else {
        FALLBACK_CHAPTER_TITLES.to_vec()
    };

    titles
        .into_iter()
        .enumerate()
        .map(|(i, title)| blank_chapter(i, title, now))
        .collect()
}

/// 按索引取章节，索引无效时返回 OutOfRange
pub fn chapter_at(structure: &[Chapter], index: i32) -> Result<&Chapter> {
    usize::try_from(index)
        .ok()
        .and_then(|i| structure.get(i))
        .ok_or_else(|| {
            SetukpaError::out_of_range(format!(
                "章节索引 {index} 超出范围（共 {} 章）",
                structure.len()
            ))
        })
}

/// 章节当前状态下是否允许学员编辑
pub fn is_editable(status: ChapterStatus) -> bool {
    matches!(status, ChapterStatus::Draft | ChapterStatus::Revision)
}

/// 替换章节内容，不改变状态（编辑不会自动提交）
///
/// 返回修改后的章节副本，版本号由存储层在写入成功后递增。
pub fn update_chapter_content(
    structure: &[Chapter],
    index: i32,
    content: impl Into<String>,
) -> Result<Chapter> {
    let current = chapter_at(structure, index)?;
    if !is_editable(current.status) {
        return Err(SetukpaError::invalid_transition(format!(
            "章节「{}」状态为 {}，不能编辑",
            current.title, current.status
        )));
    }

    let mut updated = current.clone();
    updated.content = content.into();
    updated.updated_at = chrono::Utc::now();
    Ok(updated)
}

/// 拼接旧版扁平文本：标题 + 去掉标签的正文
pub fn flatten_content(structure: &[Chapter]) -> String {
    let blocks: Vec<String> = structure
        .iter()
        .map(|chapter| {
            let body = HTML_TAG_RE.replace_all(&chapter.content, "");
            let body = body.trim();
            if body.is_empty() {
                chapter.title.clone()
            } else {
                format!("{}\n\n{}", chapter.title, body)
            }
        })
        .collect();

    BLANK_LINES_RE
        .replace_all(&blocks.join("\n\n"), "\n\n")
        .into_owned()
}

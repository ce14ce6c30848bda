// ==========================================
// 学校教务排课核心 - 领域层校验错误
// ==========================================
// 工具: thiserror 派生宏
// 用途: 值类型构造期校验失败
// ==========================================

use thiserror::Error;

/// 领域值类型构造校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("字段不能为空: {0}")]
    EmptyField(String),

    #[error("无效的时间区间: from={from} to={to}（要求 from < to）")]
    InvalidTimeRange { from: String, to: String },

    #[error("无效的日期区间: from={from} to={to}（要求 from <= to）")]
    InvalidDateRange { from: String, to: String },

    #[error("缺少作息时间: {0} 非休息日必须配置起止时间")]
    MissingTiming(String),

    #[error("无效的隔周编号: {0}（ISO 周序号范围 1-53）")]
    InvalidWeekTag(u32),

    #[error("隔周上课日必须至少指定一个周序号: {0}")]
    EmptyAlternateWeeks(String),

    #[error("字段值无法识别 (field={field}): {value}")]
    UnknownValue { field: String, value: String },

    #[error("时间格式错误 (field={field}): 期望 HH:MM，实际 {value}")]
    TimeFormat { field: String, value: String },

    #[error("日期格式错误 (field={field}): 期望 YYYY-MM-DD，实际 {value}")]
    DateFormat { field: String, value: String },
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

/// 非空字段校验（去除首尾空白后）
pub(crate) fn require_non_empty(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyField(field.to_string()));
    }
    Ok(trimmed.to_string())
}

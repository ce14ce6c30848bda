// ==========================================
// 学校教务排课核心 - 输入校验
// ==========================================
// 职责: API 入口的参数校验（空白标识、时间/日期格式）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::time_window::{parse_date, TimeWindow};
use chrono::NaiveDate;

/// 非空校验，返回去除首尾空白的值
pub fn require_non_blank<'a>(label: &str, value: &'a str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", label)));
    }
    Ok(trimmed)
}

/// 解析 "HH:MM" 时间段
pub fn parse_window(from: &str, to: &str) -> ApiResult<TimeWindow> {
    TimeWindow::parse(from, to).map_err(|e| ApiError::InvalidInput(e.to_string()))
}

/// 解析 "YYYY-MM-DD"
pub fn parse_input_date(field: &str, raw: &str) -> ApiResult<NaiveDate> {
    parse_date(field, raw).map_err(|e| ApiError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_blank() {
        assert_eq!(require_non_blank("教师ID", "  T1 ").unwrap(), "T1");
        let err = require_non_blank("教师ID", "   ").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref m) if m == "教师ID不能为空"));
    }

    #[test]
    fn test_parse_window_rejects_inverted_range() {
        assert!(parse_window("09:00", "09:45").is_ok());
        assert!(matches!(parse_window("10:00", "09:00"), Err(ApiError::InvalidInput(_))));
        assert!(matches!(parse_input_date("date", "2025/01/06"), Err(ApiError::InvalidInput(_))));
    }
}

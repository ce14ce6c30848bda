// ==========================================
// 学校教务排课核心 - 时间窗口
// ==========================================
// 半开区间 [from, to)：包含起点，不含终点
// 重叠判定: [a,b) 与 [c,d) 重叠 当且仅当 a < d 且 c < b
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 数据库/CSV 中的时间格式
pub const TIME_FORMAT: &str = "%H:%M";
/// 数据库/CSV 中的日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 一天内的时间窗口 [from, to)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeWindowRecord")]
pub struct TimeWindow {
    from: NaiveTime,
    to: NaiveTime,
}

impl TimeWindow {
    /// 构造时间窗口，要求 from < to
    pub fn new(from: NaiveTime, to: NaiveTime) -> DomainResult<Self> {
        if from >= to {
            return Err(DomainError::InvalidTimeRange {
                from: format_time(from),
                to: format_time(to),
            });
        }
        Ok(Self { from, to })
    }

    /// 从 "HH:MM" 字符串构造
    pub fn parse(from: &str, to: &str) -> DomainResult<Self> {
        Self::new(parse_time("timing_from", from)?, parse_time("timing_to", to)?)
    }

    pub fn from(&self) -> NaiveTime {
        self.from
    }

    pub fn to(&self) -> NaiveTime {
        self.to
    }

    /// 时长（分钟）
    pub fn duration_minutes(&self) -> i64 {
        (self.to - self.from).num_minutes()
    }

    /// 两窗口是否重叠
    #[inline]
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.from < other.to && other.from < self.to
    }

    /// other 是否完全落在本窗口内
    #[inline]
    pub fn contains_window(&self, other: &TimeWindow) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// 将结束时间截断到 cutoff；截断后为空则返回 None
    pub fn truncate_to(&self, cutoff: NaiveTime) -> Option<TimeWindow> {
        let to = self.to.min(cutoff);
        TimeWindow::new(self.from, to).ok()
    }
}

#[derive(Deserialize)]
struct TimeWindowRecord {
    from: NaiveTime,
    to: NaiveTime,
}

impl TryFrom<TimeWindowRecord> for TimeWindow {
    type Error = DomainError;

    fn try_from(raw: TimeWindowRecord) -> DomainResult<Self> {
        Self::new(raw.from, raw.to)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_time(self.from), format_time(self.to))
    }
}

/// 解析 "HH:MM"（兼容 "HH:MM:SS"）
pub fn parse_time(field: &str, raw: &str) -> DomainResult<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| DomainError::TimeFormat {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// 解析 "YYYY-MM-DD"
pub fn parse_date(field: &str, raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| DomainError::DateFormat {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(from: &str, to: &str) -> TimeWindow {
        TimeWindow::parse(from, to).unwrap()
    }

    #[test]
    fn test_invalid_range_rejected() {
        assert!(TimeWindow::parse("10:00", "10:00").is_err());
        assert!(TimeWindow::parse("11:00", "10:00").is_err());
        assert!(TimeWindow::parse("9am", "10:00").is_err());
    }

    #[test]
    fn test_overlap_half_open() {
        // 首尾相接不算重叠
        assert!(!w("09:00", "09:45").overlaps(&w("09:45", "10:30")));
        assert!(w("09:00", "09:45").overlaps(&w("09:30", "10:15")));
        assert!(w("09:30", "10:15").overlaps(&w("09:00", "09:45")));
        assert!(w("09:00", "15:00").overlaps(&w("10:00", "10:10")));
    }

    #[test]
    fn test_contains_window() {
        let day = w("09:00", "15:00");
        assert!(day.contains_window(&w("09:00", "09:45")));
        assert!(day.contains_window(&w("14:15", "15:00")));
        assert!(!day.contains_window(&w("08:45", "09:30")));
        assert!(!day.contains_window(&w("14:30", "15:15")));
    }

    #[test]
    fn test_truncate_to_cutoff() {
        let day = w("09:00", "15:00");
        let noon = parse_time("cutoff", "12:00").unwrap();
        assert_eq!(day.truncate_to(noon), Some(w("09:00", "12:00")));

        let early = parse_time("cutoff", "08:00").unwrap();
        assert_eq!(day.truncate_to(early), None);
    }

    #[test]
    fn test_duration_and_display() {
        let slot = w("09:00", "09:45");
        assert_eq!(slot.duration_minutes(), 45);
        assert_eq!(slot.to_string(), "09:00-09:45");
    }

    #[test]
    fn test_deserialize_rejects_inverted_window() {
        let ok: TimeWindow = serde_json::from_str(r#"{"from":"09:00:00","to":"09:45:00"}"#).unwrap();
        assert_eq!(ok, w("09:00", "09:45"));

        assert!(serde_json::from_str::<TimeWindow>(r#"{"from":"10:00:00","to":"09:00:00"}"#).is_err());
        assert!(serde_json::from_str::<TimeWindow>(r#"{"from":"10:00:00","to":"10:00:00"}"#).is_err());
    }
}

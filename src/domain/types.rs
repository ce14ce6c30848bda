// ==========================================
// 学校教务排课核心 - 领域类型定义
// ==========================================
// 职责: 星期、日类型、节次类型、记录状态等枚举
// 约定: to_db_str / from_db_str 与数据库存储格式一致
// ==========================================

use crate::domain::error::DomainError;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 星期 (Day Of Week)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// 解析星期（大小写不敏感，兼容三字母缩写）
    pub fn from_db_str(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_ascii_lowercase();
        let day = match normalized.as_str() {
            "monday" | "mon" => DayOfWeek::Monday,
            "tuesday" | "tue" => DayOfWeek::Tuesday,
            "wednesday" | "wed" => DayOfWeek::Wednesday,
            "thursday" | "thu" => DayOfWeek::Thursday,
            "friday" | "fri" => DayOfWeek::Friday,
            "saturday" | "sat" => DayOfWeek::Saturday,
            "sunday" | "sun" => DayOfWeek::Sunday,
            _ => {
                return Err(DomainError::UnknownValue {
                    field: "day_of_week".to_string(),
                    value: raw.to_string(),
                })
            }
        };
        Ok(day)
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 工作日类型 (Working Day Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayType {
    FullDay,       // 全天
    HalfDay,       // 半天
    Holiday,       // 休息日
    AlternateWeek, // 隔周上课
}

impl DayType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DayType::FullDay => "FullDay",
            DayType::HalfDay => "HalfDay",
            DayType::Holiday => "Holiday",
            DayType::AlternateWeek => "AlternateWeek",
        }
    }

    pub fn from_db_str(raw: &str) -> Result<Self, DomainError> {
        match raw.trim() {
            "FullDay" => Ok(DayType::FullDay),
            "HalfDay" => Ok(DayType::HalfDay),
            "Holiday" => Ok(DayType::Holiday),
            "AlternateWeek" => Ok(DayType::AlternateWeek),
            other => Err(DomainError::UnknownValue {
                field: "day_type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 节假日类型 (Holiday Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayType {
    FullDay, // 全天放假
    HalfDay, // 半天放假
}

impl HolidayType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            HolidayType::FullDay => "full_day",
            HolidayType::HalfDay => "half_day",
        }
    }

    pub fn from_db_str(raw: &str) -> Result<Self, DomainError> {
        match raw.trim() {
            "full_day" => Ok(HolidayType::FullDay),
            "half_day" => Ok(HolidayType::HalfDay),
            other => Err(DomainError::UnknownValue {
                field: "holiday_type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// ==========================================
// 节次类型 (Slot Type)
// ==========================================
// Period 与 Break 共用同一条时间轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotType {
    Period, // 上课节次
    Break,  // 课间/午休
}

impl SlotType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SlotType::Period => "Period",
            SlotType::Break => "Break",
        }
    }

    pub fn from_db_str(raw: &str) -> Result<Self, DomainError> {
        match raw.trim() {
            "Period" | "period" => Ok(SlotType::Period),
            "Break" | "break" => Ok(SlotType::Break),
            other => Err(DomainError::UnknownValue {
                field: "slot_type".to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// 节次名前缀（仅用于建议名称）
    pub fn name_prefix(&self) -> &'static str {
        self.to_db_str()
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 记录状态 (Record Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }

    pub fn from_db_str(raw: &str) -> Result<Self, DomainError> {
        match raw.trim() {
            "active" => Ok(RecordStatus::Active),
            "inactive" => Ok(RecordStatus::Inactive),
            other => Err(DomainError::UnknownValue {
                field: "status".to_string(),
                value: other.to_string(),
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RecordStatus::Active)
    }
}

// ==========================================
// 日期判定结果 (Day Class)
// ==========================================
// CalendarDayModel::classify 的输出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayClass {
    FullDay,
    HalfDay,
    Holiday,
    Unscheduled, // 未配置 / 非本周隔周日
}

impl DayClass {
    /// 当天是否有课
    pub fn has_classes(&self) -> bool {
        matches!(self, DayClass::FullDay | DayClass::HalfDay)
    }
}

impl fmt::Display for DayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayClass::FullDay => write!(f, "FULL_DAY"),
            DayClass::HalfDay => write!(f, "HALF_DAY"),
            DayClass::Holiday => write!(f, "HOLIDAY"),
            DayClass::Unscheduled => write!(f, "UNSCHEDULED"),
        }
    }
}

// ==========================================
// 学校教务排课核心 - 校历领域模型
// ==========================================
// 对齐: working_day / public_holiday 表
// ==========================================

use crate::domain::error::{require_non_empty, DomainError, DomainResult};
use crate::domain::time_window::{format_date, TimeWindow};
use crate::domain::types::{DayOfWeek, DayType, HolidayType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// ISO 周序号上限
pub const MAX_ISO_WEEK: u32 = 53;

// ==========================================
// WorkingDay - 工作日定义
// ==========================================
// 每个星期至多一条 (day_of_week 唯一)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WorkingDayRecord")]
pub struct WorkingDay {
    day_of_week: DayOfWeek,
    day_type: DayType,
    alternate_weeks: BTreeSet<u32>, // 仅 AlternateWeek 有意义，ISO 周序号
    timing: Option<TimeWindow>,     // Holiday 时为 None
}

impl WorkingDay {
    /// 创建工作日定义
    ///
    /// # 校验
    /// - 非 Holiday 必须有 timing
    /// - AlternateWeek 必须至少一个周序号，且序号在 1..=53
    /// - 非 AlternateWeek 时丢弃 alternate_weeks
    /// - Holiday 时丢弃 timing
    pub fn new(
        day_of_week: DayOfWeek,
        day_type: DayType,
        alternate_weeks: impl IntoIterator<Item = u32>,
        timing: Option<TimeWindow>,
    ) -> DomainResult<Self> {
        let timing = match day_type {
            DayType::Holiday => None,
            _ => Some(timing.ok_or_else(|| DomainError::MissingTiming(day_of_week.to_string()))?),
        };

        let alternate_weeks: BTreeSet<u32> = match day_type {
            DayType::AlternateWeek => {
                let weeks: BTreeSet<u32> = alternate_weeks.into_iter().collect();
                if let Some(bad) = weeks.iter().find(|w| **w == 0 || **w > MAX_ISO_WEEK) {
                    return Err(DomainError::InvalidWeekTag(*bad));
                }
                if weeks.is_empty() {
                    return Err(DomainError::EmptyAlternateWeeks(day_of_week.to_string()));
                }
                weeks
            }
            _ => BTreeSet::new(),
        };

        Ok(Self {
            day_of_week,
            day_type,
            alternate_weeks,
            timing,
        })
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    pub fn day_type(&self) -> DayType {
        self.day_type
    }

    pub fn alternate_weeks(&self) -> &BTreeSet<u32> {
        &self.alternate_weeks
    }

    /// 作息窗口（Holiday 为 None）
    pub fn timing(&self) -> Option<TimeWindow> {
        self.timing
    }

    pub fn is_holiday(&self) -> bool {
        self.day_type == DayType::Holiday
    }
}

// ==========================================
// PublicHoliday - 法定/校定假日
// ==========================================
// 日期区间为闭区间 [from_date, to_date]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicHolidayRecord")]
pub struct PublicHoliday {
    holiday_id: String,
    year: i32,
    description: String,
    holiday_type: HolidayType,
    from_date: NaiveDate,
    to_date: NaiveDate,
}

impl PublicHoliday {
    pub fn new(
        holiday_id: String,
        year: i32,
        description: &str,
        holiday_type: HolidayType,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> DomainResult<Self> {
        let description = require_non_empty("description", description)?;
        if from_date > to_date {
            return Err(DomainError::InvalidDateRange {
                from: format_date(from_date),
                to: format_date(to_date),
            });
        }
        Ok(Self {
            holiday_id,
            year,
            description,
            holiday_type,
            from_date,
            to_date,
        })
    }

    /// 生成新 ID 的便捷构造
    pub fn create(
        year: i32,
        description: &str,
        holiday_type: HolidayType,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> DomainResult<Self> {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            year,
            description,
            holiday_type,
            from_date,
            to_date,
        )
    }

    pub fn holiday_id(&self) -> &str {
        &self.holiday_id
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn holiday_type(&self) -> HolidayType {
        self.holiday_type
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from_date
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to_date
    }

    /// 日期是否落在假日区间内（闭区间）
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from_date <= date && date <= self.to_date
    }
}

// ==========================================
// 反序列化入口，统一经构造函数校验
// ==========================================

#[derive(Deserialize)]
struct WorkingDayRecord {
    day_of_week: DayOfWeek,
    day_type: DayType,
    #[serde(default)]
    alternate_weeks: BTreeSet<u32>,
    timing: Option<TimeWindow>,
}

impl TryFrom<WorkingDayRecord> for WorkingDay {
    type Error = DomainError;

    fn try_from(raw: WorkingDayRecord) -> DomainResult<Self> {
        Self::new(raw.day_of_week, raw.day_type, raw.alternate_weeks, raw.timing)
    }
}

#[derive(Deserialize)]
struct PublicHolidayRecord {
    holiday_id: String,
    year: i32,
    description: String,
    holiday_type: HolidayType,
    from_date: NaiveDate,
    to_date: NaiveDate,
}

impl TryFrom<PublicHolidayRecord> for PublicHoliday {
    type Error = DomainError;

    fn try_from(raw: PublicHolidayRecord) -> DomainResult<Self> {
        Self::new(
            raw.holiday_id,
            raw.year,
            &raw.description,
            raw.holiday_type,
            raw.from_date,
            raw.to_date,
        )
    }
}

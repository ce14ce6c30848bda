// ==========================================
// 学校教务排课核心 - CalendarDayModel 纯函数库
// ==========================================
// 职责: 按工作日定义与假日区间判定某日类型、有效作息窗口、当日有效节次
// 红线: 无状态、无副作用、无 I/O 操作，可并发调用
// 策略:
// - 隔周编号采用 ISO 周序号 (1-53)
// - 半天假日: 作息窗口截断到 half_day_cutoff，跨越截止时间的节次当天取消（不截断）
// - 截止时间不晚于作息开始时，半天假日当天按 Holiday 处理
// ==========================================

use crate::domain::calendar::{PublicHoliday, WorkingDay};
use crate::domain::schedule::ScheduleSlot;
use crate::domain::time_window::TimeWindow;
use crate::domain::types::{DayClass, DayOfWeek, DayType, HolidayType};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// DayPlan - 某日的有效作息
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub day_class: DayClass,
    pub window: Option<TimeWindow>,
    pub slots: Vec<ScheduleSlot>,     // 当日有效节次
    pub cancelled: Vec<ScheduleSlot>, // 当日取消的节次
}

// ==========================================
// CalendarDayModel - 纯函数工具类
// ==========================================
pub struct CalendarDayModel;

impl CalendarDayModel {
    /// 日期的隔周编号（ISO 周序号）
    ///
    /// # 示例
    /// ```
    /// use chrono::NaiveDate;
    /// use school_timetable::engine::CalendarDayModel;
    /// // 2024-12-30 属于 2025 年第 1 周
    /// let d = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
    /// assert_eq!(CalendarDayModel::iso_week_tag(d), 1);
    /// ```
    pub fn iso_week_tag(date: NaiveDate) -> u32 {
        date.iso_week().week()
    }

    /// 判定日期类型
    ///
    /// # 规则
    /// 1. 全天假日覆盖 → Holiday
    /// 2. 工作日定义缺失 → Unscheduled
    /// 3. AlternateWeek: ISO 周序号命中 → FullDay，否则 Unscheduled
    /// 4. 其余按工作日定义的类型
    /// 5. 半天假日覆盖且当日本应上课 → HalfDay；截断后无剩余窗口 → Holiday
    ///
    /// # 参数
    /// - working_day: 该星期的工作日定义（星期不匹配时视为缺失）
    /// - holidays: 假日集合（可包含不覆盖该日的记录）
    /// - half_day_cutoff: 半天假日的截止时间
    pub fn classify(
        date: NaiveDate,
        working_day: Option<&WorkingDay>,
        holidays: &[PublicHoliday],
        half_day_cutoff: NaiveTime,
    ) -> DayClass {
        if Self::covering(date, holidays, HolidayType::FullDay) {
            return DayClass::Holiday;
        }

        let base = Self::classify_regular(date, working_day);

        if base.has_classes() && Self::covering(date, holidays, HolidayType::HalfDay) {
            let remaining = Self::matching(date, working_day)
                .and_then(|wd| wd.timing())
                .and_then(|timing| timing.truncate_to(half_day_cutoff));
            return match remaining {
                Some(_) => DayClass::HalfDay,
                None => DayClass::Holiday,
            };
        }
        base
    }

    /// 当日有效作息窗口（无课返回 None）
    pub fn working_window(
        date: NaiveDate,
        working_day: Option<&WorkingDay>,
        holidays: &[PublicHoliday],
        half_day_cutoff: NaiveTime,
    ) -> Option<TimeWindow> {
        let working_day = Self::matching(date, working_day)?;
        let timing = working_day.timing()?;

        match Self::classify(date, Some(working_day), holidays, half_day_cutoff) {
            DayClass::Holiday | DayClass::Unscheduled => None,
            DayClass::FullDay => Some(timing),
            DayClass::HalfDay => {
                if Self::covering(date, holidays, HolidayType::HalfDay) {
                    timing.truncate_to(half_day_cutoff)
                } else {
                    Some(timing)
                }
            }
        }
    }

    /// 按有效窗口拆分节次: (当日有效, 当日取消)，均保持输入顺序
    pub fn effective_slots(
        slots: &[ScheduleSlot],
        window: Option<TimeWindow>,
    ) -> (Vec<ScheduleSlot>, Vec<ScheduleSlot>) {
        match window {
            None => (Vec::new(), slots.to_vec()),
            Some(window) => slots
                .iter()
                .cloned()
                .partition(|slot| window.contains_window(&slot.window())),
        }
    }

    /// 组装某日的有效作息
    pub fn day_plan(
        date: NaiveDate,
        working_day: Option<&WorkingDay>,
        holidays: &[PublicHoliday],
        slots: &[ScheduleSlot],
        half_day_cutoff: NaiveTime,
    ) -> DayPlan {
        let day_class = Self::classify(date, working_day, holidays, half_day_cutoff);
        let window = Self::working_window(date, working_day, holidays, half_day_cutoff);
        let (effective, cancelled) = Self::effective_slots(slots, window);

        DayPlan {
            date,
            day_of_week: DayOfWeek::from(date.weekday()),
            day_class,
            window,
            slots: effective,
            cancelled,
        }
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn classify_regular(date: NaiveDate, working_day: Option<&WorkingDay>) -> DayClass {
        let Some(working_day) = Self::matching(date, working_day) else {
            return DayClass::Unscheduled;
        };

        match working_day.day_type() {
            DayType::FullDay => DayClass::FullDay,
            DayType::HalfDay => DayClass::HalfDay,
            DayType::Holiday => DayClass::Holiday,
            DayType::AlternateWeek => {
                if working_day.alternate_weeks().contains(&Self::iso_week_tag(date)) {
                    DayClass::FullDay
                } else {
                    DayClass::Unscheduled
                }
            }
        }
    }

    fn matching(date: NaiveDate, working_day: Option<&WorkingDay>) -> Option<&WorkingDay> {
        let day = DayOfWeek::from(date.weekday());
        working_day.filter(|wd| wd.day_of_week() == day)
    }

    fn covering(date: NaiveDate, holidays: &[PublicHoliday], holiday_type: HolidayType) -> bool {
        holidays
            .iter()
            .any(|h| h.holiday_type() == holiday_type && h.contains(date))
    }
}

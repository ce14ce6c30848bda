// ==========================================
// 学校教务排课核心 - 作息节次注册表
// ==========================================
// 职责: 维护每个星期的节次（Period/Break），保证节次落在作息时间内且互不重叠
// 约束:
// - 所有校验与写入在同一个 IMMEDIATE 事务内完成
// - 节次名称是不透明的键，唯一性由服务端校验，不依赖序号
// - 被课表引用的节次不允许删除/修改
// ==========================================

use crate::domain::calendar::WorkingDay;
use crate::domain::schedule::ScheduleSlot;
use crate::domain::time_window::TimeWindow;
use crate::domain::types::{DayClass, DayOfWeek, SlotType};
use crate::engine::calendar_day::{CalendarDayModel, DayPlan};
use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::engine::repositories::SchoolRepositories;
use crate::engine::transaction::{with_audited_write_tx, with_read_conn, AuditFn};
use crate::repository::error::RepositoryError;
use crate::repository::{
    PublicHolidayRepository, ScheduleSlotRepository, TimeTableRepository, WorkingDayRepository,
};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use tracing::{debug, info, warn};

// ==========================================
// ScheduleSlotRegistry
// ==========================================
pub struct ScheduleSlotRegistry {
    repos: SchoolRepositories,
}

impl ScheduleSlotRegistry {
    pub fn new(repos: SchoolRepositories) -> Self {
        Self { repos }
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 某星期的全部节次（按开始时间排序）
    pub fn slots_for(&self, day: DayOfWeek) -> ScheduleResult<Vec<ScheduleSlot>> {
        Ok(self.repos.slot_repo.find_by_day(day)?)
    }

    /// 按名称解析节次（同名时优先 Period）
    pub fn resolve(&self, day: DayOfWeek, name: &str) -> ScheduleResult<Option<ScheduleSlot>> {
        with_read_conn(&self.repos.conn, |conn| Self::resolve_tx(conn, day, name))
    }

    /// 建议的下一个节次名称（仅供界面预填，写入时不作依据）
    pub fn next_slot_name(&self, day: DayOfWeek, slot_type: SlotType) -> ScheduleResult<String> {
        let slots = self.slots_for(day)?;
        Ok(suggest_slot_name(&slots, slot_type))
    }

    /// 判定日期类型
    pub fn classify_date(&self, date: NaiveDate) -> ScheduleResult<DayClass> {
        let cutoff = self.repos.config.get_half_day_cutoff()?;
        let day = DayOfWeek::from(date.weekday());
        with_read_conn(&self.repos.conn, |conn| {
            let working_day = WorkingDayRepository::find_by_day_tx(conn, day)?;
            let holidays = PublicHolidayRepository::find_covering_tx(conn, date)?;
            Ok(CalendarDayModel::classify(date, working_day.as_ref(), &holidays, cutoff))
        })
    }

    /// 某日期的有效作息（考虑假日、半天与隔周后的实际节次）
    pub fn effective_slots_on(&self, date: NaiveDate) -> ScheduleResult<DayPlan> {
        // 先读配置（ConfigManager 自行加锁）
        let cutoff = self.repos.config.get_half_day_cutoff()?;
        let day = DayOfWeek::from(date.weekday());

        let plan = with_read_conn(&self.repos.conn, |conn| {
            let working_day = WorkingDayRepository::find_by_day_tx(conn, day)?;
            let holidays = PublicHolidayRepository::find_covering_tx(conn, date)?;
            let slots = ScheduleSlotRepository::find_by_day_tx(conn, day)?;
            Ok(CalendarDayModel::day_plan(
                date,
                working_day.as_ref(),
                &holidays,
                &slots,
                cutoff,
            ))
        })?;

        debug!(
            date = %date,
            day_class = %plan.day_class,
            slots = plan.slots.len(),
            cancelled = plan.cancelled.len(),
            "effective_slots_on"
        );
        Ok(plan)
    }

    // ==========================================
    // 校验
    // ==========================================

    /// 校验新节次（不写入）
    pub fn validate_new_slot(&self, slot: &ScheduleSlot) -> ScheduleResult<()> {
        with_read_conn(&self.repos.conn, |conn| Self::validate_slot_tx(conn, slot, None))
    }

    /// 事务内校验
    ///
    /// # 规则
    /// 1. 该星期存在工作日定义、不是休息日，且节次完全落在作息时间内
    /// 2. (day, type, name) 唯一
    /// 3. 与当天任一节次不重叠（Period 与 Break 共用时间轴）
    ///
    /// exclude_slot_id: 编辑时排除自身
    pub(crate) fn validate_slot_tx(
        conn: &Connection,
        slot: &ScheduleSlot,
        exclude_slot_id: Option<&str>,
    ) -> ScheduleResult<()> {
        let day = slot.day_of_week();
        let window = slot.window();

        let out_of_bounds = |reason: String| ScheduleError::SlotOutOfBounds {
            day,
            name: slot.name().to_string(),
            window: window.to_string(),
            reason,
        };

        let working_day = WorkingDayRepository::find_by_day_tx(conn, day)?
            .ok_or_else(|| out_of_bounds("该星期未配置工作日".to_string()))?;
        let working_window = working_day
            .timing()
            .ok_or_else(|| out_of_bounds("该星期为休息日".to_string()))?;
        if !working_window.contains_window(&window) {
            return Err(out_of_bounds(format!("超出作息时间 {}", working_window)));
        }

        let existing: Vec<ScheduleSlot> = ScheduleSlotRepository::find_by_day_tx(conn, day)?
            .into_iter()
            .filter(|s| Some(s.slot_id()) != exclude_slot_id)
            .collect();

        if existing
            .iter()
            .any(|s| s.slot_type() == slot.slot_type() && s.name() == slot.name())
        {
            return Err(ScheduleError::DuplicateSlotName {
                day,
                slot_type: slot.slot_type(),
                name: slot.name().to_string(),
            });
        }

        if let Some(clash) = existing.iter().find(|s| s.window().overlaps(&window)) {
            return Err(ScheduleError::SlotOverlap {
                day,
                name: slot.name().to_string(),
                existing: format!("{} {}", clash.name(), clash.window()),
            });
        }

        Ok(())
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 新建节次
    pub fn create_slot(
        &self,
        slot: ScheduleSlot,
        audit: AuditFn<'_, ScheduleSlot>,
    ) -> ScheduleResult<ScheduleSlot> {
        let result = with_audited_write_tx(&self.repos.conn, "create_slot", audit, |tx| {
            Self::validate_slot_tx(tx, &slot, None)?;
            ScheduleSlotRepository::insert_tx(tx, &slot)?;
            Ok(slot.clone())
        });

        match result {
            Ok(slot) => {
                info!(
                    day = %slot.day_of_week(),
                    slot_type = %slot.slot_type(),
                    slot_name = slot.name(),
                    window = %slot.window(),
                    "节次已创建"
                );
                Ok(slot)
            }
            Err(e) => {
                warn!(day = %slot.day_of_week(), slot_name = slot.name(), "节次创建被拒绝: {}", e);
                Err(e)
            }
        }
    }

    /// 修改节次（被引用时拒绝）
    pub fn update_slot(
        &self,
        slot_id: &str,
        updated: &ScheduleSlot,
        audit: AuditFn<'_, ScheduleSlot>,
    ) -> ScheduleResult<ScheduleSlot> {
        let candidate = updated.with_id(slot_id);

        let result = with_audited_write_tx(&self.repos.conn, "update_slot", audit, |tx| {
            let current = ScheduleSlotRepository::find_by_id_tx(tx, slot_id)?.ok_or_else(|| {
                RepositoryError::NotFound {
                    entity: "school_schedule".to_string(),
                    id: slot_id.to_string(),
                }
            })?;

            let references = Self::reference_count_tx(tx, &current)?;
            if references > 0 {
                return Err(ScheduleError::SlotInUse {
                    day: current.day_of_week(),
                    name: current.name().to_string(),
                    references,
                });
            }

            Self::validate_slot_tx(tx, &candidate, Some(slot_id))?;
            ScheduleSlotRepository::update_tx(tx, &candidate)?;
            Ok(candidate.clone())
        });

        match result {
            Ok(candidate) => {
                info!(slot_id, slot_name = candidate.name(), window = %candidate.window(), "节次已修改");
                Ok(candidate)
            }
            Err(e) => {
                warn!(slot_id, "节次修改被拒绝: {}", e);
                Err(e)
            }
        }
    }

    /// 按名称删除节次（同名时删除 Period）
    pub fn delete_slot(
        &self,
        day: DayOfWeek,
        name: &str,
        audit: AuditFn<'_, ScheduleSlot>,
    ) -> ScheduleResult<ScheduleSlot> {
        let result = with_audited_write_tx(&self.repos.conn, "delete_slot", audit, |tx| {
            let slot = Self::resolve_tx(tx, day, name)?.ok_or_else(|| ScheduleError::UnknownSlot {
                day,
                name: name.to_string(),
            })?;
            Self::delete_checked_tx(tx, slot)
        });
        Self::log_delete(day, name, result)
    }

    /// 按 ID 删除节次
    pub fn delete_slot_by_id(
        &self,
        slot_id: &str,
        audit: AuditFn<'_, ScheduleSlot>,
    ) -> ScheduleResult<ScheduleSlot> {
        let result = with_audited_write_tx(&self.repos.conn, "delete_slot", audit, |tx| {
            let slot = ScheduleSlotRepository::find_by_id_tx(tx, slot_id)?.ok_or_else(|| {
                RepositoryError::NotFound {
                    entity: "school_schedule".to_string(),
                    id: slot_id.to_string(),
                }
            })?;
            Self::delete_checked_tx(tx, slot)
        });
        match result {
            Ok(slot) => Self::log_delete(slot.day_of_week(), slot.name(), Ok(slot.clone())),
            Err(e) => {
                warn!(slot_id, "节次删除被拒绝: {}", e);
                Err(e)
            }
        }
    }

    /// 保存工作日定义（已有节次必须仍落在新作息时间内）
    pub fn save_working_day(
        &self,
        working_day: &WorkingDay,
        audit: AuditFn<'_, ()>,
    ) -> ScheduleResult<()> {
        let day = working_day.day_of_week();
        let result = with_audited_write_tx(&self.repos.conn, "save_working_day", audit, |tx| {
            let slots = ScheduleSlotRepository::find_by_day_tx(tx, day)?;
            let excluded = excluded_slots(&slots, working_day.timing());
            if !excluded.is_empty() {
                return Err(ScheduleError::WorkingWindowExcludesSlots { day, slots: excluded });
            }
            WorkingDayRepository::upsert_tx(tx, working_day)?;
            Ok(())
        });

        match &result {
            Ok(()) => info!(
                day = %day,
                day_type = ?working_day.day_type(),
                timing = ?working_day.timing().map(|w| w.to_string()),
                "工作日定义已保存"
            ),
            Err(e) => warn!(day = %day, "工作日定义保存被拒绝: {}", e),
        }
        result
    }

    /// 删除工作日定义（该星期仍有节次时拒绝）
    pub fn delete_working_day(&self, day: DayOfWeek, audit: AuditFn<'_, bool>) -> ScheduleResult<bool> {
        let result = with_audited_write_tx(&self.repos.conn, "delete_working_day", audit, |tx| {
            let slots = ScheduleSlotRepository::find_by_day_tx(tx, day)?;
            if !slots.is_empty() {
                return Err(ScheduleError::WorkingWindowExcludesSlots {
                    day,
                    slots: slots.iter().map(|s| s.name().to_string()).collect(),
                });
            }
            Ok(WorkingDayRepository::delete_tx(tx, day)? > 0)
        });

        match &result {
            Ok(removed) => info!(day = %day, removed, "工作日定义已删除"),
            Err(e) => warn!(day = %day, "工作日定义删除被拒绝: {}", e),
        }
        result
    }

    // ==========================================
    // 事务内辅助
    // ==========================================

    /// 事务内解析节次（同名时优先 Period）
    pub(crate) fn resolve_tx(
        conn: &Connection,
        day: DayOfWeek,
        name: &str,
    ) -> ScheduleResult<Option<ScheduleSlot>> {
        let candidates = ScheduleSlotRepository::find_by_name_tx(conn, day, name.trim())?;
        Ok(pick_slot(&candidates, name).cloned())
    }

    /// 课表条目对该节次的引用数
    ///
    /// 条目按名称引用；同名的 Break 与 Period 并存时，条目解析到 Period
    fn reference_count_tx(conn: &Connection, slot: &ScheduleSlot) -> ScheduleResult<usize> {
        let resolved = Self::resolve_tx(conn, slot.day_of_week(), slot.name())?;
        match resolved {
            Some(r) if r.slot_id() == slot.slot_id() => Ok(TimeTableRepository::count_entries_by_slot_tx(
                conn,
                slot.day_of_week(),
                slot.name(),
            )?),
            _ => Ok(0),
        }
    }

    fn delete_checked_tx(conn: &Connection, slot: ScheduleSlot) -> ScheduleResult<ScheduleSlot> {
        let references = Self::reference_count_tx(conn, &slot)?;
        if references > 0 {
            return Err(ScheduleError::SlotInUse {
                day: slot.day_of_week(),
                name: slot.name().to_string(),
                references,
            });
        }
        ScheduleSlotRepository::delete_by_id_tx(conn, slot.slot_id())?;
        Ok(slot)
    }

    fn log_delete(
        day: DayOfWeek,
        name: &str,
        result: ScheduleResult<ScheduleSlot>,
    ) -> ScheduleResult<ScheduleSlot> {
        match &result {
            Ok(slot) => info!(day = %day, slot_name = name, slot_type = %slot.slot_type(), "节次已删除"),
            Err(e) => warn!(day = %day, slot_name = name, "节次删除被拒绝: {}", e),
        }
        result
    }
}

// ==========================================
// 纯函数辅助
// ==========================================

/// 按名称在当天节次中选取（同名时优先 Period）
pub(crate) fn pick_slot<'a>(slots: &'a [ScheduleSlot], name: &str) -> Option<&'a ScheduleSlot> {
    let name = name.trim();
    slots
        .iter()
        .filter(|s| s.name() == name)
        .min_by_key(|s| if s.is_period() { 0 } else { 1 })
}

/// 不在新作息窗口内的节次名称（窗口为 None 时全部越界）
fn excluded_slots(slots: &[ScheduleSlot], window: Option<TimeWindow>) -> Vec<String> {
    slots
        .iter()
        .filter(|s| match window {
            Some(w) => !w.contains_window(&s.window()),
            None => true,
        })
        .map(|s| s.name().to_string())
        .collect()
}

/// 建议名称: `{前缀}-{N}`，N 取现有同前缀名称最大序号 + 1
fn suggest_slot_name(slots: &[ScheduleSlot], slot_type: SlotType) -> String {
    let prefix = slot_type.name_prefix();
    let same_type: Vec<&ScheduleSlot> = slots.iter().filter(|s| s.slot_type() == slot_type).collect();

    let max_seq = same_type
        .iter()
        .filter_map(|s| {
            s.name()
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('-'))
                .and_then(|n| n.parse::<u32>().ok())
        })
        .max()
        .unwrap_or(0);

    let next = max_seq.max(same_type.len() as u32) + 1;
    format!("{}-{}", prefix, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(slot_type: SlotType, name: &str, from: &str, to: &str) -> ScheduleSlot {
        ScheduleSlot::create(
            DayOfWeek::Monday,
            slot_type,
            name,
            TimeWindow::parse(from, to).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_suggest_slot_name_skips_gaps() {
        // Period-2 已删除，剩余 Period-1 / Period-3
        let slots = vec![
            slot(SlotType::Period, "Period-1", "09:00", "09:45"),
            slot(SlotType::Break, "Break-1", "09:45", "10:00"),
            slot(SlotType::Period, "Period-3", "10:00", "10:45"),
        ];
        assert_eq!(suggest_slot_name(&slots, SlotType::Period), "Period-4");
        assert_eq!(suggest_slot_name(&slots, SlotType::Break), "Break-2");
    }

    #[test]
    fn test_suggest_slot_name_with_custom_names() {
        let slots = vec![
            slot(SlotType::Period, "Assembly", "09:00", "09:20"),
            slot(SlotType::Period, "Maths Lab", "09:20", "10:00"),
        ];
        assert_eq!(suggest_slot_name(&slots, SlotType::Period), "Period-3");
        assert_eq!(suggest_slot_name(&[], SlotType::Break), "Break-1");
    }

    #[test]
    fn test_pick_slot_prefers_period() {
        let slots = vec![
            slot(SlotType::Break, "Lunch", "12:00", "12:30"),
            slot(SlotType::Period, "Lunch", "12:30", "13:00"),
        ];
        let picked = pick_slot(&slots, " Lunch ").unwrap();
        assert!(picked.is_period());
        assert!(pick_slot(&slots, "Period-1").is_none());
    }

    #[test]
    fn test_excluded_slots() {
        let slots = vec![
            slot(SlotType::Period, "Period-1", "09:00", "09:45"),
            slot(SlotType::Period, "Period-6", "14:00", "14:45"),
        ];
        let narrowed = TimeWindow::parse("08:30", "13:00").unwrap();
        assert_eq!(excluded_slots(&slots, Some(narrowed)), vec!["Period-6".to_string()]);
        assert_eq!(excluded_slots(&slots, None).len(), 2);
    }
}

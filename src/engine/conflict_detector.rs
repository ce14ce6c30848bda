// ==========================================
// 学校教务排课核心 - 教师冲突检测
// ==========================================
// 职责:
// - 查询教师在某星期某时间段已占用的课表条目（只读，可用于预检）
// - 审计已有课表: 教师重复占用、失效节次引用、任课映射失效、节假日取消
// 判定: 条目按名称解析到当天节次，时间窗 [a,b) 与 [c,d) 满足 a<d && c<b 即冲突
// ==========================================

use crate::domain::schedule::ScheduleSlot;
use crate::domain::time_window::TimeWindow;
use crate::domain::timetable::{CellKey, TimeTable, TimeTableEntry};
use crate::domain::types::{DayClass, DayOfWeek};
use crate::engine::assignment_ledger::{AssignmentKey, AssignmentLedger};
use crate::engine::calendar_day::CalendarDayModel;
use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::engine::repositories::SchoolRepositories;
use crate::engine::slot_registry::pick_slot;
use crate::engine::transaction::with_read_conn;
use crate::repository::{
    PublicHolidayRepository, ScheduleSlotRepository, TimeTableRepository, WorkingDayRepository,
};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// ConflictQuery - 冲突查询条件
// ==========================================
#[derive(Debug, Clone)]
pub struct ConflictQuery {
    pub teacher_id: String,
    pub day: DayOfWeek,
    pub window: TimeWindow,
    /// 排除的单元格（替换已有条目时排除自身）
    pub exclude_cell: Option<CellKey>,
}

impl ConflictQuery {
    pub fn new(teacher_id: &str, day: DayOfWeek, window: TimeWindow) -> Self {
        Self {
            teacher_id: teacher_id.trim().to_string(),
            day,
            window,
            exclude_cell: None,
        }
    }

    pub fn excluding(mut self, cell: CellKey) -> Self {
        self.exclude_cell = Some(cell);
        self
    }
}

// ==========================================
// Conflict - 审计发现
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Conflict {
    /// 教师在同一时间段被排入多个班级
    TeacherDoubleBooked {
        entry: TimeTableEntry,
        window: TimeWindow,
        conflicts: Vec<TimeTableEntry>,
    },
    /// 条目引用的节次已不存在或为课间
    StaleSlotReference { entry: TimeTableEntry, reason: String },
    /// 教师已不再任教该 (班级, 科目, 分班)
    TeacherNoLongerMapped { entry: TimeTableEntry },
    /// 该日期节次被假日/半天/隔周取消
    SlotOnNonWorkingDay {
        entry: TimeTableEntry,
        date: NaiveDate,
        day_class: DayClass,
    },
}

impl Conflict {
    pub fn entry(&self) -> &TimeTableEntry {
        match self {
            Conflict::TeacherDoubleBooked { entry, .. }
            | Conflict::StaleSlotReference { entry, .. }
            | Conflict::TeacherNoLongerMapped { entry }
            | Conflict::SlotOnNonWorkingDay { entry, .. } => entry,
        }
    }
}

// ==========================================
// ConflictDetector
// ==========================================
pub struct ConflictDetector {
    repos: SchoolRepositories,
}

impl ConflictDetector {
    pub fn new(repos: SchoolRepositories) -> Self {
        Self { repos }
    }

    /// 教师在 (day, window) 已占用的条目（跨全部课表）
    pub fn find_conflicts(
        &self,
        teacher_id: &str,
        day: DayOfWeek,
        window: TimeWindow,
    ) -> ScheduleResult<Vec<TimeTableEntry>> {
        self.find_conflicts_matching(&ConflictQuery::new(teacher_id, day, window))
    }

    /// 带排除单元格的冲突查询
    pub fn find_conflicts_matching(&self, query: &ConflictQuery) -> ScheduleResult<Vec<TimeTableEntry>> {
        let conflicts = with_read_conn(&self.repos.conn, |conn| Self::find_conflicts_tx(conn, query))?;
        debug!(
            teacher_id = %query.teacher_id,
            day = %query.day,
            window = %query.window,
            conflicts = conflicts.len(),
            "find_conflicts"
        );
        Ok(conflicts)
    }

    /// 事务内冲突查询（供排课在写事务内调用）
    pub(crate) fn find_conflicts_tx(
        conn: &Connection,
        query: &ConflictQuery,
    ) -> ScheduleResult<Vec<TimeTableEntry>> {
        let candidates = TimeTableRepository::find_entries_by_teacher_day_tx(
            conn,
            &query.teacher_id,
            query.day,
        )?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let slots = ScheduleSlotRepository::find_by_day_tx(conn, query.day)?;
        Ok(candidates
            .into_iter()
            .filter(|e| query.exclude_cell.as_ref().map_or(true, |cell| !e.is_cell(cell)))
            .filter(|e| {
                pick_slot(&slots, &e.schedule_slot)
                    .map_or(false, |slot| slot.window().overlaps(&query.window))
            })
            .collect())
    }

    // ==========================================
    // 审计
    // ==========================================

    /// 审计整张课表
    pub fn audit_timetable(&self, time_table_id: &str) -> ScheduleResult<Vec<Conflict>> {
        with_read_conn(&self.repos.conn, |conn| {
            let time_table = Self::load_timetable(conn, time_table_id)?;
            let entries = TimeTableRepository::find_entries_tx(conn, time_table_id)?;
            Self::audit_entries(conn, &time_table, &entries)
        })
    }

    /// 审计课表在某日期的情况（只审计该星期的条目，并检查节次是否被取消）
    pub fn audit_date(&self, time_table_id: &str, date: NaiveDate) -> ScheduleResult<Vec<Conflict>> {
        let cutoff = self.repos.config.get_half_day_cutoff()?;
        let day = DayOfWeek::from(date.weekday());

        with_read_conn(&self.repos.conn, |conn| {
            let time_table = Self::load_timetable(conn, time_table_id)?;
            let entries: Vec<TimeTableEntry> = TimeTableRepository::find_entries_tx(conn, time_table_id)?
                .into_iter()
                .filter(|e| e.day_of_week == day)
                .collect();

            let mut findings = Self::audit_entries(conn, &time_table, &entries)?;

            let working_day = WorkingDayRepository::find_by_day_tx(conn, day)?;
            let holidays = PublicHolidayRepository::find_covering_tx(conn, date)?;
            let slots = ScheduleSlotRepository::find_by_day_tx(conn, day)?;
            let plan = CalendarDayModel::day_plan(date, working_day.as_ref(), &holidays, &slots, cutoff);

            for entry in &entries {
                let Some(slot) = pick_slot(&slots, &entry.schedule_slot) else {
                    continue;
                };
                if plan.cancelled.iter().any(|c| c.slot_id() == slot.slot_id()) {
                    findings.push(Conflict::SlotOnNonWorkingDay {
                        entry: entry.clone(),
                        date,
                        day_class: plan.day_class,
                    });
                }
            }
            Ok(findings)
        })
    }

    fn load_timetable(conn: &Connection, time_table_id: &str) -> ScheduleResult<TimeTable> {
        TimeTableRepository::find_by_id_tx(conn, time_table_id)?
            .ok_or_else(|| ScheduleError::TimetableNotFound(time_table_id.to_string()))
    }

    fn audit_entries(
        conn: &Connection,
        time_table: &TimeTable,
        entries: &[TimeTableEntry],
    ) -> ScheduleResult<Vec<Conflict>> {
        let mut slots_by_day: HashMap<DayOfWeek, Vec<ScheduleSlot>> = HashMap::new();
        let mut findings = Vec::new();

        for entry in entries {
            if !slots_by_day.contains_key(&entry.day_of_week) {
                let slots = ScheduleSlotRepository::find_by_day_tx(conn, entry.day_of_week)?;
                slots_by_day.insert(entry.day_of_week, slots);
            }
            let slot = slots_by_day
                .get(&entry.day_of_week)
                .and_then(|slots| pick_slot(slots, &entry.schedule_slot));

            let window = match slot {
                None => {
                    findings.push(Conflict::StaleSlotReference {
                        entry: entry.clone(),
                        reason: "节次不存在".to_string(),
                    });
                    continue;
                }
                Some(s) if !s.is_period() => {
                    findings.push(Conflict::StaleSlotReference {
                        entry: entry.clone(),
                        reason: "节次为课间".to_string(),
                    });
                    continue;
                }
                Some(s) => s.window(),
            };

            let key = AssignmentKey::new(&time_table.class_name, &entry.subject_id, &time_table.division)?;
            if !AssignmentLedger::is_mapped_tx(conn, &key, &entry.teacher_id)? {
                findings.push(Conflict::TeacherNoLongerMapped { entry: entry.clone() });
            }

            let query = ConflictQuery::new(&entry.teacher_id, entry.day_of_week, window)
                .excluding(entry.cell_key());
            let conflicts = Self::find_conflicts_tx(conn, &query)?;
            if !conflicts.is_empty() {
                findings.push(Conflict::TeacherDoubleBooked {
                    entry: entry.clone(),
                    window,
                    conflicts,
                });
            }
        }

        Ok(findings)
    }
}

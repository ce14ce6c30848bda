// ==========================================
// 学校教务排课核心 - 课表 API
// ==========================================
// 职责: 课表创建/状态、排课、清空单元格、教师空闲预检、课表审计
// ==========================================

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::build_action_log;
use crate::api::validator::{parse_window, require_non_blank};
use crate::domain::action_log::ActionType;
use crate::domain::time_window::TimeWindow;
use crate::domain::timetable::{TimeTable, TimeTableEntry};
use crate::domain::types::{DayOfWeek, RecordStatus};
use crate::engine::conflict_detector::{Conflict, ConflictDetector};
use crate::engine::repositories::SchoolRepositories;
use crate::engine::timetable_allocator::{PlacementRequest, TimetableAllocator};

/// 教师空闲预检结果
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    pub teacher_id: String,
    pub day_of_week: DayOfWeek,
    pub window: TimeWindow,
    pub available: bool,
    pub conflicts: Vec<TimeTableEntry>,
}

// ==========================================
// TimetableApi
// ==========================================
pub struct TimetableApi {
    repos: SchoolRepositories,
    allocator: Arc<TimetableAllocator>,
    detector: Arc<ConflictDetector>,
}

impl TimetableApi {
    pub fn new(
        repos: SchoolRepositories,
        allocator: Arc<TimetableAllocator>,
        detector: Arc<ConflictDetector>,
    ) -> Self {
        Self {
            repos,
            allocator,
            detector,
        }
    }

    // ==========================================
    // 课表头
    // ==========================================

    pub fn create_timetable(
        &self,
        academic_year: &str,
        class_name: &str,
        division: &str,
        actor: &str,
    ) -> ApiResult<TimeTable> {
        let actor = require_non_blank("操作人", actor)?;
        let audit = |time_table: &TimeTable| {
            Some(build_action_log(
                ActionType::CreateTimetable,
                actor,
                json!({
                    "time_table_id": time_table.time_table_id,
                    "academic_year": time_table.academic_year,
                    "class_name": time_table.class_name,
                    "division": time_table.division,
                }),
                format!(
                    "新建课表: {} {}-{}",
                    time_table.academic_year, time_table.class_name, time_table.division
                ),
            ))
        };
        Ok(self
            .allocator
            .create_timetable(academic_year, class_name, division, &audit)?)
    }

    pub fn set_timetable_status(
        &self,
        time_table_id: &str,
        status: RecordStatus,
        actor: &str,
    ) -> ApiResult<TimeTable> {
        let time_table_id = require_non_blank("课表ID", time_table_id)?;
        let actor = require_non_blank("操作人", actor)?;
        let audit = |_: &TimeTable| {
            Some(build_action_log(
                ActionType::SetTimetableStatus,
                actor,
                json!({ "time_table_id": time_table_id, "status": status.to_db_str() }),
                format!("课表状态: {} → {}", time_table_id, status.to_db_str()),
            ))
        };
        Ok(self.allocator.set_status(time_table_id, status, &audit)?)
    }

    pub fn list_timetables(&self, academic_year: &str) -> ApiResult<Vec<TimeTable>> {
        let academic_year = require_non_blank("学年", academic_year)?;
        Ok(self.repos.timetable_repo.find_by_year(academic_year)?)
    }

    // ==========================================
    // 排课
    // ==========================================

    /// 排入课表条目
    pub fn place_entry(&self, request: &PlacementRequest, actor: &str) -> ApiResult<TimeTableEntry> {
        require_non_blank("课表ID", &request.time_table_id)?;
        require_non_blank("节次名称", &request.slot_name)?;
        require_non_blank("科目", &request.subject_id)?;
        require_non_blank("教师ID", &request.teacher_id)?;
        let actor = require_non_blank("操作人", actor)?;

        let audit = |entry: &TimeTableEntry| {
            Some(build_action_log(
                ActionType::PlaceEntry,
                actor,
                json!({
                    "entry_id": entry.entry_id,
                    "time_table_id": entry.time_table_id,
                    "day_of_week": entry.day_of_week.to_db_str(),
                    "schedule_slot": entry.schedule_slot,
                    "subject_id": entry.subject_id,
                    "teacher_id": entry.teacher_id,
                }),
                format!(
                    "排课: {} {} {} → {}",
                    entry.day_of_week, entry.schedule_slot, entry.subject_id, entry.teacher_id
                ),
            ))
        };
        Ok(self.allocator.place_entry(request, &audit)?)
    }

    /// 清空单元格（幂等）
    pub fn clear_entry(
        &self,
        time_table_id: &str,
        day: DayOfWeek,
        slot_name: &str,
        actor: &str,
    ) -> ApiResult<bool> {
        let time_table_id = require_non_blank("课表ID", time_table_id)?;
        let slot_name = require_non_blank("节次名称", slot_name)?;
        let actor = require_non_blank("操作人", actor)?;

        let audit = |removed: &bool| {
            removed.then(|| {
                build_action_log(
                    ActionType::ClearEntry,
                    actor,
                    json!({
                        "time_table_id": time_table_id,
                        "day_of_week": day.to_db_str(),
                        "schedule_slot": slot_name,
                    }),
                    format!("清空单元格: {} {}", day, slot_name),
                )
            })
        };
        Ok(self.allocator.clear_entry(time_table_id, day, slot_name, &audit)?)
    }

    /// 课表条目（按星期、节次开始时间排序）
    pub fn list_entries(&self, time_table_id: &str) -> ApiResult<Vec<TimeTableEntry>> {
        let time_table_id = require_non_blank("课表ID", time_table_id)?;
        Ok(self.allocator.entries_for(time_table_id)?)
    }

    // ==========================================
    // 预检与审计（只读）
    // ==========================================

    /// 教师在 (星期, 时间段) 是否空闲
    pub fn check_teacher_availability(
        &self,
        teacher_id: &str,
        day: DayOfWeek,
        timing_from: &str,
        timing_to: &str,
    ) -> ApiResult<AvailabilityReport> {
        let window = parse_window(timing_from, timing_to)?;
        self.availability(teacher_id, day, window)
    }

    /// 教师在某节次是否空闲
    pub fn check_teacher_availability_for_slot(
        &self,
        teacher_id: &str,
        day: DayOfWeek,
        slot_name: &str,
    ) -> ApiResult<AvailabilityReport> {
        let slot_name = require_non_blank("节次名称", slot_name)?;
        let window = self.allocator.slot_window(day, slot_name)?;
        self.availability(teacher_id, day, window)
    }

    pub fn audit_timetable(&self, time_table_id: &str) -> ApiResult<Vec<Conflict>> {
        let time_table_id = require_non_blank("课表ID", time_table_id)?;
        Ok(self.detector.audit_timetable(time_table_id)?)
    }

    pub fn audit_date(&self, time_table_id: &str, date: NaiveDate) -> ApiResult<Vec<Conflict>> {
        let time_table_id = require_non_blank("课表ID", time_table_id)?;
        Ok(self.detector.audit_date(time_table_id, date)?)
    }

    fn availability(
        &self,
        teacher_id: &str,
        day: DayOfWeek,
        window: TimeWindow,
    ) -> ApiResult<AvailabilityReport> {
        let teacher_id = require_non_blank("教师ID", teacher_id)?;
        let conflicts = self.detector.find_conflicts(teacher_id, day, window)?;
        Ok(AvailabilityReport {
            teacher_id: teacher_id.to_string(),
            day_of_week: day,
            window,
            available: conflicts.is_empty(),
            conflicts,
        })
    }
}

// ==========================================
// 学校教务排课核心 - 课表排课器
// ==========================================
// 职责: 将 (科目, 教师) 放入课表单元格 (星期, 节次)
// 校验顺序（每项一个独立错误）:
// 1. 节次存在且为 Period        → UnknownSlot / SlotIsBreak
// 2. 课表存在                    → TimetableNotFound
// 3. 教师任教该科目/分班         → TeacherNotMappedToSubject
// 4. 教师该时间段无其他课        → TeacherDoubleBooked
// 5. 按单元格覆盖写入
// 约束: 全部读取与写入在同一个 IMMEDIATE 事务内，任一校验失败不产生写入
// ==========================================

use crate::domain::time_window::TimeWindow;
use crate::domain::timetable::{CellKey, TimeTable, TimeTableEntry};
use crate::domain::types::{DayOfWeek, RecordStatus};
use crate::engine::assignment_ledger::{AssignmentKey, AssignmentLedger};
use crate::engine::conflict_detector::{ConflictDetector, ConflictQuery};
use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::engine::repositories::SchoolRepositories;
use crate::engine::slot_registry::{pick_slot, ScheduleSlotRegistry};
use crate::engine::transaction::{with_audited_write_tx, with_read_conn, AuditFn};
use crate::repository::{ScheduleSlotRepository, TimeTableRepository};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// 排课请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub time_table_id: String,
    pub day_of_week: DayOfWeek,
    pub slot_name: String,
    pub subject_id: String,
    pub teacher_id: String,
}

// ==========================================
// TimetableAllocator
// ==========================================
pub struct TimetableAllocator {
    repos: SchoolRepositories,
}

impl TimetableAllocator {
    pub fn new(repos: SchoolRepositories) -> Self {
        Self { repos }
    }

    // ==========================================
    // 课表头
    // ==========================================

    /// 新建课表
    ///
    /// # 错误
    /// - DuplicateTimetable: 同一 (学年, 班级, 分班) 已存在课表
    pub fn create_timetable(
        &self,
        academic_year: &str,
        class_name: &str,
        division: &str,
        audit: AuditFn<'_, TimeTable>,
    ) -> ScheduleResult<TimeTable> {
        let time_table = TimeTable::create(academic_year, class_name, division)?;

        let result = with_audited_write_tx(&self.repos.conn, "create_timetable", audit, |tx| {
            if TimeTableRepository::find_by_key_tx(
                tx,
                &time_table.academic_year,
                &time_table.class_name,
                &time_table.division,
            )?
            .is_some()
            {
                return Err(ScheduleError::DuplicateTimetable {
                    academic_year: time_table.academic_year.clone(),
                    class_name: time_table.class_name.clone(),
                    division: time_table.division.clone(),
                });
            }
            TimeTableRepository::insert_tx(tx, &time_table)?;
            Ok(time_table.clone())
        });

        match result {
            Ok(time_table) => {
                info!(
                    time_table_id = %time_table.time_table_id,
                    academic_year = %time_table.academic_year,
                    class_name = %time_table.class_name,
                    division = %time_table.division,
                    "课表已创建"
                );
                Ok(time_table)
            }
            Err(e) => {
                warn!(academic_year, class_name, division, "课表创建被拒绝: {}", e);
                Err(e)
            }
        }
    }

    /// 设置课表状态
    pub fn set_status(
        &self,
        time_table_id: &str,
        status: RecordStatus,
        audit: AuditFn<'_, TimeTable>,
    ) -> ScheduleResult<TimeTable> {
        let time_table = with_audited_write_tx(&self.repos.conn, "set_timetable_status", audit, |tx| {
            let mut time_table = TimeTableRepository::find_by_id_tx(tx, time_table_id)?
                .ok_or_else(|| ScheduleError::TimetableNotFound(time_table_id.to_string()))?;
            TimeTableRepository::update_status_tx(tx, time_table_id, status)?;
            time_table.status = status;
            Ok(time_table)
        })?;

        info!(time_table_id, status = status.to_db_str(), "课表状态已更新");
        Ok(time_table)
    }

    // ==========================================
    // 排课
    // ==========================================

    /// 排入课表条目（同一单元格已有条目时覆盖，保留 entry_id）
    pub fn place_entry(
        &self,
        request: &PlacementRequest,
        audit: AuditFn<'_, TimeTableEntry>,
    ) -> ScheduleResult<TimeTableEntry> {
        let day = request.day_of_week;

        let result = with_audited_write_tx(&self.repos.conn, "place_entry", audit, |tx| {
            // 1. 节次
            let slot = ScheduleSlotRegistry::resolve_tx(tx, day, &request.slot_name)?.ok_or_else(|| {
                ScheduleError::UnknownSlot {
                    day,
                    name: request.slot_name.trim().to_string(),
                }
            })?;
            if !slot.is_period() {
                return Err(ScheduleError::SlotIsBreak {
                    day,
                    name: slot.name().to_string(),
                });
            }

            // 2. 课表
            let time_table = TimeTableRepository::find_by_id_tx(tx, &request.time_table_id)?
                .ok_or_else(|| ScheduleError::TimetableNotFound(request.time_table_id.clone()))?;

            // 3. 任课映射
            let key = AssignmentKey::new(&time_table.class_name, &request.subject_id, &time_table.division)?;
            if !AssignmentLedger::is_mapped_tx(tx, &key, &request.teacher_id)? {
                return Err(ScheduleError::TeacherNotMappedToSubject {
                    teacher_id: request.teacher_id.trim().to_string(),
                    class_name: key.class_name.clone(),
                    subject_id: key.subject_id.clone(),
                    division: key.division.clone(),
                });
            }

            // 4. 教师冲突（跨全部课表，排除被替换的单元格）
            let cell = CellKey {
                time_table_id: time_table.time_table_id.clone(),
                day_of_week: day,
                schedule_slot: slot.name().to_string(),
            };
            let query = ConflictQuery::new(&request.teacher_id, day, slot.window())
                .excluding(cell.clone());
            let conflicts = ConflictDetector::find_conflicts_tx(tx, &query)?;
            if !conflicts.is_empty() {
                return Err(ScheduleError::TeacherDoubleBooked {
                    teacher_id: query.teacher_id.clone(),
                    day,
                    window: slot.window().to_string(),
                    conflicts: conflicts.len(),
                });
            }

            // 5. 写入
            let entry_id = TimeTableRepository::find_entry_tx(tx, &cell)?
                .map(|e| e.entry_id)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let entry = TimeTableEntry::new(
                entry_id,
                &cell.time_table_id,
                day,
                &cell.schedule_slot,
                &key.subject_id,
                &request.teacher_id,
            )?;
            TimeTableRepository::upsert_entry_tx(tx, &entry)?;
            Ok(entry)
        });

        match &result {
            Ok(entry) => info!(
                time_table_id = %entry.time_table_id,
                day = %entry.day_of_week,
                slot = %entry.schedule_slot,
                subject_id = %entry.subject_id,
                teacher_id = %entry.teacher_id,
                "课表条目已排入"
            ),
            Err(e) => warn!(
                time_table_id = %request.time_table_id,
                day = %day,
                slot = %request.slot_name,
                teacher_id = %request.teacher_id,
                "排课被拒绝: {}",
                e
            ),
        }
        result
    }

    /// 清空单元格（幂等），返回是否有删除
    pub fn clear_entry(
        &self,
        time_table_id: &str,
        day: DayOfWeek,
        slot_name: &str,
        audit: AuditFn<'_, bool>,
    ) -> ScheduleResult<bool> {
        let cell = CellKey {
            time_table_id: time_table_id.to_string(),
            day_of_week: day,
            schedule_slot: slot_name.trim().to_string(),
        };
        let removed = with_audited_write_tx(&self.repos.conn, "clear_entry", audit, |tx| {
            Ok(TimeTableRepository::delete_entry_tx(tx, &cell)? > 0)
        })?;

        info!(time_table_id, day = %day, slot = %cell.schedule_slot, removed, "课表单元格已清空");
        Ok(removed)
    }

    /// 课表全部条目（按星期、节次开始时间排序；无法解析的节次排在当天末尾）
    pub fn entries_for(&self, time_table_id: &str) -> ScheduleResult<Vec<TimeTableEntry>> {
        with_read_conn(&self.repos.conn, |conn| {
            let mut entries = TimeTableRepository::find_entries_tx(conn, time_table_id)?;

            let mut starts: HashMap<(DayOfWeek, String), NaiveTime> = HashMap::new();
            for day in DayOfWeek::ALL {
                if !entries.iter().any(|e| e.day_of_week == day) {
                    continue;
                }
                let slots = ScheduleSlotRepository::find_by_day_tx(conn, day)?;
                for entry in entries.iter().filter(|e| e.day_of_week == day) {
                    if let Some(slot) = pick_slot(&slots, &entry.schedule_slot) {
                        starts.insert((day, entry.schedule_slot.clone()), slot.window().from());
                    }
                }
            }

            entries.sort_by(|a, b| {
                let start_a = starts.get(&(a.day_of_week, a.schedule_slot.clone()));
                let start_b = starts.get(&(b.day_of_week, b.schedule_slot.clone()));
                a.day_of_week
                    .cmp(&b.day_of_week)
                    .then_with(|| sort_start(start_a).cmp(&sort_start(start_b)))
                    .then_with(|| a.schedule_slot.cmp(&b.schedule_slot))
            });
            Ok(entries)
        })
    }

    /// 节次的时间窗（同名时取 Period）
    pub fn slot_window(&self, day: DayOfWeek, slot_name: &str) -> ScheduleResult<TimeWindow> {
        let slot = with_read_conn(&self.repos.conn, |conn| {
            ScheduleSlotRegistry::resolve_tx(conn, day, slot_name)
        })?
        .ok_or_else(|| ScheduleError::UnknownSlot {
            day,
            name: slot_name.trim().to_string(),
        })?;
        Ok(slot.window())
    }
}

/// 排序键: 可解析的节次在前（按开始时间），不可解析的在后
fn sort_start(start: Option<&NaiveTime>) -> (bool, Option<NaiveTime>) {
    (start.is_none(), start.copied())
}

// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的测试环境与数据准备函数
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use school_timetable::api::{
    ApiResult, AssignTeacherRequest, AssignmentApi, CalendarApi, ImportApi, ScheduleApi,
    SlotInput, TimetableApi,
};
use school_timetable::app::AppState;
use school_timetable::domain::{
    DayOfWeek, DayType, ScheduleSlot, SlotType, TeacherMapping, TimeTable, TimeTableEntry,
    TimeWindow, WorkingDay,
};
use school_timetable::engine::PlacementRequest;

/// 测试操作人
pub const ACTOR: &str = "admin";

/// 2025-01-06 为周一
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).expect("有效日期")
}

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 临时数据库 + 完整装配的 AppState
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: AppState,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        school_timetable::logging::init_test();
        let (temp_file, db_path) = test_helpers::create_test_db()?;
        let state = AppState::new(db_path.clone())?;
        Ok(Self {
            db_path,
            state,
            _temp_file: temp_file,
        })
    }

    pub fn calendar(&self) -> &CalendarApi {
        &self.state.calendar_api
    }

    pub fn schedule(&self) -> &ScheduleApi {
        &self.state.schedule_api
    }

    pub fn assignment(&self) -> &AssignmentApi {
        &self.state.assignment_api
    }

    pub fn timetable(&self) -> &TimetableApi {
        &self.state.timetable_api
    }

    pub fn import(&self) -> &ImportApi {
        &self.state.import_api
    }

    // ==========================================
    // 数据准备
    // ==========================================

    /// 全天工作日
    pub fn save_full_day(&self, day: DayOfWeek, from: &str, to: &str) -> WorkingDay {
        let wd = WorkingDay::new(
            day,
            DayType::FullDay,
            [],
            Some(TimeWindow::parse(from, to).expect("有效时间段")),
        )
        .expect("有效工作日");
        self.calendar().save_working_day(&wd, ACTOR).expect("保存工作日失败");
        wd
    }

    pub fn try_create_slot(
        &self,
        day: DayOfWeek,
        slot_type: SlotType,
        name: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<ScheduleSlot> {
        self.schedule().create_slot(
            &SlotInput {
                day_of_week: day,
                slot_type,
                name,
                timing_from: from,
                timing_to: to,
            },
            ACTOR,
        )
    }

    pub fn create_period(&self, day: DayOfWeek, name: &str, from: &str, to: &str) -> ScheduleSlot {
        self.try_create_slot(day, SlotType::Period, name, from, to)
            .expect("创建节次失败")
    }

    pub fn create_break(&self, day: DayOfWeek, name: &str, from: &str, to: &str) -> ScheduleSlot {
        self.try_create_slot(day, SlotType::Break, name, from, to)
            .expect("创建课间失败")
    }

    /// Monday 09:00-15:00，Period-1 09:00-09:45，Break-1 09:45-10:00，Period-2 10:00-10:45
    pub fn seed_monday(&self) {
        self.save_full_day(DayOfWeek::Monday, "09:00", "15:00");
        self.create_period(DayOfWeek::Monday, "Period-1", "09:00", "09:45");
        self.create_break(DayOfWeek::Monday, "Break-1", "09:45", "10:00");
        self.create_period(DayOfWeek::Monday, "Period-2", "10:00", "10:45");
    }

    pub fn assign_request(
        class_name: &str,
        subject_id: &str,
        division: &str,
        teacher_id: &str,
        is_class_teacher: bool,
    ) -> AssignTeacherRequest {
        AssignTeacherRequest {
            class_name: class_name.to_string(),
            subject_id: subject_id.to_string(),
            division: division.to_string(),
            teacher_id: teacher_id.to_string(),
            teacher_name: format!("教师{}", teacher_id),
            is_class_teacher,
        }
    }

    pub fn assign(
        &self,
        class_name: &str,
        subject_id: &str,
        division: &str,
        teacher_id: &str,
        is_class_teacher: bool,
    ) -> TeacherMapping {
        self.assignment()
            .assign_teacher(
                &Self::assign_request(class_name, subject_id, division, teacher_id, is_class_teacher),
                ACTOR,
            )
            .expect("分配任课失败")
    }

    pub fn create_timetable(&self, academic_year: &str, class_name: &str, division: &str) -> TimeTable {
        self.timetable()
            .create_timetable(academic_year, class_name, division, ACTOR)
            .expect("创建课表失败")
    }

    pub fn place(
        &self,
        time_table_id: &str,
        day: DayOfWeek,
        slot_name: &str,
        subject_id: &str,
        teacher_id: &str,
    ) -> ApiResult<TimeTableEntry> {
        self.timetable().place_entry(
            &PlacementRequest {
                time_table_id: time_table_id.to_string(),
                day_of_week: day,
                slot_name: slot_name.to_string(),
                subject_id: subject_id.to_string(),
                teacher_id: teacher_id.to_string(),
            },
            ACTOR,
        )
    }

    // ==========================================
    // 直接查询
    // ==========================================

    /// 表行数
    pub fn count_rows(&self, table: &str) -> i64 {
        let conn = self.state.repos.conn.lock().expect("锁获取失败");
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .expect("查询行数失败")
    }

    /// 某类操作日志条数
    pub fn count_actions(&self, action_type: &str) -> i64 {
        let conn = self.state.repos.conn.lock().expect("锁获取失败");
        conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE action_type = ?1",
            [action_type],
            |row| row.get(0),
        )
        .expect("查询操作日志失败")
    }

    /// 直接执行 SQL（模拟外部修改）
    pub fn execute_sql(&self, sql: &str) {
        let conn = self.state.repos.conn.lock().expect("锁获取失败");
        conn.execute_batch(sql).expect("执行 SQL 失败");
    }
}

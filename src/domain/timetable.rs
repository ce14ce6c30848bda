// ==========================================
// 学校教务排课核心 - 课表领域模型
// ==========================================
// 对齐: time_table / time_table_entry 表
// 一个单元格 (time_table_id, day_of_week, schedule_slot) 至多一条记录
// ==========================================

use crate::domain::error::{require_non_empty, DomainResult};
use crate::domain::types::{DayOfWeek, RecordStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// TimeTable - 班级课表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTable {
    pub time_table_id: String,
    pub academic_year: String,
    pub class_name: String,
    pub division: String,
    pub status: RecordStatus,
}

impl TimeTable {
    pub fn new(
        time_table_id: String,
        academic_year: &str,
        class_name: &str,
        division: &str,
        status: RecordStatus,
    ) -> DomainResult<Self> {
        Ok(Self {
            time_table_id,
            academic_year: require_non_empty("academic_year", academic_year)?,
            class_name: require_non_empty("class_name", class_name)?,
            division: require_non_empty("division", division)?,
            status,
        })
    }

    /// 生成新 ID 的课表（默认 active）
    pub fn create(academic_year: &str, class_name: &str, division: &str) -> DomainResult<Self> {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            academic_year,
            class_name,
            division,
            RecordStatus::Active,
        )
    }
}

// ==========================================
// CellKey - 课表单元格
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub time_table_id: String,
    pub day_of_week: DayOfWeek,
    pub schedule_slot: String,
}

// ==========================================
// TimeTableEntry - 课表条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTableEntry {
    pub entry_id: String,
    pub time_table_id: String,
    pub day_of_week: DayOfWeek,
    pub schedule_slot: String, // 节次名称，按 day_of_week 解析
    pub subject_id: String,
    pub teacher_id: String,
}

impl TimeTableEntry {
    pub fn new(
        entry_id: String,
        time_table_id: &str,
        day_of_week: DayOfWeek,
        schedule_slot: &str,
        subject_id: &str,
        teacher_id: &str,
    ) -> DomainResult<Self> {
        Ok(Self {
            entry_id,
            time_table_id: require_non_empty("time_table_id", time_table_id)?,
            day_of_week,
            schedule_slot: require_non_empty("schedule_slot", schedule_slot)?,
            subject_id: require_non_empty("subject_id", subject_id)?,
            teacher_id: require_non_empty("teacher_id", teacher_id)?,
        })
    }

    pub fn cell_key(&self) -> CellKey {
        CellKey {
            time_table_id: self.time_table_id.clone(),
            day_of_week: self.day_of_week,
            schedule_slot: self.schedule_slot.clone(),
        }
    }

    pub fn is_cell(&self, cell: &CellKey) -> bool {
        self.time_table_id == cell.time_table_id
            && self.day_of_week == cell.day_of_week
            && self.schedule_slot == cell.schedule_slot
    }
}

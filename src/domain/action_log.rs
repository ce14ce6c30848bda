// ==========================================
// 学校教务排课核心 - 操作日志领域模型
// ==========================================
// 红线: 所有管理员写操作必须记录
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub action_type: String,
    pub action_ts: NaiveDateTime,
    pub actor: String,
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

impl ActionLog {
    /// 以当前时间创建日志
    pub fn now(
        action_type: ActionType,
        actor: &str,
        payload_json: Option<JsonValue>,
        detail: Option<String>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: actor.to_string(),
            payload_json,
            detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    SaveWorkingDay,
    DeleteWorkingDay,
    SaveHoliday,
    DeleteHoliday,
    CreateSlot,
    UpdateSlot,
    DeleteSlot,
    AssignTeacher,
    UpdateAssignment,
    UnassignTeacher,
    CreateTimetable,
    SetTimetableStatus,
    PlaceEntry,
    ClearEntry,
    ImportConfig,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::SaveWorkingDay => "SAVE_WORKING_DAY",
            ActionType::DeleteWorkingDay => "DELETE_WORKING_DAY",
            ActionType::SaveHoliday => "SAVE_HOLIDAY",
            ActionType::DeleteHoliday => "DELETE_HOLIDAY",
            ActionType::CreateSlot => "CREATE_SLOT",
            ActionType::UpdateSlot => "UPDATE_SLOT",
            ActionType::DeleteSlot => "DELETE_SLOT",
            ActionType::AssignTeacher => "ASSIGN_TEACHER",
            ActionType::UpdateAssignment => "UPDATE_ASSIGNMENT",
            ActionType::UnassignTeacher => "UNASSIGN_TEACHER",
            ActionType::CreateTimetable => "CREATE_TIMETABLE",
            ActionType::SetTimetableStatus => "SET_TIMETABLE_STATUS",
            ActionType::PlaceEntry => "PLACE_ENTRY",
            ActionType::ClearEntry => "CLEAR_ENTRY",
            ActionType::ImportConfig => "IMPORT_CONFIG",
        }
    }
}

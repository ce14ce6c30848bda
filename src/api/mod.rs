// ==========================================
// 学校教务排课核心 - API 层
// ==========================================
// 职责: 提供入站业务接口，供外层请求处理器调用
// 约定: 参数校验 → 引擎调用（业务写入与 ActionLog 同事务提交）
// ==========================================

pub mod assignment_api;
pub mod calendar_api;
pub mod error;
pub mod import_api;
pub mod schedule_api;
pub mod timetable_api;
pub mod validator;

// 重导出核心类型
pub use assignment_api::{AssignTeacherRequest, AssignmentApi};
pub use calendar_api::CalendarApi;
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use schedule_api::{ScheduleApi, SlotInput};
pub use timetable_api::{AvailabilityReport, TimetableApi};

use crate::domain::action_log::{ActionLog, ActionType};

/// 构造管理员写操作日志（由引擎在业务写入的同一事务内落库）
pub(crate) fn build_action_log(
    action_type: ActionType,
    actor: &str,
    payload: serde_json::Value,
    detail: String,
) -> ActionLog {
    ActionLog::now(action_type, actor, Some(payload), Some(detail))
}

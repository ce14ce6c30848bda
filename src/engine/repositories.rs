// ==========================================
// 学校教务排课核心 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合排课引擎所需的共享连接、Repository 与配置
// 约定: 写路径通过 conn + `*_tx` 关联函数在同一事务内完成；
//       读路径可直接使用各 Repository 的实例方法
// ==========================================

use std::sync::Arc;

use crate::config::ConfigManager;
use crate::db::SharedConnection;
use crate::repository::{
    ActionLogRepository, PublicHolidayRepository, ScheduleSlotRepository,
    TeacherMappingRepository, TimeTableRepository, WorkingDayRepository,
};

/// 排课引擎仓储集合
///
/// 所有 Repository 共用同一个 `SharedConnection`。
#[derive(Clone)]
pub struct SchoolRepositories {
    /// 共享连接（写事务入口）
    pub conn: SharedConnection,
    pub working_day_repo: Arc<WorkingDayRepository>,
    pub holiday_repo: Arc<PublicHolidayRepository>,
    pub slot_repo: Arc<ScheduleSlotRepository>,
    pub mapping_repo: Arc<TeacherMappingRepository>,
    pub timetable_repo: Arc<TimeTableRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,
    pub config: Arc<ConfigManager>,
}

impl SchoolRepositories {
    /// 基于共享连接构造全部仓储
    pub fn new(conn: SharedConnection) -> Self {
        Self {
            working_day_repo: Arc::new(WorkingDayRepository::new(conn.clone())),
            holiday_repo: Arc::new(PublicHolidayRepository::new(conn.clone())),
            slot_repo: Arc::new(ScheduleSlotRepository::new(conn.clone())),
            mapping_repo: Arc::new(TeacherMappingRepository::new(conn.clone())),
            timetable_repo: Arc::new(TimeTableRepository::new(conn.clone())),
            action_log_repo: Arc::new(ActionLogRepository::new(conn.clone())),
            config: Arc::new(ConfigManager::new(conn.clone())),
            conn,
        }
    }
}

// ==========================================
// 学校教务排课核心 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接、引擎与 API 实例
// ==========================================

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{AssignmentApi, CalendarApi, ImportApi, ScheduleApi, TimetableApi};
use crate::config::ConfigManager;
use crate::db::{open_shared_connection, SharedConnection};
use crate::engine::{
    AssignmentLedger, ConflictDetector, SchoolRepositories, ScheduleSlotRegistry, TimetableAllocator,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SCHOOL_TIMETABLE_DB_PATH";

const DB_FILE_NAME: &str = "school_timetable.db";
const DATA_DIR_NAME: &str = "school-timetable";

/// 应用状态
///
/// 所有 API 共用同一个共享连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 仓储集合（含共享连接与配置）
    pub repos: SchoolRepositories,

    /// 校历 API
    pub calendar_api: Arc<CalendarApi>,

    /// 作息节次 API
    pub schedule_api: Arc<ScheduleApi>,

    /// 任课分配 API
    pub assignment_api: Arc<AssignmentApi>,

    /// 课表 API
    pub timetable_api: Arc<TimetableApi>,

    /// 配置导入 API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 打开数据库（确保 schema）并装配全部 API
    pub fn new(db_path: String) -> anyhow::Result<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_shared_connection(&db_path)
            .with_context(|| format!("无法打开数据库: {}", db_path))?;
        Ok(Self::from_connection(db_path, conn))
    }

    /// 基于已打开的共享连接装配
    pub fn from_connection(db_path: String, conn: SharedConnection) -> Self {
        let repos = SchoolRepositories::new(conn);

        // ==========================================
        // 引擎层
        // ==========================================
        let registry = Arc::new(ScheduleSlotRegistry::new(repos.clone()));
        let ledger = Arc::new(AssignmentLedger::new(repos.clone()));
        let allocator = Arc::new(TimetableAllocator::new(repos.clone()));
        let detector = Arc::new(ConflictDetector::new(repos.clone()));

        // ==========================================
        // API 层
        // ==========================================
        let calendar_api = Arc::new(CalendarApi::new(repos.clone(), registry.clone()));
        let schedule_api = Arc::new(ScheduleApi::new(registry));
        let assignment_api = Arc::new(AssignmentApi::new(ledger));
        let timetable_api = Arc::new(TimetableApi::new(repos.clone(), allocator, detector));
        let import_api = Arc::new(ImportApi::new(repos.clone()));

        tracing::info!("AppState初始化完成");

        Self {
            db_path,
            repos,
            calendar_api,
            schedule_api,
            assignment_api,
            timetable_api,
            import_api,
        }
    }

    /// 配置管理器
    pub fn config(&self) -> &Arc<ConfigManager> {
        &self.repos.config
    }
}

/// 默认数据库路径
///
/// 优先级:
/// 1. 环境变量 SCHOOL_TIMETABLE_DB_PATH
/// 2. 用户数据目录 / school-timetable / school_timetable.db
/// 3. 当前目录 ./school_timetable.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join(DATA_DIR_NAME);
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join(DB_FILE_NAME),
            Err(e) => tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", dir.display(), e),
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_app_state_wires_all_apis() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert!(state.schedule_api.list_slots(crate::domain::DayOfWeek::Monday).unwrap().is_empty());
        assert_eq!(state.assignment_api.teacher_load("T1").unwrap(), 0);
    }

    #[test]
    fn test_default_db_path_from_env() {
        std::env::set_var(DB_PATH_ENV, "  /tmp/custom_timetable.db  ");
        assert_eq!(get_default_db_path(), "/tmp/custom_timetable.db");
        std::env::remove_var(DB_PATH_ENV);

        assert!(get_default_db_path().ends_with(DB_FILE_NAME));
    }
}

// ==========================================
// 学校教务排课核心 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 校历判定、作息节次、任课分配、课表排课与冲突检测
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - CSV 批量配置
pub mod importer;

// 配置层 - 策略配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 入站业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ActionLog, ActionType, CellKey, DayClass, DayOfWeek, DayType, DivisionAssignment,
    HolidayType, PublicHoliday, RecordStatus, ScheduleSlot, SlotType, TeacherMapping, TimeTable,
    TimeTableEntry, TimeWindow, WorkingDay,
};

// 引擎
pub use engine::{
    AssignmentLedger, CalendarDayModel, Conflict, ConflictDetector, ScheduleError,
    ScheduleSlotRegistry, TimetableAllocator,
};

// API
pub use api::{ApiError, ApiResult, AssignmentApi, CalendarApi, ScheduleApi, TimetableApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学校教务排课核心";

// ==========================================
// 学校教务排课核心 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约定: `*_tx` 关联函数接受 &Connection（可传入 Transaction），
//       供引擎在同一写事务内完成“先查后写”
// ==========================================

pub mod action_log_repo;
pub mod error;
pub mod holiday_repo;
pub mod schedule_slot_repo;
pub mod teacher_mapping_repo;
pub mod timetable_repo;
pub mod working_day_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use holiday_repo::PublicHolidayRepository;
pub use schedule_slot_repo::ScheduleSlotRepository;
pub use teacher_mapping_repo::TeacherMappingRepository;
pub use timetable_repo::TimeTableRepository;
pub use working_day_repo::WorkingDayRepository;

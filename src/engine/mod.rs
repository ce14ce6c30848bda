// ==========================================
// 学校教务排课核心 - 引擎层
// ==========================================
// 职责: 实现排课业务规则，不拼 SQL
// 红线: Engine 不拼 SQL，所有拒绝必须返回类型化错误
// 约定: 写操作经 transaction::with_audited_write_tx 在 IMMEDIATE 事务内完成“先查后写”与操作日志
// ==========================================

pub mod assignment_ledger;
pub mod calendar_day;
pub mod conflict_detector;
pub mod error;
pub mod repositories;
pub mod slot_registry;
pub mod timetable_allocator;
pub mod transaction;

// 重导出核心引擎
pub use assignment_ledger::{AssignmentKey, AssignmentLedger};
pub use calendar_day::{CalendarDayModel, DayPlan};
pub use conflict_detector::{Conflict, ConflictDetector, ConflictQuery};
pub use error::{ScheduleError, ScheduleResult};
pub use repositories::SchoolRepositories;
pub use slot_registry::ScheduleSlotRegistry;
pub use timetable_allocator::{PlacementRequest, TimetableAllocator};

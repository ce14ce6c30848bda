// ==========================================
// 学校教务排课核心 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型、构造期校验
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod calendar;
pub mod error;
pub mod mapping;
pub mod schedule;
pub mod time_window;
pub mod timetable;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use calendar::{PublicHoliday, WorkingDay};
pub use error::{DomainError, DomainResult};
pub use mapping::{DivisionAssignment, TeacherMapping};
pub use schedule::ScheduleSlot;
pub use time_window::TimeWindow;
pub use timetable::{CellKey, TimeTable, TimeTableEntry};
pub use types::{DayClass, DayOfWeek, DayType, HolidayType, RecordStatus, SlotType};

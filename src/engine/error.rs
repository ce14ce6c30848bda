// ==========================================
// 学校教务排课核心 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 每个校验失败是一个独立的类型化错误，不做自动修正
// ==========================================

use crate::domain::error::DomainError;
use crate::domain::types::{DayOfWeek, SlotType};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum ScheduleError {
    // ===== 作息配置错误 =====
    #[error("节次越界: {day} {name} {window}（{reason}）")]
    SlotOutOfBounds {
        day: DayOfWeek,
        name: String,
        window: String,
        reason: String,
    },

    #[error("节次时间重叠: {day} {name} 与 {existing} 重叠")]
    SlotOverlap {
        day: DayOfWeek,
        name: String,
        existing: String,
    },

    #[error("节次仍被课表引用: {day} {name}（{references} 条）")]
    SlotInUse {
        day: DayOfWeek,
        name: String,
        references: usize,
    },

    #[error("节次名称重复: {day} {slot_type} {name}")]
    DuplicateSlotName {
        day: DayOfWeek,
        slot_type: SlotType,
        name: String,
    },

    #[error("作息时间调整后以下节次越界: {day} {slots:?}")]
    WorkingWindowExcludesSlots { day: DayOfWeek, slots: Vec<String> },

    // ===== 任课分配错误 =====
    #[error("任课映射已存在: class={class_name} subject={subject_id} division={division}")]
    DuplicateMapping {
        class_name: String,
        subject_id: String,
        division: String,
    },

    #[error("任课映射不存在: class={class_name} subject={subject_id} division={division}")]
    MappingNotFound {
        class_name: String,
        subject_id: String,
        division: String,
    },

    // ===== 排课错误 =====
    #[error("节次不存在: {day} {name}")]
    UnknownSlot { day: DayOfWeek, name: String },

    #[error("课间节次不能排课: {day} {name}")]
    SlotIsBreak { day: DayOfWeek, name: String },

    #[error("课表不存在: {0}")]
    TimetableNotFound(String),

    #[error("课表已存在: {academic_year} {class_name}-{division}")]
    DuplicateTimetable {
        academic_year: String,
        class_name: String,
        division: String,
    },

    #[error("教师未任教该科目: teacher={teacher_id} class={class_name} subject={subject_id} division={division}")]
    TeacherNotMappedToSubject {
        teacher_id: String,
        class_name: String,
        subject_id: String,
        division: String,
    },

    #[error("教师时间冲突: teacher={teacher_id} {day} {window}（已占用 {conflicts} 节）")]
    TeacherDoubleBooked {
        teacher_id: String,
        day: DayOfWeek,
        window: String,
        conflicts: usize,
    },

    // ===== 并发控制错误 =====
    #[error("并发修改冲突，请刷新后重试: {operation}")]
    ConcurrentModification { operation: String },

    // ===== 下层错误 =====
    #[error("数据校验失败: {0}")]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ScheduleError {
    /// 是否为存储层写冲突（事务助手据此重试）
    pub fn is_write_conflict(&self) -> bool {
        matches!(self, ScheduleError::Repository(e) if e.is_write_conflict())
    }
}

/// Result 类型别名
pub type ScheduleResult<T> = Result<T, ScheduleError>;

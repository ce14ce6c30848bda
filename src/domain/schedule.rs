// ==========================================
// 学校教务排课核心 - 作息节次领域模型
// ==========================================
// 对齐: school_schedule 表
// 名称在 (day_of_week, slot_type) 内唯一，视为不透明键
// ==========================================

use crate::domain::error::{require_non_empty, DomainError, DomainResult};
use crate::domain::time_window::TimeWindow;
use crate::domain::types::{DayOfWeek, SlotType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleSlotRecord")]
pub struct ScheduleSlot {
    slot_id: String,
    day_of_week: DayOfWeek,
    slot_type: SlotType,
    name: String,
    window: TimeWindow,
}

impl ScheduleSlot {
    pub fn new(
        slot_id: String,
        day_of_week: DayOfWeek,
        slot_type: SlotType,
        name: &str,
        window: TimeWindow,
    ) -> DomainResult<Self> {
        let name = require_non_empty("name", name)?;
        Ok(Self {
            slot_id,
            day_of_week,
            slot_type,
            name,
            window,
        })
    }

    /// 生成新 ID 的便捷构造
    pub fn create(
        day_of_week: DayOfWeek,
        slot_type: SlotType,
        name: &str,
        window: TimeWindow,
    ) -> DomainResult<Self> {
        Self::new(uuid::Uuid::new_v4().to_string(), day_of_week, slot_type, name, window)
    }

    /// 保留 ID，替换其余字段（用于编辑）
    pub fn with_id(&self, slot_id: &str) -> Self {
        Self {
            slot_id: slot_id.to_string(),
            ..self.clone()
        }
    }

    pub fn slot_id(&self) -> &str {
        &self.slot_id
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    pub fn slot_type(&self) -> SlotType {
        self.slot_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn is_period(&self) -> bool {
        self.slot_type == SlotType::Period
    }
}

#[derive(Deserialize)]
struct ScheduleSlotRecord {
    slot_id: String,
    day_of_week: DayOfWeek,
    slot_type: SlotType,
    name: String,
    window: TimeWindow,
}

impl TryFrom<ScheduleSlotRecord> for ScheduleSlot {
    type Error = DomainError;

    fn try_from(raw: ScheduleSlotRecord) -> DomainResult<Self> {
        Self::new(raw.slot_id, raw.day_of_week, raw.slot_type, &raw.name, raw.window)
    }
}

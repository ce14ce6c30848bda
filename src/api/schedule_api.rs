// ==========================================
// 学校教务排课核心 - 作息节次 API
// ==========================================
// 职责: 节次查询、新建、修改、删除
// ==========================================

use serde_json::json;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::build_action_log;
use crate::api::validator::{parse_window, require_non_blank};
use crate::domain::action_log::ActionType;
use crate::domain::schedule::ScheduleSlot;
use crate::domain::types::{DayOfWeek, SlotType};
use crate::engine::slot_registry::ScheduleSlotRegistry;

/// 节次输入
#[derive(Debug, Clone)]
pub struct SlotInput<'a> {
    pub day_of_week: DayOfWeek,
    pub slot_type: SlotType,
    pub name: &'a str,
    pub timing_from: &'a str,
    pub timing_to: &'a str,
}

impl SlotInput<'_> {
    fn to_slot(&self) -> ApiResult<ScheduleSlot> {
        let name = require_non_blank("节次名称", self.name)?;
        let window = parse_window(self.timing_from, self.timing_to)?;
        Ok(ScheduleSlot::create(self.day_of_week, self.slot_type, name, window)?)
    }
}

// ==========================================
// ScheduleApi
// ==========================================
pub struct ScheduleApi {
    registry: Arc<ScheduleSlotRegistry>,
}

impl ScheduleApi {
    pub fn new(registry: Arc<ScheduleSlotRegistry>) -> Self {
        Self { registry }
    }

    /// 某星期的节次（按开始时间排序）
    pub fn list_slots(&self, day: DayOfWeek) -> ApiResult<Vec<ScheduleSlot>> {
        Ok(self.registry.slots_for(day)?)
    }

    /// 建议的下一个节次名称
    pub fn suggest_slot_name(&self, day: DayOfWeek, slot_type: SlotType) -> ApiResult<String> {
        Ok(self.registry.next_slot_name(day, slot_type)?)
    }

    /// 预检节次（不写入）
    pub fn validate_slot(&self, input: &SlotInput<'_>) -> ApiResult<()> {
        let slot = input.to_slot()?;
        Ok(self.registry.validate_new_slot(&slot)?)
    }

    /// 新建节次
    pub fn create_slot(&self, input: &SlotInput<'_>, actor: &str) -> ApiResult<ScheduleSlot> {
        let actor = require_non_blank("操作人", actor)?;
        let audit = |slot: &ScheduleSlot| {
            Some(build_action_log(
                ActionType::CreateSlot,
                actor,
                slot_payload(slot),
                format!("新建节次: {} {}", slot.day_of_week(), slot.name()),
            ))
        };
        Ok(self.registry.create_slot(input.to_slot()?, &audit)?)
    }

    /// 修改节次
    pub fn update_slot(&self, slot_id: &str, input: &SlotInput<'_>, actor: &str) -> ApiResult<ScheduleSlot> {
        let slot_id = require_non_blank("节次ID", slot_id)?;
        let actor = require_non_blank("操作人", actor)?;
        let audit = |slot: &ScheduleSlot| {
            Some(build_action_log(
                ActionType::UpdateSlot,
                actor,
                slot_payload(slot),
                format!("修改节次: {} {}", slot.day_of_week(), slot.name()),
            ))
        };
        Ok(self.registry.update_slot(slot_id, &input.to_slot()?, &audit)?)
    }

    /// 删除节次（同名时删除 Period）
    pub fn delete_slot(&self, day: DayOfWeek, name: &str, actor: &str) -> ApiResult<ScheduleSlot> {
        let name = require_non_blank("节次名称", name)?;
        let actor = require_non_blank("操作人", actor)?;
        let audit = |slot: &ScheduleSlot| {
            Some(build_action_log(
                ActionType::DeleteSlot,
                actor,
                slot_payload(slot),
                format!("删除节次: {} {}", day, slot.name()),
            ))
        };
        Ok(self.registry.delete_slot(day, name, &audit)?)
    }
}

fn slot_payload(slot: &ScheduleSlot) -> serde_json::Value {
    json!({
        "slot_id": slot.slot_id(),
        "day_of_week": slot.day_of_week().to_db_str(),
        "slot_type": slot.slot_type().to_db_str(),
        "name": slot.name(),
        "window": slot.window().to_string(),
    })
}

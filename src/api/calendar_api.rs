// ==========================================
// 学校教务排课核心 - 校历 API
// ==========================================
// 职责: 日期判定、工作日定义与公共假日维护
// ==========================================

use serde_json::json;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::build_action_log;
use crate::api::validator::require_non_blank;
use crate::domain::action_log::ActionType;
use crate::domain::calendar::{PublicHoliday, WorkingDay};
use crate::domain::time_window::format_date;
use crate::domain::types::{DayClass, DayOfWeek};
use crate::engine::calendar_day::{CalendarDayModel, DayPlan};
use crate::engine::repositories::SchoolRepositories;
use crate::engine::slot_registry::ScheduleSlotRegistry;
use crate::engine::transaction::with_audited_write_tx;
use crate::repository::PublicHolidayRepository;
use chrono::NaiveDate;

// ==========================================
// CalendarApi
// ==========================================
pub struct CalendarApi {
    repos: SchoolRepositories,
    registry: Arc<ScheduleSlotRegistry>,
}

impl CalendarApi {
    pub fn new(repos: SchoolRepositories, registry: Arc<ScheduleSlotRegistry>) -> Self {
        Self { repos, registry }
    }

    /// 判定日期类型
    pub fn classify_date(&self, date: NaiveDate) -> ApiResult<DayClass> {
        Ok(self.registry.classify_date(date)?)
    }

    /// 某日期的有效作息（窗口、有效节次、被取消节次）
    pub fn day_plan(&self, date: NaiveDate) -> ApiResult<DayPlan> {
        Ok(self.registry.effective_slots_on(date)?)
    }

    /// 日期的隔周编号（ISO 周序号）
    pub fn week_tag(&self, date: NaiveDate) -> u32 {
        CalendarDayModel::iso_week_tag(date)
    }

    // ==========================================
    // 工作日定义
    // ==========================================

    pub fn list_working_days(&self) -> ApiResult<Vec<WorkingDay>> {
        Ok(self.repos.working_day_repo.find_all()?)
    }

    pub fn save_working_day(&self, working_day: &WorkingDay, actor: &str) -> ApiResult<()> {
        let actor = require_non_blank("操作人", actor)?;
        let audit = |_: &()| {
            Some(build_action_log(
                ActionType::SaveWorkingDay,
                actor,
                json!({
                    "day_of_week": working_day.day_of_week().to_db_str(),
                    "day_type": working_day.day_type().to_db_str(),
                    "alternate_weeks": working_day.alternate_weeks(),
                    "timing": working_day.timing().map(|w| w.to_string()),
                }),
                format!("保存工作日定义: {}", working_day.day_of_week()),
            ))
        };
        Ok(self.registry.save_working_day(working_day, &audit)?)
    }

    pub fn delete_working_day(&self, day: DayOfWeek, actor: &str) -> ApiResult<bool> {
        let actor = require_non_blank("操作人", actor)?;
        let audit = |removed: &bool| {
            removed.then(|| {
                build_action_log(
                    ActionType::DeleteWorkingDay,
                    actor,
                    json!({ "day_of_week": day.to_db_str() }),
                    format!("删除工作日定义: {}", day),
                )
            })
        };
        Ok(self.registry.delete_working_day(day, &audit)?)
    }

    // ==========================================
    // 公共假日
    // ==========================================

    pub fn list_holidays(&self, year: i32) -> ApiResult<Vec<PublicHoliday>> {
        Ok(self.repos.holiday_repo.find_by_year(year)?)
    }

    pub fn holidays_between(&self, from: NaiveDate, to: NaiveDate) -> ApiResult<Vec<PublicHoliday>> {
        if from > to {
            return Err(ApiError::InvalidInput(format!(
                "日期区间无效: {} > {}",
                format_date(from),
                format_date(to)
            )));
        }
        Ok(self.repos.holiday_repo.find_in_range(from, to)?)
    }

    pub fn save_holiday(&self, holiday: &PublicHoliday, actor: &str) -> ApiResult<()> {
        let actor = require_non_blank("操作人", actor)?;
        let audit = |_: &()| {
            Some(build_action_log(
                ActionType::SaveHoliday,
                actor,
                json!({
                    "holiday_id": holiday.holiday_id(),
                    "year": holiday.year(),
                    "holiday_type": holiday.holiday_type().to_db_str(),
                    "from_date": format_date(holiday.from_date()),
                    "to_date": format_date(holiday.to_date()),
                }),
                format!("保存公共假日: {}", holiday.description()),
            ))
        };
        with_audited_write_tx(&self.repos.conn, "save_holiday", &audit, |tx| {
            Ok(PublicHolidayRepository::upsert_tx(tx, holiday)?)
        })?;

        tracing::info!(
            holiday_id = holiday.holiday_id(),
            from = %holiday.from_date(),
            to = %holiday.to_date(),
            holiday_type = holiday.holiday_type().to_db_str(),
            "公共假日已保存"
        );
        Ok(())
    }

    pub fn delete_holiday(&self, holiday_id: &str, actor: &str) -> ApiResult<bool> {
        let holiday_id = require_non_blank("假日ID", holiday_id)?;
        let actor = require_non_blank("操作人", actor)?;
        let audit = |removed: &bool| {
            removed.then(|| {
                build_action_log(
                    ActionType::DeleteHoliday,
                    actor,
                    json!({ "holiday_id": holiday_id }),
                    format!("删除公共假日: {}", holiday_id),
                )
            })
        };
        let removed = with_audited_write_tx(&self.repos.conn, "delete_holiday", &audit, |tx| {
            Ok(PublicHolidayRepository::delete_tx(tx, holiday_id)? > 0)
        })?;

        if removed {
            tracing::info!(holiday_id, "公共假日已删除");
        }
        Ok(removed)
    }
}

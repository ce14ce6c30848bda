// ==========================================
// 学校教务排课核心 - 作息配置批量导入
// ==========================================
// 输入: CSV
// - 工作日: day_of_week, day_type, alternate_weeks, timing_from, timing_to
// - 节次:   day_of_week, slot_type, name, timing_from, timing_to
// 约定: 每行经 ScheduleSlotRegistry 的同一套校验写入；单行被拒不影响其余行
//       每个成功行在其写事务内记录一条 IMPORT_CONFIG 操作日志
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::calendar::WorkingDay;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::schedule::ScheduleSlot;
use crate::domain::time_window::TimeWindow;
use crate::domain::types::{DayOfWeek, DayType, SlotType};
use crate::engine::error::ScheduleResult;
use crate::engine::repositories::SchoolRepositories;
use crate::engine::slot_registry::ScheduleSlotRegistry;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{CsvParser, RawRow};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

pub const WORKING_DAY_COLUMNS: [&str; 5] =
    ["day_of_week", "day_type", "alternate_weeks", "timing_from", "timing_to"];
pub const SLOT_COLUMNS: [&str; 5] = ["day_of_week", "slot_type", "name", "timing_from", "timing_to"];

/// 被拒绝的行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub row: usize,
    pub reason: String,
}

/// 导入结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: Vec<RowRejection>,
}

impl ImportReport {
    fn reject(&mut self, row: usize, reason: String) {
        warn!(row, "导入行被拒绝: {}", reason);
        self.rejected.push(RowRejection { row, reason });
    }
}

// ==========================================
// ScheduleConfigImporter
// ==========================================
pub struct ScheduleConfigImporter {
    registry: ScheduleSlotRegistry,
    parser: CsvParser,
}

impl ScheduleConfigImporter {
    pub fn new(repos: SchoolRepositories) -> Self {
        Self {
            registry: ScheduleSlotRegistry::new(repos),
            parser: CsvParser,
        }
    }

    /// 导入工作日定义
    pub fn import_working_days(
        &self,
        file_path: impl AsRef<Path>,
        actor: &str,
    ) -> ImportResult<ImportReport> {
        let path = file_path.as_ref();
        let rows = self.parser.parse(path, &WORKING_DAY_COLUMNS[..2])?;

        let mut report = ImportReport::default();
        for row in &rows {
            let audit = |_: &()| Some(row_action_log(actor, "working_day", path, row));
            let outcome: ScheduleResult<()> = parse_working_day(row)
                .map_err(Into::into)
                .and_then(|wd| self.registry.save_working_day(&wd, &audit));
            match outcome {
                Ok(()) => report.imported += 1,
                Err(e) => report.reject(row.row_number, e.to_string()),
            }
        }

        info!(
            file = %path.display(),
            imported = report.imported,
            rejected = report.rejected.len(),
            "工作日定义导入完成"
        );
        Ok(report)
    }

    /// 导入节次
    pub fn import_slots(&self, file_path: impl AsRef<Path>, actor: &str) -> ImportResult<ImportReport> {
        let path = file_path.as_ref();
        let rows = self.parser.parse(path, &SLOT_COLUMNS)?;

        let mut report = ImportReport::default();
        for row in &rows {
            let audit = |_: &ScheduleSlot| Some(row_action_log(actor, "school_schedule", path, row));
            let outcome = parse_slot(row)
                .map_err(Into::into)
                .and_then(|slot| self.registry.create_slot(slot, &audit));
            match outcome {
                Ok(_) => report.imported += 1,
                Err(e) => report.reject(row.row_number, e.to_string()),
            }
        }

        info!(
            file = %path.display(),
            imported = report.imported,
            rejected = report.rejected.len(),
            "节次导入完成"
        );
        Ok(report)
    }
}

// ==========================================
// 行解析
// ==========================================

fn row_action_log(actor: &str, target: &str, path: &Path, row: &RawRow) -> ActionLog {
    ActionLog::now(
        ActionType::ImportConfig,
        actor,
        Some(json!({
            "target": target,
            "file": path.display().to_string(),
            "row": row.row_number,
        })),
        Some(format!("导入 {}: 第 {} 行", target, row.row_number)),
    )
}

fn parse_working_day(row: &RawRow) -> DomainResult<WorkingDay> {
    let day = DayOfWeek::from_db_str(row.get("day_of_week"))?;
    let day_type = DayType::from_db_str(row.get("day_type"))?;
    let weeks = parse_week_tags(row.get("alternate_weeks"))?;
    let timing = match (row.get_opt("timing_from"), row.get_opt("timing_to")) {
        (Some(from), Some(to)) => Some(TimeWindow::parse(from, to)?),
        _ => None,
    };
    WorkingDay::new(day, day_type, weeks, timing)
}

fn parse_slot(row: &RawRow) -> DomainResult<ScheduleSlot> {
    let day = DayOfWeek::from_db_str(row.get("day_of_week"))?;
    let slot_type = SlotType::from_db_str(row.get("slot_type"))?;
    let window = TimeWindow::parse(row.get("timing_from"), row.get("timing_to"))?;
    ScheduleSlot::create(day, slot_type, row.get("name"), window)
}

/// 解析周序号列表（分隔符: 分号/逗号/空白），例如 "2;4"
pub fn parse_week_tags(raw: &str) -> DomainResult<Vec<u32>> {
    raw.split(|c: char| c == ';' || c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|_| DomainError::UnknownValue {
                field: "alternate_weeks".to_string(),
                value: part.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_week_tags() {
        assert_eq!(parse_week_tags("2;4").unwrap(), vec![2, 4]);
        assert_eq!(parse_week_tags(" 1, 3  5 ").unwrap(), vec![1, 3, 5]);
        assert!(parse_week_tags("").unwrap().is_empty());
        assert!(parse_week_tags("2;x").is_err());
    }
}

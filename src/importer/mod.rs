// ==========================================
// 学校教务排课核心 - 导入层
// ==========================================
// 职责: 批量导入作息配置（工作日、节次）
// 支持: CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod schedule_config_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, RawRow};
pub use schedule_config_importer::{ImportReport, RowRejection, ScheduleConfigImporter};

// ==========================================
// 学校教务排课核心 - 命令行入口
// ==========================================
// 职责: 打开数据库、确保 schema、输出当前配置摘要
// 用法: school-timetable [--json-log] [数据库路径]
//   --json-log  以 JSON 行输出日志
// ==========================================

use school_timetable::app::{get_default_db_path, AppState};
use school_timetable::db::read_schema_version;
use school_timetable::domain::DayOfWeek;

const JSON_LOG_FLAG: &str = "--json-log";

/// 命令行参数
#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    json_log: bool,
    db_path: Option<String>,
}

impl CliArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut json_log = false;
        let mut db_path = None;
        for arg in args {
            if arg == JSON_LOG_FLAG {
                json_log = true;
            } else if db_path.is_none() && !arg.starts_with("--") {
                db_path = Some(arg);
            }
        }
        Self { json_log, db_path }
    }
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse(std::env::args().skip(1));
    if args.json_log {
        school_timetable::logging::init_json();
    } else {
        school_timetable::logging::init();
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", school_timetable::APP_NAME, school_timetable::VERSION);
    tracing::info!("==================================================");

    let db_path = args.db_path.unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path)?;

    let schema_version = {
        let conn = state
            .repos
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("数据库锁获取失败: {}", e))?;
        read_schema_version(&conn)?
    };
    tracing::info!("数据库: {} (schema_version={:?})", state.db_path, schema_version);
    tracing::info!("配置: {}", state.config().get_config_snapshot()?);

    let working_days = state.calendar_api.list_working_days()?;
    tracing::info!("已配置工作日: {}", working_days.len());
    for day in DayOfWeek::ALL {
        let slots = state.schedule_api.list_slots(day)?;
        if !slots.is_empty() {
            tracing::info!("{}: {} 个节次", day, slots.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_json_log_flag_in_any_position() {
        assert_eq!(
            parse(&["--json-log", "school.db"]),
            CliArgs { json_log: true, db_path: Some("school.db".to_string()) }
        );
        assert_eq!(
            parse(&["school.db", "--json-log"]),
            CliArgs { json_log: true, db_path: Some("school.db".to_string()) }
        );
    }

    #[test]
    fn test_defaults_to_plain_log() {
        assert_eq!(parse(&[]), CliArgs { json_log: false, db_path: None });
        assert_eq!(
            parse(&["school.db"]),
            CliArgs { json_log: false, db_path: Some("school.db".to_string()) }
        );
    }
}

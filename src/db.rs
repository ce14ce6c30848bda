// ==========================================
// 学校教务排课核心 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，写锁等待有上限，不无限阻塞
// - 统一建表（幂等）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 进程内共享连接
pub type SharedConnection = Arc<Mutex<Connection>>;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开连接、确保 schema，并包装为共享连接
pub fn open_shared_connection(db_path: &str) -> rusqlite::Result<SharedConnection> {
    let conn = open_sqlite_connection(db_path)?;
    ensure_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 建表（幂等）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS working_day (
            day_of_week TEXT PRIMARY KEY,
            day_type TEXT NOT NULL,
            alternate_weeks_json TEXT NOT NULL DEFAULT '[]',
            timing_from TEXT,
            timing_to TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS public_holiday (
            holiday_id TEXT PRIMARY KEY,
            year INTEGER NOT NULL,
            description TEXT NOT NULL,
            holiday_type TEXT NOT NULL,
            from_date TEXT NOT NULL,
            to_date TEXT NOT NULL,
            CHECK (from_date <= to_date)
        );
        CREATE INDEX IF NOT EXISTS idx_public_holiday_range
            ON public_holiday(from_date, to_date);

        CREATE TABLE IF NOT EXISTS school_schedule (
            slot_id TEXT PRIMARY KEY,
            day_of_week TEXT NOT NULL,
            slot_type TEXT NOT NULL,
            name TEXT NOT NULL,
            timing_from TEXT NOT NULL,
            timing_to TEXT NOT NULL,
            UNIQUE(day_of_week, slot_type, name)
        );
        CREATE INDEX IF NOT EXISTS idx_school_schedule_day
            ON school_schedule(day_of_week, timing_from);

        CREATE TABLE IF NOT EXISTS teacher_mapping (
            mapping_id TEXT PRIMARY KEY,
            class_name TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            divisions_json TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'active',
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(class_name, subject_id)
        );
        CREATE INDEX IF NOT EXISTS idx_teacher_mapping_class
            ON teacher_mapping(class_name);

        CREATE TABLE IF NOT EXISTS time_table (
            time_table_id TEXT PRIMARY KEY,
            academic_year TEXT NOT NULL,
            class_name TEXT NOT NULL,
            division TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            UNIQUE(academic_year, class_name, division)
        );

        CREATE TABLE IF NOT EXISTS time_table_entry (
            entry_id TEXT PRIMARY KEY,
            time_table_id TEXT NOT NULL REFERENCES time_table(time_table_id) ON DELETE CASCADE,
            day_of_week TEXT NOT NULL,
            schedule_slot TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            teacher_id TEXT NOT NULL,
            UNIQUE(time_table_id, day_of_week, schedule_slot)
        );
        CREATE INDEX IF NOT EXISTS idx_time_table_entry_teacher_day
            ON time_table_entry(teacher_id, day_of_week);
        CREATE INDEX IF NOT EXISTS idx_time_table_entry_slot
            ON time_table_entry(day_of_week, schedule_slot);

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            payload_json TEXT,
            detail TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_action_log_ts
            ON action_log(action_ts DESC);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

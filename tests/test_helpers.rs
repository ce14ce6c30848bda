// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的临时数据库初始化
// ==========================================

use rusqlite::Connection;
use school_timetable::db::{ensure_schema, open_sqlite_connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是有效的 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开一个独立连接（模拟另一个请求处理进程）
pub fn open_connection(db_path: &str) -> Connection {
    open_sqlite_connection(db_path).expect("无法打开测试数据库")
}

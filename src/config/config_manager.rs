// ==========================================
// 学校教务排课核心 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 约定: 配置缺失或格式错误时回退默认值并告警，不阻断业务
// ==========================================

use crate::db::SharedConnection;
use crate::domain::time_window::parse_time;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveTime;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;

/// 配置键
pub mod config_keys {
    /// 半天假日的截止时间（HH:MM），之后的节次当天取消
    pub const HALF_DAY_CUTOFF: &str = "half_day_cutoff";
}

/// 默认半天截止时间
pub const DEFAULT_HALF_DAY_CUTOFF: &str = "12:00";

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: SharedConnection,
}

impl ConfigManager {
    /// 从共享连接创建 ConfigManager
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(json!(config_map).to_string())
    }

    // ===== 校历配置 =====

    /// 半天假日截止时间
    pub fn get_half_day_cutoff(&self) -> RepositoryResult<NaiveTime> {
        let raw = self
            .get_global_config_value(config_keys::HALF_DAY_CUTOFF)?
            .unwrap_or_else(|| DEFAULT_HALF_DAY_CUTOFF.to_string());

        match parse_time(config_keys::HALF_DAY_CUTOFF, &raw) {
            Ok(t) => Ok(t),
            Err(e) => {
                tracing::warn!("配置 {} 无效({})，回退默认值 {}", config_keys::HALF_DAY_CUTOFF, e, DEFAULT_HALF_DAY_CUTOFF);
                parse_time(config_keys::HALF_DAY_CUTOFF, DEFAULT_HALF_DAY_CUTOFF)
                    .map_err(|e| RepositoryError::decode("config_kv", e))
            }
        }
    }
}

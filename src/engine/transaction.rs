// ==========================================
// 学校教务排课核心 - 写事务助手
// ==========================================
// 约束:
// - 所有“先查后写”在同一个 BEGIN IMMEDIATE 事务内完成，写锁在事务开始时获取
// - 存储层写冲突 (SQLITE_BUSY/LOCKED) 仅重试一次（重新读取），仍冲突则返回 ConcurrentModification
// - 业务校验失败时事务回滚，不产生部分写入
// - 操作日志与业务写入在同一事务内落库，日志写入失败时业务写入一并回滚
// ==========================================

use crate::db::SharedConnection;
use crate::domain::action_log::ActionLog;
use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::error::RepositoryError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// 最大尝试次数（首次 + 1 次重试）
pub const MAX_WRITE_ATTEMPTS: u32 = 2;

/// 由写入结果生成操作日志；返回 None 表示本次不记录（如幂等操作无变更）
pub type AuditFn<'a, T> = &'a dyn Fn(&T) -> Option<ActionLog>;

/// 不记录操作日志
pub fn no_audit<T>(_: &T) -> Option<ActionLog> {
    None
}

/// 在写事务内执行 op
///
/// # 参数
/// - conn: 共享连接
/// - operation: 操作名（用于日志与 ConcurrentModification）
/// - op: 事务体；返回 Err 时整体回滚
pub fn with_write_tx<T, F>(conn: &SharedConnection, operation: &str, mut op: F) -> ScheduleResult<T>
where
    F: FnMut(&Transaction<'_>) -> ScheduleResult<T>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match run_once(conn, &mut op) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_write_conflict() => {
                if attempt >= MAX_WRITE_ATTEMPTS {
                    tracing::warn!(operation, attempt, "写事务冲突，放弃重试: {}", e);
                    return Err(ScheduleError::ConcurrentModification {
                        operation: operation.to_string(),
                    });
                }
                tracing::warn!(operation, attempt, "写事务冲突，重新读取后重试: {}", e);
            }
            Err(e) => return Err(e),
        }
    }
}

/// 在写事务内执行 op，并在同一事务内写入 audit 生成的操作日志
pub fn with_audited_write_tx<T, F>(
    conn: &SharedConnection,
    operation: &str,
    audit: AuditFn<'_, T>,
    mut op: F,
) -> ScheduleResult<T>
where
    F: FnMut(&Transaction<'_>) -> ScheduleResult<T>,
{
    with_write_tx(conn, operation, |tx| {
        let value = op(tx)?;
        if let Some(log) = audit(&value) {
            ActionLogRepository::insert_tx(tx, &log)?;
        }
        Ok(value)
    })
}

fn run_once<T, F>(conn: &SharedConnection, op: &mut F) -> ScheduleResult<T>
where
    F: FnMut(&Transaction<'_>) -> ScheduleResult<T>,
{
    let mut guard = conn
        .lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))?;

    let tx = guard
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(RepositoryError::from)?;

    // op 出错时 tx 在 drop 时回滚
    let value = op(&tx)?;
    tx.commit().map_err(RepositoryError::from)?;
    Ok(value)
}

/// 只读访问（不开事务）
pub fn with_read_conn<T, F>(conn: &SharedConnection, op: F) -> ScheduleResult<T>
where
    F: FnOnce(&Connection) -> ScheduleResult<T>,
{
    let guard = conn
        .lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))?;
    op(&guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use crate::domain::action_log::ActionType;
    use std::cell::Cell;
    use std::sync::{Arc, Mutex};

    fn shared() -> SharedConnection {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_rollback_on_error() {
        let conn = shared();
        let result: ScheduleResult<()> = with_write_tx(&conn, "test", |tx| {
            tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', 'k', 'v')",
                [],
            )
            .map_err(RepositoryError::from)?;
            Err(ScheduleError::TimetableNotFound("x".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = with_read_conn(&conn, |c| {
            Ok(c.query_row("SELECT COUNT(*) FROM config_kv", [], |r| r.get(0))
                .map_err(RepositoryError::from)?)
        })
        .unwrap();
        assert_eq!(count, 0, "业务失败时不应有部分写入");
    }

    fn count(conn: &SharedConnection, table: &str) -> i64 {
        with_read_conn(conn, |c| {
            Ok(c.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
                .map_err(RepositoryError::from)?)
        })
        .unwrap()
    }

    fn insert_config(tx: &Transaction<'_>) -> ScheduleResult<()> {
        tx.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', 'k', 'v')",
            [],
        )
        .map_err(RepositoryError::from)?;
        Ok(())
    }

    fn config_log(_: &()) -> Option<ActionLog> {
        Some(ActionLog::now(ActionType::ImportConfig, "admin", None, None))
    }

    #[test]
    fn test_audit_committed_with_write() {
        let conn = shared();
        with_audited_write_tx(&conn, "test", &config_log, insert_config).unwrap();
        assert_eq!(count(&conn, "config_kv"), 1);
        assert_eq!(count(&conn, "action_log"), 1);

        with_audited_write_tx(&conn, "test", &no_audit::<()>, |tx| {
            tx.execute("DELETE FROM config_kv", []).map_err(RepositoryError::from)?;
            Ok(())
        })
        .unwrap();
        assert_eq!(count(&conn, "config_kv"), 0);
        assert_eq!(count(&conn, "action_log"), 1);
    }

    #[test]
    fn test_audit_failure_rolls_back_write() {
        let conn = shared();
        with_read_conn(&conn, |c| {
            c.execute("DROP TABLE action_log", []).map_err(RepositoryError::from)?;
            Ok(())
        })
        .unwrap();

        let result = with_audited_write_tx(&conn, "test", &config_log, insert_config);
        assert!(result.is_err());
        assert_eq!(count(&conn, "config_kv"), 0, "日志写入失败时业务写入应回滚");
    }

    #[test]
    fn test_write_conflict_retried_once_then_surfaced() {
        let conn = shared();
        let calls = Cell::new(0);
        let result: ScheduleResult<()> = with_write_tx(&conn, "place_entry", |_tx| {
            calls.set(calls.get() + 1);
            Err(RepositoryError::WriteConflict("database is locked".to_string()).into())
        });

        assert_eq!(calls.get(), 2);
        assert!(matches!(
            result,
            Err(ScheduleError::ConcurrentModification { ref operation }) if operation == "place_entry"
        ));
    }

    #[test]
    fn test_write_conflict_recovers_on_retry() {
        let conn = shared();
        let calls = Cell::new(0);
        let result = with_write_tx(&conn, "assign", |_tx| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Err(RepositoryError::WriteConflict("busy".to_string()).into())
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
    }
}

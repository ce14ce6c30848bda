// ==========================================
// 学校教务排课核心 - 工作日仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: working_day 表 CRUD；alternate_weeks 以有序 JSON 数组存储
// ==========================================

use crate::db::SharedConnection;
use crate::domain::calendar::WorkingDay;
use crate::domain::time_window::{format_time, TimeWindow};
use crate::domain::types::{DayOfWeek, DayType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};

const TABLE: &str = "working_day";

type WorkingDayRow = (String, String, String, Option<String>, Option<String>);

// ==========================================
// WorkingDayRepository - 工作日仓储
// ==========================================
pub struct WorkingDayRepository {
    conn: SharedConnection,
}

impl WorkingDayRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_day(&self, day: DayOfWeek) -> RepositoryResult<Option<WorkingDay>> {
        let conn = self.get_conn()?;
        Self::find_by_day_tx(&conn, day)
    }

    pub fn find_all(&self) -> RepositoryResult<Vec<WorkingDay>> {
        let conn = self.get_conn()?;
        Self::find_all_tx(&conn)
    }

    pub fn upsert(&self, working_day: &WorkingDay) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::upsert_tx(&conn, working_day)
    }

    pub fn delete(&self, day: DayOfWeek) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Self::delete_tx(&conn, day)
    }

    // ==========================================
    // 事务内操作（conn 可为 Transaction）
    // ==========================================

    pub fn find_by_day_tx(conn: &Connection, day: DayOfWeek) -> RepositoryResult<Option<WorkingDay>> {
        let row: Option<WorkingDayRow> = conn
            .query_row(
                r#"
                SELECT day_of_week, day_type, alternate_weeks_json, timing_from, timing_to
                FROM working_day
                WHERE day_of_week = ?1
                "#,
                params![day.to_db_str()],
                Self::read_row,
            )
            .optional()?;

        row.map(Self::decode).transpose()
    }

    pub fn find_all_tx(conn: &Connection) -> RepositoryResult<Vec<WorkingDay>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT day_of_week, day_type, alternate_weeks_json, timing_from, timing_to
            FROM working_day
            "#,
        )?;

        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut days = rows
            .into_iter()
            .map(Self::decode)
            .collect::<RepositoryResult<Vec<_>>>()?;
        days.sort_by_key(|d| d.day_of_week());
        Ok(days)
    }

    /// 按 day_of_week 插入或更新
    pub fn upsert_tx(conn: &Connection, working_day: &WorkingDay) -> RepositoryResult<()> {
        let weeks: Vec<u32> = working_day.alternate_weeks().iter().copied().collect();
        let timing = working_day.timing();

        conn.execute(
            r#"
            INSERT INTO working_day (
                day_of_week, day_type, alternate_weeks_json, timing_from, timing_to, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
            ON CONFLICT(day_of_week) DO UPDATE SET
                day_type = excluded.day_type,
                alternate_weeks_json = excluded.alternate_weeks_json,
                timing_from = excluded.timing_from,
                timing_to = excluded.timing_to,
                updated_at = excluded.updated_at
            "#,
            params![
                working_day.day_of_week().to_db_str(),
                working_day.day_type().to_db_str(),
                serde_json::to_string(&weeks)?,
                timing.map(|w| format_time(w.from())),
                timing.map(|w| format_time(w.to())),
            ],
        )?;
        Ok(())
    }

    pub fn delete_tx(conn: &Connection, day: DayOfWeek) -> RepositoryResult<usize> {
        let rows = conn.execute(
            "DELETE FROM working_day WHERE day_of_week = ?1",
            params![day.to_db_str()],
        )?;
        Ok(rows)
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn read_row(row: &rusqlite::Row<'_>) -> SqliteResult<WorkingDayRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }

    fn decode(row: WorkingDayRow) -> RepositoryResult<WorkingDay> {
        let (day, day_type, weeks_json, from, to) = row;
        let day = DayOfWeek::from_db_str(&day).map_err(|e| RepositoryError::decode(TABLE, e))?;
        let day_type = DayType::from_db_str(&day_type).map_err(|e| RepositoryError::decode(TABLE, e))?;
        let weeks: Vec<u32> =
            serde_json::from_str(&weeks_json).map_err(|e| RepositoryError::decode(TABLE, e))?;

        let timing = match (from, to) {
            (Some(from), Some(to)) => {
                Some(TimeWindow::parse(&from, &to).map_err(|e| RepositoryError::decode(TABLE, e))?)
            }
            _ => None,
        };

        WorkingDay::new(day, day_type, weeks, timing).map_err(|e| RepositoryError::decode(TABLE, e))
    }
}

// ==========================================
// 学校教务排课核心 - 作息节次仓储
// ==========================================
// 红线: Repository 不含业务逻辑（越界/重叠校验在 ScheduleSlotRegistry）
// 职责: school_schedule 表 CRUD
// ==========================================

use crate::db::SharedConnection;
use crate::domain::schedule::ScheduleSlot;
use crate::domain::time_window::{format_time, TimeWindow};
use crate::domain::types::{DayOfWeek, SlotType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};

const TABLE: &str = "school_schedule";

const SELECT_COLUMNS: &str =
    "SELECT slot_id, day_of_week, slot_type, name, timing_from, timing_to FROM school_schedule";

type SlotRow = (String, String, String, String, String, String);

pub struct ScheduleSlotRepository {
    conn: SharedConnection,
}

impl ScheduleSlotRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询某星期的全部节次（按开始时间升序）
    pub fn find_by_day(&self, day: DayOfWeek) -> RepositoryResult<Vec<ScheduleSlot>> {
        let conn = self.get_conn()?;
        Self::find_by_day_tx(&conn, day)
    }

    pub fn find_all(&self) -> RepositoryResult<Vec<ScheduleSlot>> {
        let conn = self.get_conn()?;
        Self::find_all_tx(&conn)
    }

    pub fn find_by_id(&self, slot_id: &str) -> RepositoryResult<Option<ScheduleSlot>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, slot_id)
    }

    pub fn find_by_name(&self, day: DayOfWeek, name: &str) -> RepositoryResult<Vec<ScheduleSlot>> {
        let conn = self.get_conn()?;
        Self::find_by_name_tx(&conn, day, name)
    }

    // ==========================================
    // 事务内操作
    // ==========================================

    pub fn find_by_day_tx(conn: &Connection, day: DayOfWeek) -> RepositoryResult<Vec<ScheduleSlot>> {
        let sql = format!("{} WHERE day_of_week = ?1 ORDER BY timing_from ASC, name ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![day.to_db_str()], Self::read_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode).collect()
    }

    pub fn find_all_tx(conn: &Connection) -> RepositoryResult<Vec<ScheduleSlot>> {
        let sql = format!("{} ORDER BY day_of_week ASC, timing_from ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode).collect()
    }

    pub fn find_by_id_tx(conn: &Connection, slot_id: &str) -> RepositoryResult<Option<ScheduleSlot>> {
        let sql = format!("{} WHERE slot_id = ?1", SELECT_COLUMNS);
        let row = conn
            .query_row(&sql, params![slot_id], Self::read_row)
            .optional()?;
        row.map(Self::decode).transpose()
    }

    /// 同名节次可能同时存在 Period 与 Break
    pub fn find_by_name_tx(
        conn: &Connection,
        day: DayOfWeek,
        name: &str,
    ) -> RepositoryResult<Vec<ScheduleSlot>> {
        let sql = format!("{} WHERE day_of_week = ?1 AND name = ?2", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![day.to_db_str(), name], Self::read_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode).collect()
    }

    pub fn insert_tx(conn: &Connection, slot: &ScheduleSlot) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO school_schedule (
                slot_id, day_of_week, slot_type, name, timing_from, timing_to
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                slot.slot_id(),
                slot.day_of_week().to_db_str(),
                slot.slot_type().to_db_str(),
                slot.name(),
                format_time(slot.window().from()),
                format_time(slot.window().to()),
            ],
        )?;
        Ok(())
    }

    pub fn update_tx(conn: &Connection, slot: &ScheduleSlot) -> RepositoryResult<usize> {
        let rows = conn.execute(
            r#"
            UPDATE school_schedule SET
                day_of_week = ?2,
                slot_type = ?3,
                name = ?4,
                timing_from = ?5,
                timing_to = ?6
            WHERE slot_id = ?1
            "#,
            params![
                slot.slot_id(),
                slot.day_of_week().to_db_str(),
                slot.slot_type().to_db_str(),
                slot.name(),
                format_time(slot.window().from()),
                format_time(slot.window().to()),
            ],
        )?;
        Ok(rows)
    }

    pub fn delete_by_id_tx(conn: &Connection, slot_id: &str) -> RepositoryResult<usize> {
        let rows = conn.execute("DELETE FROM school_schedule WHERE slot_id = ?1", params![slot_id])?;
        Ok(rows)
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn read_row(row: &rusqlite::Row<'_>) -> SqliteResult<SlotRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }

    fn decode(row: SlotRow) -> RepositoryResult<ScheduleSlot> {
        let (slot_id, day, slot_type, name, from, to) = row;
        let day = DayOfWeek::from_db_str(&day).map_err(|e| RepositoryError::decode(TABLE, e))?;
        let slot_type = SlotType::from_db_str(&slot_type).map_err(|e| RepositoryError::decode(TABLE, e))?;
        let window = TimeWindow::parse(&from, &to).map_err(|e| RepositoryError::decode(TABLE, e))?;
        ScheduleSlot::new(slot_id, day, slot_type, &name, window).map_err(|e| RepositoryError::decode(TABLE, e))
    }
}

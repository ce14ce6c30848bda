// ==========================================
// 学校教务排课核心 - 课表仓储
// ==========================================
// 红线: Repository 不含业务逻辑（节次/任课/冲突校验在 TimetableAllocator）
// 职责: time_table / time_table_entry 表 CRUD
// ==========================================

use crate::db::SharedConnection;
use crate::domain::timetable::{CellKey, TimeTable, TimeTableEntry};
use crate::domain::types::{DayOfWeek, RecordStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};

const TIMETABLE_TABLE: &str = "time_table";
const ENTRY_TABLE: &str = "time_table_entry";

type TimeTableRow = (String, String, String, String, String);
type EntryRow = (String, String, String, String, String, String);

// ==========================================
// TimeTableRepository - 课表仓储
// ==========================================
pub struct TimeTableRepository {
    conn: SharedConnection,
}

impl TimeTableRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, time_table_id: &str) -> RepositoryResult<Option<TimeTable>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, time_table_id)
    }

    /// 查询学年下全部课表
    pub fn find_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<TimeTable>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT time_table_id, academic_year, class_name, division, status
            FROM time_table
            WHERE academic_year = ?1
            ORDER BY class_name ASC, division ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![academic_year], Self::read_timetable_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode_timetable).collect()
    }

    pub fn find_entries(&self, time_table_id: &str) -> RepositoryResult<Vec<TimeTableEntry>> {
        let conn = self.get_conn()?;
        Self::find_entries_tx(&conn, time_table_id)
    }

    // ==========================================
    // 事务内操作 - time_table
    // ==========================================

    pub fn insert_tx(conn: &Connection, time_table: &TimeTable) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO time_table (
                time_table_id, academic_year, class_name, division, status
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                time_table.time_table_id,
                time_table.academic_year,
                time_table.class_name,
                time_table.division,
                time_table.status.to_db_str(),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id_tx(conn: &Connection, time_table_id: &str) -> RepositoryResult<Option<TimeTable>> {
        let row = conn
            .query_row(
                r#"
                SELECT time_table_id, academic_year, class_name, division, status
                FROM time_table
                WHERE time_table_id = ?1
                "#,
                params![time_table_id],
                Self::read_timetable_row,
            )
            .optional()?;
        row.map(Self::decode_timetable).transpose()
    }

    pub fn find_by_key_tx(
        conn: &Connection,
        academic_year: &str,
        class_name: &str,
        division: &str,
    ) -> RepositoryResult<Option<TimeTable>> {
        let row = conn
            .query_row(
                r#"
                SELECT time_table_id, academic_year, class_name, division, status
                FROM time_table
                WHERE academic_year = ?1 AND class_name = ?2 AND division = ?3
                "#,
                params![academic_year, class_name, division],
                Self::read_timetable_row,
            )
            .optional()?;
        row.map(Self::decode_timetable).transpose()
    }

    pub fn update_status_tx(
        conn: &Connection,
        time_table_id: &str,
        status: RecordStatus,
    ) -> RepositoryResult<usize> {
        let rows = conn.execute(
            "UPDATE time_table SET status = ?2 WHERE time_table_id = ?1",
            params![time_table_id, status.to_db_str()],
        )?;
        Ok(rows)
    }

    // ==========================================
    // 事务内操作 - time_table_entry
    // ==========================================

    /// 按单元格 upsert（单元格已有记录时保留原 entry_id）
    pub fn upsert_entry_tx(conn: &Connection, entry: &TimeTableEntry) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO time_table_entry (
                entry_id, time_table_id, day_of_week, schedule_slot, subject_id, teacher_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(time_table_id, day_of_week, schedule_slot) DO UPDATE SET
                subject_id = excluded.subject_id,
                teacher_id = excluded.teacher_id
            "#,
            params![
                entry.entry_id,
                entry.time_table_id,
                entry.day_of_week.to_db_str(),
                entry.schedule_slot,
                entry.subject_id,
                entry.teacher_id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_entry_tx(conn: &Connection, cell: &CellKey) -> RepositoryResult<usize> {
        let rows = conn.execute(
            r#"
            DELETE FROM time_table_entry
            WHERE time_table_id = ?1 AND day_of_week = ?2 AND schedule_slot = ?3
            "#,
            params![cell.time_table_id, cell.day_of_week.to_db_str(), cell.schedule_slot],
        )?;
        Ok(rows)
    }

    pub fn find_entry_tx(conn: &Connection, cell: &CellKey) -> RepositoryResult<Option<TimeTableEntry>> {
        let row = conn
            .query_row(
                r#"
                SELECT entry_id, time_table_id, day_of_week, schedule_slot, subject_id, teacher_id
                FROM time_table_entry
                WHERE time_table_id = ?1 AND day_of_week = ?2 AND schedule_slot = ?3
                "#,
                params![cell.time_table_id, cell.day_of_week.to_db_str(), cell.schedule_slot],
                Self::read_entry_row,
            )
            .optional()?;
        row.map(Self::decode_entry).transpose()
    }

    pub fn find_entries_tx(conn: &Connection, time_table_id: &str) -> RepositoryResult<Vec<TimeTableEntry>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT entry_id, time_table_id, day_of_week, schedule_slot, subject_id, teacher_id
            FROM time_table_entry
            WHERE time_table_id = ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![time_table_id], Self::read_entry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode_entry).collect()
    }

    /// 教师在某星期的全部课表条目（跨全部课表、班级与分班）
    pub fn find_entries_by_teacher_day_tx(
        conn: &Connection,
        teacher_id: &str,
        day: DayOfWeek,
    ) -> RepositoryResult<Vec<TimeTableEntry>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT entry_id, time_table_id, day_of_week, schedule_slot, subject_id, teacher_id
            FROM time_table_entry
            WHERE teacher_id = ?1
              AND day_of_week = ?2
            ORDER BY time_table_id ASC, schedule_slot ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![teacher_id, day.to_db_str()], Self::read_entry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode_entry).collect()
    }

    /// 引用某节次名称的条目数
    pub fn count_entries_by_slot_tx(
        conn: &Connection,
        day: DayOfWeek,
        slot_name: &str,
    ) -> RepositoryResult<usize> {
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM time_table_entry
            WHERE day_of_week = ?1 AND schedule_slot = ?2
            "#,
            params![day.to_db_str(), slot_name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn read_timetable_row(row: &rusqlite::Row<'_>) -> SqliteResult<TimeTableRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }

    fn decode_timetable(row: TimeTableRow) -> RepositoryResult<TimeTable> {
        let (id, year, class_name, division, status) = row;
        let status =
            RecordStatus::from_db_str(&status).map_err(|e| RepositoryError::decode(TIMETABLE_TABLE, e))?;
        TimeTable::new(id, &year, &class_name, &division, status)
            .map_err(|e| RepositoryError::decode(TIMETABLE_TABLE, e))
    }

    fn read_entry_row(row: &rusqlite::Row<'_>) -> SqliteResult<EntryRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }

    fn decode_entry(row: EntryRow) -> RepositoryResult<TimeTableEntry> {
        let (entry_id, time_table_id, day, slot, subject_id, teacher_id) = row;
        let day = DayOfWeek::from_db_str(&day).map_err(|e| RepositoryError::decode(ENTRY_TABLE, e))?;
        TimeTableEntry::new(entry_id, &time_table_id, day, &slot, &subject_id, &teacher_id)
            .map_err(|e| RepositoryError::decode(ENTRY_TABLE, e))
    }
}

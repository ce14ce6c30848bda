// ==========================================
// 学校教务排课核心 - 假日仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: public_holiday 表 CRUD
// ==========================================

use crate::db::SharedConnection;
use crate::domain::calendar::PublicHoliday;
use crate::domain::time_window::{format_date, parse_date};
use crate::domain::types::HolidayType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult};

const TABLE: &str = "public_holiday";

type HolidayRow = (String, i32, String, String, String, String);

pub struct PublicHolidayRepository {
    conn: SharedConnection,
}

impl PublicHolidayRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入或整体替换
    pub fn upsert_tx(conn: &Connection, holiday: &PublicHoliday) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO public_holiday (
                holiday_id, year, description, holiday_type, from_date, to_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(holiday_id) DO UPDATE SET
                year = excluded.year,
                description = excluded.description,
                holiday_type = excluded.holiday_type,
                from_date = excluded.from_date,
                to_date = excluded.to_date
            "#,
            params![
                holiday.holiday_id(),
                holiday.year(),
                holiday.description(),
                holiday.holiday_type().to_db_str(),
                format_date(holiday.from_date()),
                format_date(holiday.to_date()),
            ],
        )?;
        Ok(())
    }

    pub fn delete_tx(conn: &Connection, holiday_id: &str) -> RepositoryResult<usize> {
        let rows = conn.execute(
            "DELETE FROM public_holiday WHERE holiday_id = ?1",
            params![holiday_id],
        )?;
        Ok(rows)
    }

    pub fn find_by_year(&self, year: i32) -> RepositoryResult<Vec<PublicHoliday>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT holiday_id, year, description, holiday_type, from_date, to_date
            FROM public_holiday
            WHERE year = ?1
            ORDER BY from_date ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![year], Self::read_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode).collect()
    }

    /// 查询覆盖指定日期的假日
    pub fn find_covering(&self, date: NaiveDate) -> RepositoryResult<Vec<PublicHoliday>> {
        let conn = self.get_conn()?;
        Self::find_covering_tx(&conn, date)
    }

    /// 查询与 [from, to] 有交集的假日
    pub fn find_in_range(&self, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<PublicHoliday>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT holiday_id, year, description, holiday_type, from_date, to_date
            FROM public_holiday
            WHERE from_date <= ?2 AND to_date >= ?1
            ORDER BY from_date ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![format_date(from), format_date(to)], Self::read_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode).collect()
    }

    pub fn find_covering_tx(conn: &Connection, date: NaiveDate) -> RepositoryResult<Vec<PublicHoliday>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT holiday_id, year, description, holiday_type, from_date, to_date
            FROM public_holiday
            WHERE from_date <= ?1 AND to_date >= ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![format_date(date)], Self::read_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode).collect()
    }

    fn read_row(row: &rusqlite::Row<'_>) -> SqliteResult<HolidayRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }

    fn decode(row: HolidayRow) -> RepositoryResult<PublicHoliday> {
        let (holiday_id, year, description, holiday_type, from, to) = row;
        let holiday_type =
            HolidayType::from_db_str(&holiday_type).map_err(|e| RepositoryError::decode(TABLE, e))?;
        let from = parse_date("from_date", &from).map_err(|e| RepositoryError::decode(TABLE, e))?;
        let to = parse_date("to_date", &to).map_err(|e| RepositoryError::decode(TABLE, e))?;
        PublicHoliday::new(holiday_id, year, &description, holiday_type, from, to)
            .map_err(|e| RepositoryError::decode(TABLE, e))
    }
}

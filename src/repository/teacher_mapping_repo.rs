// ==========================================
// 学校教务排课核心 - 任课映射仓储
// ==========================================
// 红线: Repository 不含业务逻辑（唯一性/班主任规则在 AssignmentLedger）
// 职责: teacher_mapping 表 CRUD；divisions 以有序 JSON 数组存储
// ==========================================

use crate::db::SharedConnection;
use crate::domain::mapping::{DivisionAssignment, TeacherMapping};
use crate::domain::types::RecordStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};

const TABLE: &str = "teacher_mapping";

const SELECT_COLUMNS: &str =
    "SELECT mapping_id, class_name, subject_id, divisions_json, status FROM teacher_mapping";

type MappingRow = (String, String, String, String, String);

pub struct TeacherMappingRepository {
    conn: SharedConnection,
}

impl TeacherMappingRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_class_subject(
        &self,
        class_name: &str,
        subject_id: &str,
    ) -> RepositoryResult<Option<TeacherMapping>> {
        let conn = self.get_conn()?;
        Self::find_by_class_subject_tx(&conn, class_name, subject_id)
    }

    pub fn find_by_class(&self, class_name: &str) -> RepositoryResult<Vec<TeacherMapping>> {
        let conn = self.get_conn()?;
        Self::find_by_class_tx(&conn, class_name)
    }

    pub fn find_all_active(&self) -> RepositoryResult<Vec<TeacherMapping>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE status = 'active' ORDER BY class_name, subject_id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode).collect()
    }

    // ==========================================
    // 事务内操作
    // ==========================================

    pub fn find_by_class_subject_tx(
        conn: &Connection,
        class_name: &str,
        subject_id: &str,
    ) -> RepositoryResult<Option<TeacherMapping>> {
        let sql = format!("{} WHERE class_name = ?1 AND subject_id = ?2", SELECT_COLUMNS);
        let row = conn
            .query_row(&sql, params![class_name, subject_id], Self::read_row)
            .optional()?;
        row.map(Self::decode).transpose()
    }

    /// 班级下全部映射（含 inactive），按科目排序
    pub fn find_by_class_tx(conn: &Connection, class_name: &str) -> RepositoryResult<Vec<TeacherMapping>> {
        let sql = format!("{} WHERE class_name = ?1 ORDER BY subject_id ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![class_name], Self::read_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(Self::decode).collect()
    }

    /// 插入或整体替换（按 mapping_id）
    pub fn save_tx(conn: &Connection, mapping: &TeacherMapping) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO teacher_mapping (
                mapping_id, class_name, subject_id, divisions_json, status, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
            ON CONFLICT(mapping_id) DO UPDATE SET
                divisions_json = excluded.divisions_json,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
            params![
                mapping.mapping_id(),
                mapping.class_name(),
                mapping.subject_id(),
                serde_json::to_string(mapping.divisions())?,
                mapping.status().to_db_str(),
            ],
        )?;
        Ok(())
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn read_row(row: &rusqlite::Row<'_>) -> SqliteResult<MappingRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }

    fn decode(row: MappingRow) -> RepositoryResult<TeacherMapping> {
        let (mapping_id, class_name, subject_id, divisions_json, status) = row;
        let divisions: Vec<DivisionAssignment> =
            serde_json::from_str(&divisions_json).map_err(|e| RepositoryError::decode(TABLE, e))?;
        let status = RecordStatus::from_db_str(&status).map_err(|e| RepositoryError::decode(TABLE, e))?;
        TeacherMapping::new(mapping_id, &class_name, &subject_id, divisions, status)
            .map_err(|e| RepositoryError::decode(TABLE, e))
    }
}

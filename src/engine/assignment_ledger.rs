// ==========================================
// 学校教务排课核心 - 任课分配台账
// ==========================================
// 职责: 维护 (班级, 科目, 分班) → 教师 的任课映射与班主任标记
// 约束:
// - 同一 (班级, 科目, 分班) 至多一条有效映射
// - 同一 (班级, 分班) 至多一位班主任；设置新班主任时在同一事务内清除其他科目上的标记
// - 取消分配幂等；分班列表清空后该行置为 inactive
// ==========================================

use crate::domain::error::require_non_empty;
use crate::domain::mapping::{DivisionAssignment, TeacherMapping};
use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::engine::repositories::SchoolRepositories;
use crate::engine::transaction::{with_audited_write_tx, with_read_conn, AuditFn};
use crate::repository::TeacherMappingRepository;
use rusqlite::Connection;
use tracing::{info, warn};

/// 任课映射键 (班级, 科目, 分班)，值已去除首尾空白
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentKey {
    pub class_name: String,
    pub subject_id: String,
    pub division: String,
}

impl AssignmentKey {
    pub fn new(class_name: &str, subject_id: &str, division: &str) -> ScheduleResult<Self> {
        Ok(Self {
            class_name: require_non_empty("class_name", class_name)?,
            subject_id: require_non_empty("subject_id", subject_id)?,
            division: require_non_empty("division", division)?,
        })
    }

    fn duplicate(&self) -> ScheduleError {
        ScheduleError::DuplicateMapping {
            class_name: self.class_name.clone(),
            subject_id: self.subject_id.clone(),
            division: self.division.clone(),
        }
    }

    fn not_found(&self) -> ScheduleError {
        ScheduleError::MappingNotFound {
            class_name: self.class_name.clone(),
            subject_id: self.subject_id.clone(),
            division: self.division.clone(),
        }
    }
}

// ==========================================
// AssignmentLedger
// ==========================================
pub struct AssignmentLedger {
    repos: SchoolRepositories,
}

impl AssignmentLedger {
    pub fn new(repos: SchoolRepositories) -> Self {
        Self { repos }
    }

    /// 分配任课教师
    ///
    /// # 错误
    /// - DuplicateMapping: 该 (班级, 科目, 分班) 已有有效映射
    pub fn assign(
        &self,
        key: &AssignmentKey,
        teacher_id: &str,
        teacher_name: &str,
        is_class_teacher: bool,
        audit: AuditFn<'_, TeacherMapping>,
    ) -> ScheduleResult<TeacherMapping> {
        let entry = DivisionAssignment::new(&key.division, teacher_id, teacher_name, is_class_teacher)?;

        let result = with_audited_write_tx(&self.repos.conn, "assign_teacher", audit, |tx| {
            let existing =
                TeacherMappingRepository::find_by_class_subject_tx(tx, &key.class_name, &key.subject_id)?;

            let mut mapping = match existing {
                Some(mut m) => {
                    m.reactivate();
                    m
                }
                None => TeacherMapping::create(&key.class_name, &key.subject_id)?,
            };

            if entry.is_class_teacher() {
                Self::clear_class_teacher_tx(tx, key)?;
            }

            if !mapping.add_division(entry.clone()) {
                return Err(key.duplicate());
            }
            TeacherMappingRepository::save_tx(tx, &mapping)?;
            Ok(mapping)
        });

        match &result {
            Ok(_) => info!(
                class_name = %key.class_name,
                subject_id = %key.subject_id,
                division = %key.division,
                teacher_id = %entry.teacher_id(),
                is_class_teacher,
                "任课教师已分配"
            ),
            Err(e) => warn!(
                class_name = %key.class_name,
                subject_id = %key.subject_id,
                division = %key.division,
                "任课分配被拒绝: {}",
                e
            ),
        }
        result
    }

    /// 修改已有映射的教师/班主任标记
    ///
    /// # 错误
    /// - MappingNotFound: 该 (班级, 科目, 分班) 无有效映射
    pub fn update_assignment(
        &self,
        key: &AssignmentKey,
        teacher_id: &str,
        teacher_name: &str,
        is_class_teacher: bool,
        audit: AuditFn<'_, TeacherMapping>,
    ) -> ScheduleResult<TeacherMapping> {
        let entry = DivisionAssignment::new(&key.division, teacher_id, teacher_name, is_class_teacher)?;

        let result = with_audited_write_tx(&self.repos.conn, "update_assignment", audit, |tx| {
            let mut mapping =
                TeacherMappingRepository::find_by_class_subject_tx(tx, &key.class_name, &key.subject_id)?
                    .filter(|m| m.is_active())
                    .ok_or_else(|| key.not_found())?;

            if mapping.division(&key.division).is_none() {
                return Err(key.not_found());
            }
            if entry.is_class_teacher() {
                Self::clear_class_teacher_tx(tx, key)?;
            }
            mapping.replace_division(entry.clone());

            TeacherMappingRepository::save_tx(tx, &mapping)?;
            Ok(mapping)
        });

        match &result {
            Ok(_) => info!(
                class_name = %key.class_name,
                subject_id = %key.subject_id,
                division = %key.division,
                teacher_id = %entry.teacher_id(),
                is_class_teacher,
                "任课映射已修改"
            ),
            Err(e) => warn!(
                class_name = %key.class_name,
                subject_id = %key.subject_id,
                division = %key.division,
                "任课映射修改被拒绝: {}",
                e
            ),
        }
        result
    }

    /// 取消分配（幂等），返回是否有变更
    pub fn unassign(&self, key: &AssignmentKey, audit: AuditFn<'_, bool>) -> ScheduleResult<bool> {
        let changed = with_audited_write_tx(&self.repos.conn, "unassign_teacher", audit, |tx| {
            let Some(mut mapping) =
                TeacherMappingRepository::find_by_class_subject_tx(tx, &key.class_name, &key.subject_id)?
            else {
                return Ok(false);
            };

            if !mapping.is_active() || !mapping.remove_division(&key.division) {
                return Ok(false);
            }
            TeacherMappingRepository::save_tx(tx, &mapping)?;
            Ok(true)
        })?;

        info!(
            class_name = %key.class_name,
            subject_id = %key.subject_id,
            division = %key.division,
            changed,
            "任课分配已取消"
        );
        Ok(changed)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 教师当前承担的有效分班任课数
    pub fn teacher_load(&self, teacher_id: &str) -> ScheduleResult<usize> {
        let teacher_id = teacher_id.trim();
        let mappings = self.repos.mapping_repo.find_all_active()?;
        Ok(mappings
            .iter()
            .flat_map(|m| m.divisions().iter())
            .filter(|d| d.teacher_id() == teacher_id)
            .count())
    }

    /// (班级, 分班) 的班主任
    pub fn class_teacher_of(
        &self,
        class_name: &str,
        division: &str,
    ) -> ScheduleResult<Option<DivisionAssignment>> {
        let division = division.trim();
        let mappings = self.repos.mapping_repo.find_by_class(class_name.trim())?;
        Ok(mappings
            .into_iter()
            .filter(|m| m.is_active())
            .flat_map(|m| m.divisions().to_vec())
            .find(|d| d.division() == division && d.is_class_teacher()))
    }

    /// 教师是否任教 (班级, 科目, 分班)
    pub fn is_mapped(&self, key: &AssignmentKey, teacher_id: &str) -> ScheduleResult<bool> {
        with_read_conn(&self.repos.conn, |conn| Self::is_mapped_tx(conn, key, teacher_id))
    }

    /// 班级的全部有效映射
    pub fn mappings_for_class(&self, class_name: &str) -> ScheduleResult<Vec<TeacherMapping>> {
        let mappings = self.repos.mapping_repo.find_by_class(class_name.trim())?;
        Ok(mappings.into_iter().filter(|m| m.is_active()).collect())
    }

    // ==========================================
    // 事务内辅助
    // ==========================================

    pub(crate) fn is_mapped_tx(
        conn: &Connection,
        key: &AssignmentKey,
        teacher_id: &str,
    ) -> ScheduleResult<bool> {
        let mapping =
            TeacherMappingRepository::find_by_class_subject_tx(conn, &key.class_name, &key.subject_id)?;
        Ok(mapping
            .filter(|m| m.is_active())
            .and_then(|m| m.division(&key.division).map(|d| d.teacher_id() == teacher_id.trim()))
            .unwrap_or(false))
    }

    /// 清除 (班级, 分班) 在其他科目上的班主任标记
    fn clear_class_teacher_tx(conn: &Connection, key: &AssignmentKey) -> ScheduleResult<()> {
        let mappings = TeacherMappingRepository::find_by_class_tx(conn, &key.class_name)?;
        for mut mapping in mappings
            .into_iter()
            .filter(|m| m.is_active() && m.subject_id() != key.subject_id)
        {
            if mapping.clear_class_teacher(&key.division) {
                info!(
                    class_name = %key.class_name,
                    division = %key.division,
                    subject_id = %mapping.subject_id(),
                    "清除原班主任标记"
                );
                TeacherMappingRepository::save_tx(conn, &mapping)?;
            }
        }
        Ok(())
    }
}

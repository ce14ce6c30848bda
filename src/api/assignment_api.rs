// ==========================================
// 学校教务排课核心 - 任课分配 API
// ==========================================
// 职责: 任课教师分配/修改/取消、班主任与教师负载查询
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::build_action_log;
use crate::api::validator::require_non_blank;
use crate::domain::action_log::ActionType;
use crate::domain::mapping::{DivisionAssignment, TeacherMapping};
use crate::engine::assignment_ledger::{AssignmentKey, AssignmentLedger};

/// 任课分配请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignTeacherRequest {
    pub class_name: String,
    pub subject_id: String,
    pub division: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub is_class_teacher: bool,
}

impl AssignTeacherRequest {
    fn key(&self) -> ApiResult<AssignmentKey> {
        require_non_blank("教师ID", &self.teacher_id)?;
        Ok(AssignmentKey::new(&self.class_name, &self.subject_id, &self.division)?)
    }

    fn payload(&self) -> serde_json::Value {
        json!({
            "class_name": self.class_name.trim(),
            "subject_id": self.subject_id.trim(),
            "division": self.division.trim(),
            "teacher_id": self.teacher_id.trim(),
            "is_class_teacher": self.is_class_teacher,
        })
    }
}

// ==========================================
// AssignmentApi
// ==========================================
pub struct AssignmentApi {
    ledger: Arc<AssignmentLedger>,
}

impl AssignmentApi {
    pub fn new(ledger: Arc<AssignmentLedger>) -> Self {
        Self { ledger }
    }

    /// 分配任课教师
    pub fn assign_teacher(&self, request: &AssignTeacherRequest, actor: &str) -> ApiResult<TeacherMapping> {
        let actor = require_non_blank("操作人", actor)?;
        let key = request.key()?;
        let audit = |_: &TeacherMapping| {
            Some(build_action_log(
                ActionType::AssignTeacher,
                actor,
                request.payload(),
                format!(
                    "分配任课: {}-{} {} → {}",
                    key.class_name, key.division, key.subject_id, request.teacher_id.trim()
                ),
            ))
        };
        Ok(self.ledger.assign(
            &key,
            &request.teacher_id,
            &request.teacher_name,
            request.is_class_teacher,
            &audit,
        )?)
    }

    /// 修改已有任课映射
    pub fn update_assignment(
        &self,
        request: &AssignTeacherRequest,
        actor: &str,
    ) -> ApiResult<TeacherMapping> {
        let actor = require_non_blank("操作人", actor)?;
        let key = request.key()?;
        let audit = |_: &TeacherMapping| {
            Some(build_action_log(
                ActionType::UpdateAssignment,
                actor,
                request.payload(),
                format!(
                    "修改任课: {}-{} {} → {}",
                    key.class_name, key.division, key.subject_id, request.teacher_id.trim()
                ),
            ))
        };
        Ok(self.ledger.update_assignment(
            &key,
            &request.teacher_id,
            &request.teacher_name,
            request.is_class_teacher,
            &audit,
        )?)
    }

    /// 取消任课（幂等）
    pub fn unassign_teacher(
        &self,
        class_name: &str,
        subject_id: &str,
        division: &str,
        actor: &str,
    ) -> ApiResult<bool> {
        let actor = require_non_blank("操作人", actor)?;
        let key = AssignmentKey::new(class_name, subject_id, division)?;
        let audit = |changed: &bool| {
            changed.then(|| {
                build_action_log(
                    ActionType::UnassignTeacher,
                    actor,
                    json!({
                        "class_name": key.class_name,
                        "subject_id": key.subject_id,
                        "division": key.division,
                    }),
                    format!("取消任课: {}-{} {}", key.class_name, key.division, key.subject_id),
                )
            })
        };
        Ok(self.ledger.unassign(&key, &audit)?)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn teacher_load(&self, teacher_id: &str) -> ApiResult<usize> {
        let teacher_id = require_non_blank("教师ID", teacher_id)?;
        Ok(self.ledger.teacher_load(teacher_id)?)
    }

    pub fn class_teacher_of(&self, class_name: &str, division: &str) -> ApiResult<Option<DivisionAssignment>> {
        let class_name = require_non_blank("班级", class_name)?;
        let division = require_non_blank("分班", division)?;
        Ok(self.ledger.class_teacher_of(class_name, division)?)
    }

    pub fn list_mappings(&self, class_name: &str) -> ApiResult<Vec<TeacherMapping>> {
        let class_name = require_non_blank("班级", class_name)?;
        Ok(self.ledger.mappings_for_class(class_name)?)
    }
}

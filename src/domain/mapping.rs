// ==========================================
// 学校教务排课核心 - 任课分配领域模型
// ==========================================
// 对齐: teacher_mapping 表
// 一条记录对应 (班级, 科目)，divisions 为有序的分班任课列表
// 班主任标记冗余存储在各科目的分班条目上
// ==========================================

use crate::domain::error::{require_non_empty, DomainError, DomainResult};
use crate::domain::types::RecordStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// DivisionAssignment - 分班任课条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DivisionAssignmentRecord")]
pub struct DivisionAssignment {
    division: String,
    teacher_id: String,
    teacher_name: String,
    is_class_teacher: bool,
}

impl DivisionAssignment {
    pub fn new(
        division: &str,
        teacher_id: &str,
        teacher_name: &str,
        is_class_teacher: bool,
    ) -> DomainResult<Self> {
        Ok(Self {
            division: require_non_empty("division", division)?,
            teacher_id: require_non_empty("teacher_id", teacher_id)?,
            teacher_name: teacher_name.trim().to_string(),
            is_class_teacher,
        })
    }

    pub fn division(&self) -> &str {
        &self.division
    }

    pub fn teacher_id(&self) -> &str {
        &self.teacher_id
    }

    pub fn teacher_name(&self) -> &str {
        &self.teacher_name
    }

    pub fn is_class_teacher(&self) -> bool {
        self.is_class_teacher
    }
}

/// divisions_json 中的原始条目，经 DivisionAssignment::new 校验
#[derive(Deserialize)]
struct DivisionAssignmentRecord {
    division: String,
    teacher_id: String,
    #[serde(default)]
    teacher_name: String,
    #[serde(default)]
    is_class_teacher: bool,
}

impl TryFrom<DivisionAssignmentRecord> for DivisionAssignment {
    type Error = DomainError;

    fn try_from(raw: DivisionAssignmentRecord) -> DomainResult<Self> {
        Self::new(&raw.division, &raw.teacher_id, &raw.teacher_name, raw.is_class_teacher)
    }
}

// ==========================================
// TeacherMapping - 科目任课映射
// ==========================================
// 只能经由下列方法变更，空列表的映射随即停用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherMapping {
    mapping_id: String,
    class_name: String,
    subject_id: String,
    divisions: Vec<DivisionAssignment>,
    status: RecordStatus,
}

impl TeacherMapping {
    pub fn new(
        mapping_id: String,
        class_name: &str,
        subject_id: &str,
        divisions: Vec<DivisionAssignment>,
        status: RecordStatus,
    ) -> DomainResult<Self> {
        Ok(Self {
            mapping_id,
            class_name: require_non_empty("class_name", class_name)?,
            subject_id: require_non_empty("subject_id", subject_id)?,
            divisions,
            status,
        })
    }

    /// 生成新 ID 的空映射
    pub fn create(class_name: &str, subject_id: &str) -> DomainResult<Self> {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            class_name,
            subject_id,
            Vec::new(),
            RecordStatus::Active,
        )
    }

    pub fn mapping_id(&self) -> &str {
        &self.mapping_id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// 分班任课列表（保持添加顺序）
    pub fn divisions(&self) -> &[DivisionAssignment] {
        &self.divisions
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn division(&self, division: &str) -> Option<&DivisionAssignment> {
        self.divisions.iter().find(|d| d.division == division)
    }

    fn division_mut(&mut self, division: &str) -> Option<&mut DivisionAssignment> {
        self.divisions.iter_mut().find(|d| d.division == division)
    }

    /// 停用的映射以空列表重新启用
    pub fn reactivate(&mut self) {
        if !self.is_active() {
            self.divisions.clear();
            self.status = RecordStatus::Active;
        }
    }

    /// 追加分班条目，分班已存在时返回 false
    pub fn add_division(&mut self, entry: DivisionAssignment) -> bool {
        if self.division(&entry.division).is_some() {
            return false;
        }
        self.divisions.push(entry);
        true
    }

    /// 原位替换同一分班的条目，分班不存在时返回 false
    pub fn replace_division(&mut self, entry: DivisionAssignment) -> bool {
        match self.division_mut(&entry.division) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    /// 移除分班条目，返回是否有变更；移除最后一条时映射停用
    pub fn remove_division(&mut self, division: &str) -> bool {
        let before = self.divisions.len();
        self.divisions.retain(|d| d.division != division);
        let changed = before != self.divisions.len();
        if changed && self.divisions.is_empty() {
            self.status = RecordStatus::Inactive;
        }
        changed
    }

    /// 清除该分班的班主任标记，返回是否有变更
    pub fn clear_class_teacher(&mut self, division: &str) -> bool {
        match self.division_mut(division) {
            Some(entry) if entry.is_class_teacher => {
                entry.is_class_teacher = false;
                true
            }
            _ => false,
        }
    }
}

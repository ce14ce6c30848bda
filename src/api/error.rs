// ==========================================
// 学校教务排课核心 - API层错误类型
// ==========================================
// 职责: 将引擎/仓储/导入错误转换为调用方可处理的错误
// 约定: 引擎的业务拒绝原样保留（ScheduleRejected），调用方按类型决定如何提示
// ==========================================

use crate::engine::error::ScheduleError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 排课/作息/任课规则拒绝
    #[error("{0}")]
    ScheduleRejected(ScheduleError),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("并发修改冲突，请刷新后重试: {0}")]
    ConcurrentModification(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 被拒绝时的引擎错误（若有）
    pub fn schedule_error(&self) -> Option<&ScheduleError> {
        match self {
            ApiError::ScheduleRejected(e) => Some(e),
            _ => None,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::WriteConflict(msg) => ApiError::ConcurrentModification(msg),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::DecodeError { table, message } => {
                ApiError::DatabaseError(format!("{} 数据无法解析: {}", table, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ScheduleError 转换
// ==========================================
impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Domain(e) => ApiError::InvalidInput(e.to_string()),
            ScheduleError::Repository(e) => ApiError::from(e),
            ScheduleError::ConcurrentModification { operation } => {
                ApiError::ConcurrentModification(operation)
            }
            other => ApiError::ScheduleRejected(other),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

impl From<crate::domain::error::DomainError> for ApiError {
    fn from(err: crate::domain::error::DomainError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DayOfWeek;

    #[test]
    fn test_schedule_rejection_kept_typed() {
        let err: ApiError = ScheduleError::UnknownSlot {
            day: DayOfWeek::Monday,
            name: "Period-9".to_string(),
        }
        .into();
        assert!(matches!(
            err.schedule_error(),
            Some(ScheduleError::UnknownSlot { name, .. }) if name == "Period-9"
        ));
    }

    #[test]
    fn test_write_conflict_translated() {
        let err: ApiError = ScheduleError::ConcurrentModification {
            operation: "place_entry".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::ConcurrentModification(ref op) if op == "place_entry"));

        let err: ApiError = RepositoryError::WriteConflict("database is locked".to_string()).into();
        assert!(matches!(err, ApiError::ConcurrentModification(_)));
    }
}

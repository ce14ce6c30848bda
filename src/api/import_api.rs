// ==========================================
// 学校教务排课核心 - 配置导入 API
// ==========================================
// 职责: CSV 批量导入工作日定义与节次
// 约定: 逐行提交，每个成功行与其 IMPORT_CONFIG 操作日志同事务写入
// ==========================================

use std::path::Path;

use crate::api::error::ApiResult;
use crate::api::validator::require_non_blank;
use crate::engine::repositories::SchoolRepositories;
use crate::importer::{ImportReport, ScheduleConfigImporter};

pub struct ImportApi {
    importer: ScheduleConfigImporter,
}

impl ImportApi {
    pub fn new(repos: SchoolRepositories) -> Self {
        Self {
            importer: ScheduleConfigImporter::new(repos),
        }
    }

    pub fn import_working_days(&self, file_path: &Path, actor: &str) -> ApiResult<ImportReport> {
        let actor = require_non_blank("操作人", actor)?;
        Ok(self.importer.import_working_days(file_path, actor)?)
    }

    pub fn import_slots(&self, file_path: &Path, actor: &str) -> ApiResult<ImportReport> {
        let actor = require_non_blank("操作人", actor)?;
        Ok(self.importer.import_slots(file_path, actor)?)
    }
}

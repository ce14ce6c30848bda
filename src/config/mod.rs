// ==========================================
// 学校教务排课核心 - 配置层
// ==========================================
// 职责: 校历配置（半天截止时间）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};

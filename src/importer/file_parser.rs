// ==========================================
// 学校教务排课核心 - CSV 文件解析
// ==========================================
// 输出: 每行一个 列名 → 值 的映射，附带源文件行号（表头为第 1 行）
// 约定: 列名与值去除首尾空白；完全空白的行跳过
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 解析后的原始行
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 源文件行号（表头为第 1 行）
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

impl RawRow {
    /// 读取字段（缺失时返回空串）
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// 读取非空字段
    pub fn get_opt(&self, column: &str) -> Option<&str> {
        Some(self.get(column)).filter(|v| !v.is_empty())
    }
}

// ==========================================
// CsvParser
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 解析 CSV 文件，并校验必需列
    pub fn parse(&self, file_path: &Path, required_columns: &[&str]) -> ImportResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        if let Some(ext) = file_path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(ext.to_string_lossy().to_string()));
            }
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if let Some(missing) = required_columns
            .iter()
            .find(|col| !headers.iter().any(|h| h == *col))
        {
            return Err(ImportError::MissingColumn(missing.to_string()));
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let fields: HashMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.trim().to_string()))
                .collect();

            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            rows.push(RawRow { row_number, fields });
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_parse_trims_and_skips_blank_rows() {
        let file = csv_file("day_of_week , slot_type\n Monday , Period \n,\nTuesday,Break\n");
        let rows = CsvParser.parse(file.path(), &["day_of_week", "slot_type"]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("day_of_week"), "Monday");
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].get("slot_type"), "Break");
        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].get_opt("timing_from"), None);
    }

    #[test]
    fn test_missing_column() {
        let file = csv_file("day_of_week\nMonday\n");
        let err = CsvParser.parse(file.path(), &["day_of_week", "name"]).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(ref c) if c == "name"));
    }

    #[test]
    fn test_file_not_found_and_extension() {
        let err = CsvParser
            .parse(Path::new("/nonexistent/slots.csv"), &[])
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));

        let mut xlsx = Builder::new().suffix(".xlsx").tempfile().unwrap();
        write!(xlsx, "x").unwrap();
        let err = CsvParser.parse(xlsx.path(), &[]).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }
}

// ==========================================
// 作息配置导入集成测试
// ==========================================

mod helpers;

use helpers::api_test_helper::{ApiTestEnv, ACTOR};
use school_timetable::api::ApiError;
use school_timetable::domain::{DayOfWeek, DayType};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("创建临时CSV失败");
    file.write_all(content.as_bytes()).expect("写入CSV失败");
    file.flush().expect("刷新CSV失败");
    file
}

#[test]
fn test_import_working_days_partial_rejection() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    let csv = write_csv(
        "day_of_week,day_type,alternate_weeks,timing_from,timing_to\n\
         Monday,FullDay,,09:00,15:00\n\
         Saturday,AlternateWeek,2;4,09:00,12:00\n\
         Sunday,Holiday,,,\n\
         Funday,FullDay,,09:00,15:00\n\
         Tuesday,FullDay,,15:00,09:00\n",
    );

    let report = env.import().import_working_days(csv.path(), ACTOR).unwrap();
    assert_eq!(report.imported, 3);
    let rejected_rows: Vec<usize> = report.rejected.iter().map(|r| r.row).collect();
    assert_eq!(rejected_rows, vec![5, 6]);

    let saved = env.calendar().list_working_days().unwrap();
    assert_eq!(saved.len(), 3);
    let saturday = saved
        .iter()
        .find(|wd| wd.day_of_week() == DayOfWeek::Saturday)
        .unwrap();
    assert_eq!(saturday.day_type(), DayType::AlternateWeek);
    assert_eq!(saturday.alternate_weeks().len(), 2);

    // 每个成功行一条操作日志
    assert_eq!(env.count_actions("IMPORT_CONFIG"), 3);
}

#[test]
fn test_import_slots_uses_same_validation() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    env.save_full_day(DayOfWeek::Monday, "09:00", "15:00");
    let csv = write_csv(
        "day_of_week,slot_type,name,timing_from,timing_to\n\
         Monday,Period,Period-1,09:00,09:45\n\
         Monday,Break,Break-1,09:45,10:00\n\
         Monday,Period,Period-2,09:30,10:15\n\
         Tuesday,Period,Period-1,09:00,09:45\n\
         \n\
         mon,period,Period-2,10:00,10:45\n",
    );

    let report = env.import().import_slots(csv.path(), ACTOR).unwrap();
    assert_eq!(report.imported, 3);
    let rejected_rows: Vec<usize> = report.rejected.iter().map(|r| r.row).collect();
    assert_eq!(rejected_rows, vec![4, 5]);

    let names: Vec<String> = env
        .schedule()
        .list_slots(DayOfWeek::Monday)
        .unwrap()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec!["Period-1", "Break-1", "Period-2"]);
    assert_eq!(env.count_actions("IMPORT_CONFIG"), 3);
    assert_eq!(env.count_actions("CREATE_SLOT"), 0);
}

#[test]
fn test_import_missing_column() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    let csv = write_csv("day_of_week,slot_type,name\nMonday,Period,Period-1\n");

    let err = env.import().import_slots(csv.path(), ACTOR).unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));
    assert_eq!(env.count_actions("IMPORT_CONFIG"), 0);
}

#[test]
fn test_import_missing_file() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    let err = env
        .import()
        .import_working_days(std::path::Path::new("/nonexistent/working_days.csv"), ACTOR)
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));
}

// ==========================================
// 校历 API 集成测试
// ==========================================
// 覆盖: 日期判定（全天/半天/隔周/假日）、当日有效节次、假日维护
// ==========================================

mod helpers;

use chrono::NaiveDate;
use helpers::api_test_helper::{monday, ApiTestEnv, ACTOR};
use school_timetable::api::ApiError;
use school_timetable::config::config_keys;
use school_timetable::domain::{
    DayClass, DayOfWeek, DayType, HolidayType, PublicHoliday, TimeWindow, WorkingDay,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn save_alternate_saturday(env: &ApiTestEnv, weeks: &[u32]) {
    let saturday = WorkingDay::new(
        DayOfWeek::Saturday,
        DayType::AlternateWeek,
        weeks.iter().copied(),
        Some(TimeWindow::parse("09:00", "12:00").unwrap()),
    )
    .unwrap();
    env.calendar().save_working_day(&saturday, ACTOR).unwrap();
}

#[test]
fn test_classify_regular_days() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    env.save_full_day(DayOfWeek::Monday, "09:00", "15:00");
    let friday = WorkingDay::new(
        DayOfWeek::Friday,
        DayType::HalfDay,
        [],
        Some(TimeWindow::parse("09:00", "12:00").unwrap()),
    )
    .unwrap();
    env.calendar().save_working_day(&friday, ACTOR).unwrap();
    let sunday = WorkingDay::new(DayOfWeek::Sunday, DayType::Holiday, [], None).unwrap();
    env.calendar().save_working_day(&sunday, ACTOR).unwrap();

    assert_eq!(env.calendar().classify_date(monday()).unwrap(), DayClass::FullDay);
    assert_eq!(env.calendar().classify_date(date(2025, 1, 10)).unwrap(), DayClass::HalfDay);
    assert_eq!(env.calendar().classify_date(date(2025, 1, 12)).unwrap(), DayClass::Holiday);
    // 周二未配置
    assert_eq!(env.calendar().classify_date(date(2025, 1, 7)).unwrap(), DayClass::Unscheduled);
}

#[test]
fn test_alternate_week_saturdays() {
    // 周六隔周上课: 第 2、4 周
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    save_alternate_saturday(&env, &[2, 4]);

    assert_eq!(env.calendar().week_tag(date(2025, 1, 11)), 2);
    assert_eq!(env.calendar().classify_date(date(2025, 1, 4)).unwrap(), DayClass::Unscheduled);
    assert_eq!(env.calendar().classify_date(date(2025, 1, 11)).unwrap(), DayClass::FullDay);
    assert_eq!(env.calendar().classify_date(date(2025, 1, 18)).unwrap(), DayClass::Unscheduled);
    assert_eq!(env.calendar().classify_date(date(2025, 1, 25)).unwrap(), DayClass::FullDay);
}

#[test]
fn test_alternate_week_tags_round_trip() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    save_alternate_saturday(&env, &[4, 2, 2]);

    let saved = env.calendar().list_working_days().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].day_type(), DayType::AlternateWeek);
    let weeks: Vec<u32> = saved[0].alternate_weeks().iter().copied().collect();
    assert_eq!(weeks, vec![2, 4]);
}

#[test]
fn test_full_day_holiday_overrides_working_day() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    env.seed_monday();
    let holiday = PublicHoliday::create(
        2025,
        "寒假",
        HolidayType::FullDay,
        date(2025, 1, 6),
        date(2025, 1, 12),
    )
    .unwrap();
    env.calendar().save_holiday(&holiday, ACTOR).unwrap();

    assert_eq!(env.calendar().classify_date(monday()).unwrap(), DayClass::Holiday);
    let plan = env.calendar().day_plan(monday()).unwrap();
    assert!(plan.window.is_none());
    assert!(plan.slots.is_empty());
    assert_eq!(plan.cancelled.len(), 3);

    // 区间外恢复正常
    assert_eq!(env.calendar().classify_date(date(2025, 1, 13)).unwrap(), DayClass::FullDay);
}

#[test]
fn test_half_day_holiday_truncates_window() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    env.seed_monday();
    env.create_period(DayOfWeek::Monday, "Period-3", "11:30", "12:15");
    env.create_period(DayOfWeek::Monday, "Period-4", "13:00", "13:45");
    let holiday =
        PublicHoliday::create(2025, "运动会", HolidayType::HalfDay, monday(), monday()).unwrap();
    env.calendar().save_holiday(&holiday, ACTOR).unwrap();

    let plan = env.calendar().day_plan(monday()).unwrap();
    assert_eq!(plan.day_class, DayClass::HalfDay);
    assert_eq!(plan.window, Some(TimeWindow::parse("09:00", "12:00").unwrap()));

    let effective: Vec<&str> = plan.slots.iter().map(|s| s.name()).collect();
    assert_eq!(effective, vec!["Period-1", "Break-1", "Period-2"]);
    // 跨越截止时间的节次整节取消
    let cancelled: Vec<&str> = plan.cancelled.iter().map(|s| s.name()).collect();
    assert_eq!(cancelled, vec!["Period-3", "Period-4"]);
}

#[test]
fn test_half_day_cutoff_configurable() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    env.seed_monday();
    env.state
        .config()
        .set_global_value(config_keys::HALF_DAY_CUTOFF, "10:00")
        .unwrap();
    let holiday =
        PublicHoliday::create(2025, "教研", HolidayType::HalfDay, monday(), monday()).unwrap();
    env.calendar().save_holiday(&holiday, ACTOR).unwrap();

    let plan = env.calendar().day_plan(monday()).unwrap();
    let effective: Vec<&str> = plan.slots.iter().map(|s| s.name()).collect();
    assert_eq!(effective, vec!["Period-1", "Break-1"]);
}

#[test]
fn test_half_day_cutoff_at_start_classified_holiday() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    env.seed_monday();
    env.state
        .config()
        .set_global_value(config_keys::HALF_DAY_CUTOFF, "09:00")
        .unwrap();
    let holiday =
        PublicHoliday::create(2025, "上午集会", HolidayType::HalfDay, monday(), monday()).unwrap();
    env.calendar().save_holiday(&holiday, ACTOR).unwrap();

    assert_eq!(env.calendar().classify_date(monday()).unwrap(), DayClass::Holiday);
    let plan = env.calendar().day_plan(monday()).unwrap();
    assert_eq!(plan.day_class, DayClass::Holiday);
    assert_eq!(plan.window, None);
    assert!(plan.slots.is_empty());
    assert_eq!(plan.cancelled.len(), 3);
}

#[test]
fn test_half_day_holiday_on_unscheduled_day() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    let tuesday = date(2025, 1, 7);
    let holiday =
        PublicHoliday::create(2025, "半天", HolidayType::HalfDay, tuesday, tuesday).unwrap();
    env.calendar().save_holiday(&holiday, ACTOR).unwrap();

    assert_eq!(env.calendar().classify_date(tuesday).unwrap(), DayClass::Unscheduled);
}

#[test]
fn test_unscheduled_alternate_week_cancels_all_slots() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    save_alternate_saturday(&env, &[2]);
    env.create_period(DayOfWeek::Saturday, "Period-1", "09:00", "09:45");

    let off_week = env.calendar().day_plan(date(2025, 1, 4)).unwrap();
    assert_eq!(off_week.day_class, DayClass::Unscheduled);
    assert!(off_week.slots.is_empty());
    assert_eq!(off_week.cancelled.len(), 1);

    let on_week = env.calendar().day_plan(date(2025, 1, 11)).unwrap();
    assert_eq!(on_week.day_class, DayClass::FullDay);
    assert_eq!(on_week.slots.len(), 1);
}

// ==========================================
// 公共假日维护
// ==========================================

#[test]
fn test_holiday_crud() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    let spring = PublicHoliday::create(
        2025,
        "春节",
        HolidayType::FullDay,
        date(2025, 1, 28),
        date(2025, 2, 4),
    )
    .unwrap();
    let labor = PublicHoliday::create(
        2025,
        "劳动节",
        HolidayType::FullDay,
        date(2025, 5, 1),
        date(2025, 5, 5),
    )
    .unwrap();
    env.calendar().save_holiday(&spring, ACTOR).unwrap();
    env.calendar().save_holiday(&labor, ACTOR).unwrap();

    assert_eq!(env.calendar().list_holidays(2025).unwrap().len(), 2);
    assert!(env.calendar().list_holidays(2024).unwrap().is_empty());

    let february = env
        .calendar()
        .holidays_between(date(2025, 2, 1), date(2025, 2, 28))
        .unwrap();
    assert_eq!(february.len(), 1);
    assert_eq!(february[0].description(), "春节");

    let err = env
        .calendar()
        .holidays_between(date(2025, 3, 1), date(2025, 2, 1))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    assert!(env.calendar().delete_holiday(spring.holiday_id(), ACTOR).unwrap());
    assert!(!env.calendar().delete_holiday(spring.holiday_id(), ACTOR).unwrap());
    assert_eq!(env.calendar().list_holidays(2025).unwrap().len(), 1);

    assert_eq!(env.count_actions("SAVE_HOLIDAY"), 2);
    assert_eq!(env.count_actions("DELETE_HOLIDAY"), 1);
}

#[test]
fn test_save_holiday_upserts() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");
    let holiday = PublicHoliday::new(
        "h-1".to_string(),
        2025,
        "校庆",
        HolidayType::HalfDay,
        monday(),
        monday(),
    )
    .unwrap();
    env.calendar().save_holiday(&holiday, ACTOR).unwrap();

    let widened = PublicHoliday::new(
        "h-1".to_string(),
        2025,
        "校庆",
        HolidayType::FullDay,
        monday(),
        date(2025, 1, 7),
    )
    .unwrap();
    env.calendar().save_holiday(&widened, ACTOR).unwrap();

    let holidays = env.calendar().list_holidays(2025).unwrap();
    assert_eq!(holidays, vec![widened]);
}

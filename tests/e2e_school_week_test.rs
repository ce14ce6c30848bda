// ==========================================
// 端到端场景测试: 配置一周作息并排课
// ==========================================
// 流程: 工作日 → 节次 → 任课 → 课表 → 排课 → 修改作息 → 审计
// ==========================================

mod helpers;

use helpers::api_test_helper::{monday, ApiTestEnv, ACTOR};
use school_timetable::api::SlotInput;
use school_timetable::domain::{DayOfWeek, SlotType};
use school_timetable::engine::ScheduleError;

#[test]
fn test_e2e_school_week_flow() {
    let env = ApiTestEnv::new().expect("创建测试环境失败");

    // ===== 作息: 周一全天 09:00-15:00 =====
    env.save_full_day(DayOfWeek::Monday, "09:00", "15:00");
    env.create_period(DayOfWeek::Monday, "Period-1", "09:00", "09:45");
    let overlap = env
        .try_create_slot(DayOfWeek::Monday, SlotType::Period, "Period-2", "09:30", "10:15")
        .unwrap_err();
    assert!(matches!(overlap.schedule_error(), Some(ScheduleError::SlotOverlap { .. })));

    let suggested = env
        .schedule()
        .suggest_slot_name(DayOfWeek::Monday, SlotType::Period)
        .unwrap();
    assert_eq!(suggested, "Period-2");
    env.create_period(DayOfWeek::Monday, &suggested, "10:00", "10:45");

    // ===== 任课: T 任 5-A 数学班主任，后由 T2 科学接任班主任 =====
    env.assign("5", "Math", "A", "T", true);
    env.assign("6", "Science", "B", "T", false);
    env.assign("5", "Science", "A", "T2", true);
    let math = env
        .assignment()
        .list_mappings("5")
        .unwrap()
        .into_iter()
        .find(|m| m.subject_id() == "Math")
        .unwrap();
    assert!(!math.divisions()[0].is_class_teacher());
    assert_eq!(
        env.assignment().class_teacher_of("5", "A").unwrap().unwrap().teacher_id(),
        "T2"
    );

    // ===== 排课 =====
    let tt_5a = env.create_timetable("2024-25", "5", "A").time_table_id;
    let tt_6b = env.create_timetable("2024-25", "6", "B").time_table_id;

    env.place(&tt_5a, DayOfWeek::Monday, "Period-1", "Math", "T").unwrap();
    let double = env
        .place(&tt_6b, DayOfWeek::Monday, "Period-1", "Science", "T")
        .unwrap_err();
    assert!(matches!(
        double.schedule_error(),
        Some(ScheduleError::TeacherDoubleBooked { .. })
    ));

    let unknown = env
        .place(&tt_6b, DayOfWeek::Monday, "Period-9", "Science", "T")
        .unwrap_err();
    assert!(matches!(unknown.schedule_error(), Some(ScheduleError::UnknownSlot { .. })));
    assert!(env.timetable().list_entries(&tt_6b).unwrap().is_empty());

    env.place(&tt_6b, DayOfWeek::Monday, "Period-2", "Science", "T").unwrap();
    env.place(&tt_5a, DayOfWeek::Monday, "Period-2", "Science", "T2").unwrap();

    // ===== 删除被引用节次被拒，节次与条目均不变 =====
    let in_use = env
        .schedule()
        .delete_slot(DayOfWeek::Monday, "Period-1", ACTOR)
        .unwrap_err();
    assert!(matches!(in_use.schedule_error(), Some(ScheduleError::SlotInUse { .. })));
    assert_eq!(env.schedule().list_slots(DayOfWeek::Monday).unwrap().len(), 2);
    assert_eq!(env.timetable().list_entries(&tt_5a).unwrap().len(), 2);

    // ===== 未被引用的节次可自由调整 =====
    let lunch = env.create_break(DayOfWeek::Monday, "Lunch", "12:00", "13:00");
    env.schedule()
        .update_slot(
            lunch.slot_id(),
            &SlotInput {
                day_of_week: DayOfWeek::Monday,
                slot_type: SlotType::Break,
                name: "Lunch",
                timing_from: "12:15",
                timing_to: "13:00",
            },
            ACTOR,
        )
        .unwrap();

    // ===== 审计 =====
    assert!(env.timetable().audit_timetable(&tt_5a).unwrap().is_empty());
    assert!(env.timetable().audit_timetable(&tt_6b).unwrap().is_empty());
    assert!(env.timetable().audit_date(&tt_5a, monday()).unwrap().is_empty());

    let plan = env.calendar().day_plan(monday()).unwrap();
    assert_eq!(plan.slots.len(), 3);

    // ===== 操作日志 =====
    assert_eq!(env.count_actions("CREATE_SLOT"), 3);
    assert_eq!(env.count_actions("UPDATE_SLOT"), 1);
    assert_eq!(env.count_actions("ASSIGN_TEACHER"), 3);
    assert_eq!(env.count_actions("PLACE_ENTRY"), 3);
    assert_eq!(env.count_actions("DELETE_SLOT"), 0);
}

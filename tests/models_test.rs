use chrono::NaiveDate;
use mdrive::db::models::{Alert, AlertSchedule, Maintenance, VehicleStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn maintenance(cost: &str) -> Maintenance {
    Maintenance {
        id: String::new(),
        date: date(2024, 1, 15),
        operation: "Oil change".to_string(),
        odometer_km: 50000,
        cost: cost.to_string(),
        next_due_km: None,
        note: None,
    }
}

#[test]
fn test_status_round_trip() {
    for status in [
        VehicleStatus::Active,
        VehicleStatus::InService,
        VehicleStatus::Broken,
    ] {
        let parsed: VehicleStatus = status.as_str().parse().unwrap();
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_status_rejects_unknown_value() {
    let result = "totaled".parse::<VehicleStatus>();
    assert!(result.is_err());
}

#[test]
fn test_status_severity_order() {
    assert!(VehicleStatus::Active.severity_rank() < VehicleStatus::InService.severity_rank());
    assert!(VehicleStatus::InService.severity_rank() < VehicleStatus::Broken.severity_rank());
}

#[test]
fn test_cost_value_parses_numbers() {
    assert_eq!(maintenance("1500").cost_value(), 1500.0);
    assert_eq!(maintenance("99.5").cost_value(), 99.5);
    assert_eq!(maintenance(" 250 ").cost_value(), 250.0);
}

#[test]
fn test_cost_value_non_numeric_is_zero() {
    assert_eq!(maintenance("abc").cost_value(), 0.0);
    assert_eq!(maintenance("").cost_value(), 0.0);
}

#[test]
fn test_dedup_key_prefers_id() {
    let mut record = maintenance("100");
    record.id = "1700000000000-1".to_string();
    assert_eq!(record.dedup_key(), "1700000000000-1");
}

#[test]
fn test_dedup_key_falls_back_to_date_and_operation() {
    let record = maintenance("100");
    assert_eq!(record.dedup_key(), "2024-01-15Oil change");
}

fn date_alert(due: NaiveDate, lead_days: i64) -> Alert {
    Alert {
        id: "a1".to_string(),
        plate: "34ABC123".to_string(),
        title: "Insurance renewal".to_string(),
        note: None,
        schedule: AlertSchedule::Date { due, lead_days },
    }
}

#[test]
fn test_date_alert_due_inside_lead_window() {
    let today = date(2024, 6, 1);
    let alert = date_alert(date(2024, 6, 10), 14);
    assert!(alert.is_due(today, 0));
}

#[test]
fn test_date_alert_not_due_outside_lead_window() {
    let today = date(2024, 6, 1);
    let alert = date_alert(date(2024, 6, 30), 7);
    assert!(!alert.is_due(today, 0));
}

#[test]
fn test_date_alert_not_due_after_deadline() {
    let today = date(2024, 7, 1);
    let alert = date_alert(date(2024, 6, 10), 14);
    assert!(!alert.is_due(today, 0));
}

#[test]
fn test_date_alert_without_lead_never_fires() {
    let today = date(2024, 6, 9);
    let alert = date_alert(date(2024, 6, 10), 0);
    assert!(!alert.is_due(today, 0));
}

#[test]
fn test_odometer_alert_due_inside_lead_window() {
    let alert = Alert {
        id: "a2".to_string(),
        plate: "34ABC123".to_string(),
        title: "Timing belt".to_string(),
        note: None,
        schedule: AlertSchedule::Odometer {
            due_km: 90000,
            lead_km: 5000,
        },
    };
    assert!(!alert.is_due(date(2024, 6, 1), 80000));
    assert!(alert.is_due(date(2024, 6, 1), 85000));
    assert!(alert.is_due(date(2024, 6, 1), 95000));
}

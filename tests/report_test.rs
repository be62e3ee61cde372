use chrono::NaiveDate;
use mdrive::db::models::{Maintenance, Vehicle, VehicleStatus};
use mdrive::report::{export_csv, import_csv, CSV_HEADER};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn vehicle(plate: &str, km: i64, status: VehicleStatus) -> Vehicle {
    Vehicle {
        plate: plate.to_string(),
        make: "Toyota".to_string(),
        model: "Corolla".to_string(),
        year: None,
        odometer_km: km,
        next_service_km: None,
        chassis_no: None,
        status,
        maintenances: Vec::new(),
        alerts: Vec::new(),
        owner_email: "owner@example.com".to_string(),
        created_at: None,
    }
}

#[test]
fn test_export_starts_with_bom_and_header() {
    let fleet = vec![vehicle("34ABC123", 50000, VehicleStatus::Active)];
    let csv = export_csv(&fleet);

    assert!(csv.starts_with('\u{feff}'));
    let mut lines = csv.trim_start_matches('\u{feff}').lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
}

#[test]
fn test_export_vehicle_without_maintenance_emits_one_blank_row() {
    let mut v = vehicle("34ABC123", 50000, VehicleStatus::Active);
    v.year = Some("2018".to_string());
    v.chassis_no = Some("VF1RFB00".to_string());
    let csv = export_csv(&[v]);

    let row = csv.trim_start_matches('\u{feff}').lines().nth(1).unwrap();
    assert_eq!(
        row,
        "34ABC123;Toyota;Corolla;2018;50000;VF1RFB00;active;;;;;owner@example.com"
    );
    assert_eq!(row.split(';').count(), 12);
}

#[test]
fn test_export_one_row_per_maintenance_record() {
    let mut v = vehicle("34ABC123", 50000, VehicleStatus::InService);
    v.maintenances.push(Maintenance {
        id: "1".to_string(),
        date: date(2024, 1, 15),
        operation: "Oil change".to_string(),
        odometer_km: 48000,
        cost: "1500".to_string(),
        next_due_km: Some(58000),
        note: Some("Filter too".to_string()),
    });
    v.maintenances.push(Maintenance {
        id: "2".to_string(),
        date: date(2024, 3, 2),
        operation: "Brake pads".to_string(),
        odometer_km: 51000,
        cost: "2400".to_string(),
        next_due_km: None,
        note: None,
    });

    let csv = export_csv(&[v]);
    let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "34ABC123;Toyota;Corolla;;50000;;in-service;2024-01-15;Oil change;1500;Filter too;owner@example.com"
    );
    assert_eq!(
        lines[2],
        "34ABC123;Toyota;Corolla;;50000;;in-service;2024-03-02;Brake pads;2400;;owner@example.com"
    );
}

#[test]
fn test_import_skips_header_blank_and_short_lines() {
    let text = format!(
        "{}\n\n34ABC123;Toyota;Corolla;2018;50000;;active;;;;;\nBADLINE;only;three\n",
        CSV_HEADER
    );
    let fleet = import_csv(&text, "owner@example.com");
    assert_eq!(fleet.len(), 1);
    assert_eq!(fleet[0].plate, "34ABC123");
}

#[test]
fn test_import_header_is_skipped_unconditionally() {
    // No header at all: the first data row is consumed as one
    let text = "34ABC123;Toyota;Corolla;;50000;;active;;;;;\n06XYZ99;Honda;Civic;;120000;;broken;;;;;\n";
    let fleet = import_csv(text, "owner@example.com");
    assert_eq!(fleet.len(), 1);
    assert_eq!(fleet[0].plate, "06XYZ99");
}

#[test]
fn test_import_uppercases_and_groups_by_plate() {
    let text = format!(
        "{}\n34abc123;Toyota;Corolla;;50000;;active;2024-01-15;Oil change;1500;;\n34ABC123;Toyota;Corolla;;50000;;active;2024-03-02;Brake pads;2400;;\n",
        CSV_HEADER
    );
    let fleet = import_csv(&text, "owner@example.com");
    assert_eq!(fleet.len(), 1);
    assert_eq!(fleet[0].plate, "34ABC123");
    assert_eq!(fleet[0].maintenances.len(), 2);
}

#[test]
fn test_import_first_occurrence_fixes_vehicle_fields() {
    let text = format!(
        "{}\n34ABC123;Toyota;Corolla;2018;50000;;active;;;;;\n34ABC123;Honda;Civic;2020;99999;;broken;2024-01-15;Oil change;1500;;\n",
        CSV_HEADER
    );
    let fleet = import_csv(&text, "owner@example.com");
    assert_eq!(fleet.len(), 1);
    assert_eq!(fleet[0].make, "Toyota");
    assert_eq!(fleet[0].odometer_km, 50000);
    assert_eq!(fleet[0].status, VehicleStatus::Active);
    assert_eq!(fleet[0].maintenances.len(), 1);
}

#[test]
fn test_import_requires_date_and_operation_for_a_record() {
    let text = format!(
        "{}\n34ABC123;Toyota;Corolla;;50000;;active;2024-01-15;;1500;;\n34ABC123;Toyota;Corolla;;50000;;active;;Oil change;1500;;\n",
        CSV_HEADER
    );
    let fleet = import_csv(&text, "owner@example.com");
    assert_eq!(fleet.len(), 1);
    assert!(fleet[0].maintenances.is_empty());
}

#[test]
fn test_import_record_defaults() {
    let text = format!(
        "{}\n34ABC123;Toyota;Corolla;;50000;;active;2024-01-15;Oil change;;;\n",
        CSV_HEADER
    );
    let fleet = import_csv(&text, "owner@example.com");
    let record = &fleet[0].maintenances[0];
    assert_eq!(record.id, "");
    assert_eq!(record.cost, "0");
    assert_eq!(record.odometer_km, 0);
    assert_eq!(record.note, None);
}

#[test]
fn test_import_empty_status_defaults_to_active() {
    let text = format!(
        "{}\n34ABC123;Toyota;Corolla;;50000;;;;;;;\n",
        CSV_HEADER
    );
    let fleet = import_csv(&text, "owner@example.com");
    assert_eq!(fleet[0].status, VehicleStatus::Active);
}

#[test]
fn test_import_sets_owner_email() {
    let text = format!(
        "{}\n34ABC123;Toyota;Corolla;;50000;;active;;;;;other@example.com\n",
        CSV_HEADER
    );
    let fleet = import_csv(&text, "me@example.com");
    assert_eq!(fleet[0].owner_email, "me@example.com");
}

#[test]
fn test_round_trip_preserves_plates_and_operations_but_not_record_odometers() {
    let mut a = vehicle("34ABC123", 50000, VehicleStatus::Active);
    a.maintenances.push(Maintenance {
        id: "1".to_string(),
        date: date(2024, 1, 15),
        operation: "Oil change".to_string(),
        odometer_km: 48000,
        cost: "1500".to_string(),
        next_due_km: Some(58000),
        note: None,
    });
    let b = vehicle("06XYZ99", 120000, VehicleStatus::Broken);

    let reimported = import_csv(&export_csv(&[a, b]), "owner@example.com");

    assert_eq!(reimported.len(), 2);
    assert_eq!(reimported[0].plate, "34ABC123");
    assert_eq!(reimported[1].plate, "06XYZ99");
    assert_eq!(reimported[1].status, VehicleStatus::Broken);

    let record = &reimported[0].maintenances[0];
    assert_eq!(record.date, date(2024, 1, 15));
    assert_eq!(record.operation, "Oil change");
    assert_eq!(record.cost, "1500");
    // Per-record odometers and service thresholds are not part of the
    // wire format
    assert_eq!(record.odometer_km, 0);
    assert_eq!(record.next_due_km, None);
}

//! The semicolon-delimited fleet report format.
//!
//! One row per maintenance record (one blank-maintenance row for vehicles
//! without any), UTF-8 with a leading byte-order mark. Fields are written
//! verbatim with no quoting, so embedded semicolons are not representable.

use crate::db::models::{Maintenance, Vehicle};
use crate::utils::time::parse_date;

pub const CSV_HEADER: &str =
    "Plaka;Marka;Model;Yil;KM;Sasi;Durum;Bakim_Tarihi;Bakim_Islemi;Bakim_Maliyet;Bakim_Not;Sahip_Email";

pub const REPORT_FILE_NAME: &str = "mdrive-rapor.csv";

const BOM: char = '\u{feff}';

pub fn export_csv(vehicles: &[Vehicle]) -> String {
    let mut csv = String::new();
    csv.push(BOM);
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for vehicle in vehicles {
        let base = format!(
            "{};{};{};{};{};{};{}",
            vehicle.plate,
            vehicle.make,
            vehicle.model,
            vehicle.year.as_deref().unwrap_or(""),
            vehicle.odometer_km,
            vehicle.chassis_no.as_deref().unwrap_or(""),
            vehicle.status,
        );

        if vehicle.maintenances.is_empty() {
            csv.push_str(&format!("{};;;;;{}\n", base, vehicle.owner_email));
        } else {
            for record in &vehicle.maintenances {
                csv.push_str(&format!(
                    "{};{};{};{};{};{}\n",
                    base,
                    record.date.format("%Y-%m-%d"),
                    record.operation,
                    record.cost,
                    record.note.as_deref().unwrap_or(""),
                    vehicle.owner_email,
                ));
            }
        }
    }

    csv
}

/// Rebuild a fleet from report text. The first line is always treated as the
/// header. Rows sharing a plate (uppercased) accumulate into one vehicle: the
/// first row fixes the vehicle fields, every row with a date and an operation
/// contributes a maintenance record. Malformed rows are dropped silently.
///
/// Per-record odometer readings are not part of the format, so imported
/// records always carry a reading of zero.
pub fn import_csv(text: &str, owner_email: &str) -> Vec<Vehicle> {
    let mut vehicles: Vec<Vehicle> = Vec::new();

    for line in text.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cols: Vec<&str> = line.split(';').collect();
        if cols.len() < 7 {
            continue;
        }

        let plate = cols[0].trim().to_uppercase();
        if plate.is_empty() {
            continue;
        }

        let index = match vehicles.iter().position(|v| v.plate == plate) {
            Some(index) => index,
            None => {
                vehicles.push(Vehicle {
                    plate: plate.clone(),
                    make: cols[1].to_string(),
                    model: cols[2].to_string(),
                    year: non_empty(cols[3]),
                    odometer_km: cols[4].parse().unwrap_or(0),
                    next_service_km: None,
                    chassis_no: non_empty(cols[5]),
                    status: cols[6].parse().unwrap_or_default(),
                    maintenances: Vec::new(),
                    alerts: Vec::new(),
                    owner_email: owner_email.to_string(),
                    created_at: None,
                });
                vehicles.len() - 1
            }
        };

        let date = cols.get(7).copied().unwrap_or("");
        let operation = cols.get(8).copied().unwrap_or("");
        if date.is_empty() || operation.is_empty() {
            continue;
        }
        let date = match parse_date(date) {
            Some(date) => date,
            None => continue,
        };

        vehicles[index].maintenances.push(Maintenance {
            id: String::new(),
            date,
            operation: operation.to_string(),
            odometer_km: 0,
            cost: cols
                .get(9)
                .filter(|c| !c.is_empty())
                .unwrap_or(&"0")
                .to_string(),
            next_due_km: None,
            note: cols.get(10).copied().and_then(non_empty),
        });
    }

    vehicles
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use super::models::{
    Alert, AlertDraft, Maintenance, MaintenanceDraft, Vehicle, VehicleDraft, VehicleStatus,
};

const VEHICLE_COLUMNS: &str = "plate, make, model, year, odometer_km, next_service_km, \
     chassis_no, status, maintenances, alerts, owner_email, created_at";

static ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Ids for embedded records, unique even for back-to-back inserts.
fn generate_id() -> String {
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", Utc::now().timestamp_millis(), seq)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub merged: usize,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        // One row per vehicle; maintenance and alert sequences are embedded
        // as JSON, they have no existence outside their vehicle.
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS vehicles (
                id INTEGER PRIMARY KEY,
                owner_email TEXT NOT NULL,
                plate TEXT NOT NULL,
                make TEXT NOT NULL,
                model TEXT NOT NULL,
                year TEXT,
                odometer_km INTEGER NOT NULL DEFAULT 0,
                next_service_km INTEGER,
                chassis_no TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                maintenances TEXT NOT NULL DEFAULT '[]',
                alerts TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                UNIQUE(owner_email, plate)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_vehicles_owner ON vehicles(owner_email)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_vehicles_plate ON vehicles(plate)",
            [],
        )?;

        Ok(())
    }

    pub fn add_vehicle(&mut self, owner: &str, draft: &VehicleDraft) -> Result<Vehicle> {
        let plate = draft.plate.trim();
        if plate.is_empty() {
            return Err(anyhow!("plate is required"));
        }
        if self.get_vehicle(owner, plate)?.is_some() {
            return Err(anyhow!("vehicle '{}' already exists", plate));
        }

        let vehicle = Vehicle {
            plate: plate.to_string(),
            make: draft.make.clone(),
            model: draft.model.clone(),
            year: draft.year.clone(),
            odometer_km: draft.odometer_km,
            next_service_km: None,
            chassis_no: draft.chassis_no.clone(),
            status: VehicleStatus::Active,
            maintenances: Vec::new(),
            alerts: Vec::new(),
            owner_email: owner.to_string(),
            created_at: None,
        };
        self.insert_vehicle(owner, &vehicle)
    }

    fn insert_vehicle(&mut self, owner: &str, vehicle: &Vehicle) -> Result<Vehicle> {
        if vehicle.plate.trim().is_empty() {
            return Err(anyhow!("plate is required"));
        }

        let mut stored = vehicle.clone();
        stored.owner_email = owner.to_string();
        stored.created_at = Some(Utc::now());

        self.conn.execute(
            "INSERT INTO vehicles (owner_email, plate, make, model, year, odometer_km,
                next_service_km, chassis_no, status, maintenances, alerts, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                stored.owner_email,
                stored.plate,
                stored.make,
                stored.model,
                stored.year,
                stored.odometer_km,
                stored.next_service_km,
                stored.chassis_no,
                stored.status.as_str(),
                serde_json::to_string(&stored.maintenances)?,
                serde_json::to_string(&stored.alerts)?,
                stored.created_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        Ok(stored)
    }

    pub fn get_vehicle(&self, owner: &str, plate: &str) -> Result<Option<Vehicle>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM vehicles WHERE owner_email = ?1 AND plate = ?2",
            VEHICLE_COLUMNS
        ))?;

        let mut rows = stmt.query([owner, plate])?;
        if let Some(row) = rows.next()? {
            Ok(Some(read_vehicle(row)?))
        } else {
            Ok(None)
        }
    }

    /// Full snapshot of an owner's fleet, plate-ordered.
    pub fn list_vehicles(&self, owner: &str) -> Result<Vec<Vehicle>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM vehicles WHERE owner_email = ?1 ORDER BY plate",
            VEHICLE_COLUMNS
        ))?;

        let mut rows = stmt.query([owner])?;
        let mut vehicles = Vec::new();
        while let Some(row) = rows.next()? {
            vehicles.push(read_vehicle(row)?);
        }

        Ok(vehicles)
    }

    pub fn update_vehicle(&mut self, vehicle: &Vehicle) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE vehicles
             SET make = ?1,
                 model = ?2,
                 year = ?3,
                 odometer_km = ?4,
                 next_service_km = ?5,
                 chassis_no = ?6,
                 status = ?7,
                 maintenances = ?8,
                 alerts = ?9
             WHERE owner_email = ?10 AND plate = ?11",
            rusqlite::params![
                vehicle.make,
                vehicle.model,
                vehicle.year,
                vehicle.odometer_km,
                vehicle.next_service_km,
                vehicle.chassis_no,
                vehicle.status.as_str(),
                serde_json::to_string(&vehicle.maintenances)?,
                serde_json::to_string(&vehicle.alerts)?,
                vehicle.owner_email,
                vehicle.plate,
            ],
        )?;

        if updated == 0 {
            return Err(anyhow!("vehicle '{}' not found", vehicle.plate));
        }
        Ok(())
    }

    pub fn delete_vehicle(&mut self, owner: &str, plate: &str) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM vehicles WHERE owner_email = ?1 AND plate = ?2",
            [owner, plate],
        )?;

        if deleted == 0 {
            return Err(anyhow!("vehicle '{}' not found", plate));
        }
        Ok(())
    }

    pub fn update_odometer(&mut self, owner: &str, plate: &str, odometer_km: i64) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE vehicles SET odometer_km = ?1 WHERE owner_email = ?2 AND plate = ?3",
            rusqlite::params![odometer_km, owner, plate],
        )?;

        if updated == 0 {
            return Err(anyhow!("vehicle '{}' not found", plate));
        }
        Ok(())
    }

    pub fn update_next_service(
        &mut self,
        owner: &str,
        plate: &str,
        next_service_km: Option<i64>,
    ) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE vehicles SET next_service_km = ?1 WHERE owner_email = ?2 AND plate = ?3",
            rusqlite::params![next_service_km, owner, plate],
        )?;

        if updated == 0 {
            return Err(anyhow!("vehicle '{}' not found", plate));
        }
        Ok(())
    }

    fn require_vehicle(&self, owner: &str, plate: &str) -> Result<Vehicle> {
        self.get_vehicle(owner, plate)?
            .ok_or_else(|| anyhow!("vehicle '{}' not found", plate))
    }

    fn save_sequences(
        &mut self,
        owner: &str,
        plate: &str,
        maintenances: &[Maintenance],
        alerts: &[Alert],
    ) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE vehicles SET maintenances = ?1, alerts = ?2
             WHERE owner_email = ?3 AND plate = ?4",
            rusqlite::params![
                serde_json::to_string(maintenances)?,
                serde_json::to_string(alerts)?,
                owner,
                plate,
            ],
        )?;

        if updated == 0 {
            return Err(anyhow!("vehicle '{}' not found", plate));
        }
        Ok(())
    }

    pub fn add_maintenance(
        &mut self,
        owner: &str,
        plate: &str,
        draft: &MaintenanceDraft,
    ) -> Result<Maintenance> {
        let vehicle = self.require_vehicle(owner, plate)?;

        let record = Maintenance {
            id: generate_id(),
            date: draft.date,
            operation: draft.operation.clone(),
            odometer_km: draft.odometer_km,
            cost: draft.cost.clone(),
            next_due_km: draft.next_due_km,
            note: draft.note.clone(),
        };

        let mut maintenances = vehicle.maintenances;
        maintenances.push(record.clone());
        self.save_sequences(owner, plate, &maintenances, &vehicle.alerts)?;

        Ok(record)
    }

    /// Replace the record at `index` (0-based), keeping its identifier.
    pub fn update_maintenance(
        &mut self,
        owner: &str,
        plate: &str,
        index: usize,
        draft: &MaintenanceDraft,
    ) -> Result<()> {
        let vehicle = self.require_vehicle(owner, plate)?;

        let mut maintenances = vehicle.maintenances;
        let record = maintenances
            .get_mut(index)
            .ok_or_else(|| anyhow!("no maintenance record at index {}", index + 1))?;

        record.date = draft.date;
        record.operation = draft.operation.clone();
        record.odometer_km = draft.odometer_km;
        record.cost = draft.cost.clone();
        record.next_due_km = draft.next_due_km;
        record.note = draft.note.clone();

        self.save_sequences(owner, plate, &maintenances, &vehicle.alerts)
    }

    pub fn remove_maintenance(&mut self, owner: &str, plate: &str, index: usize) -> Result<()> {
        let vehicle = self.require_vehicle(owner, plate)?;

        let mut maintenances = vehicle.maintenances;
        if index >= maintenances.len() {
            return Err(anyhow!("no maintenance record at index {}", index + 1));
        }
        maintenances.remove(index);

        self.save_sequences(owner, plate, &maintenances, &vehicle.alerts)
    }

    pub fn add_alert(&mut self, owner: &str, plate: &str, draft: &AlertDraft) -> Result<Alert> {
        let vehicle = self.require_vehicle(owner, plate)?;

        let alert = Alert {
            id: generate_id(),
            plate: vehicle.plate.clone(),
            title: draft.title.clone(),
            note: draft.note.clone(),
            schedule: draft.schedule.clone(),
        };

        let mut alerts = vehicle.alerts;
        alerts.push(alert.clone());
        self.save_sequences(owner, plate, &vehicle.maintenances, &alerts)?;

        Ok(alert)
    }

    /// Rewrite the alert matching `alert_id`, keeping its id and vehicle.
    pub fn update_alert(
        &mut self,
        owner: &str,
        plate: &str,
        alert_id: &str,
        draft: &AlertDraft,
    ) -> Result<()> {
        let vehicle = self.require_vehicle(owner, plate)?;

        let mut alerts = vehicle.alerts;
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or_else(|| anyhow!("no alert with id {}", alert_id))?;

        alert.title = draft.title.clone();
        alert.note = draft.note.clone();
        alert.schedule = draft.schedule.clone();

        self.save_sequences(owner, plate, &vehicle.maintenances, &alerts)
    }

    pub fn remove_alert(&mut self, owner: &str, plate: &str, alert_id: &str) -> Result<()> {
        let vehicle = self.require_vehicle(owner, plate)?;

        let mut alerts = vehicle.alerts;
        let before = alerts.len();
        alerts.retain(|a| a.id != alert_id);
        if alerts.len() == before {
            return Err(anyhow!("no alert with id {}", alert_id));
        }

        self.save_sequences(owner, plate, &vehicle.maintenances, &alerts)
    }

    /// Merge an imported fleet into the owner's collection. Known plates get
    /// their maintenance and alert sequences unioned and de-duplicated
    /// (maintenance by id or date+operation, alerts by id, first seen wins);
    /// unknown plates are inserted as new vehicles.
    pub fn merge_import(&mut self, owner: &str, imported: Vec<Vehicle>) -> Result<ImportSummary> {
        let mut summary = ImportSummary { added: 0, merged: 0 };

        for incoming in imported {
            match self.get_vehicle(owner, &incoming.plate)? {
                Some(existing) => {
                    let mut seen = HashSet::new();
                    let mut maintenances = Vec::new();
                    for record in existing.maintenances.iter().chain(incoming.maintenances.iter()) {
                        if seen.insert(record.dedup_key()) {
                            maintenances.push(record.clone());
                        }
                    }

                    let mut seen_alerts = HashSet::new();
                    let mut alerts = Vec::new();
                    for alert in existing.alerts.iter().chain(incoming.alerts.iter()) {
                        if seen_alerts.insert(alert.id.clone()) {
                            alerts.push(alert.clone());
                        }
                    }

                    self.save_sequences(owner, &existing.plate, &maintenances, &alerts)?;
                    summary.merged += 1;
                }
                None => {
                    self.insert_vehicle(owner, &incoming)?;
                    summary.added += 1;
                }
            }
        }

        Ok(summary)
    }

    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;

        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn set_manual_order(&mut self, owner: &str, plates: &[String]) -> Result<()> {
        let key = format!("order:{}", owner);
        self.set_setting(&key, &serde_json::to_string(plates)?)
    }

    pub fn manual_order(&self, owner: &str) -> Result<Option<Vec<String>>> {
        let key = format!("order:{}", owner);
        match self.get_setting(&key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn clear_manual_order(&mut self, owner: &str) -> Result<()> {
        let key = format!("order:{}", owner);
        self.conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }
}

fn read_vehicle(row: &rusqlite::Row) -> Result<Vehicle> {
    let status: String = row.get(7)?;
    let created_at: Option<String> = row.get(11)?;

    Ok(Vehicle {
        plate: row.get(0)?,
        make: row.get(1)?,
        model: row.get(2)?,
        year: row.get(3)?,
        odometer_km: row.get(4)?,
        next_service_km: row.get(5)?,
        chassis_no: row.get(6)?,
        status: status.parse()?,
        maintenances: serde_json::from_str(&row.get::<_, String>(8)?)
            .map_err(|e| anyhow!("failed to parse maintenance records: {}", e))?,
        alerts: serde_json::from_str(&row.get::<_, String>(9)?)
            .map_err(|e| anyhow!("failed to parse alerts: {}", e))?,
        owner_email: row.get(10)?,
        created_at: created_at
            .map(|t| DateTime::parse_from_rfc3339(&t).map(|t| t.with_timezone(&Utc)))
            .transpose()?,
    })
}

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleStatus {
    #[default]
    Active,
    InService,
    Broken,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "active",
            VehicleStatus::InService => "in-service",
            VehicleStatus::Broken => "broken",
        }
    }

    /// Rank used for status sorting: active < in-service < broken.
    pub fn severity_rank(&self) -> u8 {
        match self {
            VehicleStatus::Active => 0,
            VehicleStatus::InService => 1,
            VehicleStatus::Broken => 2,
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(VehicleStatus::Active),
            "in-service" => Ok(VehicleStatus::InService),
            "broken" => Ok(VehicleStatus::Broken),
            other => Err(anyhow!(
                "unknown status '{}' (expected active, in-service or broken)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maintenance {
    /// Store-assigned identifier. Empty for records reconstructed from a CSV import.
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    pub operation: String,
    pub odometer_km: i64,
    pub cost: String,
    #[serde(default)]
    pub next_due_km: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Maintenance {
    /// Numeric value of the free-form cost field. Missing or non-numeric
    /// costs count as zero rather than failing the aggregation.
    pub fn cost_value(&self) -> f64 {
        self.cost.trim().parse::<f64>().unwrap_or(0.0)
    }

    /// Key used to de-duplicate records when merging an imported fleet:
    /// the id when one was assigned, otherwise date plus operation.
    pub fn dedup_key(&self) -> String {
        if self.id.is_empty() {
            format!("{}{}", self.date, self.operation)
        } else {
            self.id.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AlertSchedule {
    Date {
        due: NaiveDate,
        #[serde(default)]
        lead_days: i64,
    },
    Odometer {
        due_km: i64,
        #[serde(default)]
        lead_km: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    /// Plate of the owning vehicle.
    pub plate: String,
    pub title: String,
    #[serde(default)]
    pub note: Option<String>,
    pub schedule: AlertSchedule,
}

impl Alert {
    /// Whether the reminder should fire. Date reminders fire inside their
    /// lead window but not once the deadline has passed; odometer reminders
    /// fire as soon as the reading enters the lead window and stay due.
    pub fn is_due(&self, today: NaiveDate, vehicle_km: i64) -> bool {
        match self.schedule {
            AlertSchedule::Date { due, lead_days } => {
                let days_until = (due - today).num_days();
                days_until > 0 && days_until <= lead_days
            }
            AlertSchedule::Odometer { due_km, lead_km } => vehicle_km + lead_km >= due_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub plate: String,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<String>,
    pub odometer_km: i64,
    #[serde(default)]
    pub next_service_km: Option<i64>,
    #[serde(default)]
    pub chassis_no: Option<String>,
    pub status: VehicleStatus,
    #[serde(default)]
    pub maintenances: Vec<Maintenance>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    pub owner_email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Vehicle {
    pub fn total_maintenance_cost(&self) -> f64 {
        self.maintenances.iter().map(|m| m.cost_value()).sum()
    }
}

/// Input for registering a vehicle. Status, history and the creation stamp
/// are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDraft {
    pub plate: String,
    pub make: String,
    pub model: String,
    pub year: Option<String>,
    pub odometer_km: i64,
    pub chassis_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceDraft {
    pub date: NaiveDate,
    pub operation: String,
    pub odometer_km: i64,
    pub cost: String,
    pub next_due_km: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub title: String,
    pub note: Option<String>,
    pub schedule: AlertSchedule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_vehicles: usize,
    pub total_maintenances: usize,
    pub total_cost: f64,
    pub upcoming_maintenances: Vec<Maintenance>,
    pub average_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub active: usize,
    pub in_service: usize,
    pub broken: usize,
}

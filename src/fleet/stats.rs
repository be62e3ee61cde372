use chrono::NaiveDate;

use crate::db::models::{Alert, DashboardStats, StatusBreakdown, Vehicle, VehicleStatus};

/// Reduce a fleet snapshot to dashboard statistics. Maintenance records are
/// flattened in vehicle order, then record order within each vehicle; that
/// order carries through to `upcoming_maintenances`.
pub fn compute_stats(vehicles: &[Vehicle]) -> DashboardStats {
    let total_vehicles = vehicles.len();

    let flattened: Vec<_> = vehicles
        .iter()
        .flat_map(|v| v.maintenances.iter())
        .collect();
    let total_maintenances = flattened.len();

    let total_cost = flattened.iter().map(|m| m.cost_value()).sum();

    let upcoming_maintenances = flattened
        .iter()
        .filter(|m| m.next_due_km.map_or(false, |km| km > 0))
        .map(|m| (*m).clone())
        .collect();

    let average_km = if total_vehicles > 0 {
        vehicles.iter().map(|v| v.odometer_km).sum::<i64>() as f64 / total_vehicles as f64
    } else {
        0.0
    };

    DashboardStats {
        total_vehicles,
        total_maintenances,
        total_cost,
        upcoming_maintenances,
        average_km,
    }
}

pub fn status_breakdown(vehicles: &[Vehicle]) -> StatusBreakdown {
    StatusBreakdown {
        active: count_status(vehicles, VehicleStatus::Active),
        in_service: count_status(vehicles, VehicleStatus::InService),
        broken: count_status(vehicles, VehicleStatus::Broken),
    }
}

fn count_status(vehicles: &[Vehicle], status: VehicleStatus) -> usize {
    vehicles.iter().filter(|v| v.status == status).count()
}

/// All reminders across the fleet that are currently due, each evaluated
/// against its vehicle's odometer reading.
pub fn due_alerts(vehicles: &[Vehicle], today: NaiveDate) -> Vec<Alert> {
    vehicles
        .iter()
        .flat_map(|v| {
            v.alerts
                .iter()
                .filter(|a| a.is_due(today, v.odometer_km))
                .cloned()
        })
        .collect()
}

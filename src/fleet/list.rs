use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use anyhow::anyhow;

use crate::db::models::{Vehicle, VehicleStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Plate,
    Odometer,
    Cost,
    Status,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plate" => Ok(SortKey::Plate),
            "odometer" => Ok(SortKey::Odometer),
            "cost" => Ok(SortKey::Cost),
            "status" => Ok(SortKey::Status),
            other => Err(anyhow!(
                "unknown sort key '{}' (expected plate, odometer, cost or status)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(VehicleStatus),
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(StatusFilter::All)
        } else {
            Ok(StatusFilter::Only(s.parse()?))
        }
    }
}

/// Case-insensitive substring search over plate, make, model and chassis
/// number. A blank query returns the input unchanged.
pub fn search(vehicles: &[Vehicle], query: &str) -> Vec<Vehicle> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return vehicles.to_vec();
    }

    vehicles
        .iter()
        .filter(|v| {
            v.plate.to_lowercase().contains(&query)
                || v.make.to_lowercase().contains(&query)
                || v.model.to_lowercase().contains(&query)
                || v.chassis_no
                    .as_ref()
                    .map_or(false, |c| c.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

pub fn filter_by_status(vehicles: &[Vehicle], filter: StatusFilter) -> Vec<Vehicle> {
    match filter {
        StatusFilter::All => vehicles.to_vec(),
        StatusFilter::Only(status) => vehicles
            .iter()
            .filter(|v| v.status == status)
            .cloned()
            .collect(),
    }
}

/// Return a new ordering of the fleet. All comparisons are stable, so
/// vehicles that compare equal keep their input order.
pub fn sort(vehicles: &[Vehicle], key: SortKey) -> Vec<Vehicle> {
    let mut sorted = vehicles.to_vec();
    match key {
        SortKey::Plate => {
            sorted.sort_by(|a, b| a.plate.to_lowercase().cmp(&b.plate.to_lowercase()))
        }
        SortKey::Odometer => sorted.sort_by(|a, b| b.odometer_km.cmp(&a.odometer_km)),
        SortKey::Cost => sorted.sort_by(|a, b| {
            b.total_maintenance_cost()
                .partial_cmp(&a.total_maintenance_cost())
                .unwrap_or(Ordering::Equal)
        }),
        SortKey::Status => sorted.sort_by_key(|v| v.status.severity_rank()),
    }
    sorted
}

/// Rearrange vehicles to match a pinned plate order. Plates missing from the
/// pinned list come after all pinned ones, keeping their relative order.
pub fn apply_manual_order(vehicles: &[Vehicle], order: &[String]) -> Vec<Vehicle> {
    let position: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, plate)| (plate.as_str(), idx))
        .collect();

    let mut arranged = vehicles.to_vec();
    arranged.sort_by_key(|v| position.get(v.plate.as_str()).copied().unwrap_or(usize::MAX));
    arranged
}

/// The full display pipeline: search, then status filter, then sort. A
/// manual order, when given, overrides the sort order while the view is
/// unfiltered; any search query or status filter disables it.
pub fn build_display_list(
    vehicles: &[Vehicle],
    query: &str,
    filter: StatusFilter,
    key: SortKey,
    manual_order: Option<&[String]>,
) -> Vec<Vehicle> {
    let searched = search(vehicles, query);
    let filtered = filter_by_status(&searched, filter);
    let sorted = sort(&filtered, key);

    match manual_order {
        Some(order)
            if !order.is_empty() && query.trim().is_empty() && filter == StatusFilter::All =>
        {
            apply_manual_order(&sorted, order)
        }
        _ => sorted,
    }
}

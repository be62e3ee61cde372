use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::Utc;
use colored::*;
use dialoguer::Confirm;

use crate::db::models::{
    Alert, AlertDraft, AlertSchedule, Maintenance, MaintenanceDraft, Vehicle, VehicleDraft,
    VehicleStatus,
};
use crate::db::Database;
use crate::fleet::{list, stats};
use crate::report;
use crate::utils::format::{format_currency, format_km};
use crate::utils::time::parse_date;
use crate::version::{APP_NAME, VERSION};

use super::args::{AlertCommands, Commands, ConfigCommands, MaintCommands};

const DEFAULT_CURRENCY: &str = "₺";

pub fn handle_command(command: Commands, owner: Option<String>, db: &mut Database) -> Result<()> {
    // Preferences are account-independent; everything else needs an owner.
    let command = match command {
        Commands::Config { action } => return handle_config(action, db),
        other => other,
    };
    let owner = resolve_owner(owner, db)?;

    match command {
        Commands::Add { plate, make, model, year, km, chassis } => {
            let draft = VehicleDraft {
                plate,
                make,
                model,
                year,
                odometer_km: km,
                chassis_no: chassis,
            };
            let vehicle = db.add_vehicle(&owner, &draft)?;
            println!("Vehicle {} added to the fleet", vehicle.plate.bold());
        }
        Commands::Edit { plate, make, model, year, chassis, km, next_km, status } => {
            let mut vehicle = require_vehicle(db, &owner, &plate)?;
            if let Some(make) = make {
                vehicle.make = make;
            }
            if let Some(model) = model {
                vehicle.model = model;
            }
            if let Some(year) = year {
                vehicle.year = Some(year);
            }
            if let Some(chassis) = chassis {
                vehicle.chassis_no = Some(chassis);
            }
            if let Some(km) = km {
                vehicle.odometer_km = km;
            }
            if let Some(next_km) = next_km {
                vehicle.next_service_km = Some(next_km);
            }
            if let Some(status) = status {
                vehicle.status = status;
            }
            db.update_vehicle(&vehicle)?;
            println!("Vehicle {} updated", vehicle.plate.bold());
        }
        Commands::Rm { plate, yes } => {
            let vehicle = require_vehicle(db, &owner, &plate)?;
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!(
                        "Delete {} and its entire history?",
                        vehicle.plate
                    ))
                    .default(false)
                    .interact()?;
            if confirmed {
                db.delete_vehicle(&owner, &plate)?;
                println!("Vehicle {} deleted", vehicle.plate.bold());
            }
        }
        Commands::Ls { search, status, sort } => {
            let vehicles = db.list_vehicles(&owner)?;
            let manual = db.manual_order(&owner)?;
            let display =
                list::build_display_list(&vehicles, &search, status, sort, manual.as_deref());
            print_vehicles(&display);
        }
        Commands::Show { plate } => {
            let vehicle = require_vehicle(db, &owner, &plate)?;
            let symbol = currency(db)?;
            print_vehicle_detail(&vehicle, &symbol);
        }
        Commands::Km { plate, odometer } => {
            db.update_odometer(&owner, &plate, odometer)?;
            println!("Odometer for {} set to {}", plate.bold(), format_km(odometer));
        }
        Commands::Maint { action } => handle_maint(action, &owner, db)?,
        Commands::Alert { action } => handle_alert(action, &owner, db)?,
        Commands::Stats => {
            let vehicles = db.list_vehicles(&owner)?;
            let symbol = currency(db)?;
            print_dashboard(&vehicles, &symbol);
        }
        Commands::Order { plates, clear } => {
            if clear {
                db.clear_manual_order(&owner)?;
                println!("Manual order cleared");
            } else if plates.is_empty() {
                match db.manual_order(&owner)? {
                    Some(order) if !order.is_empty() => {
                        println!("Manual order: {}", order.join(", "));
                    }
                    _ => println!("No manual order set"),
                }
            } else {
                db.set_manual_order(&owner, &plates)?;
                println!("Manual order saved ({} plates)", plates.len());
            }
        }
        Commands::Export { output } => {
            let vehicles = db.list_vehicles(&owner)?;
            if vehicles.is_empty() {
                println!("No vehicles to export.");
                return Ok(());
            }
            let path = output.unwrap_or_else(|| PathBuf::from(report::REPORT_FILE_NAME));
            std::fs::write(&path, report::export_csv(&vehicles))?;
            println!(
                "Report written to {} ({} vehicle{})",
                path.display(),
                vehicles.len(),
                if vehicles.len() == 1 { "" } else { "s" }
            );
        }
        Commands::Import { path } => {
            let text = std::fs::read_to_string(&path)?;
            let imported = report::import_csv(&text, &owner);
            if imported.is_empty() {
                println!("No vehicles found in {}", path.display());
                return Ok(());
            }
            let summary = db.merge_import(&owner, imported)?;
            println!(
                "Import finished: {} added, {} merged",
                summary.added, summary.merged
            );
        }
        Commands::Config { .. } => unreachable!("handled above"),
    }
    Ok(())
}

fn handle_maint(action: MaintCommands, owner: &str, db: &mut Database) -> Result<()> {
    match action {
        MaintCommands::Add { plate, date, operation, km, cost, next, note } => {
            let draft = maintenance_draft(&date, operation, km, cost, next, note)?;
            db.add_maintenance(owner, &plate, &draft)?;
            println!("Maintenance logged for {}", plate.bold());
        }
        MaintCommands::Edit { plate, index, date, operation, km, cost, next, note } => {
            let draft = maintenance_draft(&date, operation, km, cost, next, note)?;
            let index = index
                .checked_sub(1)
                .ok_or_else(|| anyhow!("record positions start at 1"))?;
            db.update_maintenance(owner, &plate, index, &draft)?;
            println!("Maintenance record updated");
        }
        MaintCommands::Rm { plate, index } => {
            let index = index
                .checked_sub(1)
                .ok_or_else(|| anyhow!("record positions start at 1"))?;
            db.remove_maintenance(owner, &plate, index)?;
            println!("Maintenance record deleted");
        }
        MaintCommands::Ls { plate } => {
            let vehicle = require_vehicle(db, owner, &plate)?;
            let symbol = currency(db)?;
            print_maintenances(&vehicle.maintenances, &symbol);
        }
    }
    Ok(())
}

fn handle_alert(action: AlertCommands, owner: &str, db: &mut Database) -> Result<()> {
    match action {
        AlertCommands::Add { plate, title, note, date, lead_days, km, lead_km } => {
            let schedule = build_schedule(date, lead_days, km, lead_km)?;
            let alert = db.add_alert(owner, &plate, &AlertDraft { title, note, schedule })?;
            println!("Reminder added with id {}", alert.id);
        }
        AlertCommands::Edit { plate, id, title, note, date, lead_days, km, lead_km } => {
            let schedule = build_schedule(date, lead_days, km, lead_km)?;
            db.update_alert(owner, &plate, &id, &AlertDraft { title, note, schedule })?;
            println!("Reminder updated");
        }
        AlertCommands::Rm { plate, id } => {
            db.remove_alert(owner, &plate, &id)?;
            println!("Reminder deleted");
        }
        AlertCommands::Ls { due } => {
            let vehicles = db.list_vehicles(owner)?;
            let alerts: Vec<Alert> = if due {
                stats::due_alerts(&vehicles, Utc::now().date_naive())
            } else {
                vehicles.iter().flat_map(|v| v.alerts.clone()).collect()
            };
            print_alerts(&alerts);
        }
    }
    Ok(())
}

fn handle_config(action: ConfigCommands, db: &mut Database) -> Result<()> {
    match action {
        ConfigCommands::Owner { value } => match value {
            Some(email) => {
                db.set_setting("owner", &email)?;
                println!("Owner set to {}", email);
            }
            None => match db.get_setting("owner")? {
                Some(email) => println!("{}", email),
                None => println!("No owner configured"),
            },
        },
        ConfigCommands::Currency { value } => match value {
            Some(symbol) => {
                db.set_setting("currency", &symbol)?;
                println!("Currency set to {}", symbol);
            }
            None => println!("{}", currency(db)?),
        },
    }
    Ok(())
}

fn resolve_owner(flag: Option<String>, db: &Database) -> Result<String> {
    if let Some(owner) = flag {
        return Ok(owner);
    }
    db.get_setting("owner")?.ok_or_else(|| {
        anyhow!("no owner configured; run 'mdrive config owner <email>' or pass --owner")
    })
}

fn currency(db: &Database) -> Result<String> {
    Ok(db
        .get_setting("currency")?
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

fn require_vehicle(db: &Database, owner: &str, plate: &str) -> Result<Vehicle> {
    db.get_vehicle(owner, plate)?
        .ok_or_else(|| anyhow!("vehicle '{}' not found", plate))
}

fn maintenance_draft(
    date: &str,
    operation: String,
    km: i64,
    cost: String,
    next: Option<i64>,
    note: Option<String>,
) -> Result<MaintenanceDraft> {
    let date = parse_date(date).ok_or_else(|| anyhow!("invalid date '{}'", date))?;
    Ok(MaintenanceDraft {
        date,
        operation,
        odometer_km: km,
        cost,
        next_due_km: next,
        note,
    })
}

fn build_schedule(
    date: Option<String>,
    lead_days: i64,
    km: Option<i64>,
    lead_km: i64,
) -> Result<AlertSchedule> {
    match (date, km) {
        (Some(date), None) => {
            let due = parse_date(&date).ok_or_else(|| anyhow!("invalid date '{}'", date))?;
            Ok(AlertSchedule::Date { due, lead_days })
        }
        (None, Some(due_km)) => Ok(AlertSchedule::Odometer { due_km, lead_km }),
        _ => Err(anyhow!("a reminder needs exactly one of --date or --km")),
    }
}

fn status_label(status: VehicleStatus) -> ColoredString {
    match status {
        VehicleStatus::Active => "active".green(),
        VehicleStatus::InService => "in-service".yellow(),
        VehicleStatus::Broken => "broken".red(),
    }
}

fn print_vehicles(vehicles: &[Vehicle]) {
    if vehicles.is_empty() {
        println!("No vehicles found.");
        return;
    }

    println!(
        "\n{} vehicle{}:",
        vehicles.len(),
        if vehicles.len() == 1 { "" } else { "s" }
    );
    println!("─────────────────────────────────────────────");

    for vehicle in vehicles {
        println!(
            "{} [{}] {} {}",
            vehicle.plate.bold(),
            status_label(vehicle.status),
            vehicle.make,
            vehicle.model
        );
        println!("    Odometer: {}", format_km(vehicle.odometer_km));
        if let Some(year) = &vehicle.year {
            println!("    Year: {}", year);
        }
        if !vehicle.maintenances.is_empty() {
            println!("    Maintenances: {}", vehicle.maintenances.len());
        }
        println!("─────────────────────────────────────────────");
    }
}

fn print_vehicle_detail(vehicle: &Vehicle, symbol: &str) {
    println!(
        "\n{} [{}] {} {}",
        vehicle.plate.bold(),
        status_label(vehicle.status),
        vehicle.make,
        vehicle.model
    );
    println!("─────────────────────────────────────────────");
    if let Some(year) = &vehicle.year {
        println!("    Year: {}", year);
    }
    println!("    Odometer: {}", format_km(vehicle.odometer_km));
    if let Some(next) = vehicle.next_service_km {
        println!("    Next service: {}", format_km(next));
    }
    if let Some(chassis) = &vehicle.chassis_no {
        println!("    Chassis: {}", chassis);
    }
    println!(
        "    Total maintenance cost: {}",
        format_currency(vehicle.total_maintenance_cost(), symbol)
    );

    print_maintenances(&vehicle.maintenances, symbol);
    print_alerts(&vehicle.alerts);
}

fn print_maintenances(records: &[Maintenance], symbol: &str) {
    if records.is_empty() {
        println!("\nNo maintenance records.");
        return;
    }

    println!(
        "\n{} maintenance record{}:",
        records.len(),
        if records.len() == 1 { "" } else { "s" }
    );
    println!("─────────────────────────────────────────────");

    for (idx, record) in records.iter().enumerate() {
        println!("({}) [{}] {}", idx + 1, record.date, record.operation);
        println!("    Odometer: {}", format_km(record.odometer_km));
        println!("    Cost: {}", format_currency(record.cost_value(), symbol));
        if let Some(next) = record.next_due_km {
            println!("    Next due: {}", format_km(next));
        }
        if let Some(note) = &record.note {
            println!("    Note: {}", note);
        }
        println!("─────────────────────────────────────────────");
    }
}

fn print_alerts(alerts: &[Alert]) {
    if alerts.is_empty() {
        println!("\nNo reminders.");
        return;
    }

    println!(
        "\n{} reminder{}:",
        alerts.len(),
        if alerts.len() == 1 { "" } else { "s" }
    );
    println!("─────────────────────────────────────────────");

    for alert in alerts {
        println!(
            "({}) [{}] {}",
            alert.id,
            alert.plate.yellow(),
            alert.title.bold()
        );
        match &alert.schedule {
            AlertSchedule::Date { due, lead_days } => {
                if *lead_days > 0 {
                    println!("    Due: {} (warn {} days ahead)", due, lead_days);
                } else {
                    println!("    Due: {}", due);
                }
            }
            AlertSchedule::Odometer { due_km, lead_km } => {
                if *lead_km > 0 {
                    println!(
                        "    Due: {} (warn {} ahead)",
                        format_km(*due_km),
                        format_km(*lead_km)
                    );
                } else {
                    println!("    Due: {}", format_km(*due_km));
                }
            }
        }
        if let Some(note) = &alert.note {
            println!("    Note: {}", note);
        }
        println!("─────────────────────────────────────────────");
    }
}

fn print_dashboard(vehicles: &[Vehicle], symbol: &str) {
    let fleet_stats = stats::compute_stats(vehicles);
    let breakdown = stats::status_breakdown(vehicles);
    let due = stats::due_alerts(vehicles, Utc::now().date_naive());

    println!("\n{} {}", APP_NAME.bold(), VERSION.dimmed());
    println!("─────────────────────────────────────────────");
    println!("    Vehicles:      {}", fleet_stats.total_vehicles);
    println!("    Maintenances:  {}", fleet_stats.total_maintenances);
    println!(
        "    Total cost:    {}",
        format_currency(fleet_stats.total_cost, symbol).green()
    );
    println!(
        "    Average km:    {}",
        format_km(fleet_stats.average_km.round() as i64)
    );
    println!(
        "    Status:        {} active · {} in-service · {} broken",
        breakdown.active.to_string().green(),
        breakdown.in_service.to_string().yellow(),
        breakdown.broken.to_string().red()
    );

    if !fleet_stats.upcoming_maintenances.is_empty() {
        println!("\nUpcoming maintenance:");
        for record in fleet_stats.upcoming_maintenances.iter().take(5) {
            println!(
                "    {} · due at {}",
                record.operation,
                format_km(record.next_due_km.unwrap_or(0))
            );
        }
    }

    if !due.is_empty() {
        println!("\nDue reminders:");
        for alert in &due {
            println!("    [{}] {}", alert.plate.yellow(), alert.title);
        }
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::db::models::VehicleStatus;
use crate::fleet::{SortKey, StatusFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Owner account to operate on (overrides the configured default)
    #[arg(long, global = true)]
    pub owner: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a vehicle in the fleet
    Add {
        /// License plate (the vehicle's unique key)
        plate: String,

        make: String,

        model: String,

        #[arg(short, long)]
        year: Option<String>,

        /// Current odometer reading in kilometers
        #[arg(short, long, default_value = "0")]
        km: i64,

        /// Chassis (VIN) number
        #[arg(short, long)]
        chassis: Option<String>,
    },

    /// Update a vehicle's details
    Edit {
        plate: String,

        #[arg(long)]
        make: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        year: Option<String>,

        #[arg(long)]
        chassis: Option<String>,

        #[arg(long)]
        km: Option<i64>,

        /// Odometer threshold for the next scheduled service
        #[arg(long)]
        next_km: Option<i64>,

        /// active, in-service or broken
        #[arg(long)]
        status: Option<VehicleStatus>,
    },

    /// Remove a vehicle and its entire history
    Rm {
        plate: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List vehicles
    Ls {
        /// Free-text search over plate, make, model and chassis number
        #[arg(short, long, default_value = "")]
        search: String,

        /// all, active, in-service or broken
        #[arg(short = 't', long, default_value = "all")]
        status: StatusFilter,

        /// plate, odometer, cost or status
        #[arg(short = 'o', long, default_value = "plate")]
        sort: SortKey,
    },

    /// Show one vehicle with its maintenance log and reminders
    Show {
        plate: String,
    },

    /// Update a vehicle's odometer reading
    Km {
        plate: String,
        odometer: i64,
    },

    /// Maintenance log operations
    Maint {
        #[command(subcommand)]
        action: MaintCommands,
    },

    /// Reminder operations
    Alert {
        #[command(subcommand)]
        action: AlertCommands,
    },

    /// Fleet dashboard: totals, averages and upcoming work
    Stats,

    /// Pin a manual display order for `ls`
    ///
    /// The pinned order only applies to the unfiltered list; it is ignored
    /// whenever a search query or status filter is active.
    Order {
        /// Plates in the desired order
        plates: Vec<String>,

        /// Drop the pinned order
        #[arg(long)]
        clear: bool,
    },

    /// Write the fleet report as semicolon-delimited CSV
    Export {
        /// Output path (defaults to mdrive-rapor.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a CSV report, merging it into the existing fleet
    Import {
        path: PathBuf,
    },

    /// Read or change preferences
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum MaintCommands {
    /// Log a maintenance event for a vehicle
    Add {
        plate: String,

        /// Service date (YYYY-MM-DD, DD/MM/YYYY or DD.MM.YYYY)
        #[arg(short, long)]
        date: String,

        /// What was done
        #[arg(short, long)]
        operation: String,

        /// Odometer reading at service time
        #[arg(short, long, default_value = "0")]
        km: i64,

        #[arg(short, long, default_value = "0")]
        cost: String,

        /// Odometer threshold when this service is next due
        #[arg(short, long)]
        next: Option<i64>,

        #[arg(short = 'm', long)]
        note: Option<String>,
    },

    /// Rewrite the record at the given position (as shown by `maint ls`)
    Edit {
        plate: String,

        /// 1-based record position
        index: usize,

        /// Service date (YYYY-MM-DD, DD/MM/YYYY or DD.MM.YYYY)
        #[arg(short, long)]
        date: String,

        /// What was done
        #[arg(short, long)]
        operation: String,

        /// Odometer reading at service time
        #[arg(short, long, default_value = "0")]
        km: i64,

        #[arg(short, long, default_value = "0")]
        cost: String,

        /// Odometer threshold when this service is next due
        #[arg(short, long)]
        next: Option<i64>,

        #[arg(short = 'm', long)]
        note: Option<String>,
    },

    /// Delete the record at the given position
    Rm {
        plate: String,

        /// 1-based record position
        index: usize,
    },

    /// List a vehicle's maintenance log
    Ls {
        plate: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AlertCommands {
    /// Add a reminder tied to a date or an odometer threshold
    Add {
        plate: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        note: Option<String>,

        /// Calendar deadline (date-based reminder)
        #[arg(short, long, conflicts_with = "km")]
        date: Option<String>,

        /// Warn this many days ahead of the deadline
        #[arg(long, default_value = "0", requires = "date")]
        lead_days: i64,

        /// Odometer deadline (mileage-based reminder)
        #[arg(short, long)]
        km: Option<i64>,

        /// Warn this many kilometers ahead of the deadline
        #[arg(long, default_value = "0", requires = "km")]
        lead_km: i64,
    },

    /// Rewrite a reminder by id
    Edit {
        plate: String,

        /// Reminder id (as shown by `alert ls`)
        id: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        note: Option<String>,

        /// Calendar deadline (date-based reminder)
        #[arg(short, long, conflicts_with = "km")]
        date: Option<String>,

        /// Warn this many days ahead of the deadline
        #[arg(long, default_value = "0", requires = "date")]
        lead_days: i64,

        /// Odometer deadline (mileage-based reminder)
        #[arg(short, long)]
        km: Option<i64>,

        /// Warn this many kilometers ahead of the deadline
        #[arg(long, default_value = "0", requires = "km")]
        lead_km: i64,
    },

    /// Delete a reminder by id
    Rm {
        plate: String,
        id: String,
    },

    /// List reminders across the fleet
    Ls {
        /// Show only reminders that are currently due
        #[arg(short, long)]
        due: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show or set the owner account (an email address)
    Owner {
        value: Option<String>,
    },

    /// Show or set the currency symbol used for totals
    Currency {
        value: Option<String>,
    },
}

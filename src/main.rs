use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use mdrive::{cli, db};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Keep the fleet database in the user's home directory
    let db_path = dirs::home_dir()
        .map(|mut path| {
            path.push(".mdrive");
            path.push("fleet.db");
            path
        })
        .unwrap_or_else(|| PathBuf::from("fleet.db"));

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut db = db::Database::new(&db_path.to_string_lossy())?;
    cli::handle_command(cli.command, cli.owner, &mut db)?;

    Ok(())
}

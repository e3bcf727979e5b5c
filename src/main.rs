mod config;
mod db;
mod logging;
mod models;
mod repository;
mod run;
mod stats;
mod transfer;

use anyhow::Result;

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::load()?;
    let mut db = db::Database::open(&config.db_path)?;

    run::as_cli(&args, &mut db)
}

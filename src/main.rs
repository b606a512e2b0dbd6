use disease_portal::config::{AppConfig, CONFIG_FILE};
use disease_portal::state::RecordStore;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("disease_portal=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

/// Open the catalog and report what it holds
fn run() -> disease_portal::Result<()> {
    let config = AppConfig::load_or_default(CONFIG_FILE)?;

    let store = RecordStore::open(&config.db_path)?;
    let count = store.count()?;
    info!(
        path = %store.path().display(),
        images = count,
        users = config.users.len(),
        "disease image catalog ready"
    );

    for record in store.list_all()? {
        info!(
            id = record.id,
            uploaded = %record.upload_time,
            bytes = record.size(),
            "{}",
            record.caption()
        );
    }

    Ok(())
}

//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notehub_core` linkage and open the configured database.
//! - Keep output deterministic for quick local sanity checks.

use notehub_core::db::migrations::schema_version;
use notehub_core::{core_version, init_from_config, open_db, ping, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = CoreConfig::from_env();

    // File logging only when a log directory is configured.
    if std::env::var_os(notehub_core::config::ENV_LOG_DIR).is_some() {
        if let Err(err) = init_from_config(&config) {
            eprintln!("notehub_cli logging disabled: {err}");
        }
    }

    println!("notehub_core ping={}", ping());
    println!("notehub_core version={}", core_version());

    let version = open_db(&config.db_path).and_then(|conn| schema_version(&conn));
    match version {
        Ok(version) => {
            println!("notehub_core schema_version={version}");
            log::info!("event=cli_probe module=cli status=ok schema_version={version}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!(
                "notehub_cli failed to open `{}`: {err}",
                config.db_path.display()
            );
            ExitCode::FAILURE
        }
    }
}

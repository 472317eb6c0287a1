//! Database preparation and hand-off to the server process.

use std::process::Command;

use reelsmith_db::DbError;

use crate::config::BootstrapConfig;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Server command is empty")]
    EmptyCommand,

    #[error("Could not start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// Wait for the database and apply migrations.
///
/// The pool used here is closed before returning; the server opens its own.
pub async fn prepare_database(config: &BootstrapConfig) -> Result<(), DbError> {
    tracing::info!(
        target_db = %config.target(),
        max_attempts = config.retry.max_attempts,
        delay_secs = config.retry.delay.as_secs(),
        "Waiting for database",
    );
    let pool = reelsmith_db::wait_for_database(&config.database, &config.retry).await?;
    reelsmith_db::health_check(&pool).await?;

    if config.skip_migrations {
        tracing::info!("Skipping migrations");
    } else {
        reelsmith_db::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    pool.close().await;
    Ok(())
}

/// Build the server [`Command`] from a program and its arguments.
pub fn server_command(argv: &[String]) -> Result<Command, LaunchError> {
    let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;
    let mut command = Command::new(program);
    command.args(args);
    Ok(command)
}

/// Replace the current process with the server command.
///
/// Only returns if the command could not be executed.
#[cfg(unix)]
pub fn exec_server(argv: &[String]) -> LaunchError {
    use std::os::unix::process::CommandExt;

    let mut command = match server_command(argv) {
        Ok(command) => command,
        Err(e) => return e,
    };
    tracing::info!(command = %argv.join(" "), "Starting server");
    let source = command.exec();
    LaunchError::Spawn {
        program: command.get_program().to_string_lossy().into_owned(),
        source,
    }
}

/// Run the server command as a child and exit with its status.
///
/// Only returns if the command could not be started.
#[cfg(not(unix))]
pub fn exec_server(argv: &[String]) -> LaunchError {
    let mut command = match server_command(argv) {
        Ok(command) => command,
        Err(e) => return e,
    };
    tracing::info!(command = %argv.join(" "), "Starting server");
    match command.status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(source) => LaunchError::Spawn {
            program: command.get_program().to_string_lossy().into_owned(),
            source,
        },
    }
}

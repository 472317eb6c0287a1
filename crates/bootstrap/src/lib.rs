//! Backend startup: wait for the database, migrate, then hand the process
//! over to the server command.

pub mod config;
pub mod launch;

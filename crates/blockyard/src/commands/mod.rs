//! CLI command implementations.

pub mod build;
pub mod dev;
pub mod init;
pub mod routes;
pub mod serve;

// Library root: exposes the service internals to the binary and to
// integration tests. The binary entry point is src/main.rs.

pub mod catalog;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod llm;
pub mod logger;
pub mod web;

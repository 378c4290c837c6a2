//! Single integration test binary: all integration tests as modules, sharing `common`.
//!
//! Run: `cargo test -p fieldtrack_core --test integration`

mod concurrency;
mod csv_import;
mod followups;
mod workflow;

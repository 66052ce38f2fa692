// Library root: roster model, team draw engine and configuration for the
// pelada manager. The `pelada` binary and integration tests build on this.

pub mod config;
pub mod draw;
pub mod roster;

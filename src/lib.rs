// Library target for the binary, the integration tests, and the criterion
// benches; main.rs is a thin CLI over these modules.

pub mod config;
pub mod profile;
pub mod progression;
pub mod session;
pub mod store;

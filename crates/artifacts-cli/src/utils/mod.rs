//! Process-level helpers for the binary.

pub mod browser;
pub mod logging;

pub use browser::open_on_first_create;
pub use logging::initialize_logging;

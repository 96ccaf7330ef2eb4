// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod features;
pub mod geometry;
pub mod recorder;
pub mod replay;
pub mod runtime;
pub mod scheduler;
pub mod signature;
pub mod surface;
pub mod ui;
pub mod util;
pub mod verification;

pub use app::App;

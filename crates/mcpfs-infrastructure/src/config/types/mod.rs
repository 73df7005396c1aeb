//! Configuration types

pub mod app;
pub mod logging;
pub mod server;
pub mod session;

pub use app::AppConfig;
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use session::SessionConfig;

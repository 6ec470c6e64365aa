pub mod config;
pub mod directory;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{AppConfig, AuthSettings, LoggingConfig, ServerConfig, UpstreamConfig};
pub use directory::{Directory, PortalUser, UpstreamDirectory};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{PortalServer, ServerBuilder, build_app};
pub use state::AppState;

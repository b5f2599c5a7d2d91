//! HTTP handlers for tunematch-web
//!
//! - HTML form (`/`, `/home`, `POST /search`)
//! - JSON query endpoint (`POST /api/query`)
//! - Health check (`/health`)

pub mod health;
pub mod query;
pub mod ui;

pub use health::health_routes;
pub use query::query_routes;
pub use ui::ui_routes;

//! HTTP API handlers for vetwatch-ai
//!
//! JSON over HTTP for the dashboard, plus an SSE stream of state changes.

pub mod alerts;
pub mod analysis;
pub mod forms;
pub mod health;
pub mod messages;
pub mod sse;
pub mod training;
pub mod users;

pub use alerts::alert_routes;
pub use analysis::analysis_routes;
pub use forms::form_routes;
pub use health::health_routes;
pub use messages::message_routes;
pub use sse::event_stream;
pub use training::training_routes;
pub use users::user_routes;

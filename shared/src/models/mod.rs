//! Data models
//!
//! Every entity comes as a triple: the stored record, a `*Create` payload and
//! a `*Update` payload whose fields are all optional (shallow merge).
//! All IDs are `i64` snowflakes, all `created_at` values are UTC millis.

pub mod casting;
pub mod plan;
pub mod project;
pub mod promotion;
pub mod sale;
pub mod subscriber;
pub mod tag;
pub mod video;

// Re-exports
pub use casting::*;
pub use plan::*;
pub use project::*;
pub use promotion::*;
pub use sale::*;
pub use subscriber::*;
pub use tag::*;
pub use video::*;

//! Tag Model

use serde::{Deserialize, Serialize};

/// Default color for tags created without one
pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

/// Tag entity
///
/// Subscribers carry a copy of each tag they hold; the subscriber store keeps
/// those copies in sync on rename and removes them on delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// Create tag payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagCreate {
    pub name: String,
    pub color: Option<String>,
}

/// Update tag payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

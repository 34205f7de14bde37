// src/schema/mod.rs
mod post;

pub use post::Post;

use serde::{Deserialize, Serialize};

/// Expected shape of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySchema {
    /// A JSON array of [`Post`] records.
    Posts,
    /// Any well-formed JSON document.
    Json,
}

impl BodySchema {
    /// Noun used in diagnostic lines ("Found 3 posts", "Found 1 post").
    pub fn record_noun(&self, count: usize) -> &'static str {
        match (self, count) {
            (BodySchema::Posts, 1) => "post",
            (BodySchema::Posts, _) => "posts",
            (BodySchema::Json, 1) => "record",
            (BodySchema::Json, _) => "records",
        }
    }
}

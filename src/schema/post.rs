// src/schema/post.rs
use serde::{Deserialize, Serialize};

/// One entry of a content API post listing. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
}

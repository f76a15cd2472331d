use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of characters of the text used as the post's display form.
const DISPLAY_CHARS: usize = 15;

/// Post entity - a single authored text entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
}

impl Post {
    /// Create a new post published now.
    pub fn new(author_id: Uuid, text: String, group_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            pub_date: Utc::now(),
            author_id,
            group_id,
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Replace the editable fields. Identity, author and date are kept.
    pub fn apply_edit(&mut self, text: String, group_id: Option<Uuid>) {
        self.text = text;
        self.group_id = group_id;
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.text.chars().take(DISPLAY_CHARS).collect();
        f.write_str(&head)
    }
}

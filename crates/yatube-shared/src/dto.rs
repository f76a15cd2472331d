//! Data Transfer Objects - form payloads and template context items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Login form. `next` is the page to return to after a successful login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// `?next=` query of the login page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Query string of the listing pages, kept as raw pairs so that no
/// combination of parameters is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PageQuery(Vec<(String, String)>);

impl PageQuery {
    /// Raw `page` value for the paginator; the last one wins when repeated.
    pub fn page(&self) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key == "page")
            .map(|(_, value)| value.as_str())
    }
}

/// Public information about a post author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
}

/// Public information about a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// A post as shown in listings and on its detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: AuthorResponse,
    pub group: Option<GroupResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_value_wins() {
        let query: PageQuery =
            serde_json::from_str(r#"[["page", "1"], ["q", "x"], ["page", "abc"]]"#).unwrap();
        assert_eq!(query.page(), Some("abc"));

        let query: PageQuery = serde_json::from_str(r#"[["q", "x"]]"#).unwrap();
        assert_eq!(query.page(), None);
        assert_eq!(PageQuery::default().page(), None);
    }
}

//! Post form binding and validation.
//!
//! Validation is a pure function of the submitted values and the groups the
//! form offers; nothing here touches persistence or decides the author.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Group, Post};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";
pub const NO_GROUP_LABEL: &str = "No group selected";

/// Key under which errors not tied to one field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Field-level validation errors, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Raw post form input as submitted by the browser.
///
/// `group` holds a group id; an empty string (or no value at all) is the
/// explicit "no group" choice. Unknown fields such as `author` are dropped
/// during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
}

/// A post payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPost {
    pub text: String,
    pub group_id: Option<Uuid>,
}

impl PostForm {
    /// Bind the form to the current values of an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
        }
    }

    /// Validate against the groups offered as choices.
    pub fn validate(&self, choices: &[Group]) -> Result<ValidatedPost, FieldErrors> {
        let mut errors = FieldErrors::new();

        let text = self.text.trim();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }

        let group_id = match self.selected_group() {
            None => None,
            Some(raw) => {
                let found = Uuid::parse_str(raw)
                    .ok()
                    .filter(|id| choices.iter().any(|g| g.id == *id));
                if found.is_none() {
                    errors.add("group", INVALID_CHOICE);
                }
                found
            }
        };

        errors.into_result(ValidatedPost {
            text: text.to_string(),
            group_id,
        })
    }

    /// Render the form with its current values, choices and errors.
    pub fn render(&self, choices: &[Group], errors: FieldErrors) -> PostFormView {
        let selected = self.selected_group().unwrap_or_default();

        let mut group_choices = vec![Choice {
            value: String::new(),
            label: NO_GROUP_LABEL.to_string(),
            selected: selected.is_empty(),
        }];
        group_choices.extend(choices.iter().map(|g| {
            let value = g.id.to_string();
            Choice {
                selected: value == selected,
                value,
                label: g.to_string(),
            }
        }));

        let fields = vec![
            FieldView {
                name: "text",
                label: "Post text",
                help_text: "Enter the text of the post",
                required: true,
                value: self.text.clone(),
                choices: None,
                errors: errors.get("text").to_vec(),
            },
            FieldView {
                name: "group",
                label: "Group",
                help_text: "Group the post will belong to",
                required: false,
                value: selected.to_string(),
                choices: Some(group_choices),
                errors: errors.get("group").to_vec(),
            },
        ];

        PostFormView { fields, errors }
    }

    fn selected_group(&self) -> Option<&str> {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
    }
}

/// Serializable state of a rendered post form.
#[derive(Debug, Clone, Serialize)]
pub struct PostFormView {
    pub fields: Vec<FieldView>,
    pub errors: FieldErrors,
}

impl PostFormView {
    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub required: bool,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<Group> {
        vec![
            Group::new("Testers", "test-slug", "Test description"),
            Group::new("Writers", "writers", ""),
        ]
    }

    fn form(text: &str, group: Option<&str>) -> PostForm {
        PostForm {
            text: text.to_string(),
            group: group.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_without_group() {
        let post = form("Hello", Some("")).validate(&groups()).unwrap();
        assert_eq!(post.text, "Hello");
        assert_eq!(post.group_id, None);

        let post = form("Hello", None).validate(&groups()).unwrap();
        assert_eq!(post.group_id, None);
    }

    #[test]
    fn test_valid_with_group() {
        let groups = groups();
        let id = groups[1].id.to_string();

        let post = form("  Hello  ", Some(id.as_str())).validate(&groups).unwrap();

        assert_eq!(post.text, "Hello");
        assert_eq!(post.group_id, Some(groups[1].id));
    }

    #[test]
    fn test_empty_text_is_field_error() {
        for text in ["", "   \n\t"] {
            let errors = form(text, None).validate(&groups()).unwrap_err();
            assert_eq!(errors.get("text"), [REQUIRED.to_string()]);
            assert!(!errors.contains("group"));
        }
    }

    #[test]
    fn test_unknown_group_is_lookup_error() {
        let unknown = Uuid::new_v4().to_string();
        for raw in [unknown.as_str(), "not-a-uuid", "42"] {
            let errors = form("Hello", Some(raw)).validate(&groups()).unwrap_err();
            assert_eq!(errors.get("group"), [INVALID_CHOICE.to_string()]);
        }
    }

    #[test]
    fn test_errors_are_reported_together() {
        let errors = form("", Some("nope")).validate(&groups()).unwrap_err();
        assert!(errors.contains("text"));
        assert!(errors.contains("group"));
    }

    #[test]
    fn test_render_offers_explicit_empty_choice_first() {
        let groups = groups();
        let view = PostForm::default().render(&groups, FieldErrors::new());

        let choices = view.field("group").unwrap().choices.as_ref().unwrap();
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[0].value, "");
        assert_eq!(choices[0].label, NO_GROUP_LABEL);
        assert!(choices[0].selected);
        assert_eq!(choices[1].label, "Testers");
        assert!(!choices[1].selected);
    }

    #[test]
    fn test_render_from_post_selects_its_group() {
        let groups = groups();
        let post = Post::new(Uuid::new_v4(), "Body".to_string(), Some(groups[0].id));

        let view = PostForm::from_post(&post).render(&groups, FieldErrors::new());

        assert_eq!(view.field("text").unwrap().value, "Body");
        let choices = view.field("group").unwrap().choices.as_ref().unwrap();
        assert!(choices[1].selected);
        assert!(!choices[0].selected);
    }

    #[test]
    fn test_render_carries_field_errors() {
        let groups = groups();
        let bad = form("", None);
        let errors = bad.validate(&groups).unwrap_err();

        let view = bad.render(&groups, errors);

        assert_eq!(view.field("text").unwrap().errors, vec![REQUIRED.to_string()]);
        assert!(view.field("group").unwrap().errors.is_empty());
    }
}

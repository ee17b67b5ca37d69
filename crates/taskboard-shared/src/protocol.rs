//! Request and response bodies exchanged over the HTTP API.
//!
//! The server validates loosely-typed JSON (`serde_json::Value`) through the
//! `from_json` constructors so that a wrong field type is a validation failure
//! rather than a deserialization failure. The client builds the same bodies
//! through the checked constructors and serializes them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Body of `POST /owners`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
}

/// Body of `PUT /owners/{id}`. Same rules as [`NewUser`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameUser {
    pub name: String,
}

/// Body of `POST /owners/{id}/items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
}

/// Body of `PUT /items/{id}`. At least one field is always present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Every non-2xx response carries this body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

fn required_text(body: &Value, field: &str) -> Option<String> {
    match body.get(field) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => None,
    }
}

fn trimmed(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// The one rule for owner names, on create and rename alike.
fn name_field(name: Option<String>) -> Result<String, ValidationError> {
    name.ok_or(ValidationError::NameRequired)
}

impl NewUser {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name_field(trimmed(name))?;
        Ok(Self { name })
    }

    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let name = name_field(required_text(body, "name"))?;
        Ok(Self { name })
    }
}

impl RenameUser {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        NewUser::new(name).map(|NewUser { name }| Self { name })
    }

    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        NewUser::from_json(body).map(|NewUser { name }| Self { name })
    }
}

impl NewTask {
    pub fn new(title: &str) -> Result<Self, ValidationError> {
        let title = trimmed(title).ok_or(ValidationError::TitleRequired)?;
        Ok(Self { title })
    }

    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let title = required_text(body, "title").ok_or(ValidationError::TitleRequired)?;
        Ok(Self { title })
    }
}

impl TaskPatch {
    /// Patch that only flips the completion flag.
    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }

    /// Patch that only renames the task.
    pub fn title(title: &str) -> Result<Self, ValidationError> {
        Self {
            title: Some(title.to_string()),
            completed: None,
        }
        .validated()
    }

    /// Trim the title and check that the patch changes something.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let title = match self.title {
            Some(title) => Some(trimmed(&title).ok_or(ValidationError::InvalidTitle)?),
            None => None,
        };
        if title.is_none() && self.completed.is_none() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        Ok(Self {
            title,
            completed: self.completed,
        })
    }

    /// A present field with the wrong JSON type (including `null`) is
    /// rejected, as is a body with neither field.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let title = match body.get("title") {
            None => None,
            Some(Value::String(title)) => {
                Some(trimmed(title).ok_or(ValidationError::InvalidTitle)?)
            }
            Some(_) => return Err(ValidationError::InvalidTitle),
        };

        let completed = match body.get("completed") {
            None => None,
            Some(Value::Bool(completed)) => Some(*completed),
            Some(_) => return Err(ValidationError::InvalidCompleted),
        };

        if title.is_none() && completed.is_none() {
            return Err(ValidationError::NoFieldsToUpdate);
        }

        Ok(Self { title, completed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_user_trims_name() {
        let user = NewUser::from_json(&json!({ "name": "  Ricky  " })).unwrap();
        assert_eq!(user.name, "Ricky");
    }

    #[test]
    fn test_new_user_rejects_missing_blank_and_non_string() {
        for body in [
            json!({}),
            json!({ "name": "   " }),
            json!({ "name": 42 }),
            json!({ "name": null }),
            json!(null),
            json!(["name"]),
        ] {
            assert_eq!(
                NewUser::from_json(&body),
                Err(ValidationError::NameRequired),
                "body {body} should be rejected"
            );
        }
    }

    #[test]
    fn test_create_and_rename_agree_on_every_body() {
        for body in [
            json!({ "name": " Ricky " }),
            json!({ "name": "" }),
            json!({ "name": false }),
            json!({}),
            json!(null),
        ] {
            assert_eq!(
                NewUser::from_json(&body).map(|u| u.name),
                RenameUser::from_json(&body).map(|u| u.name),
                "body {body}"
            );
        }
        for raw in ["Ricky", "  ", ""] {
            assert_eq!(
                NewUser::new(raw).map(|u| u.name),
                RenameUser::new(raw).map(|u| u.name)
            );
        }
    }

    #[test]
    fn test_rename_user_shares_rules() {
        assert_eq!(
            RenameUser::from_json(&json!({ "name": "" })),
            Err(ValidationError::NameRequired)
        );
        assert_eq!(RenameUser::new(" Bo ").unwrap().name, "Bo");
    }

    #[test]
    fn test_new_task_requires_title() {
        assert_eq!(
            NewTask::from_json(&json!({ "title": " " })),
            Err(ValidationError::TitleRequired)
        );
        assert_eq!(NewTask::new("Go fast!").unwrap().title, "Go fast!");
    }

    #[test]
    fn test_patch_empty_body_rejected() {
        assert_eq!(
            TaskPatch::from_json(&json!({})),
            Err(ValidationError::NoFieldsToUpdate)
        );
    }

    #[test]
    fn test_patch_wrong_types_rejected() {
        assert_eq!(
            TaskPatch::from_json(&json!({ "title": 1 })),
            Err(ValidationError::InvalidTitle)
        );
        assert_eq!(
            TaskPatch::from_json(&json!({ "title": "  " })),
            Err(ValidationError::InvalidTitle)
        );
        assert_eq!(
            TaskPatch::from_json(&json!({ "completed": "yes" })),
            Err(ValidationError::InvalidCompleted)
        );
        assert_eq!(
            TaskPatch::from_json(&json!({ "completed": null })),
            Err(ValidationError::InvalidCompleted)
        );
    }

    #[test]
    fn test_patch_partial_fields() {
        let patch = TaskPatch::from_json(&json!({ "completed": true })).unwrap();
        assert_eq!(patch, TaskPatch::completed(true));

        let patch = TaskPatch::from_json(&json!({ "title": " Walk " })).unwrap();
        assert_eq!(patch.title.as_deref(), Some("Walk"));
        assert_eq!(patch.completed, None);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let json = serde_json::to_value(TaskPatch::completed(false)).unwrap();
        assert_eq!(json, json!({ "completed": false }));
    }
}

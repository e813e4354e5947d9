//! Submitted post input and its validation.
//!
//! A [`PostForm`] is what the client sent, unvalidated. [`PostForm::clean`]
//! turns it into [`PostContent`] or a set of per-field [`FormErrors`] that are
//! shown back to the user alongside the submitted values.

use crate::model::{
    Id,
    group::{Group, GroupMarker},
    post::{Post, PostContent, PostText},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TEXT_FIELD: &str = "text";
pub const GROUP_FIELD: &str = "group";
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Raw post input. Keys other than `text` and `group` are dropped on
/// deserialization, so an `author` key can never reach a post.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<Id<GroupMarker>>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }
}

impl PostForm {
    /// Validates the form.
    ///
    /// `group` is the store's answer for `self.group`: the caller looks the
    /// referenced group up and passes what it found, so this stays free of I/O.
    pub fn clean(&self, group: Option<&Group>) -> Result<PostContent, FormErrors> {
        let mut errors = FormErrors::default();

        let text = PostText::new(&self.text)
            .inspect_err(|_| errors.add(TEXT_FIELD, REQUIRED_MESSAGE))
            .ok();

        if let Some(requested) = self.group
            && group.is_none_or(|group| group.id != requested)
        {
            errors.add(GROUP_FIELD, INVALID_CHOICE_MESSAGE);
        }

        match text {
            Some(text) if errors.is_empty() => Ok(PostContent {
                text,
                group: self.group,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            text: post.text.get().to_owned(),
            group: post.group.as_ref().map(|group| group.id),
        }
    }
}

/// A form as handed to the renderer: field values, errors, and whether the
/// values came from a submission.
#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize)]
pub struct BoundPostForm {
    pub fields: PostForm,
    pub errors: FormErrors,
    pub is_bound: bool,
}

impl BoundPostForm {
    #[must_use]
    pub fn unbound(fields: PostForm) -> Self {
        Self {
            fields,
            errors: FormErrors::default(),
            is_bound: false,
        }
    }

    #[must_use]
    pub fn rejected(fields: PostForm, errors: FormErrors) -> Self {
        Self {
            fields,
            errors,
            is_bound: true,
        }
    }
}

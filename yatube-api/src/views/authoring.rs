//! Creating and editing posts.
//!
//! Both workflows check identity first and, for edits, ownership before any
//! form is built, so a rejected caller never sees or submits a form. The
//! author of a post is taken from the identity on create and never changes
//! afterwards: [`PostContent`] has no author to write.

use crate::views::{Result, ViewError};
use serde::Serialize;
use tracing::{debug, info};
use yatube_common::model::{
    Id,
    form::{BoundPostForm, FormErrors, NON_FIELD_ERRORS, PostForm},
    post::{CreatePost, Post, PostContent, PostMarker},
    user::{UserMarker, Username},
};
use yatube_db::store::ContentStore;

/// What the request asks the workflow to do.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum FormRequest {
    /// Show the form.
    Display,
    Submit(PostForm),
    /// A submission whose body could not be read as a post form.
    Unreadable(String),
}

#[derive(Clone, Debug, Serialize)]
pub struct PostFormContext {
    pub form: BoundPostForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
    pub is_edit: bool,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum RedirectTarget {
    Profile(Username),
    PostDetail(Id<PostMarker>),
}

#[derive(Clone, Debug)]
pub enum AuthoringOutcome {
    Form(Box<PostFormContext>),
    Redirect(RedirectTarget),
}

impl AuthoringOutcome {
    fn form(form: BoundPostForm, post: Option<Post>) -> Self {
        let is_edit = post.is_some();
        Self::Form(Box::new(PostFormContext {
            form,
            post,
            is_edit,
        }))
    }
}

async fn validate(
    store: &dyn ContentStore,
    form: &PostForm,
) -> Result<Result<PostContent, FormErrors>> {
    let group = match form.group {
        Some(group_id) => store.fetch_group(group_id).await?,
        None => None,
    };

    Ok(form.clean(group.as_ref()))
}

fn unreadable_errors(reason: &str) -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add(
        NON_FIELD_ERRORS,
        format!("The submission could not be read: {reason}"),
    );
    errors
}

pub async fn create_post(
    store: &dyn ContentStore,
    identity: Option<Id<UserMarker>>,
    request: FormRequest,
) -> Result<AuthoringOutcome> {
    let author = identity.ok_or(ViewError::Unauthenticated)?;

    let form = match request {
        FormRequest::Display => {
            return Ok(AuthoringOutcome::form(
                BoundPostForm::unbound(PostForm::default()),
                None,
            ));
        }
        FormRequest::Unreadable(reason) => {
            return Ok(AuthoringOutcome::form(
                BoundPostForm::rejected(PostForm::default(), unreadable_errors(&reason)),
                None,
            ));
        }
        FormRequest::Submit(form) => form,
    };

    let content = match validate(store, &form).await? {
        Ok(content) => content,
        Err(errors) => {
            return Ok(AuthoringOutcome::form(
                BoundPostForm::rejected(form, errors),
                None,
            ));
        }
    };

    let created = store.create_post(&CreatePost { author, content }).await?;
    info!(post_id = %created.id, author = %created.author.username, "Post created");

    Ok(AuthoringOutcome::Redirect(RedirectTarget::Profile(
        created.author.username,
    )))
}

pub async fn edit_post(
    store: &dyn ContentStore,
    identity: Option<Id<UserMarker>>,
    post_id: Id<PostMarker>,
    request: FormRequest,
) -> Result<AuthoringOutcome> {
    let editor = identity.ok_or(ViewError::Unauthenticated)?;

    let post = store
        .fetch_post(post_id)
        .await?
        .ok_or(ViewError::PostByIdNotFound(post_id))?;

    if post.author.id != editor {
        debug!(%post_id, %editor, "Edit by someone other than the author, redirecting");
        return Ok(AuthoringOutcome::Redirect(RedirectTarget::PostDetail(post_id)));
    }

    let form = match request {
        FormRequest::Display => {
            let form = BoundPostForm::unbound(PostForm::from(&post));
            return Ok(AuthoringOutcome::form(form, Some(post)));
        }
        FormRequest::Unreadable(reason) => {
            let form =
                BoundPostForm::rejected(PostForm::from(&post), unreadable_errors(&reason));
            return Ok(AuthoringOutcome::form(form, Some(post)));
        }
        FormRequest::Submit(form) => form,
    };

    let content = match validate(store, &form).await? {
        Ok(content) => content,
        Err(errors) => {
            return Ok(AuthoringOutcome::form(
                BoundPostForm::rejected(form, errors),
                Some(post),
            ));
        }
    };

    store
        .update_post(post_id, &content)
        .await?
        .ok_or(ViewError::PostByIdNotFound(post_id))?;
    info!(%post_id, "Post edited");

    Ok(AuthoringOutcome::Redirect(RedirectTarget::PostDetail(post_id)))
}

#[cfg(test)]
mod tests {
    use crate::views::{
        ViewError,
        authoring::{AuthoringOutcome, FormRequest, RedirectTarget, create_post, edit_post},
        test_util::{group, post, user},
    };
    use yatube_common::{
        model::{
            Id,
            form::{GROUP_FIELD, NON_FIELD_ERRORS, PostForm, TEXT_FIELD},
        },
        pagination::PageWindow,
    };
    use yatube_db::{
        memory::MemoryStore,
        store::{ContentStore, PostFilter},
    };

    fn submit(text: &str, group: Option<u64>) -> FormRequest {
        FormRequest::Submit(PostForm {
            text: text.to_owned(),
            group: group.map(Id::new),
        })
    }

    async fn post_count(store: &MemoryStore) -> usize {
        store.count_posts(PostFilter::All).await.unwrap()
    }

    #[tokio::test]
    async fn create_requires_identity() {
        let store = MemoryStore::new();

        for request in [FormRequest::Display, submit("hello", None)] {
            let result = create_post(&store, None, request).await;
            assert!(matches!(result, Err(ViewError::Unauthenticated)));
        }
        assert_eq!(post_count(&store).await, 0);
    }

    #[tokio::test]
    async fn create_displays_empty_form() {
        let store = MemoryStore::new();
        let leo = user(&store, "leo").await;

        let outcome = create_post(&store, Some(leo.id), FormRequest::Display)
            .await
            .unwrap();

        let AuthoringOutcome::Form(context) = outcome else {
            panic!("expected a form");
        };
        assert_eq!(context.form.fields, PostForm::default());
        assert!(!context.form.is_bound);
        assert!(context.form.errors.is_empty());
        assert!(context.post.is_none());
        assert!(!context.is_edit);
    }

    #[tokio::test]
    async fn create_saves_with_current_author_and_redirects_to_profile() {
        let store = MemoryStore::new();
        let leo = user(&store, "leo").await;
        let cats = group(&store, "cats").await;

        let request = submit("  meow ", Some(cats.id.get()));
        let outcome = create_post(&store, Some(leo.id), request).await.unwrap();

        assert!(matches!(
            outcome,
            AuthoringOutcome::Redirect(RedirectTarget::Profile(ref username))
                if *username == leo.username
        ));

        let mut posts = store
            .fetch_posts(
                PostFilter::All,
                PageWindow {
                    offset: 0,
                    limit: 10,
                },
            )
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        let created = posts.remove(0);
        assert_eq!(created.author, leo);
        assert_eq!(created.text.get(), "meow");
        assert_eq!(created.group, Some(cats));
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_without_saving() {
        let store = MemoryStore::new();
        let leo = user(&store, "leo").await;

        let outcome = create_post(&store, Some(leo.id), submit("   ", Some(404)))
            .await
            .unwrap();

        let AuthoringOutcome::Form(context) = outcome else {
            panic!("expected a form");
        };
        assert!(context.form.is_bound);
        assert_eq!(context.form.fields.text, "   ");
        assert_eq!(context.form.errors.field(TEXT_FIELD).len(), 1);
        assert_eq!(context.form.errors.field(GROUP_FIELD).len(), 1);
        assert_eq!(post_count(&store).await, 0);
    }

    #[tokio::test]
    async fn create_with_unreadable_body_shows_form_error() {
        let store = MemoryStore::new();
        let leo = user(&store, "leo").await;

        let outcome = create_post(
            &store,
            Some(leo.id),
            FormRequest::Unreadable("expected value".to_owned()),
        )
        .await
        .unwrap();

        let AuthoringOutcome::Form(context) = outcome else {
            panic!("expected a form");
        };
        assert_eq!(context.form.errors.field(NON_FIELD_ERRORS).len(), 1);
        assert_eq!(post_count(&store).await, 0);
    }

    #[tokio::test]
    async fn edit_requires_identity_before_lookup() {
        let store = MemoryStore::new();

        let result = edit_post(&store, None, Id::new(1), FormRequest::Display).await;

        assert!(matches!(result, Err(ViewError::Unauthenticated)));
    }

    #[tokio::test]
    async fn edit_of_missing_post_is_not_found() {
        let store = MemoryStore::new();
        let leo = user(&store, "leo").await;

        let result = edit_post(&store, Some(leo.id), Id::new(77), FormRequest::Display).await;

        assert!(matches!(result, Err(ViewError::PostByIdNotFound(_))));
    }

    #[tokio::test]
    async fn non_author_is_redirected_and_post_is_unchanged() {
        let store = MemoryStore::new();
        let leo = user(&store, "leo").await;
        let mia = user(&store, "mia").await;
        let original = post(&store, &leo, None, "leo's words").await;

        for request in [
            FormRequest::Display,
            submit("mia was here", None),
            FormRequest::Unreadable("garbage".to_owned()),
        ] {
            let outcome = edit_post(&store, Some(mia.id), original.id, request)
                .await
                .unwrap();

            assert!(matches!(
                outcome,
                AuthoringOutcome::Redirect(RedirectTarget::PostDetail(id)) if id == original.id
            ));
        }

        assert_eq!(store.fetch_post(original.id).await.unwrap(), Some(original));
    }

    #[tokio::test]
    async fn author_sees_prefilled_form() {
        let store = MemoryStore::new();
        let leo = user(&store, "leo").await;
        let cats = group(&store, "cats").await;
        let original = post(&store, &leo, Some(&cats), "purr").await;

        let outcome = edit_post(&store, Some(leo.id), original.id, FormRequest::Display)
            .await
            .unwrap();

        let AuthoringOutcome::Form(context) = outcome else {
            panic!("expected a form");
        };
        assert_eq!(context.form.fields.text, "purr");
        assert_eq!(context.form.fields.group, Some(cats.id));
        assert!(!context.form.is_bound);
        assert!(context.is_edit);
        assert_eq!(context.post, Some(original));
    }

    #[tokio::test]
    async fn author_edit_changes_text_and_group_but_not_author() {
        let store = MemoryStore::new();
        let leo = user(&store, "leo").await;
        let cats = group(&store, "cats").await;
        let original = post(&store, &leo, Some(&cats), "purr").await;

        let outcome = edit_post(&store, Some(leo.id), original.id, submit("woof", None))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            AuthoringOutcome::Redirect(RedirectTarget::PostDetail(id)) if id == original.id
        ));

        let edited = store.fetch_post(original.id).await.unwrap().unwrap();
        assert_eq!(edited.text.get(), "woof");
        assert_eq!(edited.group, None);
        assert_eq!(edited.author, leo);
        assert_eq!(edited.created_at, original.created_at);
    }

    #[tokio::test]
    async fn invalid_edit_redisplays_with_post_and_errors() {
        let store = MemoryStore::new();
        let leo = user(&store, "leo").await;
        let original = post(&store, &leo, None, "purr").await;

        let outcome = edit_post(&store, Some(leo.id), original.id, submit("", Some(9)))
            .await
            .unwrap();

        let AuthoringOutcome::Form(context) = outcome else {
            panic!("expected a form");
        };
        assert!(context.form.is_bound);
        assert!(context.is_edit);
        assert_eq!(context.post.as_ref(), Some(&original));
        assert_eq!(context.form.errors.field(TEXT_FIELD).len(), 1);
        assert_eq!(context.form.errors.field(GROUP_FIELD).len(), 1);
        assert_eq!(store.fetch_post(original.id).await.unwrap(), Some(original));
    }
}

//! Post listings, detail page and the create/edit forms.

use std::collections::HashMap;

use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use serde::Serialize;
use uuid::Uuid;

use yatube_core::domain::{Group, Post, User};
use yatube_core::error::DomainError;
use yatube_core::forms::{FieldErrors, PostForm, PostFormView};
use yatube_core::pagination::{PAGE_SIZE, Page, PageWindow};
use yatube_core::ports::PostFilter;
use yatube_shared::dto::{AuthorResponse, GroupResponse, PageQuery, PostResponse};

use crate::handlers::{paths, redirect, render};
use crate::middleware::auth::{Identity, author_only};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const CREATE_PATH: &str = "/create/";

#[derive(Serialize)]
struct IndexContext {
    page_obj: Page<PostResponse>,
}

#[derive(Serialize)]
struct GroupContext {
    group: GroupResponse,
    page_obj: Page<PostResponse>,
}

#[derive(Serialize)]
struct ProfileContext {
    author: AuthorResponse,
    posts_count: usize,
    page_obj: Page<PostResponse>,
}

#[derive(Serialize)]
struct DetailContext {
    post: PostResponse,
    author_posts_count: u64,
}

#[derive(Serialize)]
struct PostFormContext {
    form: PostFormView,
    is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_id: Option<Uuid>,
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page_obj = load_page(&state, PostFilter::All, query.page()).await?;

    Ok(render("posts/index.html", IndexContext { page_obj }))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Group", &slug))?;

    let page_obj = load_page(&state, PostFilter::Group(group.id), query.page()).await?;

    Ok(render(
        "posts/group_list.html",
        GroupContext {
            group: group_response(&group),
            page_obj,
        },
    ))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &username))?;

    let page_obj = load_page(&state, PostFilter::Author(author.id), query.page()).await?;
    let posts_count = page_obj.count;

    Ok(render(
        "posts/profile.html",
        ProfileContext {
            author: author_response(&author),
            posts_count,
            page_obj,
        },
    ))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    let author_posts_count = state.posts.count(PostFilter::Author(post.author_id)).await?;

    let presenter = Presenter::load(&state, std::slice::from_ref(&post)).await?;
    let post = presenter.present(post)?;

    Ok(render(
        "posts/post_detail.html",
        DetailContext {
            post,
            author_posts_count,
        },
    ))
}

/// GET /create/
pub async fn post_create_form(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let groups = state.groups.list_all().await?;
    let form = PostForm::default().render(&groups, FieldErrors::new());

    Ok(render_form(form, None))
}

/// POST /create/
///
/// The author is always the requester; any author value in the body is ignored.
/// A session whose user no longer exists is sent back to the login page.
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let Some(author) = state.users.find_by_id(identity.user_id).await? else {
        tracing::warn!(user_id = %identity.user_id, "Session refers to a deleted user");
        return Ok(redirect(&paths::login(Some(CREATE_PATH))));
    };

    let form = form.into_inner();
    let groups = state.groups.list_all().await?;

    match form.validate(&groups) {
        Ok(valid) => {
            let post = Post::new(author.id, valid.text, valid.group_id);
            let post = state.posts.create(post).await?;

            tracing::info!(post_id = %post.id, author = %author.username, "Post created");
            Ok(redirect(&paths::profile(&author.username)))
        }
        Err(errors) => {
            tracing::debug!(?errors, "Post form rejected");
            Ok(render_form(form.render(&groups, errors), None))
        }
    }
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    if let Err(response) = author_only(&post, &identity) {
        return Ok(response);
    }

    let groups = state.groups.list_all().await?;
    let form = PostForm::from_post(&post).render(&groups, FieldErrors::new());

    Ok(render_form(form, Some(post.id)))
}

/// POST /posts/{post_id}/edit/
///
/// The body is only decoded once the post exists and belongs to the
/// requester, so strangers are redirected whatever they send.
pub async fn post_edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Payload,
) -> AppResult<HttpResponse> {
    let mut post = find_post(&state, path.into_inner()).await?;
    if let Err(response) = author_only(&post, &identity) {
        return Ok(response);
    }

    let form = web::Form::<PostForm>::from_request(&req, &mut body.into_inner())
        .await
        .map_err(|err| AppError::rejected(err.as_response_error()))?
        .into_inner();
    let groups = state.groups.list_all().await?;

    match form.validate(&groups) {
        Ok(valid) => {
            post.apply_edit(valid.text, valid.group_id);
            let post = state.posts.update(post).await?;

            tracing::info!(post_id = %post.id, "Post edited");
            Ok(redirect(&paths::post_detail(post.id)))
        }
        Err(errors) => Ok(render_form(form.render(&groups, errors), Some(post.id))),
    }
}

async fn find_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id).into())
}

fn render_form(form: PostFormView, post_id: Option<Uuid>) -> HttpResponse {
    render(
        "posts/create_post.html",
        PostFormContext {
            form,
            is_edit: post_id.is_some(),
            post_id,
        },
    )
}

/// Load only the requested page of the posts matching `filter`.
async fn load_page(
    state: &AppState,
    filter: PostFilter,
    requested: Option<&str>,
) -> AppResult<Page<PostResponse>> {
    let count = state.posts.count(filter).await?;
    let window = PageWindow::resolve(count as usize, requested, PAGE_SIZE);
    let posts = state
        .posts
        .fetch_page(filter, window.index() as u64, window.per_page as u64)
        .await?;

    present_page(state, window.page(posts)).await
}

async fn present_page(state: &AppState, page: Page<Post>) -> AppResult<Page<PostResponse>> {
    let presenter = Presenter::load(state, &page.object_list).await?;

    page.try_map(|post| presenter.present(post))
}

/// Author and group lookups for a batch of posts.
struct Presenter {
    authors: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
}

impl Presenter {
    async fn load(state: &AppState, posts: &[Post]) -> AppResult<Self> {
        let groups = state
            .groups
            .list_all()
            .await?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();

        let mut authors = HashMap::new();
        for post in posts {
            if authors.contains_key(&post.author_id) {
                continue;
            }
            if let Some(user) = state.users.find_by_id(post.author_id).await? {
                authors.insert(user.id, user);
            }
        }

        Ok(Self { authors, groups })
    }

    fn present(&self, post: Post) -> AppResult<PostResponse> {
        let author = self.authors.get(&post.author_id).ok_or_else(|| {
            AppError::Internal(format!(
                "post {} references missing author {}",
                post.id, post.author_id
            ))
        })?;

        Ok(PostResponse {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author: author_response(author),
            group: post
                .group_id
                .and_then(|id| self.groups.get(&id))
                .map(group_response),
        })
    }
}

fn author_response(user: &User) -> AuthorResponse {
    AuthorResponse {
        id: user.id,
        username: user.username.clone(),
    }
}

fn group_response(group: &Group) -> GroupResponse {
    GroupResponse {
        id: group.id,
        title: group.title.clone(),
        slug: group.slug.clone(),
        description: group.description.clone(),
    }
}

//! Fixtures shared by the handler tests.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;

use yatube_core::domain::{Group, Post, User};
use yatube_core::ports::PostFilter;
use yatube_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build the full application around `state`, as `main` does.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap($crate::observability::RequestIdMiddleware)
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure($crate::handlers::configure_routes),
        )
        .await
    };
}
pub(crate) use init_app;

pub fn test_state() -> AppState {
    let jwt = JwtConfig {
        secret: "test-secret".to_string(),
        ..JwtConfig::default()
    };
    AppState::in_memory(
        Arc::new(JwtTokenService::new(jwt)),
        Arc::new(Argon2PasswordService::new()),
    )
}

pub async fn create_user(state: &AppState, username: &str) -> User {
    let hash = state.passwords.hash(TEST_PASSWORD).unwrap();
    state
        .users
        .create(User::new(username.to_string(), hash))
        .await
        .unwrap()
}

pub async fn create_group(state: &AppState, title: &str, slug: &str) -> Group {
    state
        .groups
        .create(Group::new(title, slug, "Test description"))
        .await
        .unwrap()
}

pub async fn create_post(state: &AppState, author: &User, text: &str, group: Option<&Group>) -> Post {
    state
        .posts
        .create(Post::new(author.id, text.to_string(), group.map(|g| g.id)))
        .await
        .unwrap()
}

/// Every stored post, newest first.
pub async fn all_posts(state: &AppState) -> Vec<Post> {
    state
        .posts
        .fetch_page(PostFilter::All, 0, 1000)
        .await
        .unwrap()
}

/// Session cookie of a logged-in `user`.
pub fn session_cookie(state: &AppState, user: &User) -> Cookie<'static> {
    let token = state.tokens.generate_token(user.id, &user.username).unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

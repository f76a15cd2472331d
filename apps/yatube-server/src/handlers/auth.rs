//! Sign-up, login and logout.

use actix_web::{
    HttpResponse,
    cookie::{Cookie, SameSite, time::Duration},
    http::header,
    web,
};
use serde::Serialize;

use yatube_core::RepoError;
use yatube_core::domain::User;
use yatube_core::forms::{FieldErrors, NON_FIELD_ERRORS, REQUIRED};
use yatube_shared::dto::{LoginForm, NextQuery, SignupForm};

use crate::handlers::{paths, redirect, render};
use crate::middleware::auth::SESSION_COOKIE;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const USERNAME_MAX_LENGTH: usize = 150;
const PASSWORD_MIN_LENGTH: usize = 8;

const USERNAME_INVALID: &str = "Enter a valid username. This value may contain only letters, \
                                numbers, and @/./+/-/_ characters.";
const USERNAME_TOO_LONG: &str = "Ensure this value has at most 150 characters.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const PASSWORD_TOO_SHORT: &str =
    "This password is too short. It must contain at least 8 characters.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
const INVALID_LOGIN: &str = "Please enter a correct username and password. \
                             Note that both fields may be case-sensitive.";

#[derive(Serialize)]
struct SignupContext {
    username: String,
    errors: FieldErrors,
}

#[derive(Serialize)]
struct LoginContext {
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,
    errors: FieldErrors,
}

/// GET /auth/signup/
pub async fn signup_form() -> HttpResponse {
    render(
        "users/signup.html",
        SignupContext {
            username: String::new(),
            errors: FieldErrors::new(),
        },
    )
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let username = form.username.trim().to_string();

    let mut errors = validate_signup(&username, &form);
    if !errors.contains("username") && state.users.find_by_username(&username).await?.is_some() {
        errors.add("username", USERNAME_TAKEN);
    }
    if !errors.is_empty() {
        return Ok(render_signup(username, errors));
    }

    let passwords = state.passwords.clone();
    let password = form.password1;
    let password_hash = web::block(move || passwords.hash(&password)).await??;

    match state.users.create(User::new(username.clone(), password_hash)).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
            Ok(redirect(&paths::login(None)))
        }
        // Lost a race with a concurrent sign-up of the same name.
        Err(RepoError::Constraint(_)) => {
            let mut errors = FieldErrors::new();
            errors.add("username", USERNAME_TAKEN);
            Ok(render_signup(username, errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/login/
pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    render(
        "users/login.html",
        LoginContext {
            username: String::new(),
            next: query.into_inner().next,
            errors: FieldErrors::new(),
        },
    )
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let username = form.username.trim().to_string();

    let user = state.users.find_by_username(&username).await?;
    let verified = match &user {
        Some(user) => {
            let passwords = state.passwords.clone();
            let password = form.password;
            let hash = user.password_hash.clone();
            web::block(move || passwords.verify(&password, &hash)).await??
        }
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        tracing::info!(username = %username, "Failed login attempt");

        let mut errors = FieldErrors::new();
        errors.add(NON_FIELD_ERRORS, INVALID_LOGIN);
        return Ok(render(
            "users/login.html",
            LoginContext {
                username,
                next: form.next,
                errors,
            },
        ));
    };

    let token = state.tokens.generate_token(user.id, &user.username)?;

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(state.tokens.expiration_seconds()))
        .finish();

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, paths::local_or_index(form.next.as_deref())))
        .cookie(cookie)
        .finish())
}

/// GET|POST /auth/logout/
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Found()
        .insert_header((header::LOCATION, paths::INDEX))
        .cookie(cookie)
        .finish()
}

fn validate_signup(username: &str, form: &SignupForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if username.is_empty() {
        errors.add("username", REQUIRED);
    } else if username.chars().count() > USERNAME_MAX_LENGTH {
        errors.add("username", USERNAME_TOO_LONG);
    } else if !username.chars().all(is_username_char) {
        errors.add("username", USERNAME_INVALID);
    }

    if form.password1.is_empty() {
        errors.add("password1", REQUIRED);
    } else if form.password1.chars().count() < PASSWORD_MIN_LENGTH {
        errors.add("password1", PASSWORD_TOO_SHORT);
    }

    if form.password2.is_empty() {
        errors.add("password2", REQUIRED);
    } else if form.password1 != form.password2 {
        errors.add("password2", PASSWORD_MISMATCH);
    }

    errors
}

// Usernames end up in URL paths and headers, so only ASCII is accepted.
fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

fn render_signup(username: String, errors: FieldErrors) -> HttpResponse {
    render("users/signup.html", SignupContext { username, errors })
}

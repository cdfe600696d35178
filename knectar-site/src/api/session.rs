//! Edit-mode login and logout
//!
//! Plain form posts answered with `303 See Other`, so the login page works
//! without scripting. The session lives in a cookie, next to the seal
//! that makes it count.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::session::CookieStorage;
use crate::AppState;

pub(crate) const HOME: &str = "/index.html";
const LOGIN_FAILED: &str = "/edit.html?error=1";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/login
pub async fn login(State(state): State<AppState>, headers: HeaderMap, Form(form): Form<LoginForm>) -> Response {
    let mut cookies = CookieStorage::from_headers(&headers);
    let location = match state.gate.login(&mut cookies, &form.username, &form.password) {
        Ok(_) => {
            state.seal.seal(&mut cookies);
            HOME
        }
        Err(_) => LOGIN_FAILED,
    };

    let mut response = Redirect::to(location).into_response();
    cookies.apply_to(response.headers_mut());
    response
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut cookies = CookieStorage::from_headers(&headers);
    state.gate.logout(&mut cookies);
    state.seal.unseal(&mut cookies);

    let mut response = Redirect::to(HOME).into_response();
    cookies.apply_to(response.headers_mut());
    response
}

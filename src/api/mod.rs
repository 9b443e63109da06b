// SPDX-License-Identifier: MIT

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AuthResponse, FriendRequestResponse, FriendRequestsResponse, FriendSummary,
        IncomingRequestView, LoginRequest, OnboardRequest, SentRequestView, SignupRequest,
        StatusMessage, UserResponse,
    },
    state::AppState,
    storage::RequestStatus,
};

pub mod auth;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/onboarding", post(auth::onboard))
        .route("/me", get(auth::me));

    let user_routes = Router::new()
        .route("/", get(users::get_recommended_users))
        .route("/friends", get(users::get_my_friends))
        .route("/friend-request/{id}", post(users::send_friend_request))
        .route(
            "/friend-request/{id}/accept",
            put(users::accept_friend_request),
        )
        .route("/friend-requests", get(users::get_friend_requests))
        .route(
            "/outgoing-friend-requests",
            get(users::get_outgoing_friend_requests),
        );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup,
        auth::login,
        auth::logout,
        auth::onboard,
        auth::me,
        users::get_recommended_users,
        users::get_my_friends,
        users::send_friend_request,
        users::accept_friend_request,
        users::get_friend_requests,
        users::get_outgoing_friend_requests,
        health::health
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            OnboardRequest,
            AuthResponse,
            UserResponse,
            StatusMessage,
            FriendSummary,
            FriendRequestResponse,
            FriendRequestsResponse,
            IncomingRequestView,
            SentRequestView,
            RequestStatus
        )
    ),
    tags(
        (name = "Auth", description = "Signup, login, sessions, onboarding"),
        (name = "Users", description = "Recommendations, friends, friend requests"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;

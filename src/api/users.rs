// SPDX-License-Identifier: MIT

//! Social-graph endpoints: recommendations, friend lists, and the
//! friend-request workflow.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        FriendRequestResponse, FriendRequestsResponse, FriendSummary, IncomingRequestView,
        SentRequestView, StatusMessage, UserResponse,
    },
    state::AppState,
    storage::{StorageError, StoredFriendRequest},
};

/// Recommended partners: everyone except self, the not-yet-onboarded, and
/// current friends. Unordered, no pagination.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Recommended users", body = [UserResponse]),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn get_recommended_users(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let recommended = state
        .db
        .list_users()?
        .into_iter()
        .filter(|candidate| {
            candidate.id != user.id && candidate.is_onboarded && !user.is_friend_of(&candidate.id)
        })
        .map(UserResponse::from)
        .collect();

    Ok(Json(recommended))
}

#[utoipa::path(
    get,
    path = "/api/users/friends",
    tag = "Users",
    responses(
        (status = 200, description = "Current user's friends", body = [FriendSummary]),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn get_my_friends(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<Vec<FriendSummary>>, ApiError> {
    let friends = state
        .db
        .friends_of(&user.id)?
        .into_iter()
        .map(FriendSummary::from)
        .collect();

    Ok(Json(friends))
}

#[utoipa::path(
    post,
    path = "/api/users/friend-request/{id}",
    params(("id" = String, Path, description = "Recipient user id")),
    tag = "Users",
    responses(
        (status = 201, description = "Pending request created", body = FriendRequestResponse),
        (status = 400, description = "Self-send, already friends, or duplicate request"),
        (status = 404, description = "Recipient not found"),
    )
)]
pub async fn send_friend_request(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(recipient_id): Path<String>,
) -> Result<(StatusCode, Json<FriendRequestResponse>), ApiError> {
    if recipient_id == user.id {
        return Err(ApiError::bad_request(
            "You cannot send a friend request to yourself",
        ));
    }

    let recipient = state.db.get_user(&recipient_id).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found("Recipient not found"),
        other => other.into(),
    })?;

    if user.is_friend_of(&recipient.id) {
        return Err(ApiError::conflict("You are already friends with this user"));
    }

    // The duplicate-pair check runs inside the create transaction, so two
    // concurrent sends (either direction) cannot both commit.
    let request = state
        .db
        .create_friend_request(&user.id, &recipient.id)
        .map_err(|e| match e {
            StorageError::AlreadyExists(msg) => ApiError::conflict(msg),
            other => other.into(),
        })?;

    info!(sender = %user.id, recipient = %recipient.id, "friend request sent");
    Ok((StatusCode::CREATED, Json(request.into())))
}

#[utoipa::path(
    put,
    path = "/api/users/friend-request/{id}/accept",
    params(("id" = String, Path, description = "Friend request id")),
    tag = "Users",
    responses(
        (status = 200, description = "Request accepted, both friend sets updated", body = StatusMessage),
        (status = 403, description = "Acting user is not the recipient"),
        (status = 404, description = "Request not found"),
    )
)]
pub async fn accept_friend_request(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(request_id): Path<String>,
) -> Result<Json<StatusMessage>, ApiError> {
    let request = state.db.get_friend_request(&request_id).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found("Friend request not found"),
        other => other.into(),
    })?;

    if request.recipient_id != user.id {
        return Err(ApiError::forbidden(
            "You are not authorized to accept this request",
        ));
    }

    state.db.accept_friend_request(&request_id)?;

    info!(request_id = %request_id, user_id = %user.id, "friend request accepted");
    Ok(Json(StatusMessage {
        success: true,
        message: "Friend request accepted".to_string(),
    }))
}

/// Incoming pending requests (sender projected) and accepted requests the
/// current user originally sent (recipient projected).
#[utoipa::path(
    get,
    path = "/api/users/friend-requests",
    tag = "Users",
    responses(
        (status = 200, description = "Incoming and accepted requests", body = FriendRequestsResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn get_friend_requests(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<FriendRequestsResponse>, ApiError> {
    let incoming_reqs = project_senders(&state, state.db.incoming_pending_requests(&user.id)?)?;
    let accepted_reqs = project_recipients(&state, state.db.accepted_requests_sent_by(&user.id)?)?;

    Ok(Json(FriendRequestsResponse {
        incoming_reqs,
        accepted_reqs,
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/outgoing-friend-requests",
    tag = "Users",
    responses(
        (status = 200, description = "Pending requests the user sent", body = [SentRequestView]),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn get_outgoing_friend_requests(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<Vec<SentRequestView>>, ApiError> {
    let outgoing = project_recipients(&state, state.db.outgoing_pending_requests(&user.id)?)?;
    Ok(Json(outgoing))
}

fn project_senders(
    state: &AppState,
    requests: Vec<StoredFriendRequest>,
) -> Result<Vec<IncomingRequestView>, ApiError> {
    let mut views = Vec::with_capacity(requests.len());
    for request in requests {
        // Dangling sender ids are skipped rather than failing the listing.
        if let Ok(sender) = state.db.get_user(&request.sender_id) {
            views.push(IncomingRequestView {
                id: request.id,
                sender: sender.into(),
                status: request.status,
            });
        }
    }
    Ok(views)
}

fn project_recipients(
    state: &AppState,
    requests: Vec<StoredFriendRequest>,
) -> Result<Vec<SentRequestView>, ApiError> {
    let mut views = Vec::with_capacity(requests.len());
    for request in requests {
        if let Ok(recipient) = state.db.get_user(&request.recipient_id) {
            views.push(SentRequestView {
                id: request.id,
                recipient: recipient.into(),
                status: request.status,
            });
        }
    }
    Ok(views)
}

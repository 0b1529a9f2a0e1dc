use crate::AppState;
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::users::{ListUsersQuery, UserCreate, UserResponse, UserUpdate};
use crate::db::handlers::{Repository, Users, users::UserFilter};
use crate::errors::{Error, Result};
use crate::types::UserId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users", body = PaginatedResponse<UserResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>> {
    let mut tx = state.store.begin().await;
    let mut filter = UserFilter::default();
    if let Some(search) = query.search {
        filter = filter.with_search(search);
    }

    let users = Users::new(&mut tx).list(&filter).await?;
    Ok(Json(query.pagination.page(users.into_iter().map(UserResponse::from).collect())))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create user",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Name missing"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(State(state): State<AppState>, Json(create): Json<UserCreate>) -> Result<(StatusCode, Json<UserResponse>)> {
    let mut tx = state.store.begin().await;
    let user = Users::new(&mut tx).create(&create.into()).await?;
    tx.commit();
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get user",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %id))]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<UserResponse>> {
    let mut tx = state.store.begin().await;
    match Users::new(&mut tx).get_by_id(id.clone()).await? {
        Some(user) => Ok(Json(UserResponse::from(user))),
        None => Err(Error::NotFound {
            resource: "User".to_string(),
            id,
        }),
    }
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    summary = "Update user",
    params(("id" = String, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %id))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    let mut tx = state.store.begin().await;
    let user = Users::new(&mut tx).update(id, &update.into()).await?;
    tx.commit();
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    summary = "Delete user",
    description = "Refused while the user is the custodian of an asset.",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "User still holds assets"),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %id))]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<StatusCode> {
    let mut tx = state.store.begin().await;
    if Users::new(&mut tx).delete(id.clone()).await? {
        tx.commit();
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "User".to_string(),
            id,
        })
    }
}

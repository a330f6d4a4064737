//! Administration: groups, roles, users and navigation nodes.
//!
//! Lookup failures other than the specific not-found kinds are reported as
//! 422, since they usually come from a bad name in the path.

use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::{error_ladder, no_content, unprocessable};
use crate::auth::basic::BASIC_PROVIDER;
use crate::auth::CurrentUser;
use crate::http::error::{ApiError, ApiResult};
use crate::http::params::decode_json;
use crate::http::state::AppState;
use crate::model::admin::SUPER_USER;
use crate::model::{Group, Node, PasswordChange, Role, User, UserGroupsUpdate};
use crate::service::ErrorKind;

const GROUP_NOT_FOUND: &[(ErrorKind, StatusCode)] = &[(ErrorKind::GroupNotFound, StatusCode::NOT_FOUND)];
const ROLE_NOT_FOUND: &[(ErrorKind, StatusCode)] = &[(ErrorKind::RoleNotFound, StatusCode::NOT_FOUND)];
const NODE_NOT_FOUND: &[(ErrorKind, StatusCode)] = &[(ErrorKind::NodeNotFound, StatusCode::NOT_FOUND)];

/// Body name must be empty (taken from the path) or equal to the path name.
fn name_from_path(body_name: &mut String, path_name: String) -> ApiResult<()> {
    if body_name.is_empty() {
        *body_name = path_name;
    } else if *body_name != path_name {
        return Err(ApiError::bad_request("Name does not correspond"));
    }
    Ok(())
}

fn invalid(err: crate::model::ValidationError) -> ApiError {
    ApiError::bad_request(err.to_string())
}

// =============================================================================
// Groups
// =============================================================================

/// POST /admins/groups
pub async fn insert_group(State(state): State<AppState>, body: Body) -> ApiResult<Response> {
    let group: Group = decode_json(body).await?;
    group.validate().map_err(invalid)?;

    let inserted = state.service.insert_group(group).await.map_err(unprocessable)?;
    Ok((StatusCode::CREATED, Json(inserted)).into_response())
}

/// PUT /admins/groups/{name}
pub async fn update_group(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Body,
) -> ApiResult<Json<Group>> {
    let mut group: Group = decode_json(body).await?;
    name_from_path(&mut group.name, name)?;
    group.validate().map_err(invalid)?;

    let updated = state
        .service
        .update_group(group)
        .await
        .map_err(error_ladder(GROUP_NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY))?;
    Ok(Json(updated))
}

/// GET /admins/groups
pub async fn get_groups(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let groups = state.service.get_groups().await.map_err(unprocessable)?;
    Ok(Json(json!({ "groups": groups })))
}

/// GET /admins/groups/{name}
pub async fn get_group(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Group>> {
    let group = state
        .service
        .get_group(&name)
        .await
        .map_err(error_ladder(GROUP_NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY))?;
    Ok(Json(group))
}

/// DELETE /admins/groups/{name}
///
/// Refused while any user still belongs to the group.
pub async fn delete_group(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Response> {
    let users = state.service.list_users().await.map_err(unprocessable)?;
    if users.iter().any(|user| user.groups.contains(&name)) {
        return Err(ApiError::bad_request(ErrorKind::GroupCannotBeDeleted.as_str()));
    }

    state
        .service
        .delete_group(&name)
        .await
        .map_err(error_ladder(GROUP_NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY))?;
    Ok(no_content())
}

// =============================================================================
// Roles
// =============================================================================

/// POST /admins/roles
pub async fn insert_role(State(state): State<AppState>, body: Body) -> ApiResult<Response> {
    let role: Role = decode_json(body).await?;
    role.validate().map_err(invalid)?;

    let inserted = state.service.insert_role(role).await.map_err(unprocessable)?;
    Ok((StatusCode::CREATED, Json(inserted)).into_response())
}

/// PUT /admins/roles/{name}
pub async fn update_role(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Body,
) -> ApiResult<Json<Role>> {
    let mut role: Role = decode_json(body).await?;
    name_from_path(&mut role.name, name)?;

    let updated = state
        .service
        .update_role(role)
        .await
        .map_err(error_ladder(ROLE_NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY))?;
    Ok(Json(updated))
}

/// GET /admins/roles
pub async fn get_roles(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let roles = state.service.get_roles().await.map_err(unprocessable)?;
    Ok(Json(json!({ "roles": roles })))
}

/// GET /admins/roles/{name}
pub async fn get_role(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Role>> {
    let role = state
        .service
        .get_role(&name)
        .await
        .map_err(error_ladder(ROLE_NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY))?;
    Ok(Json(role))
}

/// DELETE /admins/roles/{name}
pub async fn delete_role(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Response> {
    state
        .service
        .delete_role(&name)
        .await
        .map_err(error_ladder(ROLE_NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY))?;
    Ok(no_content())
}

// =============================================================================
// Users
// =============================================================================

/// GET /admins/users
pub async fn get_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state.service.list_users().await.map_err(unprocessable)?;
    Ok(Json(users))
}

/// GET /admins/users/{username}
pub async fn get_user(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Json<User>> {
    let user = state.service.get_user(&username).await.map_err(unprocessable)?;
    Ok(Json(user))
}

/// POST /admins/users
pub async fn add_user(State(state): State<AppState>, body: Body) -> ApiResult<Response> {
    let mut user: User = decode_json(body).await?;
    if user.password.is_empty() {
        return Err(ApiError::bad_request(ErrorKind::InvalidPassword.as_str()));
    }
    user.provider = BASIC_PROVIDER.to_string();

    let username = user.username.clone();
    state.service.add_user(user).await.map_err(unprocessable)?;
    info!(%username, "User added");
    Ok(StatusCode::CREATED.into_response())
}

/// PUT /admins/users/{username}
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Body,
) -> ApiResult<Response> {
    let update: UserGroupsUpdate = decode_json(body).await?;
    state
        .service
        .update_user_groups(&username, update.groups)
        .await
        .map_err(unprocessable)?;
    Ok(no_content())
}

/// DELETE /admins/users/{username}
pub async fn remove_user(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Response> {
    if username == SUPER_USER {
        return Err(ApiError::bad_request(ErrorKind::SuperUserCannotBeDeleted.as_str()));
    }
    state.service.remove_user(&username).await.map_err(unprocessable)?;
    Ok(no_content())
}

/// POST /admins/users/{username}/reset-password
///
/// Answers with the generated password; the user must change it at the
/// next login.
pub async fn new_password(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Json<String>> {
    let user = state.service.get_user(&username).await.map_err(unprocessable)?;
    let password = state.service.new_password(&user.username).await.map_err(unprocessable)?;
    state
        .service
        .add_limited_group(&user.username)
        .await
        .map_err(|err| ApiError::service(StatusCode::BAD_REQUEST, err))?;
    Ok(Json(password))
}

/// PUT /users/{username}/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(username): Path<String>,
    body: Body,
) -> ApiResult<Response> {
    if !caller.is_admin() && caller.username() != username {
        return Err(ApiError::unauthorized(ErrorKind::InvalidUser.as_str()));
    }

    let change: PasswordChange = decode_json(body).await?;
    if change.new_password != change.confirmed_password {
        return Err(ApiError::bad_request(ErrorKind::InvalidPassword.as_str()));
    }

    state
        .service
        .update_password(&username, &change.old_password, &change.new_password)
        .await
        .map_err(|err| ApiError::service(StatusCode::BAD_REQUEST, err))?;
    state
        .service
        .remove_limited_group(&username)
        .await
        .map_err(|err| ApiError::service(StatusCode::BAD_REQUEST, err))?;
    Ok(no_content())
}

// =============================================================================
// Nodes
// =============================================================================

/// GET /nodes
pub async fn get_nodes(State(state): State<AppState>) -> ApiResult<Json<Vec<Node>>> {
    let nodes = state.service.get_nodes().await.map_err(unprocessable)?;
    Ok(Json(nodes))
}

/// GET /nodes/{name}
pub async fn get_node(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Node>> {
    let node = state
        .service
        .get_node(&name)
        .await
        .map_err(error_ladder(NODE_NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY))?;
    Ok(Json(node))
}

/// POST /nodes
pub async fn add_node(State(state): State<AppState>, body: Body) -> ApiResult<Response> {
    let node: Node = decode_json(body).await?;
    node.validate().map_err(invalid)?;

    let added = state.service.add_node(node).await.map_err(unprocessable)?;
    Ok((StatusCode::CREATED, Json(added)).into_response())
}

/// PUT /nodes/{name}
pub async fn update_node(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Body,
) -> ApiResult<Json<Node>> {
    let mut node: Node = decode_json(body).await?;
    name_from_path(&mut node.name, name)?;

    let updated = state
        .service
        .update_node(node)
        .await
        .map_err(error_ladder(NODE_NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY))?;
    Ok(Json(updated))
}

/// DELETE /nodes/{name}
pub async fn delete_node(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Response> {
    state
        .service
        .delete_node(&name)
        .await
        .map_err(error_ladder(NODE_NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY))?;
    Ok(no_content())
}

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use pinpics_types::{ApiResponse, Comment, CommentRequest, FullPost, LikeStatus, PostSummary};
use serde::Deserialize;

use super::{require_user, require_user_id, ApiError, ApiResult};
use crate::db::repositories::{CommentRepository, LikeRepository, NewPostImage, PostRepository};
use crate::state::AppState;

pub const MAX_COMMENT_LEN: usize = 500;
const MAX_LIST_LIMIT: i64 = 100;

#[derive(Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    50
}

fn post_not_found() -> ApiError {
    ApiError::NotFound("Post not found.".to_string())
}

/// GET /api/post - Newest posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<PostSummary>>>> {
    let limit = query.limit.clamp(1, MAX_LIST_LIMIT);
    let posts = PostRepository::new(state.db.pool.clone()).list(limit)?;
    Ok(Json(ApiResponse::success("Posts loaded.", posts)))
}

/// GET /api/post/:id - A post with images, likes and comments
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<FullPost>>> {
    let post = PostRepository::new(state.db.pool.clone())
        .get_full(post_id)?
        .ok_or_else(post_not_found)?;
    Ok(Json(ApiResponse::success("Post loaded.", post)))
}

/// POST /api/post - Create a post from a multipart form
///
/// Fields: `name`, `description`, and one or more `images` (or `images[]`) files.
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<FullPost>>)> {
    let user_id = require_user_id(&state, &headers, "Please log in to create a post.")?;

    let mut name = String::new();
    let mut description = String::new();
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => {
                name = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid name: {}", e)))?;
            }
            "description" => {
                description = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid description: {}", e)))?;
            }
            "images" | "images[]" => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid image: {}", e)))?;
                if !bytes.is_empty() {
                    files.push((filename, bytes.to_vec()));
                }
            }
            other => tracing::debug!("Ignoring multipart field {}", other),
        }
    }

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Post name is required.".to_string()));
    }
    if files.is_empty() {
        return Err(ApiError::BadRequest("At least one image is required.".to_string()));
    }

    let stored = state
        .store
        .upload(files)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to store images: {}", e)))?;

    let images: Vec<NewPostImage> = stored
        .iter()
        .map(|object| NewPostImage {
            picpath: object.location.clone(),
            storage_key: Some(object.key.clone()),
        })
        .collect();

    let repo = PostRepository::new(state.db.pool.clone());
    let post_id = match repo.create(user_id, &name, description.trim(), &images) {
        Ok(id) => id,
        Err(e) => {
            let keys = stored.into_iter().map(|object| object.key).collect();
            delete_objects_in_background(&state, keys);
            return Err(e.into());
        }
    };

    let post = repo.get_full(post_id)?.ok_or_else(post_not_found)?;
    tracing::info!("User {} created post {}", user_id, post_id);

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Post created.", post))))
}

/// DELETE /api/post/:id - Remove a post; requires banana level above zero
pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let user = require_user(&state, &headers, "Please log in to delete posts.")?;
    if !user.can_delete_posts() {
        return Err(ApiError::Forbidden("You are not allowed to delete posts.".to_string()));
    }

    let repo = PostRepository::new(state.db.pool.clone());
    let keys = repo.storage_keys(post_id)?;
    if !repo.delete(post_id)? {
        return Err(post_not_found());
    }

    delete_objects_in_background(&state, keys);
    tracing::info!("User {} deleted post {}", user.id, post_id);

    Ok(Json(ApiResponse::ok("Post deleted.")))
}

/// POST /api/post/:id/like - Toggle the caller's like
pub async fn toggle_like(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<LikeStatus>>> {
    let user_id = require_user_id(&state, &headers, "You have to be logged in to like posts.")?;

    if !PostRepository::new(state.db.pool.clone()).exists(post_id)? {
        return Err(post_not_found());
    }

    let status = LikeRepository::new(state.db.pool.clone()).toggle(user_id, post_id)?;
    let message = if status.liked { "Post liked." } else { "Like removed." };

    Ok(Json(ApiResponse::success(message, status)))
}

/// POST /api/post/:id/comment - Add a comment
pub async fn add_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Comment>>)> {
    let user_id = require_user_id(&state, &headers, "Please log in to add a comment.")?;

    let text = payload.comment.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Comment cannot be empty.".to_string()));
    }
    if text.chars().count() > MAX_COMMENT_LEN {
        return Err(ApiError::BadRequest(format!(
            "Comment must be at most {} characters.",
            MAX_COMMENT_LEN
        )));
    }

    if !PostRepository::new(state.db.pool.clone()).exists(post_id)? {
        return Err(post_not_found());
    }

    let comment = CommentRepository::new(state.db.pool.clone()).create(post_id, user_id, text)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Comment added.", comment))))
}

/// Remove stored objects without holding up the response; failures are only logged
fn delete_objects_in_background(state: &AppState, keys: Vec<String>) {
    if keys.is_empty() {
        return;
    }
    let store = state.store.clone();
    tokio::spawn(async move {
        if let Err(e) = store.delete(&keys).await {
            tracing::warn!("Failed to delete {} stored objects: {}", keys.len(), e);
        }
    });
}

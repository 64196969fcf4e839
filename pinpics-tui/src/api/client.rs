use std::path::PathBuf;

use reqwest::{multipart, Client};
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult};
use pinpics_types::*;

/// Header the server reads the session token from
pub const SESSION_HEADER: &str = "X-Session-Token";

/// API client for communicating with the Pinpics server
///
/// Every call returns the server envelope. A non-2xx reply that still carries
/// a valid envelope is `Ok` with an error status; only transport failures and
/// bodies that are not envelopes become `Err`.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the session token for authenticated requests
    pub fn set_session_token(&mut self, token: Option<String>) {
        self.session_token = token;
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Helper to add session token to request if available
    fn add_auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.session_token {
            req.header(SESSION_HEADER, token)
        } else {
            req
        }
    }

    /// Helper to turn a reply into an envelope
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ApiResult<ApiResponse<T>> {
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> ApiResult<ApiResponse<T>> {
        let response = self.add_auth_header(req).send().await?;
        self.handle_response(response).await
    }

    // Authentication endpoints

    /// Register a new account; a successful reply logs the client in
    pub async fn registration(
        &mut self,
        name: String,
        email: String,
        password: String,
    ) -> ApiResult<ApiResponse<AuthPayload>> {
        let request = RegistrationRequest {
            email,
            name,
            password,
        };
        let req = self
            .client
            .post(self.url("/api/user/registration"))
            .json(&request);
        let response: ApiResponse<AuthPayload> = self.send(req).await?;
        self.remember_token(&response);
        Ok(response)
    }

    /// Login with account name or email
    pub async fn login(
        &mut self,
        username: String,
        password: String,
    ) -> ApiResult<ApiResponse<AuthPayload>> {
        let request = LoginRequest { username, password };
        let req = self.client.post(self.url("/api/user/login")).json(&request);
        let response: ApiResponse<AuthPayload> = self.send(req).await?;
        self.remember_token(&response);
        Ok(response)
    }

    fn remember_token(&mut self, response: &ApiResponse<AuthPayload>) {
        if let (true, Some(payload)) = (response.is_success(), &response.data) {
            self.session_token = Some(payload.token.clone());
        }
    }

    pub async fn forgot_password(&self, email: String) -> ApiResult<ApiResponse<()>> {
        let request = ForgotPasswordRequest { email };
        let req = self
            .client
            .post(self.url("/api/user/forgot-password"))
            .json(&request);
        self.send(req).await
    }

    /// Current user for the held session token
    pub async fn get_user(&self) -> ApiResult<ApiResponse<User>> {
        self.send(self.client.get(self.url("/api/user"))).await
    }

    /// Logout; the token is dropped locally whatever the server says
    pub async fn logout(&mut self) -> ApiResult<ApiResponse<()>> {
        let result = self
            .send(self.client.post(self.url("/api/user/logout")))
            .await;
        self.session_token = None;
        result
    }

    pub async fn update_settings(
        &self,
        bg_color: Option<String>,
    ) -> ApiResult<ApiResponse<User>> {
        let request = UpdateSettingsRequest { bg_color };
        let req = self
            .client
            .put(self.url("/api/user/settings"))
            .json(&request);
        self.send(req).await
    }

    // Post endpoints

    /// Toggle the viewer's like on a post
    pub async fn like_post(&self, post_id: i64) -> ApiResult<ApiResponse<LikeStatus>> {
        let req = self
            .client
            .post(self.url(&format!("/api/post/{}/like", post_id)));
        self.send(req).await
    }

    pub async fn upload_comment(
        &self,
        post_id: i64,
        comment: String,
    ) -> ApiResult<ApiResponse<Comment>> {
        let request = CommentRequest { comment };
        let req = self
            .client
            .post(self.url(&format!("/api/post/{}/comment", post_id)))
            .json(&request);
        self.send(req).await
    }

    pub async fn fetch_post(&self, post_id: i64) -> ApiResult<ApiResponse<FullPost>> {
        let req = self.client.get(self.url(&format!("/api/post/{}", post_id)));
        self.send(req).await
    }

    /// Newest posts first
    pub async fn fetch_posts(&self) -> ApiResult<ApiResponse<Vec<PostSummary>>> {
        self.send(self.client.get(self.url("/api/post"))).await
    }

    pub async fn delete_post(&self, post_id: i64) -> ApiResult<ApiResponse<()>> {
        let req = self
            .client
            .delete(self.url(&format!("/api/post/{}", post_id)));
        self.send(req).await
    }

    /// Upload a post with its images as multipart form data
    pub async fn create_post(
        &self,
        name: String,
        description: String,
        images: Vec<PathBuf>,
    ) -> ApiResult<ApiResponse<FullPost>> {
        let mut form = multipart::Form::new()
            .text("name", name)
            .text("description", description);

        for path in images {
            let bytes = tokio::fs::read(&path).await.map_err(|source| ApiError::File {
                path: path.display().to_string(),
                source,
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            form = form.part("images", multipart::Part::bytes(bytes).file_name(file_name));
        }

        let req = self.client.post(self.url("/api/post")).multipart(form);
        self.send(req).await
    }
}

/// Decode a reply body as an envelope regardless of the status code
fn decode_envelope<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    body: &str,
) -> ApiResult<ApiResponse<T>> {
    match serde_json::from_str::<ApiResponse<T>>(body) {
        Ok(envelope) => Ok(envelope),
        Err(e) if status.is_success() => Err(ApiError::Serialization(e)),
        Err(_) => {
            // Clean up HTML error pages from proxies
            let clean_error = if body.contains("<html>") || body.contains("<!DOCTYPE") {
                format!(
                    "Server returned {} error. Please check the server URL.",
                    status.as_u16()
                )
            } else {
                body.to_string()
            };
            Err(ApiError::from_status(status, clean_error))
        }
    }
}

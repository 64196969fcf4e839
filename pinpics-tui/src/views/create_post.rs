use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use pinpics_types::{ApiResponse, FullPost};
use tui_textarea::TextArea;

use super::{clear, single_line, text_of, ViewAction};
use crate::api::ApiResult;
use crate::context::Notifications;
use crate::text_wrapper::{wrap_textarea_if_needed, WrapConfig};

pub const NAME_REQUIRED_MESSAGE: &str = "Post name is required.";
pub const IMAGES_REQUIRED_MESSAGE: &str = "Add at least one image path.";
pub const CREATE_FAILED_MESSAGE: &str = "Could not create post.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateField {
    Name,
    Description,
    Images,
}

/// Validated form content ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub name: String,
    pub description: String,
    pub images: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct CreatePostForm {
    pub focus: CreateField,
    pub name: TextArea<'static>,
    pub description: TextArea<'static>,
    /// Comma separated local file paths
    pub images: TextArea<'static>,
    submitting: bool,
}

impl Default for CreatePostForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a comma separated path list, expanding a leading `~`
pub fn parse_image_paths(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(p)),
            None => PathBuf::from(p),
        })
        .collect()
}

impl CreatePostForm {
    pub fn new() -> Self {
        Self {
            focus: CreateField::Name,
            name: single_line("Name"),
            description: single_line("Description (optional)"),
            images: single_line("Image paths, comma separated"),
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn begin_submit(&mut self, notifications: &mut Notifications) -> Option<NewPost> {
        if self.submitting {
            return None;
        }

        let name = text_of(&self.name).trim().to_string();
        if name.is_empty() {
            notifications.error(NAME_REQUIRED_MESSAGE, None);
            self.focus = CreateField::Name;
            return None;
        }

        let images = parse_image_paths(&text_of(&self.images));
        if images.is_empty() {
            notifications.error(IMAGES_REQUIRED_MESSAGE, None);
            self.focus = CreateField::Images;
            return None;
        }

        self.submitting = true;
        Some(NewPost {
            name,
            description: text_of(&self.description).trim().to_string(),
            images,
        })
    }

    /// Returns the new post id on success
    pub fn finish_submit(
        &mut self,
        result: ApiResult<ApiResponse<FullPost>>,
        notifications: &mut Notifications,
    ) -> Option<i64> {
        self.submitting = false;
        match result {
            Ok(response) if response.is_success() => {
                let message = response.message.clone();
                let post = response.data?;
                let link = format!("/post/{}", post.id);
                notifications.push(response.status, message, Some(&link));
                clear(&mut self.name);
                clear(&mut self.description);
                clear(&mut self.images);
                Some(post.id)
            }
            Ok(response) => {
                notifications.push(response.status, response.message, None);
                None
            }
            Err(e) => {
                log::error!("Failed to create post: {}", e);
                notifications.error(format!("{} {}", CREATE_FAILED_MESSAGE, e), None);
                None
            }
        }
    }

    fn focused_input(&mut self) -> &mut TextArea<'static> {
        match self.focus {
            CreateField::Name => &mut self.name,
            CreateField::Description => &mut self.description,
            CreateField::Images => &mut self.images,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        match key.code {
            KeyCode::Enter => ViewAction::SubmitPost,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = match self.focus {
                    CreateField::Name => CreateField::Description,
                    CreateField::Description => CreateField::Images,
                    CreateField::Images => CreateField::Name,
                };
                ViewAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = match self.focus {
                    CreateField::Name => CreateField::Images,
                    CreateField::Description => CreateField::Name,
                    CreateField::Images => CreateField::Description,
                };
                ViewAction::None
            }
            _ => {
                let is_description = self.focus == CreateField::Description;
                let input = self.focused_input();
                input.input(key);
                if is_description {
                    wrap_textarea_if_needed(input, WrapConfig::DESCRIPTION);
                }
                ViewAction::None
            }
        }
    }
}

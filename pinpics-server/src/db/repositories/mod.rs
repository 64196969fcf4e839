mod user_repository;
mod post_repository;
mod like_repository;
mod comment_repository;
mod password_reset_repository;

pub use user_repository::{NewUser, UserRecord, UserRepository};
pub use post_repository::{NewPostImage, PostRepository};
pub use like_repository::LikeRepository;
pub use comment_repository::CommentRepository;
pub use password_reset_repository::PasswordResetRepository;

//! Domain entities - the core business objects.

mod blog;
mod media;
mod user;

pub use blog::{
    Blog, BlogChanges, BlogDraft, BlogView, Comment, CommentView, LikeToggle, parse_tags,
};
pub use media::{ImageUpload, MediaFolder, public_id_from_url};
pub use user::{NewAccount, Registration, User, UserChanges, UserSummary};

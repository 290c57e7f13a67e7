//! Domain layer: the user, memo, and feed vocabulary shared by every crate.

pub mod feed;
pub mod memo;
pub mod user;

pub use feed::{FeedKey, FeedOrder};
pub use memo::{Memo, NewMemo, Visibility, MAX_CONTENT_LENGTH};
pub use user::User;

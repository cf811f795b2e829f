mod comment_helpers;
mod news_helpers;
mod user_helpers;

pub use comment_helpers::*;
pub use news_helpers::*;
pub use user_helpers::*;

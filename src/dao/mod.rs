pub mod comments;
pub mod news;
pub mod users;

pub use comments::CommentDao;
pub use news::NewsDao;
pub use users::UserDao;

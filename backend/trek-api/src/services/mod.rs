pub mod groups;
pub mod posts;
pub mod sessions;
pub mod users;

pub use groups::GroupService;
pub use posts::{LeaveOutcome, PostService};
pub use sessions::{RedisSessionStore, SessionStore, SESSION_COOKIE};
pub use users::UserService;

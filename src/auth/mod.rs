//! User identity: password hashing, the user table, session cookies, and the
//! routes for signing up, logging in and logging out.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod sign_up;
mod sign_up_page;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, log_in, post_log_in_page};
pub use log_out::{get_log_out, log_out};
pub use middleware::{auth_guard, auth_guard_page, require_same_user};
pub use password::PasswordHash;
pub use sign_up::sign_up;
pub use sign_up_page::{get_sign_up_page, post_sign_up_page};
pub use user::{User, UserID, create_user, create_user_table, get_user_by_id, get_user_by_username};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
#[cfg(test)]
pub use log_in::LogInResponse;

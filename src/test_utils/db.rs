use rusqlite::Connection;

use crate::{PasswordHash, UserID, auth::create_user, db::initialize};

pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

#[track_caller]
pub(crate) fn insert_test_user(username: &str, connection: &Connection) -> UserID {
    create_user(username, PasswordHash::new_unchecked("hunter2"), connection)
        .expect("Could not create test user.")
        .id
}

#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod html;
pub(crate) mod provider;
pub(crate) mod server;

pub(crate) use db::{get_test_connection, insert_test_user};
pub(crate) use html::{assert_valid_html, parse_html_text};
pub(crate) use provider::StubProvider;
pub(crate) use server::{
    create_test_account, create_test_budget, get_test_server, get_test_server_with_state,
    get_test_state, sign_up, sign_up_and_log_in,
};

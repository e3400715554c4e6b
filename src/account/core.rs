use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{Error, Money, UserID, database_id::AccountId};

/// A bank account or credit card and its running balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The id for the account.
    pub account_id: AccountId,
    /// The user that owns the account.
    #[serde(skip_serializing)]
    pub user_id: UserID,
    /// The kind of account, e.g. "Checking" or "Savings".
    pub account_type: String,
    /// The opening balance plus the sum of the account's transactions.
    pub balance: Money,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            account_id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            account_type TEXT NOT NULL,
            balance INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(user_id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let account_id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let account_type = row.get(2)?;
    let balance = row.get(3)?;

    Ok(Account {
        account_id,
        user_id,
        account_type,
        balance,
    })
}

/// Create an account for `user_id` with an opening `balance`.
///
/// # Errors
/// Returns:
/// - [Error::EmptyAccountType] if `account_type` is blank,
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - [Error::SqlError] if some other SQL error occurred.
pub fn create_account(
    user_id: UserID,
    account_type: &str,
    balance: Money,
    connection: &Connection,
) -> Result<Account, Error> {
    let account_type = account_type.trim();

    if account_type.is_empty() {
        return Err(Error::EmptyAccountType);
    }

    connection
        .execute(
            "INSERT INTO account (user_id, account_type, balance) VALUES (?1, ?2, ?3)",
            (user_id.as_i64(), account_type, balance),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(Account {
        account_id: connection.last_insert_rowid(),
        user_id,
        account_type: account_type.to_owned(),
        balance,
    })
}

/// Get the account with `account_id` if it belongs to `owner`.
///
/// # Errors
/// Returns an [Error::NotFound] if the account does not exist or belongs to another user.
pub fn get_account(
    account_id: AccountId,
    owner: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .prepare(
            "SELECT account_id, user_id, account_type, balance FROM account
            WHERE account_id = :account_id AND user_id = :user_id",
        )?
        .query_row(
            &[(":account_id", &account_id), (":user_id", &owner.as_i64())],
            map_row_to_account,
        )
        .map_err(|error| error.into())
}

/// Get every account owned by `user_id`, oldest first. The list may be empty.
///
/// # Errors
/// Returns an [Error::SqlError] if the query failed.
pub fn list_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT account_id, user_id, account_type, balance FROM account
            WHERE user_id = :user_id ORDER BY account_id",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Get the accounts `user_id` can set budgets for.
///
/// # Errors
/// Returns an [Error::NotFound] if the user has no accounts.
pub fn list_budget_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    let accounts = list_accounts(user_id, connection)?;

    if accounts.is_empty() {
        return Err(Error::NotFound);
    }

    Ok(accounts)
}

/// Get the total balance across all of `user_id`'s accounts.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query failed.
pub fn get_total_account_balance(user_id: UserID, connection: &Connection) -> Result<Money, Error> {
    let mut stmt =
        connection.prepare("SELECT COALESCE(SUM(balance), 0) FROM account WHERE user_id = ?1")?;

    let total: Money = stmt.query_row([user_id.as_i64()], |row| row.get(0))?;

    Ok(total)
}


#[cfg(test)]
mod account_tests {
    use crate::{
        Error, Money, UserID,
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{
        create_account, get_account, get_total_account_balance, list_accounts,
        list_budget_accounts,
    };

    #[test]
    fn create_account_succeeds() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);

        let account = create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();

        assert!(account.account_id > 0);
        assert_eq!(account.user_id, user_id);
        assert_eq!(account.account_type, "Checking");
        assert_eq!(account.balance, Money::from_cents(10000));
        assert_eq!(get_account(account.account_id, user_id, &conn), Ok(account));
    }

    #[test]
    fn create_account_fails_for_unknown_user() {
        let conn = get_test_connection();

        let result = create_account(UserID::new(42), "Checking", Money::from_cents(10000), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn create_account_fails_with_blank_type() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);

        let result = create_account(user_id, "  ", Money::from_cents(10000), &conn);

        assert_eq!(result, Err(Error::EmptyAccountType));
    }

    #[test]
    fn get_account_hides_other_users_accounts() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let account = create_account(alice, "Checking", Money::from_cents(10000), &conn).unwrap();

        assert_eq!(get_account(account.account_id, bob, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_accounts_only_returns_own_accounts() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let checking = create_account(alice, "Checking", Money::from_cents(10000), &conn).unwrap();
        let savings = create_account(alice, "Savings", Money::from_cents(250000), &conn).unwrap();
        create_account(bob, "Checking", Money::from_cents(500), &conn).unwrap();

        let accounts = list_accounts(alice, &conn).unwrap();

        assert_eq!(accounts, vec![checking, savings]);
    }

    #[test]
    fn list_accounts_may_be_empty() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);

        assert_eq!(list_accounts(user_id, &conn), Ok(vec![]));
    }

    #[test]
    fn list_budget_accounts_fails_without_accounts() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);

        assert_eq!(list_budget_accounts(user_id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn total_balance_sums_own_accounts() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        create_account(alice, "Checking", Money::from_cents(10050), &conn).unwrap();
        create_account(alice, "Credit card", Money::from_cents(-5025), &conn).unwrap();
        create_account(bob, "Checking", Money::from_cents(100000), &conn).unwrap();

        assert_eq!(get_total_account_balance(alice, &conn), Ok(Money::from_cents(5025)));
    }

    #[test]
    fn total_balance_is_zero_without_accounts() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);

        assert_eq!(get_total_account_balance(user_id, &conn), Ok(Money::ZERO));
    }
}

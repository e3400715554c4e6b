//! Defines the core data models and database queries for transactions.
//!
//! Every write that adds or removes a transaction also moves the owning account's
//! balance by the transaction's amount, inside one SQL transaction.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, Money, UserID,
    account::get_account,
    database_id::{AccountId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub transaction_id: TransactionId,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The amount of money spent (negative) or earned (positive).
    pub amount: Money,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

/// The data needed to record a transaction against an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The amount of money spent (negative) or earned (positive).
    pub amount: Money,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// A text description of what the transaction was for, empty if omitted.
    #[serde(default)]
    pub description: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                transaction_id INTEGER PRIMARY KEY,
                account_id INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                transaction_date TEXT NOT NULL,
                description TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES account(account_id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // For listing a user's transactions by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account_date
            ON \"transaction\"(account_id, transaction_date)",
        (),
    )?;

    Ok(())
}

pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        transaction_id: row.get(0)?,
        account_id: row.get(1)?,
        amount: row.get(2)?,
        transaction_date: row.get(3)?,
        description: row.get(4)?,
    })
}

/// Record `new_transaction` and add its amount to the account's balance.
///
/// Both writes are committed together, or neither is.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if the account does not exist or is not owned by `owner`,
/// - [Error::SqlError] if some other SQL error occurred, in which case nothing is written.
pub fn add_transaction(
    new_transaction: NewTransaction,
    owner: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tx = connection.unchecked_transaction()?;

    get_account(new_transaction.account_id, owner, &tx)?;

    let transaction = tx
        .prepare(
            "INSERT INTO \"transaction\" (account_id, amount, transaction_date, description)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING transaction_id, account_id, amount, transaction_date, description",
        )?
        .query_row(
            (
                new_transaction.account_id,
                new_transaction.amount,
                new_transaction.transaction_date,
                new_transaction.description.trim(),
            ),
            map_transaction_row,
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

    let rows_affected = tx.execute(
        "UPDATE account SET balance = balance + ?1 WHERE account_id = ?2",
        (transaction.amount, transaction.account_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    tx.commit()?;

    Ok(transaction)
}

/// Delete the transaction with `transaction_id` and subtract its amount from the account's balance.
///
/// Both writes are committed together, or neither is.
///
/// # Errors
/// Returns an [Error::DeleteMissingTransaction] if the transaction does not exist
/// or belongs to an account `owner` does not own. Balances are left unchanged.
pub fn delete_transaction(
    transaction_id: TransactionId,
    owner: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tx = connection.unchecked_transaction()?;

    let transaction = tx
        .prepare(
            "SELECT t.transaction_id, t.account_id, t.amount, t.transaction_date, t.description
             FROM \"transaction\" t
             INNER JOIN account a ON a.account_id = t.account_id
             WHERE t.transaction_id = :transaction_id AND a.user_id = :user_id",
        )?
        .query_row(
            &[
                (":transaction_id", &transaction_id),
                (":user_id", &owner.as_i64()),
            ],
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::DeleteMissingTransaction,
            error => error.into(),
        })?;

    tx.execute(
        "DELETE FROM \"transaction\" WHERE transaction_id = ?1",
        [transaction.transaction_id],
    )?;
    tx.execute(
        "UPDATE account SET balance = balance - ?1 WHERE account_id = ?2",
        (transaction.amount, transaction.account_id),
    )?;

    tx.commit()?;

    Ok(transaction)
}

/// Get every transaction on `user_id`'s accounts, ordered by date and then by ID.
///
/// # Errors
/// Returns an [Error::NoAccounts] if the user has no accounts.
pub fn list_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    let account_count: i64 = connection.query_row(
        "SELECT COUNT(account_id) FROM account WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    if account_count == 0 {
        return Err(Error::NoAccounts);
    }

    connection
        .prepare(
            "SELECT t.transaction_id, t.account_id, t.amount, t.transaction_date, t.description
             FROM \"transaction\" t
             INNER JOIN account a ON a.account_id = t.account_id
             WHERE a.user_id = :user_id
             ORDER BY t.transaction_date, t.transaction_id",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod transaction_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, Money, UserID,
        account::{create_account, get_account},
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{NewTransaction, add_transaction, delete_transaction, list_transactions};

    fn new_transaction(account_id: i64, cents: i64) -> NewTransaction {
        NewTransaction {
            account_id,
            amount: Money::from_cents(cents),
            transaction_date: date!(2024 - 03 - 01),
            description: "Groceries".to_owned(),
        }
    }

    fn balance(account_id: i64, owner: UserID, conn: &Connection) -> Money {
        get_account(account_id, owner, conn).unwrap().balance
    }

    #[test]
    fn add_and_delete_keep_balance_in_sync() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let account =
            create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();

        let first = add_transaction(new_transaction(account.account_id, -4000), user_id, &conn)
            .unwrap();
        assert_eq!(
            balance(account.account_id, user_id, &conn),
            Money::from_cents(6000)
        );

        add_transaction(new_transaction(account.account_id, 1550), user_id, &conn).unwrap();
        assert_eq!(
            balance(account.account_id, user_id, &conn),
            Money::from_cents(7550)
        );

        delete_transaction(first.transaction_id, user_id, &conn).unwrap();
        assert_eq!(
            balance(account.account_id, user_id, &conn),
            Money::from_cents(11550)
        );
    }

    #[test]
    fn balance_equals_opening_balance_plus_existing_transactions() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let opening_balance = Money::from_cents(25000);
        let account = create_account(user_id, "Checking", opening_balance, &conn).unwrap();
        let amounts: Vec<Money> = serde_json::from_value(serde_json::json!([
            0.1, 0.2, 0.7, 12.5, -3.25, 0.1, 100.0, -0.75, 0.2, 42.0, -60.5, 0.7, -0.3, 19.99
        ]))
        .unwrap();

        let mut transaction_ids = Vec::new();
        for amount in amounts {
            let transaction = add_transaction(
                NewTransaction {
                    amount,
                    ..new_transaction(account.account_id, 0)
                },
                user_id,
                &conn,
            )
            .unwrap();
            transaction_ids.push(transaction.transaction_id);
        }
        // Delete every third transaction.
        for transaction_id in transaction_ids.iter().step_by(3) {
            delete_transaction(*transaction_id, user_id, &conn).unwrap();
        }

        let remaining: Money = list_transactions(user_id, &conn)
            .unwrap()
            .iter()
            .map(|transaction| transaction.amount)
            .sum();
        // 0.2 + 0.7 - 3.25 + 0.1 - 0.75 + 0.2 - 60.5 + 0.7 + 19.99
        assert_eq!(remaining, Money::from_cents(-4261));
        assert_eq!(
            balance(account.account_id, user_id, &conn),
            opening_balance + remaining
        );
    }

    #[test]
    fn add_transaction_returns_stored_row() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let account = create_account(user_id, "Checking", Money::ZERO, &conn).unwrap();
        let new = new_transaction(account.account_id, -1230);

        let transaction = add_transaction(new.clone(), user_id, &conn).unwrap();

        assert!(transaction.transaction_id > 0);
        assert_eq!(transaction.account_id, new.account_id);
        assert_eq!(transaction.amount, new.amount);
        assert_eq!(transaction.transaction_date, new.transaction_date);
        assert_eq!(transaction.description, new.description);
    }

    #[test]
    fn add_transaction_fails_for_missing_account() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);

        let result = add_transaction(new_transaction(999, 1000), user_id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn add_transaction_fails_for_other_users_account() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let account =
            create_account(alice, "Checking", Money::from_cents(10000), &conn).unwrap();

        let result = add_transaction(new_transaction(account.account_id, -1000), bob, &conn);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(
            balance(account.account_id, alice, &conn),
            Money::from_cents(10000)
        );
    }

    #[test]
    fn delete_missing_transaction_leaves_balances_unchanged() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let account =
            create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();
        add_transaction(new_transaction(account.account_id, -4000), user_id, &conn).unwrap();

        let result = delete_transaction(12345, user_id, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(
            balance(account.account_id, user_id, &conn),
            Money::from_cents(6000)
        );
    }

    #[test]
    fn delete_other_users_transaction_fails() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let account =
            create_account(alice, "Checking", Money::from_cents(10000), &conn).unwrap();
        let transaction =
            add_transaction(new_transaction(account.account_id, -4000), alice, &conn).unwrap();

        let result = delete_transaction(transaction.transaction_id, bob, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(
            balance(account.account_id, alice, &conn),
            Money::from_cents(6000)
        );
    }

    #[test]
    fn list_transactions_fails_without_accounts() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);

        assert_eq!(list_transactions(user_id, &conn), Err(Error::NoAccounts));
    }

    #[test]
    fn list_transactions_is_empty_with_accounts_but_no_transactions() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();

        assert_eq!(list_transactions(user_id, &conn), Ok(vec![]));
    }

    #[test]
    fn list_transactions_orders_by_date_then_id() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let checking = create_account(alice, "Checking", Money::ZERO, &conn).unwrap();
        let savings = create_account(alice, "Savings", Money::ZERO, &conn).unwrap();
        let bobs_account = create_account(bob, "Checking", Money::ZERO, &conn).unwrap();

        let insert = |account_id: i64, owner: UserID, day: time::Date| {
            add_transaction(
                NewTransaction {
                    account_id,
                    amount: Money::from_cents(100),
                    transaction_date: day,
                    description: String::new(),
                },
                owner,
                &conn,
            )
            .unwrap()
        };
        let late = insert(checking.account_id, alice, date!(2024 - 05 - 01));
        let early = insert(savings.account_id, alice, date!(2024 - 01 - 01));
        let same_day_first = insert(checking.account_id, alice, date!(2024 - 03 - 01));
        let same_day_second = insert(savings.account_id, alice, date!(2024 - 03 - 01));
        insert(bobs_account.account_id, bob, date!(2024 - 02 - 01));

        let transactions = list_transactions(alice, &conn).unwrap();

        assert_eq!(
            transactions,
            vec![early, same_day_first, same_day_second, late]
        );
    }
}

//! Defines the budget model and its database queries.
//!
//! A budget is a declared spending limit for an account over a date range. It
//! is not checked against the account's transactions, and budgets may overlap.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, Money, UserID,
    account::get_account,
    database_id::{AccountId, BudgetId, CategoryId},
};

/// A spending limit for one of a user's accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub budget_id: BudgetId,
    /// The user that set the budget.
    pub user_id: UserID,
    /// The account the budget is set against.
    pub account_id: AccountId,
    /// The spending category the limit applies to.
    pub category_id: CategoryId,
    /// The limit in dollars.
    pub amount: Money,
    /// The first day the budget applies to.
    pub start_date: Date,
    /// The last day the budget applies to, inclusive.
    pub end_date: Date,
}

/// The data needed to create a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    /// The user setting the budget. Must own `account_id`.
    pub user_id: UserID,
    /// The account to set the budget against.
    pub account_id: AccountId,
    /// The spending category the limit applies to.
    pub category_id: CategoryId,
    /// The limit in dollars.
    pub amount: Money,
    /// The first day the budget applies to.
    pub start_date: Date,
    /// The last day the budget applies to, inclusive.
    pub end_date: Date,
}

/// The fields of a budget that can be changed after it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetUpdate {
    /// The new limit in dollars.
    pub amount: Money,
    /// The new first day.
    pub start_date: Date,
    /// The new last day, inclusive.
    pub end_date: Date,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                budget_id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(user_id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(account_id) REFERENCES account(account_id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        budget_id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        account_id: row.get(2)?,
        category_id: row.get(3)?,
        amount: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
    })
}

fn check_date_range(start_date: Date, end_date: Date) -> Result<(), Error> {
    if end_date < start_date {
        Err(Error::InvalidDateRange)
    } else {
        Ok(())
    }
}

/// Create a budget for one of the user's accounts.
///
/// # Errors
/// Returns:
/// - [Error::InvalidDateRange] if the end date is before the start date,
/// - [Error::NotFound] if the account does not exist or belongs to another user,
/// - [Error::SqlError] if some other SQL error occurred.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    check_date_range(new_budget.start_date, new_budget.end_date)?;
    get_account(new_budget.account_id, new_budget.user_id, connection)?;

    connection
        .prepare(
            "INSERT INTO budget (user_id, account_id, category_id, amount, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING budget_id, user_id, account_id, category_id, amount, start_date, end_date",
        )?
        .query_row(
            (
                new_budget.user_id.as_i64(),
                new_budget.account_id,
                new_budget.category_id,
                new_budget.amount,
                new_budget.start_date,
                new_budget.end_date,
            ),
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Get every budget `user_id` has set, ordered by ID.
///
/// # Errors
/// Returns an [Error::SqlError] if the query failed.
pub fn list_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT budget_id, user_id, account_id, category_id, amount, start_date, end_date
             FROM budget WHERE user_id = :user_id ORDER BY budget_id",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Get the budget with `budget_id` if it belongs to `owner`.
///
/// # Errors
/// Returns an [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn get_budget(
    budget_id: BudgetId,
    owner: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT budget_id, user_id, account_id, category_id, amount, start_date, end_date
             FROM budget WHERE budget_id = :budget_id AND user_id = :user_id",
        )?
        .query_row(
            &[(":budget_id", &budget_id), (":user_id", &owner.as_i64())],
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Change the amount and date range of the budget with `budget_id`.
///
/// # Errors
/// Returns:
/// - [Error::InvalidDateRange] if the end date is before the start date,
/// - [Error::UpdateMissingBudget] if no budget with `budget_id` belongs to `owner`,
/// - [Error::SqlError] if some other SQL error occurred.
pub fn update_budget(
    budget_id: BudgetId,
    owner: UserID,
    update: BudgetUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    check_date_range(update.start_date, update.end_date)?;

    let rows_affected = connection.execute(
        "UPDATE budget SET amount = ?1, start_date = ?2, end_date = ?3
         WHERE budget_id = ?4 AND user_id = ?5",
        (
            update.amount,
            update.start_date,
            update.end_date,
            budget_id,
            owner.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete the budget with `budget_id`.
///
/// # Errors
/// Returns an [Error::DeleteMissingBudget] if no budget with `budget_id` belongs to `owner`.
pub fn delete_budget(budget_id: BudgetId, owner: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE budget_id = ?1 AND user_id = ?2",
        (budget_id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

#[cfg(test)]
mod budget_tests {
    use time::macros::date;

    use crate::{
        Error, Money, UserID,
        account::create_account,
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{
        BudgetUpdate, NewBudget, create_budget, delete_budget, get_budget, list_budgets,
        update_budget,
    };

    fn new_budget(user_id: UserID, account_id: i64) -> NewBudget {
        NewBudget {
            user_id,
            account_id,
            category_id: 3,
            amount: Money::from_cents(40000),
            start_date: date!(2024 - 01 - 01),
            end_date: date!(2024 - 01 - 31),
        }
    }

    #[test]
    fn create_and_list_budget() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let account = create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();

        let budget = create_budget(new_budget(user_id, account.account_id), &conn).unwrap();

        assert!(budget.budget_id > 0);
        assert_eq!(budget.amount, Money::from_cents(40000));
        assert_eq!(list_budgets(user_id, &conn), Ok(vec![budget]));
    }

    #[test]
    fn overlapping_budgets_are_allowed() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let account = create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();

        create_budget(new_budget(user_id, account.account_id), &conn).unwrap();
        create_budget(new_budget(user_id, account.account_id), &conn).unwrap();

        assert_eq!(list_budgets(user_id, &conn).unwrap().len(), 2);
    }

    #[test]
    fn create_budget_fails_for_other_users_account() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let account = create_account(alice, "Checking", Money::from_cents(10000), &conn).unwrap();

        let result = create_budget(new_budget(bob, account.account_id), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn create_budget_fails_with_end_before_start() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let account = create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();
        let mut budget = new_budget(user_id, account.account_id);
        budget.end_date = date!(2023 - 12 - 31);

        assert_eq!(create_budget(budget, &conn), Err(Error::InvalidDateRange));
    }

    #[test]
    fn update_budget_changes_amount_and_dates() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let account = create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();
        let budget = create_budget(new_budget(user_id, account.account_id), &conn).unwrap();
        let update = BudgetUpdate {
            amount: Money::from_cents(55000),
            start_date: date!(2024 - 02 - 01),
            end_date: date!(2024 - 02 - 29),
        };

        update_budget(budget.budget_id, user_id, update.clone(), &conn).unwrap();

        let updated = list_budgets(user_id, &conn).unwrap().remove(0);
        assert_eq!(updated.amount, update.amount);
        assert_eq!(updated.start_date, update.start_date);
        assert_eq!(updated.end_date, update.end_date);
        assert_eq!(updated.category_id, budget.category_id);
    }

    #[test]
    fn get_budget_hides_other_users_budgets() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let account =
            create_account(alice, "Checking", Money::from_cents(10000), &conn).unwrap();
        let budget = create_budget(new_budget(alice, account.account_id), &conn).unwrap();

        assert_eq!(get_budget(budget.budget_id, alice, &conn), Ok(budget.clone()));
        assert_eq!(get_budget(budget.budget_id, bob, &conn), Err(Error::NotFound));
    }

    #[test]
    fn update_missing_budget_fails() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let update = BudgetUpdate {
            amount: Money::from_cents(55000),
            start_date: date!(2024 - 02 - 01),
            end_date: date!(2024 - 02 - 29),
        };

        assert_eq!(
            update_budget(42, user_id, update, &conn),
            Err(Error::UpdateMissingBudget)
        );
    }

    #[test]
    fn update_other_users_budget_fails() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let account = create_account(alice, "Checking", Money::from_cents(10000), &conn).unwrap();
        let budget = create_budget(new_budget(alice, account.account_id), &conn).unwrap();
        let update = BudgetUpdate {
            amount: Money::from_cents(100),
            start_date: budget.start_date,
            end_date: budget.end_date,
        };

        assert_eq!(
            update_budget(budget.budget_id, bob, update, &conn),
            Err(Error::UpdateMissingBudget)
        );
        assert_eq!(list_budgets(alice, &conn), Ok(vec![budget]));
    }

    #[test]
    fn delete_budget_removes_it() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let account = create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();
        let budget = create_budget(new_budget(user_id, account.account_id), &conn).unwrap();

        delete_budget(budget.budget_id, user_id, &conn).unwrap();

        assert_eq!(list_budgets(user_id, &conn), Ok(vec![]));
    }

    #[test]
    fn delete_missing_budget_fails() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);

        assert_eq!(
            delete_budget(42, user_id, &conn),
            Err(Error::DeleteMissingBudget)
        );
    }

    #[test]
    fn deleting_account_deletes_its_budgets() {
        let conn = get_test_connection();
        let user_id = insert_test_user("alice", &conn);
        let account = create_account(user_id, "Checking", Money::from_cents(10000), &conn).unwrap();
        create_budget(new_budget(user_id, account.account_id), &conn).unwrap();

        conn.execute("DELETE FROM account WHERE account_id = ?1", [account.account_id])
            .unwrap();

        assert_eq!(list_budgets(user_id, &conn), Ok(vec![]));
    }
}

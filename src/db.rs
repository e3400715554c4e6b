//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, auth::create_user_table,
    budget::create_budget_table, plaid::create_plaid_integration_table,
    transaction::create_transaction_table,
};

/// Enable foreign keys and create every table the application needs.
///
/// The tables are created in a single exclusive transaction, so either all of them
/// exist afterwards or none of the missing ones do.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // This pragma is a no-op inside a transaction.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_account_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_plaid_integration_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

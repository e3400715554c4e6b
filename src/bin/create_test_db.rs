use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use tally_rs::{
    Money, NewBudget, NewTransaction, PasswordHash, add_transaction, create_account,
    create_budget, create_user, initialize_db,
};

/// A utility for creating a test database for the Tally server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user \"demo\" with the password \"test\"...");
    let password_hash = PasswordHash::from_raw_password("test", PasswordHash::DEFAULT_COST)?;
    let user = create_user("demo", password_hash, &conn)?;

    println!("Creating accounts...");
    let checking = create_account(user.id, "Checking", Money::from_cents(120_000), &conn)?;
    create_account(user.id, "Savings", Money::from_cents(500_000), &conn)?;

    println!("Creating transactions...");
    for (cents, transaction_date, description) in [
        (-5420, date!(2024 - 03 - 01), "Groceries"),
        (240_000, date!(2024 - 03 - 15), "Salary"),
        (-110_000, date!(2024 - 03 - 20), "Rent"),
    ] {
        add_transaction(
            NewTransaction {
                account_id: checking.account_id,
                amount: Money::from_cents(cents),
                transaction_date,
                description: description.to_owned(),
            },
            user.id,
            &conn,
        )?;
    }

    println!("Creating budget...");
    create_budget(
        NewBudget {
            user_id: user.id,
            account_id: checking.account_id,
            category_id: 1,
            amount: Money::from_cents(40_000),
            start_date: date!(2024 - 03 - 01),
            end_date: date!(2024 - 03 - 31),
        },
        &conn,
    )?;

    println!("Success!");

    Ok(())
}

use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Month};

use ledgerline::{
    SQLiteLedgerStore, Transaction, TransactionType, create_transaction, create_user,
    get_categories, initialize_db, seed_default_categories,
};

/// A utility for creating a test database for the JSON API server of ledgerline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (category name, amount, day of month, description) for each month of sample data.
const MONTHLY_TRANSACTIONS: [(&str, &str, u8, &str); 8] = [
    ("Salary", "4250.00", 1, "Monthly pay"),
    ("Housing", "1650.00", 2, "Rent"),
    ("Utilities", "142.37", 5, "Power and internet"),
    ("Food & Dining", "96.40", 8, "Groceries"),
    ("Transportation", "60.00", 12, "Bus pass"),
    ("Food & Dining", "38.50", 17, "Dinner out"),
    ("Entertainment", "15.99", 20, "Streaming"),
    ("Investments", "120.00", 28, "Dividends"),
];

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

    println!("Creating test user...");
    let user = create_user("Test User", &conn)?;

    let conn = Arc::new(Mutex::new(conn));

    println!("Creating default categories...");
    seed_default_categories(&SQLiteLedgerStore::new(conn.clone()), user.id)?;

    println!("Creating transactions...");
    let conn = conn.lock().map_err(|error| error.to_string())?;
    let categories = get_categories(user.id, None, &conn)?;

    for month in [Month::January, Month::February, Month::March] {
        for (category_name, amount, day, description) in MONTHLY_TRANSACTIONS {
            let Some(category) = categories
                .iter()
                .find(|category| category.name.as_ref() == category_name)
            else {
                eprintln!("Missing default category {category_name}");
                exit(1);
            };

            create_transaction(
                Transaction::build(
                    amount.parse()?,
                    Date::from_calendar_date(2024, month, day)?,
                    category.transaction_type,
                )
                .description(description)
                .category_id(Some(category.id)),
                user.id,
                &conn,
            )?;
        }
    }

    // One uncategorised expense so reports show the difference between the summary and the
    // category totals.
    create_transaction(
        Transaction::build(
            "25.00".parse()?,
            Date::from_calendar_date(2024, Month::March, 30)?,
            TransactionType::Expense,
        )
        .description("Cash"),
        user.id,
        &conn,
    )?;

    println!("Success! Created user {} with ID {}", user.name, user.id);

    Ok(())
}

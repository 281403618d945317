use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use household_ledger::{
    NewCategory, Payment, Transaction, create_category, create_payment, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a test database for the household ledger server.
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

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test users...");
    let alice = create_user(None, "alice@example.com", &conn)?;
    let bob = create_user(None, "bob@example.com", &conn)?;

    println!("Creating categories...");
    let mut categories = Vec::new();
    for (name, icon, color) in [
        ("Groceries", "🛒", "#bbf7d0"),
        ("Eating Out", "🍕", "#fed7aa"),
        ("Transport", "🚌", "#bfdbfe"),
        ("Utilities", "💡", "#fef08a"),
    ] {
        categories.push(create_category(
            NewCategory {
                id: None,
                name: name.to_owned(),
                icon: icon.to_owned(),
                color: color.to_owned(),
            },
            &conn,
        )?);
    }

    println!("Creating transactions...");
    let now = OffsetDateTime::now_utc();
    let users = [&alice, &bob];
    for day in 0..30_i64 {
        let user = users[day as usize % users.len()];
        let category = &categories[day as usize % categories.len()];
        let amount = 5.0 + (day * 7 % 40) as f64 + 0.25;

        create_transaction(
            Transaction::build(
                &format!("{} #{}", category.name, day + 1),
                amount,
                now - Duration::days(day),
                &user.id,
                &category.id,
            )
            .panini(day % 3 == 0),
            &conn,
        )?;
    }

    println!("Creating payments...");
    create_payment(
        Payment::build("Rent share", 450.0, &alice.id, &bob.id),
        &conn,
    )?;
    create_payment(
        Payment::build("Power bill", 82.40, &bob.id, &alice.id).notes(Some("March".to_owned())),
        &conn,
    )?;
    create_payment(
        Payment::build("Shared groceries kitty", 100.0, &alice.id, &alice.id).panini(true),
        &conn,
    )?;
    create_payment(
        Payment::build("Shared groceries kitty", 100.0, &bob.id, &bob.id).panini(true),
        &conn,
    )?;

    println!("Success!");

    Ok(())
}

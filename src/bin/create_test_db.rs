use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime};

use cashflow_rs::{EntityName, NewRecord, TaxonomyKind, create_entry, create_record, initialize_db};

/// A utility for creating a test database for the cashflow_rs server.
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
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.exists() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating statuses, types, categories and subcategories...");

    let create = |kind, name: &str, parent| -> Result<i64, cashflow_rs::Error> {
        Ok(create_entry(kind, EntityName::new(name)?, parent, &conn)?.id)
    };

    let business = create(TaxonomyKind::Status, "Business", None)?;
    let personal = create(TaxonomyKind::Status, "Personal", None)?;
    create(TaxonomyKind::Status, "Tax", None)?;

    let income = create(TaxonomyKind::Type, "Income", None)?;
    let expense = create(TaxonomyKind::Type, "Expense", None)?;

    let salary = create(TaxonomyKind::Category, "Salary", Some(income))?;
    let monthly_pay = create(TaxonomyKind::SubCategory, "Monthly pay", Some(salary))?;
    let bonus = create(TaxonomyKind::SubCategory, "Bonus", Some(salary))?;

    let food = create(TaxonomyKind::Category, "Food", Some(expense))?;
    let groceries = create(TaxonomyKind::SubCategory, "Groceries", Some(food))?;
    let restaurants = create(TaxonomyKind::SubCategory, "Restaurants", Some(food))?;

    let infrastructure = create(TaxonomyKind::Category, "Infrastructure", Some(expense))?;
    let hosting = create(TaxonomyKind::SubCategory, "Hosting", Some(infrastructure))?;

    println!("Creating records...");

    let today = OffsetDateTime::now_utc().date();
    let days_ago = |days: i64| -> Date { today - Duration::days(days) };

    let records = [
        (days_ago(60), None, Some(personal), income, salary, monthly_pay, "4200.00", None),
        (days_ago(45), None, Some(personal), expense, food, groceries, "152.37", None),
        (
            days_ago(40),
            Some(days_ago(42)),
            Some(business),
            expense,
            food,
            restaurants,
            "86.50",
            Some("Client lunch"),
        ),
        (days_ago(30), None, Some(personal), income, salary, monthly_pay, "4200.00", None),
        (days_ago(20), None, Some(business), income, salary, bonus, "1000.00", Some("Q3 bonus")),
        (days_ago(10), None, None, expense, infrastructure, hosting, "24.99", None),
        (days_ago(2), None, Some(personal), expense, food, groceries, "98.10", None),
    ];

    for (created_at, custom_date, status_id, type_id, category_id, subcategory_id, amount, comment) in
        records
    {
        create_record(
            &NewRecord {
                custom_date,
                status_id,
                type_id,
                category_id,
                subcategory_id,
                amount: amount.parse::<Decimal>()?,
                comment: comment.map(str::to_owned),
            },
            created_at,
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}

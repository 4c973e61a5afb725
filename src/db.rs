//! Creates the application's database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, record::create_record_table, taxonomy::create_taxonomy_tables};

/// Enable foreign keys and create any tables that do not exist yet.
///
/// Safe to call on a database that has already been initialized.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_taxonomy_tables(&transaction)?;
    create_record_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

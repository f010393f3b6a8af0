use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement,
};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());

    // An in-memory SQLite database exists per connection; keep the pool at
    // one connection so every handle sees the same database.
    if database_url.contains(":memory:") {
        options.max_connections(1);
    }

    let db = Database::connect(options).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create titles table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS titles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            author TEXT,
            isbn TEXT,
            total_stock INTEGER NOT NULL DEFAULT 0,
            available_stock INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create patrons table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS patrons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create loans table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS loans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patron_id INTEGER NOT NULL,
            title_id INTEGER NOT NULL,
            borrow_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            return_date TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (patron_id) REFERENCES patrons(id) ON DELETE CASCADE,
            FOREIGN KEY (title_id) REFERENCES titles(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_loans_patron_id ON loans(patron_id);
        CREATE INDEX IF NOT EXISTS idx_loans_title_id ON loans(title_id);
        CREATE INDEX IF NOT EXISTS idx_loans_status ON loans(status);
        CREATE INDEX IF NOT EXISTS idx_loans_patron_title ON loans(patron_id, title_id);
        -- At most one open loan per (patron, title) pair, enforced by the
        -- engine so concurrent borrows cannot slip past the duplicate check
        CREATE UNIQUE INDEX IF NOT EXISTS idx_loans_open_pair
            ON loans(patron_id, title_id) WHERE status != 'returned';
        "#
        .to_owned(),
    ))
    .await?;

    Ok(())
}

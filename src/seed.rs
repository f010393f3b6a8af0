use sea_orm::*;

use crate::models::{patron, title};

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Create Titles
    let titles = vec![
        ("The Hobbit", "J.R.R. Tolkien", "9780261103344", 3),
        ("Foundation", "Isaac Asimov", "9780553293357", 2),
        ("Dune", "Frank Herbert", "9780441172719", 1),
    ];

    for (name, author, isbn, stock) in titles {
        let t = title::ActiveModel {
            name: Set(name.to_owned()),
            author: Set(Some(author.to_owned())),
            isbn: Set(Some(isbn.to_owned())),
            total_stock: Set(stock),
            available_stock: Set(stock),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        t.insert(db).await?;
    }

    // 2. Create Patrons
    let patrons = vec![
        ("Alice Martin", "alice@example.org"),
        ("Bruno Keller", "bruno@example.org"),
    ];

    for (name, email) in patrons {
        let p = patron::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(Some(email.to_owned())),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        p.insert(db).await?;
    }

    Ok(())
}

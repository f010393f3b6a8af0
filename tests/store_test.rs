//! Store-level tests for the conditional atomic updates

use lenddesk::db;
use lenddesk::domain::{
    CatalogStore, CreateTitleInput, LendingError, LoanFilter, LoanStore, NewLoan,
};
use lenddesk::infrastructure::{SeaOrmCatalogStore, SeaOrmLoanStore, SeaOrmPatronStore};
use lenddesk::models::patron;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:").await.expect("Failed to init DB")
}

async fn create_test_patron(db: &DatabaseConnection, name: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let p = patron::ActiveModel {
        name: Set(name.to_string()),
        email: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = patron::Entity::insert(p)
        .exec(db)
        .await
        .expect("Failed to create patron");
    res.last_insert_id
}

fn new_loan(patron_id: i32, title_id: i32, borrow: &str, due: &str) -> NewLoan {
    NewLoan {
        patron_id,
        title_id,
        borrow_date: borrow.to_string(),
        due_date: due.to_string(),
        notes: None,
    }
}

#[tokio::test]
async fn reserve_unit_is_conditional_on_stock() {
    let db = setup_test_db().await;
    let catalog = SeaOrmCatalogStore::new(db);

    let title = catalog
        .insert(CreateTitleInput {
            name: "Dune".to_string(),
            author: None,
            isbn: None,
            total_stock: 1,
        })
        .await
        .expect("Insert should succeed");
    assert_eq!(title.available_stock, 1);

    assert!(catalog.try_reserve_unit(title.id).await.unwrap());
    // Stock exhausted: reservation reports failure, not an error
    assert!(!catalog.try_reserve_unit(title.id).await.unwrap());

    let t = catalog.find_by_id(title.id).await.unwrap().unwrap();
    assert_eq!(t.available_stock, 0);
    assert_eq!(t.total_stock, 1);
}

#[tokio::test]
async fn reserve_unit_distinguishes_missing_title_from_no_stock() {
    let db = setup_test_db().await;
    let catalog = SeaOrmCatalogStore::new(db);

    let err = catalog
        .try_reserve_unit(9999)
        .await
        .expect_err("Missing title should be an error");
    assert!(matches!(err, LendingError::NotFound));
}

#[tokio::test]
async fn release_unit_restores_stock() {
    let db = setup_test_db().await;
    let catalog = SeaOrmCatalogStore::new(db);

    let title = catalog
        .insert(CreateTitleInput {
            name: "Foundation".to_string(),
            author: None,
            isbn: None,
            total_stock: 2,
        })
        .await
        .unwrap();

    assert!(catalog.try_reserve_unit(title.id).await.unwrap());
    assert!(catalog.try_reserve_unit(title.id).await.unwrap());
    catalog.release_unit(title.id).await.unwrap();

    let t = catalog.find_by_id(title.id).await.unwrap().unwrap();
    assert_eq!(t.available_stock, 1);

    let err = catalog
        .release_unit(9999)
        .await
        .expect_err("Missing title should be an error");
    assert!(matches!(err, LendingError::NotFound));
}

#[tokio::test]
async fn mark_returned_flips_exactly_once() {
    let db = setup_test_db().await;
    let catalog = SeaOrmCatalogStore::new(db.clone());
    let loans = SeaOrmLoanStore::new(db.clone());

    let title = catalog
        .insert(CreateTitleInput {
            name: "Dune".to_string(),
            author: None,
            isbn: None,
            total_stock: 1,
        })
        .await
        .unwrap();
    let patron_id = create_test_patron(&db, "Alice").await;

    let loan = loans
        .insert(new_loan(patron_id, title.id, "2024-01-01", "2024-01-15"))
        .await
        .unwrap();
    assert_eq!(loan.status, "active");

    assert!(loans.mark_returned(loan.id, "2024-01-10").await.unwrap());
    // The conditional update refuses a second flip
    assert!(!loans.mark_returned(loan.id, "2024-01-11").await.unwrap());

    let stored = loans.find_by_id(loan.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "returned");
    assert_eq!(stored.return_date.as_deref(), Some("2024-01-10"));
}

#[tokio::test]
async fn overdue_batch_only_flips_active_loans_past_due() {
    let db = setup_test_db().await;
    let catalog = SeaOrmCatalogStore::new(db.clone());
    let loans = SeaOrmLoanStore::new(db.clone());

    let title = catalog
        .insert(CreateTitleInput {
            name: "The Hobbit".to_string(),
            author: None,
            isbn: None,
            total_stock: 3,
        })
        .await
        .unwrap();
    let p1 = create_test_patron(&db, "Alice").await;
    let p2 = create_test_patron(&db, "Bruno").await;
    let p3 = create_test_patron(&db, "Chloe").await;

    // Due before the cutoff
    let overdue = loans
        .insert(new_loan(p1, title.id, "2024-01-01", "2024-01-10"))
        .await
        .unwrap();
    // Due exactly on the cutoff: strictly-before comparison leaves it active
    let due_today = loans
        .insert(new_loan(p2, title.id, "2024-01-01", "2024-01-11"))
        .await
        .unwrap();
    // Already returned: untouched by the batch
    let returned = loans
        .insert(new_loan(p3, title.id, "2024-01-01", "2024-01-05"))
        .await
        .unwrap();
    assert!(loans.mark_returned(returned.id, "2024-01-04").await.unwrap());

    let count = loans.mark_overdue_batch("2024-01-11").await.unwrap();
    assert_eq!(count, 1);

    let l = loans.find_by_id(overdue.id).await.unwrap().unwrap();
    assert_eq!(l.status, "overdue");
    let l = loans.find_by_id(due_today.id).await.unwrap().unwrap();
    assert_eq!(l.status, "active");
    let l = loans.find_by_id(returned.id).await.unwrap().unwrap();
    assert_eq!(l.status, "returned");
}

#[tokio::test]
async fn insert_enforces_single_open_loan_per_pair() {
    let db = setup_test_db().await;
    let catalog = SeaOrmCatalogStore::new(db.clone());
    let loans = SeaOrmLoanStore::new(db.clone());

    let title = catalog
        .insert(CreateTitleInput {
            name: "Foundation".to_string(),
            author: None,
            isbn: None,
            total_stock: 2,
        })
        .await
        .unwrap();
    let patron_id = create_test_patron(&db, "Alice").await;

    let first = loans
        .insert(new_loan(patron_id, title.id, "2024-01-01", "2024-01-15"))
        .await
        .unwrap();

    // The unique index over open loans rejects a second insert for the pair
    let err = loans
        .insert(new_loan(patron_id, title.id, "2024-01-02", "2024-01-16"))
        .await
        .expect_err("Second open loan for the same pair should be rejected");
    assert!(matches!(err, LendingError::DuplicateLoan));

    // A returned loan no longer blocks the pair
    assert!(loans.mark_returned(first.id, "2024-01-10").await.unwrap());
    loans
        .insert(new_loan(patron_id, title.id, "2024-01-11", "2024-01-25"))
        .await
        .expect("Loan after return should be accepted");
}

#[tokio::test]
async fn find_active_loan_covers_overdue_but_not_returned() {
    let db = setup_test_db().await;
    let catalog = SeaOrmCatalogStore::new(db.clone());
    let loans = SeaOrmLoanStore::new(db.clone());

    let title = catalog
        .insert(CreateTitleInput {
            name: "Dune".to_string(),
            author: None,
            isbn: None,
            total_stock: 1,
        })
        .await
        .unwrap();
    let patron_id = create_test_patron(&db, "Alice").await;

    let loan = loans
        .insert(new_loan(patron_id, title.id, "2024-01-01", "2024-01-10"))
        .await
        .unwrap();

    assert!(loans
        .find_active_loan(patron_id, title.id)
        .await
        .unwrap()
        .is_some());

    loans.mark_overdue_batch("2024-02-01").await.unwrap();
    let found = loans
        .find_active_loan(patron_id, title.id)
        .await
        .unwrap()
        .expect("Overdue loan still counts as active");
    assert_eq!(found.status, "overdue");

    assert!(loans.mark_returned(loan.id, "2024-02-02").await.unwrap());
    assert!(loans
        .find_active_loan(patron_id, title.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn listings_are_ordered_and_enriched() {
    let db = setup_test_db().await;
    let catalog = SeaOrmCatalogStore::new(db.clone());
    let loans = SeaOrmLoanStore::new(db.clone());

    let t1 = catalog
        .insert(CreateTitleInput {
            name: "Foundation".to_string(),
            author: None,
            isbn: None,
            total_stock: 1,
        })
        .await
        .unwrap();
    let t2 = catalog
        .insert(CreateTitleInput {
            name: "Dune".to_string(),
            author: None,
            isbn: None,
            total_stock: 1,
        })
        .await
        .unwrap();
    let patron_id = create_test_patron(&db, "Alice").await;

    loans
        .insert(new_loan(patron_id, t1.id, "2024-01-01", "2024-01-15"))
        .await
        .unwrap();
    loans
        .insert(new_loan(patron_id, t2.id, "2024-02-01", "2024-02-15"))
        .await
        .unwrap();

    let all = loans.find_all(LoanFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].borrow_date, "2024-02-01");
    assert_eq!(all[0].title_name, "Dune");
    assert_eq!(all[0].patron_name, "Alice");
    assert_eq!(all[1].borrow_date, "2024-01-01");

    let active_only = loans
        .find_all(LoanFilter {
            status: Some("active".to_string()),
            patron_id: None,
        })
        .await
        .unwrap();
    assert_eq!(active_only.len(), 2);
}

#[tokio::test]
async fn catalog_counts_aggregate_stock() {
    let db = setup_test_db().await;
    let catalog = SeaOrmCatalogStore::new(db);

    // Empty catalog
    let counts = catalog.counts().await.unwrap();
    assert_eq!(counts.titles, 0);
    assert_eq!(counts.total_stock, 0);
    assert_eq!(counts.available_stock, 0);

    let t1 = catalog
        .insert(CreateTitleInput {
            name: "Foundation".to_string(),
            author: None,
            isbn: None,
            total_stock: 2,
        })
        .await
        .unwrap();
    catalog
        .insert(CreateTitleInput {
            name: "Dune".to_string(),
            author: None,
            isbn: None,
            total_stock: 3,
        })
        .await
        .unwrap();

    assert!(catalog.try_reserve_unit(t1.id).await.unwrap());

    let counts = catalog.counts().await.unwrap();
    assert_eq!(counts.titles, 2);
    assert_eq!(counts.total_stock, 5);
    assert_eq!(counts.available_stock, 4);
}

#[tokio::test]
async fn patron_store_round_trip() {
    let db = setup_test_db().await;
    let patrons = SeaOrmPatronStore::new(db);

    use lenddesk::domain::{CreatePatronInput, PatronStore};

    let created = patrons
        .insert(CreatePatronInput {
            name: "Alice Martin".to_string(),
            email: Some("alice@example.org".to_string()),
        })
        .await
        .unwrap();

    let found = patrons.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.name, "Alice Martin");
    assert_eq!(found.email.as_deref(), Some("alice@example.org"));

    assert!(patrons.find_by_id(9999).await.unwrap().is_none());
}

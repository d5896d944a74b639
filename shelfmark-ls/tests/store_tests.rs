//! Store layer integration tests
//!
//! Run against in-memory SQLite pools built from the exported schema
//! functions: insert idempotence, the user-delete cascade, reading status
//! upserts, label idempotence, and the label-similarity recommendation
//! query.

use shelfmark_common::db::init::{create_schema, seed_defaults, DEFAULT_LABELS};
use shelfmark_common::db::models::{BookMetadata, NewUser, ReadingStatus};
use shelfmark_common::Error;
use shelfmark_ls::db::{books, labels, reading_status, users};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Fresh seeded in-memory database.
///
/// One connection only: each in-memory SQLite connection is its own
/// database.
async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .expect("Failed to enable foreign keys");

    create_schema(&pool).await.expect("Failed to create schema");
    seed_defaults(&pool).await.expect("Failed to seed defaults");

    pool
}

async fn add_test_user(pool: &SqlitePool, account: &str) -> i64 {
    users::add_user(
        pool,
        &NewUser {
            account: account.to_string(),
            password: "secret".to_string(),
            display_name: account.to_string(),
            avatar: String::new(),
        },
    )
    .await
    .expect("Failed to add user")
}

fn metadata(isbn: &str, title: &str) -> BookMetadata {
    BookMetadata {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: "Unknown".to_string(),
        publisher: "Unknown Publisher".to_string(),
        published: "Unknown Date".to_string(),
        publish_place: String::new(),
        price: 0.0,
        cover_url: String::new(),
        description: String::new(),
    }
}

async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar(sql)
        .fetch_one(pool)
        .await
        .expect("Count query failed")
}

#[tokio::test]
async fn test_add_book_seeds_ownership_and_status() {
    let pool = memory_pool().await;
    let user = add_test_user(&pool, "alice").await;

    let book_id = books::add_book_for_user(&pool, user, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    assert!(book_id > 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM books").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM user_books").await, 1);

    let state = reading_status::get_status(&pool, book_id, user).await.unwrap();
    assert_eq!(state.status, ReadingStatus::ToRead);
    assert_eq!(state.finished_on, None);
}

#[tokio::test]
async fn test_add_book_is_idempotent_per_isbn() {
    let pool = memory_pool().await;
    let user = add_test_user(&pool, "alice").await;

    let first = books::add_book_for_user(&pool, user, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();
    let second = books::add_book_for_user(&pool, user, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM books").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM user_books").await, 1);
}

#[tokio::test]
async fn test_failed_add_leaves_no_book_row() {
    let pool = memory_pool().await;

    // No such user: the ownership insert violates its foreign key and
    // the whole transaction rolls back, fresh book row included
    let result = books::add_book_for_user(&pool, 999, &metadata("9780306406157", "Physics")).await;

    assert!(result.is_err());
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM books").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM user_books").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM reading_status").await, 0);
}

#[tokio::test]
async fn test_two_users_share_one_book_row() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let bob = add_test_user(&pool, "bob").await;

    let id_a = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();
    let id_b = books::add_book_for_user(&pool, bob, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    assert_eq!(id_a, id_b);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM books").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM user_books").await, 2);
}

#[tokio::test]
async fn test_get_book_by_isbn_is_ownership_scoped() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let bob = add_test_user(&pool, "bob").await;

    books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    let for_alice = books::get_book_by_isbn(&pool, "9780306406157", alice)
        .await
        .unwrap();
    let for_bob = books::get_book_by_isbn(&pool, "9780306406157", bob)
        .await
        .unwrap();

    assert!(for_alice.is_some());
    assert!(for_bob.is_none(), "Unowned book must read as absent");
}

#[tokio::test]
async fn test_remove_book_clears_user_state_only() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let bob = add_test_user(&pool, "bob").await;

    let book_id = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();
    books::add_book_for_user(&pool, bob, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    let label_id = labels::insert_label(&pool, alice, "favorites", true).await.unwrap();
    labels::add_label_to_book(&pool, book_id, label_id, alice).await.unwrap();

    books::remove_book_from_user(&pool, alice, book_id).await.unwrap();

    // The canonical row and the other owner survive
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM books").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM user_books").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM book_labels").await, 0);
    assert!(books::get_user_books(&pool, alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_book_not_owned_reports_not_found() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;

    let err = books::remove_book_from_user(&pool, alice, 42).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_duplicate_account_reports_constraint_violation() {
    let pool = memory_pool().await;
    add_test_user(&pool, "alice").await;

    let err = users::add_user(
        &pool,
        &NewUser {
            account: "alice".to_string(),
            password: "other".to_string(),
            display_name: "Alice II".to_string(),
            avatar: String::new(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[tokio::test]
async fn test_update_missing_user_reports_not_found() {
    let pool = memory_pool().await;

    let err = users::update_user(
        &pool,
        &shelfmark_common::db::models::User {
            id: 999,
            account: "ghost".to_string(),
            password: "x".to_string(),
            display_name: "Ghost".to_string(),
            avatar: String::new(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_delete_user_cascades_but_spares_others() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let bob = add_test_user(&pool, "bob").await;

    let book_id = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();
    books::add_book_for_user(&pool, bob, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    let alice_label = labels::insert_label(&pool, alice, "favorites", true).await.unwrap();
    labels::add_label_to_book(&pool, book_id, alice_label, alice).await.unwrap();

    let bob_label = labels::insert_label(&pool, bob, "loans", true).await.unwrap();
    labels::add_label_to_book(&pool, book_id, bob_label, bob).await.unwrap();

    users::delete_user_and_related_data(&pool, alice).await.unwrap();

    assert!(users::get_user(&pool, alice).await.unwrap().is_none());
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM labels WHERE personalized = 1").await,
        1,
        "Only Bob's label should remain"
    );
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM book_labels").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM user_books").await, 1);
    // Only the fresh insert seeded a status row, and it was Alice's
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM reading_status").await, 0);
    // The shared book and the system labels are untouched
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM books").await, 1);
    assert_eq!(
        labels::get_system_labels(&pool).await.unwrap().len(),
        DEFAULT_LABELS.len()
    );
}

#[tokio::test]
async fn test_delete_missing_user_reports_not_found() {
    let pool = memory_pool().await;

    let err = users::delete_user_and_related_data(&pool, 999).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_reading_status_upsert_never_duplicates() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let book_id = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    let finished = chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
    reading_status::set_status(&pool, book_id, alice, ReadingStatus::AlreadyRead, Some(finished))
        .await
        .unwrap();
    reading_status::set_status(&pool, book_id, alice, ReadingStatus::AlreadyRead, Some(finished))
        .await
        .unwrap();

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM reading_status").await, 1);

    let state = reading_status::get_status(&pool, book_id, alice).await.unwrap();
    assert_eq!(state.status, ReadingStatus::AlreadyRead);
    assert_eq!(state.finished_on, Some(finished));
}

#[tokio::test]
async fn test_missing_status_row_reads_as_to_read_default() {
    let pool = memory_pool().await;

    let state = reading_status::get_status(&pool, 42, 7).await.unwrap();
    assert_eq!(state.status, ReadingStatus::ToRead);
    assert_eq!(state.finished_on, None);
}

#[tokio::test]
async fn test_label_attach_is_idempotent() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let book_id = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();
    let label_id = labels::insert_label(&pool, alice, "favorites", true).await.unwrap();

    labels::add_label_to_book(&pool, book_id, label_id, alice).await.unwrap();
    labels::add_label_to_book(&pool, book_id, label_id, alice).await.unwrap();

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM book_labels").await, 1);

    // Detaching twice is equally harmless
    labels::remove_label_from_book(&pool, book_id, label_id, alice).await.unwrap();
    labels::remove_label_from_book(&pool, book_id, label_id, alice).await.unwrap();

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM book_labels").await, 0);
}

#[tokio::test]
async fn test_attach_unknown_label_reports_constraint_violation() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let book_id = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    let err = labels::add_label_to_book(&pool, book_id, 9999, alice).await.unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM book_labels").await, 0);
}

#[tokio::test]
async fn test_label_visibility_scopes() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let bob = add_test_user(&pool, "bob").await;

    labels::insert_label(&pool, alice, "favorites", true).await.unwrap();
    labels::insert_label(&pool, bob, "loans", true).await.unwrap();

    let alice_own = labels::get_user_labels(&pool, alice).await.unwrap();
    assert_eq!(alice_own.len(), 1);
    assert_eq!(alice_own[0].name, "favorites");

    let alice_all = labels::get_all_available_labels(&pool, alice).await.unwrap();
    assert_eq!(alice_all.len(), DEFAULT_LABELS.len() + 1);
    assert!(alice_all.iter().all(|l| l.name != "loans"));

    // Visible-name lookup sees system labels and own labels, not Bob's
    assert!(labels::get_visible_label_by_name(&pool, alice, "novel")
        .await
        .unwrap()
        .is_some());
    assert!(labels::get_visible_label_by_name(&pool, alice, "favorites")
        .await
        .unwrap()
        .is_some());
    assert!(labels::get_visible_label_by_name(&pool, alice, "loans")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_rename_and_delete_spare_system_labels() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;

    let system = labels::get_system_labels(&pool).await.unwrap();
    let novel_id = system[0].id;

    let err = labels::update_label_name(&pool, novel_id, alice, "renamed").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = labels::delete_label(&pool, novel_id, alice).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let own = labels::insert_label(&pool, alice, "favorites", true).await.unwrap();
    labels::update_label_name(&pool, own, alice, "keepers").await.unwrap();
    labels::delete_label(&pool, own, alice).await.unwrap();
}

#[tokio::test]
async fn test_get_book_and_account_lookup() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;

    let book_id = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    let book = books::get_book(&pool, book_id).await.unwrap().unwrap();
    assert_eq!(book.isbn, "9780306406157");
    assert!(books::get_book(&pool, book_id + 1).await.unwrap().is_none());

    let found = users::get_user_by_account(&pool, "alice").await.unwrap().unwrap();
    assert_eq!(found.id, alice);
    // The reserved system user never answers account lookups
    assert!(users::get_user_by_account(&pool, "system")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_clearing_label_associations_across_books() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let bob = add_test_user(&pool, "bob").await;

    let first = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();
    let second = books::add_book_for_user(&pool, alice, &metadata("9780132350884", "Clean Code"))
        .await
        .unwrap();
    books::add_book_for_user(&pool, bob, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    let system = labels::get_system_labels(&pool).await.unwrap();
    let novel_id = system[0].id;

    labels::add_label_to_book(&pool, first, novel_id, alice).await.unwrap();
    labels::add_label_to_book(&pool, second, novel_id, alice).await.unwrap();
    labels::add_label_to_book(&pool, first, novel_id, bob).await.unwrap();

    labels::remove_all_book_label_associations(&pool, novel_id, alice)
        .await
        .unwrap();

    assert!(labels::get_book_labels(&pool, first, alice).await.unwrap().is_empty());
    assert!(labels::get_book_labels(&pool, second, alice).await.unwrap().is_empty());
    // Bob's association with the same label survives
    assert_eq!(labels::get_book_labels(&pool, first, bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_similar_books_empty_without_labels() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let book_id = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();

    let similar = books::find_similar_by_labels(&pool, book_id, alice).await.unwrap();
    assert!(similar.is_empty());
}

#[tokio::test]
async fn test_similar_books_cross_user_by_shared_label() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;
    let bob = add_test_user(&pool, "bob").await;

    let mine = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();
    let theirs = books::add_book_for_user(&pool, bob, &metadata("9780132350884", "Clean Code"))
        .await
        .unwrap();

    let system = labels::get_system_labels(&pool).await.unwrap();
    let novel_id = system[0].id;

    labels::add_label_to_book(&pool, mine, novel_id, alice).await.unwrap();
    labels::add_label_to_book(&pool, theirs, novel_id, bob).await.unwrap();

    let similar = books::find_similar_by_labels(&pool, mine, alice).await.unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].id, theirs);
}

#[tokio::test]
async fn test_similar_books_excludes_self_and_caps_at_five() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;

    let isbns = [
        "9780306406157",
        "9780132350884",
        "9780134685991",
        "9781491927281",
        "9780596517748",
        "9781593278281",
        "9781593272838",
    ];

    let system = labels::get_system_labels(&pool).await.unwrap();
    let novel_id = system[0].id;

    let mut book_ids = Vec::new();
    for (i, isbn) in isbns.iter().enumerate() {
        let id = books::add_book_for_user(&pool, alice, &metadata(isbn, &format!("Book {}", i)))
            .await
            .unwrap();
        labels::add_label_to_book(&pool, id, novel_id, alice).await.unwrap();
        book_ids.push(id);
    }

    let queried = book_ids[0];
    let similar = books::find_similar_by_labels(&pool, queried, alice).await.unwrap();

    assert_eq!(similar.len(), books::SIMILAR_BOOKS_LIMIT as usize);
    assert!(similar.iter().all(|b| b.id != queried));
}

#[tokio::test]
async fn test_shelf_filters_by_status_and_label() {
    let pool = memory_pool().await;
    let alice = add_test_user(&pool, "alice").await;

    let read = books::add_book_for_user(&pool, alice, &metadata("9780306406157", "Physics"))
        .await
        .unwrap();
    let unread = books::add_book_for_user(&pool, alice, &metadata("9780132350884", "Clean Code"))
        .await
        .unwrap();

    reading_status::set_status(&pool, read, alice, ReadingStatus::AlreadyRead, None)
        .await
        .unwrap();

    let finished = books::get_books_with_status(&pool, alice, ReadingStatus::AlreadyRead)
        .await
        .unwrap();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].id, read);

    let pending = books::get_books_with_status(&pool, alice, ReadingStatus::ToRead)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, unread);

    let label_id = labels::insert_label(&pool, alice, "favorites", true).await.unwrap();
    labels::add_label_to_book(&pool, unread, label_id, alice).await.unwrap();

    let labeled = books::get_books_with_label(&pool, label_id, alice).await.unwrap();
    assert_eq!(labeled.len(), 1);
    assert_eq!(labeled[0].id, unread);
}

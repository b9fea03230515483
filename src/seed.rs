use crate::auth::hash_password;
use crate::models::{book, category, payment_method, user};
use sea_orm::*;

// `ON CONFLICT DO NOTHING` surfaces as RecordNotInserted; on a re-run a
// skipped row is the expected outcome, not a failure.
fn skip_existing<T>(res: Result<T, DbErr>) -> Result<(), DbErr> {
    match res {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Users
    let admin_password = hash_password("admin123!").unwrap();
    let user_password = hash_password("reader123!").unwrap();

    let admin = user::ActiveModel {
        email: Set("admin@bookbazaar.local".to_owned()),
        full_name: Set("Site Admin".to_owned()),
        phone: Set(None),
        password_hash: Set(admin_password),
        role: Set("admin".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };

    let reader = user::ActiveModel {
        email: Set("reader@bookbazaar.local".to_owned()),
        full_name: Set("Demo Reader".to_owned()),
        phone: Set(Some("+1-555-0100".to_owned())),
        password_hash: Set(user_password),
        role: Set("user".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };

    skip_existing(
        user::Entity::insert(admin)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(user::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await,
    )?;

    skip_existing(
        user::Entity::insert(reader)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(user::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await,
    )?;

    // 2. Categories
    let categories = vec![
        ("Science Fiction", "Space, time and everything in between"),
        ("Programming", "Technical books for developers"),
        ("Fiction", "Novels and short stories"),
    ];

    for (name, description) in categories {
        let cat = category::ActiveModel {
            name: Set(name.to_owned()),
            description: Set(Some(description.to_owned())),
            created_at: Set(now.clone()),
            ..Default::default()
        };
        skip_existing(
            category::Entity::insert(cat)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::column(category::Column::Name)
                        .do_nothing()
                        .to_owned(),
                )
                .exec(db)
                .await,
        )?;
    }

    // 3. A couple of books in the first category
    let first_category = category::Entity::find().one(db).await?;
    if let Some(cat) = first_category {
        let books = vec![
            (
                "Dune",
                "Frank Herbert",
                "A spice planet story.",
                9.99,
                412,
                "1965-08-01",
                Some("9780441172719"),
            ),
            (
                "Foundation",
                "Isaac Asimov",
                "Psychohistory and the fall of empires.",
                7.49,
                255,
                "1951-06-01",
                Some("9780553293357"),
            ),
        ];

        for (title, author, description, price, pages, published, isbn) in books {
            let book = book::ActiveModel {
                title: Set(title.to_owned()),
                author: Set(author.to_owned()),
                description: Set(description.to_owned()),
                price: Set(price),
                cover_image: Set(String::new()),
                book_file: Set(None),
                category_id: Set(cat.id),
                tags: Set(r#"["classic","sci-fi"]"#.to_owned()),
                pages: Set(pages),
                published_date: Set(published.to_owned()),
                isbn: Set(isbn.map(|s| s.to_owned())),
                language: Set("en".to_owned()),
                is_active: Set(true),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            };
            skip_existing(
                book::Entity::insert(book)
                    .on_conflict(
                        sea_orm::sea_query::OnConflict::column(book::Column::Isbn)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec(db)
                    .await,
            )?;
        }
    }

    // 4. A payment method so the purchase modal has something to show.
    // No unique column to conflict on, so check before inserting.
    let existing_method = payment_method::Entity::find()
        .filter(payment_method::Column::Name.eq("Bank transfer"))
        .one(db)
        .await?;
    if existing_method.is_none() {
        let method = payment_method::ActiveModel {
            name: Set("Bank transfer".to_owned()),
            description: Set(Some("Wire the amount and paste the reference".to_owned())),
            qr_code: Set(None),
            account_details: Set(r#"{"bank":"Demo Bank","account":"000-1234"}"#.to_owned()),
            is_active: Set(true),
            created_at: Set(now),
            ..Default::default()
        };
        payment_method::Entity::insert(method).exec(db).await?;
    }

    Ok(())
}

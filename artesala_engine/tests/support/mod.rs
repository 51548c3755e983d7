use artesala_common::EuroCents;
use artesala_engine::SqliteDatabase;
use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    let db = run_migrations(url).await;
    seed_rooms(&db).await;
    db
}

pub fn random_db_path() -> String {
    format!("sqlite://../data/test_store_{}.db", rand::random::<u64>())
}

pub async fn run_migrations(url: &str) -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url(url).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

pub async fn create_database(url: &str) {
    std::fs::create_dir_all("../data").ok();
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

/// Reference data used across the integration tests: room 1 at €20/h, room 2 at €15/h.
pub async fn seed_rooms(db: &SqliteDatabase) {
    db.upsert_room(1, "Sala grande", EuroCents::from_euros(20)).await.expect("Error seeding room 1");
    db.upsert_room(2, "Sala pequeña", EuroCents::from_euros(15)).await.expect("Error seeding room 2");
}

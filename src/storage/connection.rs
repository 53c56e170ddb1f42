use crate::storage::entity::LocalStorage;
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use std::time::Duration;

pub async fn establish_connection(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    // 内存库每个连接都是独立的库，只能用单连接
    let in_memory = db_url.contains(":memory:");
    let mut opt = ConnectOptions::new(db_url.to_owned());
    opt.max_connections(if in_memory { 1 } else { 4 })
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;
    let backend = db.get_database_backend();

    if backend == sea_orm::DatabaseBackend::Sqlite && !in_memory {
        let _ = db
            .execute(sea_orm::Statement::from_string(
                backend,
                "PRAGMA journal_mode=WAL;".to_string(),
            ))
            .await;
    }

    let schema = Schema::new(backend);
    let stmt = backend.build(
        schema
            .create_table_from_entity(LocalStorage)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    info!("Local storage ready at {}", db_url);

    Ok(db)
}

use crate::storage::entity::local_storage::{
    self, ActiveModel as LocalStorageActiveModel, Entity as LocalStorage,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

pub const KEY_TOKEN: &str = "token";
pub const KEY_USERNAME: &str = "username";

/// 登录凭据的读写，语义同浏览器 localStorage：最后写入者生效
pub struct CredentialRepository;

impl CredentialRepository {
    pub async fn get(db: &DatabaseConnection, key: &str) -> Result<Option<String>, DbErr> {
        let row = LocalStorage::find_by_id(key.to_string()).one(db).await?;
        Ok(row.map(|m| m.value))
    }

    pub async fn set(db: &DatabaseConnection, key: &str, value: &str) -> Result<(), DbErr> {
        let model = LocalStorageActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(Utc::now().timestamp()),
        };
        LocalStorage::insert(model)
            .on_conflict(
                OnConflict::column(local_storage::Column::Key)
                    .update_columns([
                        local_storage::Column::Value,
                        local_storage::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn remove(db: &DatabaseConnection, key: &str) -> Result<u64, DbErr> {
        let res = LocalStorage::delete_many()
            .filter(local_storage::Column::Key.eq(key))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn save_login(
        db: &DatabaseConnection,
        token: &str,
        username: &str,
    ) -> Result<(), DbErr> {
        Self::set(db, KEY_TOKEN, token).await?;
        Self::set(db, KEY_USERNAME, username).await
    }

    pub async fn clear_login(db: &DatabaseConnection) -> Result<(), DbErr> {
        Self::remove(db, KEY_TOKEN).await?;
        Self::remove(db, KEY_USERNAME).await?;
        Ok(())
    }
}

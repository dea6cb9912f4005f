use crate::constants::admin::{
    DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
};
use crate::domain::Role;
use crate::entities::prelude::*;
use crate::entities::users;
use sea_orm_migration::prelude::*;

/// Seeds the demo administrator. Rotate the password with
/// `cinelist create-admin` on anything that is not a throwaway instance.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let password_hash =
            crate::db::repositories::user::hash_password(DEFAULT_ADMIN_PASSWORD, None).map_err(
                |e| DbErr::Custom(format!("Failed to hash default admin password: {e}")),
            )?;
        let now = crate::db::now();

        let insert = Query::insert()
            .into_table(Users)
            .columns([
                users::Column::Username,
                users::Column::Email,
                users::Column::PasswordHash,
                users::Column::Role,
                users::Column::CreatedAt,
                users::Column::UpdatedAt,
            ])
            .values_panic([
                DEFAULT_ADMIN_USERNAME.into(),
                DEFAULT_ADMIN_EMAIL.into(),
                password_hash.into(),
                Role::Admin.as_str().into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Users)
            .and_where(Expr::col(users::Column::Username).eq(DEFAULT_ADMIN_USERNAME))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}

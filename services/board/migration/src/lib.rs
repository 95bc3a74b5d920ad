use sea_orm_migration::prelude::*;

mod m20260401_000001_create_accounts;
mod m20260401_000002_create_email_verifications;
mod m20260401_000003_create_posts;
mod m20260401_000004_create_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_accounts::Migration),
            Box::new(m20260401_000002_create_email_verifications::Migration),
            Box::new(m20260401_000003_create_posts::Migration),
            Box::new(m20260401_000004_create_comments::Migration),
        ]
    }
}

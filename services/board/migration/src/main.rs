use sea_orm_migration::prelude::*;

use anoy_board_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}

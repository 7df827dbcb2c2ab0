mod cli;
mod demo;
mod infra;
mod routes;
mod server;
mod sqlite;

use gradebook::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

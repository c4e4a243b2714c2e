mod cli;
mod infra;
mod pa;
mod routes;
mod server;

use migraine_nav::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

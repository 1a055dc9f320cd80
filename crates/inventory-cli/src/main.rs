//! `inventory` binary entrypoint.

#[tokio::main]
async fn main() {
    let code = inventory_cli::run().await;
    std::process::exit(code);
}

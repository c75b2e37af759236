#[tokio::main]
async fn main() {
    if let Err(e) = medcita_lib::run().await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = courier::cli::Cli::parse();
    if let Err(e) = courier::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

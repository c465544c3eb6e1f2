use clap::Parser;
use accounter_api::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = accounter_api::cli::run(cli).await {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }

    Ok(())
}

use clap::Parser;
use rebloggr::{args::Args, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .parse_default_env()
        .init();

    if let Err(err) = run(args).await {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("Because: {cause}");
        }
        std::process::exit(1);
    }
    Ok(())
}

//! nldump command - watch and print kernel network events.

use clap::Parser;
use nlmon::dump::DumpRequest;
use nlmon::monitor::NamespaceScope;

#[derive(Parser)]
#[command(name = "nldump", version, about = "Watch and print kernel network events")]
struct Cli {
    /// Message kinds to print (link, addr, route, neighbor, noop,
    /// error, done). No selector means everything.
    selectors: Vec<String>,

    /// Also watch every named namespace under /var/run/netns.
    #[arg(long)]
    all_nsid: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    // Validate selectors before any socket is touched
    let mut request = DumpRequest::parse(&cli.selectors)?;
    if cli.all_nsid {
        request.scope = NamespaceScope::All;
    }

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = request.run(&mut stdout).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

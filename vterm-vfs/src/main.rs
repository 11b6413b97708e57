use anyhow::Result;
use clap::Parser;
use vterm_vfs::config::CliArgs;
use vterm_vfs::server::VfsServer;
use vterm_vfs::transport::NdjsonTransport;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Logging goes to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = args.vfs_config();
    tracing::debug!(?config, "Session defaults");

    let transport = NdjsonTransport::new();
    let mut server = VfsServer::new(transport, config);

    tracing::info!("vterm-vfs ready");
    server.run()?;
    Ok(())
}

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use vterm_vfs::{loader, LoadSource, VirtualFs};
use vterm_vsh::config::CliArgs;
use vterm_vsh::Shell;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Logging goes to stderr so it never interleaves with command output
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut vfs = VirtualFs::new(args.vfs_config());
    match &args.vfs {
        Some(path) => {
            if vfs.load_or_default(loader::load_document(path)) == LoadSource::External {
                tracing::info!(path = %path.display(), "Loaded VFS document");
            }
        }
        None => vfs.load_default(),
    }

    let mut shell = Shell::new(vfs);
    let mut stdout = io::stdout().lock();

    if let Some(path) = &args.script {
        let script = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        shell.run_script(&script, &mut stdout)?;
    }

    if shell.is_running() {
        shell.run_interactive(io::stdin().lock(), &mut stdout)?;
    }
    Ok(())
}

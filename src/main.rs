mod app;
mod cli;
mod document;
mod loader;
mod renderer;
mod reshape;
mod watcher;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Handle --export mode: print the document verbatim and exit.
    if cli.export {
        handle_export(&cli)?;
        return Ok(());
    }

    // Normal dashboard mode.
    let mut app = app::App::new(&cli)?;
    app.run()?;

    Ok(())
}

/// Load the document and write its raw text to stdout, byte for byte. This
/// is the non-interactive counterpart of the dashboard's export key: the
/// output is the loaded file itself, never a re-serialization.
fn handle_export(cli: &cli::Cli) -> anyhow::Result<()> {
    use std::io::Write;

    let loaded = loader::load(&cli.path)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(loaded.raw.as_bytes())?;

    Ok(())
}

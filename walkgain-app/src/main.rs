mod app;
mod cli;
mod sim;
mod telemetry;

use clap::Parser;

use app::App;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    telemetry::init_tracing()?;

    let app = App::new(args)?;
    app.run()?;

    Ok(())
}

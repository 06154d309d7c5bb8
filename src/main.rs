mod app;
mod cli;
mod config;
mod errors;
mod logging;
mod metadata;

use clap::Parser;
use cli::Cli;
use color_eyre::Result;

use crate::app::App;

fn main() -> Result<()> {
    errors::init()?;
    logging::init()?;

    let args = Cli::parse();
    let app = App::new()?;
    app.run(&args)?;
    Ok(())
}

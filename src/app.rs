use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::config::Settings;
use crate::errors::AppResult;
use crate::metadata;

pub struct App {
    settings: Settings,
}

impl App {
    pub fn new() -> AppResult<Self> {
        let settings = Settings::new()?;
        debug!("settings: {:?}", settings);
        Ok(App { settings })
    }

    pub fn run(&self, args: &Cli) -> AppResult<()> {
        let manifest_file = args
            .manifest_file
            .as_deref()
            .unwrap_or(&self.settings.manifest_file);

        let metadata = metadata::load(&args.package_dir, manifest_file)?;

        if args.check {
            println!("{}: manifest OK", metadata.name);
            return Ok(());
        }

        match args.format {
            OutputFormat::Text => print!("{}", metadata),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metadata)?),
        }

        Ok(())
    }
}

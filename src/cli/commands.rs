use std::rc::Rc;

use tracing::{debug, instrument};

use crate::application::{build_sample_assembly, render, render_links};
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{RenderStyle, Settings};
use crate::domain::{SharedItemStore, Teardown, TreeArena};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "settings loaded");
    execute_with_settings(cli, settings)
}

/// Dispatches `cli` against settings that are already loaded.
pub fn execute_with_settings(cli: &Cli, settings: Settings) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Demo { style, no_links }) => {
            run_demo(settings, *style, *no_links).map(|_| ())
        }
        Some(Commands::Config) => _config(&settings),
        None if cli.info || cli.generator.is_some() => Ok(()),
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

/// Builds, prints and tears down the sample assembly.
#[instrument(skip(settings))]
pub fn run_demo(
    mut settings: Settings,
    style: Option<RenderStyle>,
    no_links: bool,
) -> CliResult<Teardown> {
    if let Some(style) = style {
        settings.style = style;
    }
    if no_links {
        settings.show_links = false;
    }

    let store = SharedItemStore::shared();
    let mut tree = TreeArena::new(Rc::clone(&store));
    let sample = build_sample_assembly(&mut tree)?;

    output::header("Assembly");
    output::block(&render(&tree, sample.root, &settings)?);
    if settings.show_links {
        output::block(&render_links(&store.borrow()));
    }

    let teardown = tree.destroy(sample.root)?;
    output::success(&format!(
        "destroyed {} nodes, released {} items",
        teardown.removed.len(),
        teardown.items_destroyed
    ));
    if settings.show_links {
        output::block(&render_links(&store.borrow()));
    }
    Ok(teardown)
}

#[instrument(skip(settings))]
fn _config(settings: &Settings) -> CliResult<()> {
    output::block(&settings.to_toml()?);
    Ok(())
}

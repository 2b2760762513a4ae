mod catalog;
mod cli;
mod paths;
mod picker;
mod run;
mod window;

use anyhow::Result;
use cli::Command;
use run::Session;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let session = Session::load(cli.config.as_deref())?;
    match cli.command {
        Some(Command::List(args)) => run::list(&session, args.json),
        Some(Command::Route(args)) => run::route(&session, &args.path),
        None => run::run(session, cli.run),
    }
}

//! cordsync CLI - keeps a Cordova project's build artifacts in sync

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use cordsync::core::SyncError;
use cordsync::util::diagnostic::render_malformed_descriptor;
use cordsync::util::{GlobalContext, Shell};

/// State shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
    pub ctx: GlobalContext,
}

fn main() {
    let cli = Cli::parse();

    init_logging(&cli);

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    let ctx = match GlobalContext::new() {
        Ok(ctx) => ctx.with_project_root(cli.project_root.clone()),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    };

    let opts = GlobalOptions { shell, ctx };
    if let Err(e) = run(cli.command, &opts) {
        report_error(&opts, &e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "cordsync=debug"
    } else if cli.quiet {
        "cordsync=error"
    } else {
        "cordsync=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(command: Commands, opts: &GlobalOptions) -> Result<()> {
    match command {
        Commands::Scan => commands::scan::execute(opts),
        Commands::Show => commands::show::execute(opts),
        Commands::Edit(args) => commands::edit::execute(args, opts),
        Commands::Prepare(args) => commands::prepare::execute(args, opts),
        Commands::PinGradle(args) => commands::pin_gradle::execute(args, opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print a failed command's error once, as an actionable diagnostic when the
/// cause is a [`SyncError`].
fn report_error(opts: &GlobalOptions, err: &anyhow::Error) {
    let shell = &opts.shell;

    let Some(sync) = err.downcast_ref::<SyncError>() else {
        if shell.is_json() {
            shell.error(format!("{:#}", err));
        } else {
            eprintln!("error: {:#}", err);
        }
        return;
    };

    if !shell.is_json() {
        if let SyncError::MalformedDescriptor {
            reason,
            offset: Some(offset),
        } = sync.root_cause()
        {
            let rendered = opts.ctx.layout().ok().and_then(|(layout, _)| {
                render_malformed_descriptor(&layout.descriptor, reason, *offset)
            });
            if let Some(rendered) = rendered {
                eprintln!("{}", rendered);
                return;
            }
        }
    }

    let mut diag = sync.to_diagnostic();
    let outer = err.to_string();
    if outer != sync.to_string() {
        diag = diag.with_context(outer);
    }
    shell.diagnostic(&diag);
}

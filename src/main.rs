//! Where the magic happens for `camenum` binary!
use clap::Parser;
use std::io::{self, BufRead, IsTerminal, Write};

use camenum::backend;
use camenum::config::Config;
use camenum::display::{self, PrintSettings};
use camenum::enumeration::{self, Status};
use camenum::error::{ErrorKind, Result};
use camenum::system::Session;

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None, max_term_width = 80)]
struct Args {
    /// Read system from json dump file rather than querying the transport layer
    #[arg(long)]
    from_json: Option<String>,

    /// Output as json instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Disable coloured output, can also use NO_COLOR environment variable
    #[arg(short, long, default_value_t = false)]
    no_colour: bool,

    /// Do not wait for Enter before exiting
    #[arg(long, default_value_t = false)]
    no_pause: bool,

    /// Print serial number of each device
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Path to user config file to use for custom colours and defaults
    #[arg(short, long)]
    config: Option<String>,

    /// Turn debugging information on; -z info, -zz debug, -zzz trace. Alternatively set `RUST_LOG` env
    #[arg(short = 'z', long, action = clap::ArgAction::Count)]
    debug: u8,
}

macro_rules! eprintexit {
    ($error:expr) => {
        // `{:#}` so we just print the message
        eprintln!("{:#}", $error);
        std::process::exit(1);
    };
}

fn merge_config(args: &Args, config: Config) -> (Config, PrintSettings) {
    let mut config = config;
    config.no_colour |= args.no_colour || std::env::var_os("NO_COLOR").is_some();
    config.no_pause |= args.no_pause;
    config.verbose |= args.verbose;

    let settings = PrintSettings {
        colours: if config.no_colour {
            None
        } else {
            Some(config.colours.clone())
        },
        verbose: config.verbose,
    };

    (config, settings)
}

fn wait_for_enter() -> Result<()> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        log::debug!("stdin is not a terminal, not waiting for Enter");
        return Ok(());
    }
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(())
}

fn run(args: Args) -> Result<Status> {
    let config = match args.config.as_ref() {
        Some(path) => Config::from_file(path)?,
        None => Config::sys()?,
    };
    let (config, settings) = merge_config(&args, config);
    log::debug!("Running with {:?}", config);
    if config.no_colour {
        colored::control::set_override(false);
    }

    let transport = backend::get_transport(args.from_json.as_deref())?;
    let session = Session::acquire(transport);

    if args.json {
        let enumeration = enumeration::enumerate(session)?;
        display::print_json(&mut io::stdout().lock(), &enumeration)?;
        return Ok(enumeration.status());
    }

    // before listing; a listing failure still shows the library version
    let mut stdout = io::stdout().lock();
    display::print_library_version(
        &mut stdout,
        session.library_name(),
        &session.library_version(),
        &settings,
    )?;
    stdout.flush()?;

    let enumeration = enumeration::enumerate(session)?;
    let status = enumeration.status();
    display::print_results(&mut stdout, &enumeration, &settings)?;
    display::print_exit_prompt(&mut stdout, status)?;
    stdout.flush()?;
    drop(stdout);

    if !config.no_pause {
        wait_for_enter()?;
    }

    Ok(status)
}

fn main() {
    let args = Args::parse();

    camenum::set_log_level(args.debug).unwrap_or_else(|e| {
        eprintexit!(e);
    });

    match run(args) {
        Ok(status) => {
            log::info!("Finished with {:?}", status);
            std::process::exit(status.exit_code());
        }
        Err(e) if e.kind() == ErrorKind::Io && e.message().contains("Broken pipe") => {
            std::process::exit(0);
        }
        Err(e) => {
            eprintexit!(e);
        }
    }
}

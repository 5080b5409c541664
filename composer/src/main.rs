use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use structopt::StructOpt;

use composer::compose::ComposeCommand;
use composer::inspect::InspectCommand;

#[derive(StructOpt)]
#[structopt(about = "Face capture mesh composer")]
struct Opts {
    #[structopt(
        help = "Logging level (off, error, warn, info, debug or trace)",
        long,
        default_value = "info"
    )]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    Compose(ComposeCommand),
    Inspect(InspectCommand),
}

fn main() {
    let opts = Opts::from_args();

    if let Err(err) = TermLogger::init(
        opts.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("failed to initialize logger: {}", err);
    }

    let res = match opts.command {
        Command::Compose(command) => command.run(),
        Command::Inspect(command) => command.run(),
    };

    if let Err(err) = res {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

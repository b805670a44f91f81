use clap::{Parser, Subcommand};

mod route;
mod snap;

#[derive(Parser)]
#[command(name = "copperpath")]
#[command(about = "Interactive PCB track routing, driven from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a routing session against a board and write the result
    #[command(alias = "r")]
    Route(route::RouteArgs),

    /// Show where a segment from one point towards another would end
    Snap(snap::SnapArgs),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Route(args) => route::execute(args),
        Commands::Snap(args) => snap::execute(args),
    }
}

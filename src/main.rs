use clap::Parser;
use moodmirror::Opts;
use moodmirror::cli::SubCommandExtend;
use moodmirror::config::SubCommand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();
    match &opts.subcmd {
        SubCommand::Server(config) => config.run(&opts).await,
        SubCommand::Detect(config) => config.run(&opts).await,
        SubCommand::Recommend(config) => config.run(&opts).await,
    }
}

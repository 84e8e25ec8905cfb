use anyhow::Result;
use clap::Parser;
use o2ims_template::cli::Cli;

fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    o2ims_template::run(&cli.cmd, &mut stdout.lock())
}

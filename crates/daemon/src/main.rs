use clap::Parser;
use owo_colors::OwoColorize;

mod cli;

use cli::op::OpContext;
use cli::{Args, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // serve installs its own subscriber once the config is resolved
    if !matches!(args.command, Command::Serve(_)) {
        docsvc_daemon::init_tracing("warn");
    }

    let remote = args.remote_url()?;
    let ctx = OpContext::new(&remote, args.config.clone(), args.port)?;

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

use anyhow::Result;
use clap::Parser;
use whichshell::{DEFAULT_MAX_DEPTH, Pid, detect_shell};

#[derive(Parser)]
#[command(name = "whichshell")]
#[command(about = "Detect the interactive shell that launched this process")]
#[command(version)]
struct Cli {
    /// Process to start the ancestry walk from (defaults to this process)
    #[arg(short, long)]
    pid: Option<Pid>,

    /// Maximum number of ancestors to inspect
    #[arg(short, long, env = "WHICHSHELL_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() -> Result<()> {
    env_logger::builder()
        .parse_env(env_logger::Env::new().filter_or("WHICHSHELL_LOG", "warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let shell = detect_shell(cli.pid, cli.max_depth)?;
    println!("{} {}", shell.name, shell.path);
    Ok(())
}

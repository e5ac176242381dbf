use std::io;
use std::path::PathBuf;

use chill_core::{action, config::Credentials};

use super::{GlobalArgs, SubcmdResult};
use crate::config;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub program_file: PathBuf,

    /// Language name (e.g. python, cpp); guessed from the file name if omitted
    #[arg(short, long)]
    pub lang: Option<String>,

    /// File fed to the program as stdin
    #[arg(short, long)]
    pub stdin: Option<PathBuf>,

    #[arg(long)]
    pub json: bool,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = config::load_config(global_args)?;
    let cred = Credentials::from_env()?;
    let lang = action::determine_language(&cfg, &args.program_file, args.lang.as_deref())?;

    let stdin = match &args.stdin {
        Some(path) => fsutil::read_to_string(path)?,
        None => String::new(),
    };

    let judge = action::build_judge(&cfg, &cred)?;
    let out = action::do_run(&judge, &args.program_file, &lang, &stdin).await?;

    if args.json {
        serde_json::to_writer_pretty(io::stdout(), &out)?;
        println!();
    } else {
        action::print_run_output(&out);
    }
    Ok(())
}

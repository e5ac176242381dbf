use std::io;

use super::{GlobalArgs, SubcmdResult};
use crate::config;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(short, long)]
    pub json: bool,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = config::load_config(global_args)?;
    let langs = cfg.language_table().supported_languages();

    if args.json {
        serde_json::to_writer_pretty(io::stdout(), &langs)?;
        println!();
        return Ok(());
    }

    for lang in langs {
        println!("{:<12} {}", lang.name, lang.id);
    }
    Ok(())
}

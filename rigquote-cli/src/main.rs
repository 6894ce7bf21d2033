pub(crate) mod common;
mod modules;
mod options;

use std::io::stdout;

use erased_serde::Serializer;
use rigquote_core::{chrono::Local, config::load_config};
use structopt::StructOpt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::common::{Run, Session};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let opt = options::Options::from_args();
    let session = Session {
        config: load_config(opt.config.as_deref())?,
        today: opt.today.unwrap_or_else(|| Local::now().date_naive()),
    };

    opt.command
        .run(
            &session,
            &mut <dyn Serializer>::erase(&mut serde_json::Serializer::pretty(stdout())),
        )
        .await?;

    println!();
    Ok(())
}

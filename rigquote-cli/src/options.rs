use clap::AppSettings;
use rigquote_core::chrono::NaiveDate;
use std::path::PathBuf;
use structopt::StructOpt;

use crate::{
    modules::{offer::Offer, parts::Parts, settings::Settings},
    run_impl_enum,
};

#[derive(StructOpt)]
#[structopt(name = "rigquote-cli", global_settings = &[AppSettings::ColoredHelp])]
pub struct Options {
    /// Configuration file [default: ./rigquote.toml, if present]
    #[structopt(short, long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// Value parts as of this date (YYYY-MM-DD) instead of the current date
    #[structopt(long)]
    pub today: Option<NaiveDate>,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Inspect the reconciled part lists
    Parts(Parts),
    /// Compute a trade-in offer for a whole machine
    Offer(Offer),
    /// Print the effective configuration
    Config(Settings),
}

run_impl_enum!(Command, self, session, ser, {
    match self {
        Self::Parts(p) => p.run(session, ser).await?,
        Self::Offer(o) => o.run(session, ser).await?,
        Self::Config(c) => c.run(session, ser).await?,
    }
});

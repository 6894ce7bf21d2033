use rigquote_core::schemas::computing::PartClass;
use structopt::StructOpt;

use crate::{run_impl_enum, run_impl_struct};

#[derive(StructOpt)]
pub struct Parts {
    #[structopt(subcommand)]
    class: Class,
}

run_impl_struct!(Parts, class);

#[derive(StructOpt)]
enum Class {
    Cpu(query::SubCommand),
    Gpu(query::SubCommand),
}

run_impl_enum!(Class, self, session, ser, {
    match self {
        Self::Cpu(q) => q.run_for(PartClass::Cpu, session, ser).await?,
        Self::Gpu(q) => q.run_for(PartClass::Gpu, session, ser).await?,
    }
});

mod query {
    use anyhow::anyhow;
    use erased_serde::Serializer;
    use rigquote_core::{
        estimate::estimate_part,
        schemas::{
            computing::{PartClass, PartRecord},
            money::Money,
        },
    };
    use serde::Serialize;
    use structopt::StructOpt;

    use crate::common::Session;

    #[derive(StructOpt)]
    pub(super) enum SubCommand {
        /// Every reconciled record of this class
        List,
        /// One record by name or normalized key, optionally suffixed "@ <base clock>"
        Find { name: String },
        /// One record together with its estimated value
        Estimate { name: String },
    }

    #[derive(Serialize)]
    struct Valuation<'a> {
        #[serde(flatten)]
        record: &'a PartRecord,
        estimate: Money,
    }

    impl SubCommand {
        pub(super) async fn run_for(
            &self,
            class: PartClass,
            session: &Session,
            ser: &mut (dyn Serializer + Send),
        ) -> anyhow::Result<()> {
            let cache = session.cache().await?;
            let lookup = |name: &str| {
                cache
                    .find(class, name)
                    .ok_or_else(|| anyhow!("no {} matches {:?}", class, name))
            };

            match self {
                Self::List => {
                    erased_serde::serialize(cache.records(class), ser)?;
                }
                Self::Find { name } => {
                    erased_serde::serialize(lookup(name)?, ser)?;
                }
                Self::Estimate { name } => {
                    let record = lookup(name)?;
                    erased_serde::serialize(
                        &Valuation {
                            record,
                            estimate: Money {
                                unit: session.config.offer.currency,
                                amount: session
                                    .config
                                    .offer
                                    .rounding
                                    .apply(estimate_part(record, &session.config, session.today)),
                            },
                        },
                        ser,
                    )?;
                }
            }

            Ok(())
        }
    }
}

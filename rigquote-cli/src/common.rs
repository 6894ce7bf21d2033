use anyhow::Context as _;
use async_trait::async_trait;
use erased_serde::Serializer;
use rigquote_core::{
    cache::{DatasetSources, PartCache},
    chrono::NaiveDate,
    common::Client,
    config::ValuationConfig,
    reconcile::Reconciler,
};

/// What every command runs against: the loaded configuration and the valuation date.
pub struct Session {
    pub config: ValuationConfig,
    pub today: NaiveDate,
}

impl Session {
    /// Fetch and reconcile the configured datasets.
    pub async fn cache(&self) -> anyhow::Result<PartCache> {
        let client = Client::new().context("could not set up dataset retrieval")?;
        let sources = DatasetSources::from_config(&self.config.sources, &client);
        let reconciler = Reconciler::new(self.config.reconcile.clone());
        Ok(PartCache::load(&sources, &reconciler).await)
    }
}

#[async_trait]
pub trait Run {
    async fn run(
        &self,
        session: &Session,
        serializer: &mut (dyn Serializer + Send),
    ) -> anyhow::Result<()>;
}

#[macro_export]
macro_rules! run_impl_enum {
    ($i:ident, $self:ident, $session:ident, $ser:ident, $b:block) => {
        #[async_trait::async_trait]
        impl $crate::common::Run for $i {
            async fn run(
                &$self,
                $session: &$crate::common::Session,
                $ser: &mut (dyn erased_serde::Serializer + Send),
            ) -> anyhow::Result<()> {
                $b;

                Ok(())
            }
        }
    }
}

#[macro_export]
macro_rules! run_impl_struct {
    ($i:ident, $b:ident) => {
        #[async_trait::async_trait]
        impl $crate::common::Run for $i {
            async fn run(
                &self,
                session: &$crate::common::Session,
                serializer: &mut (dyn erased_serde::Serializer + Send),
            ) -> anyhow::Result<()> {
                self.$b.run(session, serializer).await
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::{Run, Session};
    use crate::run_impl_enum;
    use erased_serde::Serializer;
    use rigquote_core::{chrono::NaiveDate, config::ValuationConfig};

    struct Today;

    run_impl_enum!(Today, self, session, ser, {
        erased_serde::serialize(&session.today.to_string(), ser)?;
    });

    #[tokio::test]
    async fn test_run_impl_enum() {
        let session = Session {
            config: ValuationConfig::default(),
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };

        let mut out = Vec::new();
        Today
            .run(
                &session,
                &mut <dyn Serializer>::erase(&mut serde_json::Serializer::new(&mut out)),
            )
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"2024-01-01\"");
    }
}

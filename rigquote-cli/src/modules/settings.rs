use structopt::StructOpt;

use crate::run_impl_enum;

#[derive(StructOpt)]
pub enum Settings {
    /// As JSON, like every other command
    Show,
    /// As TOML, ready to be saved as rigquote.toml
    Toml,
}

run_impl_enum!(Settings, self, session, ser, {
    match self {
        Self::Show => {
            erased_serde::serialize(&session.config, ser)?;
        }
        Self::Toml => {
            print!("{}", session.config.to_toml()?);
        }
    }
});

#[cfg(test)]
mod tests {
    use super::Settings;
    use crate::common::{Run, Session};
    use erased_serde::Serializer;
    use rigquote_core::{chrono::NaiveDate, config::ValuationConfig};

    #[tokio::test]
    async fn test_show_prints_config_as_json() {
        let session = Session {
            config: ValuationConfig::default(),
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };

        let mut out = Vec::new();
        Settings::Show
            .run(
                &session,
                &mut <dyn Serializer>::erase(&mut serde_json::Serializer::new(&mut out)),
            )
            .await
            .unwrap();

        let shown: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(shown["gpu"]["pricing"]["class_multiplier"], 1.5);
        assert_eq!(shown["offer"]["currency"], "EUR");
    }
}

use rigquote_core::offer::{compose_offer, OfferForm, OfferInput};
use structopt::StructOpt;
use tracing::info;

use crate::run_impl_enum;

/// The offer form, one flag per field. Numbers and choices are read leniently: anything
/// unrecognized counts as empty.
#[derive(StructOpt)]
pub struct Offer {
    /// CPU name, e.g. "AMD Ryzen 5 3600", or "AMD Ryzen 5 3600 @ 3.5" to pick a base clock
    #[structopt(long)]
    cpu: Option<String>,
    /// GPU name, optionally with its memory size, e.g. "RTX 3060-12"
    #[structopt(long)]
    gpu: Option<String>,
    /// Memory in GB
    #[structopt(long)]
    ram: Option<String>,
    /// DDR2, DDR3, DDR4 or DDR5
    #[structopt(long)]
    ram_type: Option<String>,
    /// Primary storage in GB
    #[structopt(long)]
    storage: Option<String>,
    /// SSD or HDD
    #[structopt(long)]
    storage_type: Option<String>,
    /// Secondary storage in GB
    #[structopt(long)]
    secondary_storage: Option<String>,
    #[structopt(long)]
    secondary_storage_type: Option<String>,
    /// PSU wattage
    #[structopt(long)]
    psu_wattage: Option<String>,
    /// 80 PLUS rating, e.g. "Gold"
    #[structopt(long)]
    psu_certification: Option<String>,
    /// new, like-new, used or worn
    #[structopt(long)]
    condition: Option<String>,
    /// sell (to us) or buy (from us)
    #[structopt(long)]
    transaction: Option<String>,
}

impl Offer {
    fn form(&self) -> OfferForm {
        OfferForm {
            cpu: self.cpu.clone(),
            gpu: self.gpu.clone(),
            ram: self.ram.clone(),
            ram_type: self.ram_type.clone(),
            storage: self.storage.clone(),
            storage_type: self.storage_type.clone(),
            secondary_storage: self.secondary_storage.clone(),
            secondary_storage_type: self.secondary_storage_type.clone(),
            psu_wattage: self.psu_wattage.clone(),
            psu_certification: self.psu_certification.clone(),
            condition: self.condition.clone(),
            transaction: self.transaction.clone(),
        }
    }
}

run_impl_enum!(Offer, self, session, ser, {
    let cache = session.cache().await?;
    let input = OfferInput::from_form(&self.form(), &cache)?;
    let breakdown = compose_offer(&input, &session.config, session.today)?;

    info!(total = %breakdown.total(), "offer ready");
    erased_serde::serialize(&breakdown, ser)?;
});

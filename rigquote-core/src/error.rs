use thiserror::Error;

use crate::schemas::computing::PartClass;

/// Why an offer could not be made. Both cases are the user's to fix, so the messages are
/// meant to be shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfferError {
    #[error("please complete the form: no {0} selected")]
    MissingSelection(PartClass),
    #[error("please complete the form: unknown {class} {name:?}")]
    UnknownPart { class: PartClass, name: String },
}

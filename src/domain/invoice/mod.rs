//! Invoice domain model: the entity, its lifecycle and its events.

mod events;
mod invoice;
mod status;

pub use events::{InvoiceEvent, InvoiceEventKind};
pub use invoice::{Invoice, InvoiceDraft};
pub use status::InvoiceStatus;

pub mod environment;
pub mod error;
pub mod listing;

pub use environment::Environment;
pub use error::{ErrorKind, SyncError};
pub use listing::{
    Action, AdDraft, Credentials, ExternalId, ImageAsset, ListingKey, MarketplaceListing,
    SyncCommand,
};
/// A message as delivered by the queue
pub use sync_storage::queue::QueueMessage as InboundMessage;

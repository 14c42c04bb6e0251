pub mod chunker;
pub mod connection;
pub mod delivery;
pub mod telegram;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use chunker::chunk_message;
pub use connection::{ChannelConnection, ClientFactory, ConnectionState};
pub use delivery::{DeliveryEngine, DeliveryReport, format_error_message, with_flood_wait};
pub use telegram::TelegramBotClient;
pub use traits::{ChannelClient, ChannelFuture, UploadHandle};

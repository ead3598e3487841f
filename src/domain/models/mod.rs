pub mod message;
pub mod recipient;

pub use message::BroadcastMessage;
pub use recipient::Recipient;

mod channel;
mod dispatcher;

pub use channel::{PacketChannel, PacketChannelReceiver};
pub use dispatcher::{PacketDispatcher, WORKER_QUEUE_CAPACITY};

use std::sync::Arc;

use smol::channel::{self, Receiver, Sender, TryRecvError};

use holosync_shared::{PacketSink, SendError, ViewerId};

/// A sink that queues frames for a host's own connection layer to drain
pub struct PacketChannel;

impl PacketChannel {
    pub fn unbounded() -> (Arc<dyn PacketSink>, PacketChannelReceiver) {
        let (packet_sender, packet_receiver) = channel::unbounded();
        let packet_receiver = PacketChannelReceiver::new(packet_receiver);
        (Arc::new(ChannelSink(packet_sender)), packet_receiver)
    }
}

struct ChannelSink(Sender<(ViewerId, Box<[u8]>)>);

impl PacketSink for ChannelSink {
    fn send(&self, viewer: ViewerId, payload: &[u8]) -> Result<(), SendError> {
        self.0
            .send_blocking((viewer, payload.into()))
            .map_err(|_| SendError::Disconnected { viewer })
    }
}

#[derive(Clone)]
pub struct PacketChannelReceiver {
    receiver: Receiver<(ViewerId, Box<[u8]>)>,
}

impl PacketChannelReceiver {
    fn new(receiver: Receiver<(ViewerId, Box<[u8]>)>) -> Self {
        Self { receiver }
    }

    /// Next queued frame, if any
    pub fn receive(&mut self) -> Option<(ViewerId, Box<[u8]>)> {
        match self.receiver.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    pub async fn receive_async(&mut self) -> Option<(ViewerId, Box<[u8]>)> {
        self.receiver.recv().await.ok()
    }
}

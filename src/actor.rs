//! Actors and the channels that connect them.
//!
//! Messages carry the sender's tracing span so the receiving actor can
//! handle them inside it.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::Span;

pub mod mouse;
pub mod overlay;
pub mod reactor;

pub struct Sender<Message>(UnboundedSender<(Span, Message)>);
pub type Receiver<Message> = UnboundedReceiver<(Span, Message)>;

pub fn channel<Message>() -> (Sender<Message>, Receiver<Message>) {
    let (tx, rx) = unbounded_channel();
    (Sender(tx), rx)
}

impl<Message> Sender<Message> {
    /// Queues `message` for the receiving actor. Messages to an actor that
    /// has shut down are dropped.
    pub fn send(&self, message: Message) {
        _ = self.0.send((Span::current(), message));
    }
}

impl<Message> Clone for Sender<Message> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Message> std::fmt::Debug for Sender<Message> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender").field("closed", &self.0.is_closed()).finish()
    }
}

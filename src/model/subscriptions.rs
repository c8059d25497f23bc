use tracing::trace;

use crate::common::collections::HashMap;
use crate::sys::host::{Host, SignalHandle, WindowSignal};
use crate::sys::window::WindowId;

/// Live host connections per window, at most one per `(window, signal)`.
#[derive(Debug, Default)]
pub struct SubscriptionLedger {
    entries: HashMap<WindowId, HashMap<WindowSignal, SignalHandle>>,
}

impl SubscriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects `signal` on `wid` unless a live connection already exists.
    /// Returns whether a new connection was made.
    pub fn subscribe_once(
        &mut self,
        host: &mut dyn Host,
        wid: WindowId,
        signal: WindowSignal,
    ) -> bool {
        let signals = self.entries.entry(wid).or_default();
        if signals.contains_key(&signal) {
            trace!(?wid, %signal, "Already subscribed");
            return false;
        }
        let handle = host.connect_window(wid, signal);
        signals.insert(signal, handle);
        true
    }

    pub fn unsubscribe(&mut self, host: &mut dyn Host, wid: WindowId, signal: WindowSignal) {
        let Some(signals) = self.entries.get_mut(&wid) else { return };
        if let Some(handle) = signals.remove(&signal) {
            host.disconnect_window(wid, handle);
        }
        if signals.is_empty() {
            self.entries.remove(&wid);
        }
    }

    /// Drops every connection held for `wid`. A no-op for unknown windows.
    pub fn unsubscribe_all(&mut self, host: &mut dyn Host, wid: WindowId) {
        let Some(signals) = self.entries.remove(&wid) else { return };
        for (_, handle) in signals {
            host.disconnect_window(wid, handle);
        }
    }

    pub fn is_subscribed(&self, wid: WindowId, signal: WindowSignal) -> bool {
        self.entries.get(&wid).is_some_and(|signals| signals.contains_key(&signal))
    }

    pub fn windows(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|signals| signals.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

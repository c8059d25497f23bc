pub mod registry;
pub mod subscriptions;

pub use registry::{Classification, WindowRegistry, classify};
pub use subscriptions::SubscriptionLedger;

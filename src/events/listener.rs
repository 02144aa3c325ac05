use async_trait::async_trait;

use super::SessionEvent;

/// Trait for handling session events asynchronously.
///
/// Implement this trait to create custom event listeners: audit trails,
/// metrics, notifications. Listeners are called for every dispatched
/// event; filter by matching on the variant.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &SessionEvent);
}

//! Usage dispatch
//!
//! Using a stack is the only interaction that may suspend. The inventory
//! hands a [`UsageRequest`] to its main [`InventoryUsageStrategy`] and gets a
//! [`PendingUsage`] future back. At most one such future exists per
//! inventory; it holds a guard that is released when the usage completes or
//! when the future is dropped.

use crate::error::UsageError;
use crate::item::Item;
use crate::positioning::ContainerPosition;
use crate::quantity::Quantity;
use crate::spatial::StackPosition;
use crate::stack::StackId;
use crate::strategy::StrategyKind;
use crate::usage::{StackUsageStrategy, UsageArgument, UsageState};
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Snapshot of the stack being used
#[derive(Debug, Clone)]
pub struct UsageRequest {
    pub container: ContainerPosition,
    pub position: StackPosition,
    pub stack: StackId,
    pub item: Arc<Item>,
    pub quantity: Quantity,
    /// Export of the stack's main usage strategy
    pub state: UsageState,
    pub argument: Option<UsageArgument>,
}

/// What a finished usage does to its stack
#[derive(Debug, Clone, PartialEq)]
pub enum UsageEffect {
    /// Leave the stack as it is
    Nothing,
    /// Take this quantity off the stack, removing it when emptied
    Consume(Quantity),
    /// Import this state into the stack's main usage strategy
    UpdateState(UsageState),
}

/// Inventory-level usage behavior
#[async_trait]
pub trait InventoryUsageStrategy: fmt::Debug + Send + Sync {
    /// Strategy kind
    fn kind(&self) -> StrategyKind;

    /// Whether stacks with this main usage strategy may enter the inventory
    fn accepts(&self, strategy: &dyn StackUsageStrategy) -> bool;

    /// Run the interaction
    async fn use_stack(&self, request: UsageRequest) -> Result<UsageEffect, UsageError>;
}

/// Accepts every stack and does nothing on use
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInventoryUsage;

impl NullInventoryUsage {
    pub const KIND: StrategyKind = StrategyKind::new("null-inventory-usage");
}

#[async_trait]
impl InventoryUsageStrategy for NullInventoryUsage {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn accepts(&self, _strategy: &dyn StackUsageStrategy) -> bool {
        true
    }

    async fn use_stack(&self, _request: UsageRequest) -> Result<UsageEffect, UsageError> {
        Ok(UsageEffect::Nothing)
    }
}

/// Consumes one unit per use
///
/// An integer argument overrides the amount for integral stacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsumingUsage;

impl ConsumingUsage {
    pub const KIND: StrategyKind = StrategyKind::new("consuming");
}

#[async_trait]
impl InventoryUsageStrategy for ConsumingUsage {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn accepts(&self, _strategy: &dyn StackUsageStrategy) -> bool {
        true
    }

    async fn use_stack(&self, request: UsageRequest) -> Result<UsageEffect, UsageError> {
        let amount = match (request.quantity, &request.argument) {
            (Quantity::Unstacked(_), _) => Quantity::Unstacked(true),
            (Quantity::Integral(_), Some(UsageState::Int(amount))) if *amount > 0 => {
                Quantity::Integral(*amount)
            }
            (Quantity::Integral(_), Some(UsageState::Int(amount))) => {
                return Err(UsageError::Rejected(format!("cannot consume {}", amount)))
            }
            (Quantity::Integral(_), _) => Quantity::Integral(1),
            (Quantity::Fractional(_), _) => Quantity::Fractional(1.0),
        };
        Ok(UsageEffect::Consume(amount))
    }
}

/// Re-entrancy flag of one inventory
#[derive(Debug, Clone, Default)]
pub(crate) struct UsageGate(Arc<AtomicBool>);

impl UsageGate {
    pub(crate) fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn acquire(&self) -> Option<UsageGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| UsageGuard(Arc::clone(&self.0)))
    }
}

/// Holds the re-entrancy flag until dropped
#[derive(Debug)]
pub struct UsageGuard(Arc<AtomicBool>);

impl Drop for UsageGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Finished usage, to be handed back to the inventory
#[derive(Debug)]
pub struct UsageCompletion {
    pub container: ContainerPosition,
    pub position: StackPosition,
    pub stack: StackId,
    pub result: Result<UsageEffect, UsageError>,
}

/// In-flight usage
pub struct PendingUsage {
    container: ContainerPosition,
    position: StackPosition,
    stack: StackId,
    future: BoxFuture<'static, Result<UsageEffect, UsageError>>,
    guard: Option<UsageGuard>,
}

impl PendingUsage {
    pub(crate) fn new(
        container: ContainerPosition,
        position: StackPosition,
        stack: StackId,
        future: BoxFuture<'static, Result<UsageEffect, UsageError>>,
        guard: UsageGuard,
    ) -> Self {
        Self {
            container,
            position,
            stack,
            future,
            guard: Some(guard),
        }
    }

    /// Stack being used
    pub fn stack(&self) -> StackId {
        self.stack
    }
}

impl fmt::Debug for PendingUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUsage")
            .field("container", &self.container)
            .field("position", &self.position)
            .field("stack", &self.stack)
            .field("active", &self.guard.is_some())
            .finish()
    }
}

impl Future for PendingUsage {
    type Output = UsageCompletion;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match this.future.as_mut().poll(cx) {
            Poll::Ready(result) => {
                this.guard.take();
                Poll::Ready(UsageCompletion {
                    container: this.container,
                    position: this.position,
                    stack: this.stack,
                    result,
                })
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::QuantityKind;

    fn request(quantity: Quantity, argument: Option<UsageArgument>) -> UsageRequest {
        let item = Item::builder("test", 1)
            .with_quantity(QuantityKind::integral(10))
            .build()
            .unwrap();
        let stack = Item::create(&item, Quantity::Integral(1), None).unwrap();
        UsageRequest {
            container: ContainerPosition::SINGLE,
            position: 0,
            stack: stack.id(),
            item,
            quantity,
            state: UsageState::None,
            argument,
        }
    }

    #[test]
    fn test_gate() {
        let gate = UsageGate::default();
        let guard = gate.acquire().unwrap();
        assert!(gate.is_busy());
        assert!(gate.acquire().is_none());
        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.acquire().is_some());
    }

    #[tokio::test]
    async fn test_pending_releases_on_completion() {
        let gate = UsageGate::default();
        let request = request(Quantity::Integral(3), None);
        let strategy: Arc<dyn InventoryUsageStrategy> = Arc::new(ConsumingUsage);
        let (container, position, stack) = (request.container, request.position, request.stack);
        let future: BoxFuture<'static, _> = Box::pin(async move { strategy.use_stack(request).await });

        let pending = PendingUsage::new(container, position, stack, future, gate.acquire().unwrap());
        assert!(gate.is_busy());
        let completion = pending.await;
        assert!(!gate.is_busy());
        assert_eq!(
            completion.result.unwrap(),
            UsageEffect::Consume(Quantity::Integral(1))
        );
    }

    #[tokio::test]
    async fn test_consuming_argument() {
        let effect = ConsumingUsage
            .use_stack(request(Quantity::Integral(5), Some(UsageState::Int(3))))
            .await
            .unwrap();
        assert_eq!(effect, UsageEffect::Consume(Quantity::Integral(3)));

        let rejected = ConsumingUsage
            .use_stack(request(Quantity::Integral(5), Some(UsageState::Int(0))))
            .await;
        assert!(matches!(rejected, Err(UsageError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_null_usage() {
        let effect = NullInventoryUsage
            .use_stack(request(Quantity::Integral(1), None))
            .await
            .unwrap();
        assert_eq!(effect, UsageEffect::Nothing);
    }
}

//! Presentation collaborators
//!
//! The inventory pushes state changes into a [`RenderingStrategy`]. The
//! [`RenderingBroadcaster`] fans one container's changes out to any number of
//! [`RenderingListener`]s.

use crate::item::Item;
use crate::positioning::ContainerPosition;
use crate::quantity::Quantity;
use crate::spatial::StackPosition;
use crate::stack::Stack;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Receives every state change of an inventory
pub trait RenderingStrategy: fmt::Debug + Send {
    /// Every container was discarded
    fn everything_was_cleared(&mut self);

    /// A stack was placed or changed
    fn stack_was_updated(&mut self, container: ContainerPosition, position: StackPosition, stack: &Stack);

    /// The stack at a position is gone
    fn stack_was_removed(&mut self, container: ContainerPosition, position: StackPosition);
}

impl<R: RenderingStrategy + ?Sized> RenderingStrategy for Arc<Mutex<R>> {
    fn everything_was_cleared(&mut self) {
        self.lock().everything_was_cleared();
    }

    fn stack_was_updated(&mut self, container: ContainerPosition, position: StackPosition, stack: &Stack) {
        self.lock().stack_was_updated(container, position, stack);
    }

    fn stack_was_removed(&mut self, container: ContainerPosition, position: StackPosition) {
        self.lock().stack_was_removed(container, position);
    }
}

/// Rendering strategy that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRendering;

impl RenderingStrategy for NullRendering {
    fn everything_was_cleared(&mut self) {}

    fn stack_was_updated(&mut self, _container: ContainerPosition, _position: StackPosition, _stack: &Stack) {}

    fn stack_was_removed(&mut self, _container: ContainerPosition, _position: StackPosition) {}
}

/// Presentation layer attached to a broadcaster
pub trait RenderingListener: fmt::Debug + Send {
    /// Attached to a broadcaster
    fn connected(&mut self) {}

    /// Show `quantity` of `item` at `position`
    fn update_stack(&mut self, position: StackPosition, item: &Arc<Item>, quantity: Quantity);

    /// Show nothing at `position`
    fn remove_stack(&mut self, position: StackPosition);

    /// Show nothing at all
    fn clear(&mut self);

    /// Detached from its broadcaster
    fn disconnected(&mut self) {}
}

impl<L: RenderingListener + ?Sized> RenderingListener for Arc<Mutex<L>> {
    fn connected(&mut self) {
        self.lock().connected();
    }

    fn update_stack(&mut self, position: StackPosition, item: &Arc<Item>, quantity: Quantity) {
        self.lock().update_stack(position, item, quantity);
    }

    fn remove_stack(&mut self, position: StackPosition) {
        self.lock().remove_stack(position);
    }

    fn clear(&mut self) {
        self.lock().clear();
    }

    fn disconnected(&mut self) {
        self.lock().disconnected();
    }
}

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Fans the changes of one container out to listeners
#[derive(Debug)]
pub struct RenderingBroadcaster {
    container: ContainerPosition,
    listeners: Vec<(ListenerId, Box<dyn RenderingListener>)>,
    next_id: u64,
}

impl Default for RenderingBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderingBroadcaster {
    /// Broadcaster for the single container
    pub fn new() -> Self {
        Self {
            container: ContainerPosition::SINGLE,
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Watch another container position
    pub fn with_container(mut self, container: ContainerPosition) -> Self {
        self.container = container;
        self
    }

    /// Watched container position
    pub fn container(&self) -> ContainerPosition {
        self.container
    }

    /// Number of listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if no listener is attached
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Attach a listener
    pub fn add_listener(&mut self, listener: impl RenderingListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        let mut listener: Box<dyn RenderingListener> = Box::new(listener);
        listener.connected();
        self.listeners.push((id, listener));
        log::debug!("Connected rendering listener {:?}", id);
        id
    }

    /// Detach a listener
    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn RenderingListener>> {
        let index = self.listeners.iter().position(|(candidate, _)| *candidate == id)?;
        let (_, mut listener) = self.listeners.remove(index);
        listener.disconnected();
        log::debug!("Disconnected rendering listener {:?}", id);
        Some(listener)
    }

    /// Detach every listener
    pub fn disconnect_all(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.disconnected();
        }
        self.listeners.clear();
    }

    /// Reset one listener and feed it the given stacks
    pub fn replay<'a>(
        &mut self,
        id: ListenerId,
        stacks: impl IntoIterator<Item = (StackPosition, &'a Stack)>,
    ) -> bool {
        let Some((_, listener)) = self.listeners.iter_mut().find(|(candidate, _)| *candidate == id) else {
            log::warn!("Replay requested for unknown listener {:?}", id);
            return false;
        };
        listener.clear();
        for (position, stack) in stacks {
            listener.update_stack(position, stack.item(), stack.quantity());
        }
        true
    }
}

impl RenderingStrategy for RenderingBroadcaster {
    fn everything_was_cleared(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.clear();
        }
    }

    fn stack_was_updated(&mut self, container: ContainerPosition, position: StackPosition, stack: &Stack) {
        if container != self.container {
            return;
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener.update_stack(position, stack.item(), stack.quantity());
        }
    }

    fn stack_was_removed(&mut self, container: ContainerPosition, position: StackPosition) {
        if container != self.container {
            return;
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener.remove_stack(position);
        }
    }
}

/// Listener that mirrors what should be on screen
#[derive(Debug, Default)]
pub struct SnapshotListener {
    connected: bool,
    entries: BTreeMap<StackPosition, (Arc<Item>, Quantity)>,
}

impl SnapshotListener {
    /// Create a new snapshot listener
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared snapshot listener
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Whether the listener is attached
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Item and quantity shown at `position`
    pub fn get(&self, position: StackPosition) -> Option<(&Arc<Item>, Quantity)> {
        self.entries.get(&position).map(|(item, quantity)| (item, *quantity))
    }

    /// Quantity shown at `position`
    pub fn quantity(&self, position: StackPosition) -> Option<Quantity> {
        self.entries.get(&position).map(|(_, quantity)| *quantity)
    }

    /// Positions with something shown
    pub fn positions(&self) -> Vec<StackPosition> {
        self.entries.keys().copied().collect()
    }

    /// Number of shown stacks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is shown
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RenderingListener for SnapshotListener {
    fn connected(&mut self) {
        self.connected = true;
    }

    fn update_stack(&mut self, position: StackPosition, item: &Arc<Item>, quantity: Quantity) {
        self.entries.insert(position, (Arc::clone(item), quantity));
    }

    fn remove_stack(&mut self, position: StackPosition) {
        self.entries.remove(&position);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn disconnected(&mut self) {
        self.connected = false;
    }
}

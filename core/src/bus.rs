use alloc::boxed::Box;
use core::fmt;
use core::hash::Hash;
use hashbrown::HashMap;
use smallvec::SmallVec;

/// A value that can be published on an [`EventBus`].
pub trait Event {
    /// Key that subscribers register against.
    type Name: Copy + Eq + Hash + fmt::Debug;

    fn name(&self) -> Self::Name;
}

pub type Handler<E> = Box<dyn FnMut(&E)>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u32);

/// Synchronous publish/subscribe channel keyed by event name.
///
/// Handlers run inline on the publisher's stack, in registration order. There
/// is no queuing and no isolation: a panicking handler unwinds into
/// [`EventBus::publish`].
pub struct EventBus<E: Event> {
    handlers: HashMap<E::Name, SmallVec<[Handler<E>; 2]>>,
    next_id: u32,
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, name: E::Name, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        self.handlers
            .entry(name)
            .or_default()
            .push(Box::new(handler));

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        log::trace!("Subscribed {:?} to {:?}", id, name);
        id
    }

    pub fn publish(&mut self, event: E) {
        let name = event.name();
        let Some(handlers) = self.handlers.get_mut(&name) else {
            return;
        };

        log::trace!("Publishing {:?} to {} handler(s)", name, handlers.len());
        for handler in handlers.iter_mut() {
            handler(&event);
        }
    }

    pub fn handler_count(&self, name: E::Name) -> usize {
        self.handlers.get(&name).map_or(0, |handlers| handlers.len())
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(|handlers| handlers.is_empty())
    }

    /// Drops every registered handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.handlers
                    .iter()
                    .map(|(name, handlers)| (name, handlers.len())),
            )
            .finish()
    }
}

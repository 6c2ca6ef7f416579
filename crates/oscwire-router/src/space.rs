//! The OSC address space
//!
//! An ordered registry of [`Method`]s with pattern-matched dispatch.

use std::sync::{Arc, Weak};

use oscwire_core::{address, Bundle, MatchKind, Message, Packet, Result, TimeTag};
use parking_lot::RwLock;
use tracing::debug;

use crate::Method;

/// Ordered collection of registered methods
///
/// The space holds weak references: methods stay owned by their creators and
/// drop out of dispatch once released. Duplicates are allowed; registration
/// order is dispatch order.
///
/// `register`/`deregister` take the write lock and dispatch fans out under
/// the read lock, so handlers must not call back into registration on the
/// same space.
#[derive(Debug, Default)]
pub struct AddressSpace {
    methods: RwLock<Vec<Weak<Method>>>,
}

impl AddressSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method
    ///
    /// Fails with `InvalidAddress` (leaving the space unchanged) when the
    /// method's address is not fully qualified.
    pub fn register(&self, method: &Arc<Method>) -> Result<()> {
        address::validate_method_address(method.address())?;
        self.methods.write().push(Arc::downgrade(method));
        Ok(())
    }

    /// Remove a method by identity; unknown methods are a no-op
    ///
    /// Two methods registered at the same address are distinct entries; only
    /// the one passed here is removed. Dead entries are pruned on the way.
    pub fn deregister(&self, method: &Arc<Method>) {
        let target = Arc::downgrade(method);
        self.methods
            .write()
            .retain(|entry| entry.strong_count() > 0 && !entry.ptr_eq(&target));
    }

    /// Remove every registration
    pub fn deregister_all(&self) {
        self.methods.write().clear();
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.methods
            .read()
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a packet to every matching method
    ///
    /// Bundles are flattened depth-first in element order; each contained
    /// message is delivered with its innermost enclosing bundle's timetag.
    /// Delivery is prompt regardless of the timetag; handlers receive the
    /// tag and may defer on their own.
    pub fn dispatch(&self, packet: &Packet) {
        self.dispatch_element(packet, None);
    }

    fn dispatch_element(&self, packet: &Packet, time_tag: Option<TimeTag>) {
        match packet {
            Packet::Message(message) => self.dispatch_message(message, time_tag),
            Packet::Bundle(bundle) => self.dispatch_bundle(bundle),
        }
    }

    fn dispatch_bundle(&self, bundle: &Bundle) {
        for element in &bundle.elements {
            self.dispatch_element(element, Some(bundle.time_tag));
        }
    }

    /// Deliver one message, fanning out to every method whose address the
    /// message's pattern selects and whose argument requirements it meets
    pub fn dispatch_message(&self, message: &Message, time_tag: Option<TimeTag>) {
        let methods = self.methods.read();
        let mut delivered = 0usize;

        for entry in methods.iter() {
            let Some(method) = entry.upgrade() else {
                continue;
            };
            let kind = address::match_pattern(&message.address, method.address());
            if kind == MatchKind::None || !method.accepts(message) {
                continue;
            }
            method.invoke(message, kind, time_tag);
            delivered += 1;
        }

        if delivered == 0 {
            debug!("no method matched {}", message.address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_register_and_dispatch() {
        let space = AddressSpace::new();
        let hits = Arc::new(Mutex::new(0));

        let counter = hits.clone();
        let method = Arc::new(Method::new("/mixer/gain", move |_, _, _| {
            *counter.lock() += 1;
        }));
        space.register(&method).unwrap();

        space.dispatch(&Message::new("/mixer/gain").arg(0.5f32).into());
        space.dispatch(&Message::new("/mixer/pan").into());

        assert_eq!(*hits.lock(), 1);
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_invalid_address_leaves_space_unchanged() {
        let space = AddressSpace::new();
        let method = Arc::new(Method::new("/bad?addr", |_, _, _| {}));

        assert!(space.register(&method).is_err());
        assert!(space.is_empty());
    }

    #[test]
    fn test_dropped_method_is_skipped() {
        let space = AddressSpace::new();
        let method = Arc::new(Method::new("/gone", |_, _, _| {
            panic!("must not run");
        }));
        space.register(&method).unwrap();
        drop(method);

        space.dispatch(&Message::new("/gone").into());
        assert!(space.is_empty());
    }
}

//! oscwire router
//!
//! The OSC address space: handlers registered at fully qualified addresses,
//! dispatched against incoming message patterns.
//!
//! ```
//! use std::sync::Arc;
//! use oscwire_core::Message;
//! use oscwire_router::{AddressSpace, Method};
//!
//! let space = AddressSpace::new();
//! let method = Arc::new(Method::new("/mixer/channel/1/gain", |msg, _, _| {
//!     println!("gain -> {:?}", msg.args);
//! }));
//! space.register(&method).unwrap();
//!
//! space.dispatch(&Message::new("/mixer/channel/*/gain").arg(0.8f32).into());
//! ```

mod method;
mod space;

pub use method::{Handler, Method};
pub use space::AddressSpace;

pub use oscwire_core::{Error, Result};

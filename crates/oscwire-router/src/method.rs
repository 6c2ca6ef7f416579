//! Registered OSC methods

use oscwire_core::{type_tags_match, MatchKind, Message, TimeTag, TypeTag};

/// Handler invoked for every message whose pattern selects the method
///
/// Receives the message, how the pattern matched the method's address, and
/// the enclosing bundle's timetag (`None` for bare messages).
pub type Handler = dyn Fn(&Message, MatchKind, Option<TimeTag>) + Send + Sync;

/// A handler bound to one fully qualified address
///
/// Methods are owned by their creator as `Arc<Method>`; an
/// [`AddressSpace`](crate::AddressSpace) only holds weak references to them.
pub struct Method {
    address: String,
    required_args: Option<Vec<TypeTag>>,
    handler: Box<Handler>,
}

impl Method {
    pub fn new<F>(address: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Message, MatchKind, Option<TimeTag>) + Send + Sync + 'static,
    {
        Self {
            address: address.into(),
            required_args: None,
            handler: Box::new(handler),
        }
    }

    /// Require an argument shape; non-conforming messages are not delivered
    pub fn with_required_args(mut self, tags: Vec<TypeTag>) -> Self {
        self.required_args = Some(tags);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn required_args(&self) -> Option<&[TypeTag]> {
        self.required_args.as_deref()
    }

    /// Whether `message`'s arguments satisfy this method's requirements
    pub fn accepts(&self, message: &Message) -> bool {
        match &self.required_args {
            None => true,
            Some(pattern) => type_tags_match(&message.type_tags(), pattern),
        }
    }

    pub(crate) fn invoke(&self, message: &Message, kind: MatchKind, time_tag: Option<TimeTag>) {
        (self.handler)(message, kind, time_tag);
    }
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("address", &self.address)
            .field("required_args", &self.required_args)
            .finish_non_exhaustive()
    }
}

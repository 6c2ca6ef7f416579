//! OSC data model
//!
//! A [`Packet`] is either a [`Message`] (address pattern plus typed
//! arguments) or a [`Bundle`] (timetag plus nested packets). The nine
//! argument kinds form a closed universe; each serializes under exactly one
//! type tag character.

use crate::error::{Error, Result};
use crate::time::TimeTag;
use serde::{Deserialize, Serialize};

/// A single OSC argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Argument {
    Int(i32),
    Float(f32),
    String(String),
    Blob(Vec<u8>),
    TimeTag(TimeTag),
    True,
    False,
    Null,
    Impulse,
}

impl Argument {
    /// The wire type tag character for this argument
    pub fn tag(&self) -> char {
        match self {
            Argument::Int(_) => 'i',
            Argument::Float(_) => 'f',
            Argument::String(_) => 's',
            Argument::Blob(_) => 'b',
            Argument::TimeTag(_) => 't',
            Argument::True => 'T',
            Argument::False => 'F',
            Argument::Null => 'N',
            Argument::Impulse => 'I',
        }
    }

    /// The concrete [`TypeTag`] for this argument
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Argument::Int(_) => TypeTag::Int,
            Argument::Float(_) => TypeTag::Float,
            Argument::String(_) => TypeTag::String,
            Argument::Blob(_) => TypeTag::Blob,
            Argument::TimeTag(_) => TypeTag::Time,
            Argument::True => TypeTag::True,
            Argument::False => TypeTag::False,
            Argument::Null => TypeTag::Null,
            Argument::Impulse => TypeTag::Impulse,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Argument::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Argument::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Argument::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Argument::True => Some(true),
            Argument::False => Some(false),
            _ => None,
        }
    }

    pub fn as_time_tag(&self) -> Option<TimeTag> {
        match self {
            Argument::TimeTag(t) => Some(*t),
            _ => None,
        }
    }
}

// Booleans canonicalize at construction: only `True` and `False` ever exist
// at the model layer, so wire form and equality stay unambiguous.
impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        if value {
            Argument::True
        } else {
            Argument::False
        }
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Argument::Int(value)
    }
}

impl From<f32> for Argument {
    fn from(value: f32) -> Self {
        Argument::Float(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::String(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::String(value)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(value: Vec<u8>) -> Self {
        Argument::Blob(value)
    }
}

impl From<TimeTag> for Argument {
    fn from(value: TimeTag) -> Self {
        Argument::TimeTag(value)
    }
}

/// An argument type for pattern matching
///
/// The nine concrete tags serialize to the wire; `Any`, `AnyBoolean`,
/// `AnyNumber`, and `Optional` exist only in required-argument patterns.
/// `Optional` may appear only in trailing positions of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    Int,
    Float,
    String,
    Blob,
    Time,
    True,
    False,
    Null,
    Impulse,
    Any,
    AnyBoolean,
    AnyNumber,
    Optional(Box<TypeTag>),
}

impl TypeTag {
    /// Map a wire tag character to its type
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'i' => Ok(TypeTag::Int),
            'f' => Ok(TypeTag::Float),
            's' => Ok(TypeTag::String),
            'b' => Ok(TypeTag::Blob),
            't' => Ok(TypeTag::Time),
            'T' => Ok(TypeTag::True),
            'F' => Ok(TypeTag::False),
            'N' => Ok(TypeTag::Null),
            'I' => Ok(TypeTag::Impulse),
            other => Err(Error::InvalidArgumentList(format!(
                "unknown type tag character: {other:?}"
            ))),
        }
    }

    /// The wire character, or `None` for the pattern-only types
    pub fn to_char(&self) -> Option<char> {
        match self {
            TypeTag::Int => Some('i'),
            TypeTag::Float => Some('f'),
            TypeTag::String => Some('s'),
            TypeTag::Blob => Some('b'),
            TypeTag::Time => Some('t'),
            TypeTag::True => Some('T'),
            TypeTag::False => Some('F'),
            TypeTag::Null => Some('N'),
            TypeTag::Impulse => Some('I'),
            _ => None,
        }
    }

    /// Shorthand for an optional pattern position
    pub fn optional(tag: TypeTag) -> Self {
        TypeTag::Optional(Box::new(tag))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeTag::Optional(_))
    }

    fn unwrapped(&self) -> &TypeTag {
        match self {
            TypeTag::Optional(inner) => inner.as_ref(),
            other => other,
        }
    }

    /// Symmetric elementwise match between two tags
    ///
    /// `Any` matches everything; `AnyBoolean` matches `True`/`False`;
    /// `AnyNumber` matches `Int`/`Float`; `Optional` is unwrapped before
    /// comparison; anything else requires exact equality.
    pub fn matches(&self, other: &TypeTag) -> bool {
        let a = self.unwrapped();
        let b = other.unwrapped();
        match (a, b) {
            (TypeTag::Any, _) | (_, TypeTag::Any) => true,
            (TypeTag::AnyBoolean, x) | (x, TypeTag::AnyBoolean) => {
                matches!(x, TypeTag::True | TypeTag::False | TypeTag::AnyBoolean)
            }
            (TypeTag::AnyNumber, x) | (x, TypeTag::AnyNumber) => {
                matches!(x, TypeTag::Int | TypeTag::Float | TypeTag::AnyNumber)
            }
            _ => a == b,
        }
    }
}

/// Match an argument type sequence against a pattern
///
/// The pattern's required prefix (everything before its first `Optional`)
/// must be covered exactly; past that point only `Optional` positions are
/// legal, and trailing optionals may remain unmatched when `args` is short.
pub fn type_tags_match(args: &[TypeTag], pattern: &[TypeTag]) -> bool {
    if pattern.len() < args.len() {
        return false;
    }

    let required = pattern
        .iter()
        .position(TypeTag::is_optional)
        .unwrap_or(pattern.len());

    if args.len() < required {
        return false;
    }
    if !pattern[required..].iter().all(TypeTag::is_optional) {
        return false;
    }

    args.iter()
        .zip(pattern.iter())
        .all(|(arg, pat)| arg.matches(pat))
}

/// Build the wire type tag string (`,` plus one character per argument)
pub fn tag_string(args: &[Argument]) -> String {
    let mut tags = String::with_capacity(args.len() + 1);
    tags.push(',');
    for arg in args {
        tags.push(arg.tag());
    }
    tags
}

/// Parse a wire type tag string into concrete types
///
/// The leading `,` is required; `,` alone is an empty argument list.
pub fn parse_tag_string(tags: &str) -> Result<Vec<TypeTag>> {
    let body = tags.strip_prefix(',').ok_or_else(|| {
        Error::InvalidArgumentList(format!("type tag string must start with ',': {tags:?}"))
    })?;
    body.chars().map(TypeTag::from_char).collect()
}

/// An OSC message: an address pattern and its arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Slash-delimited address pattern; wildcards are legal here (they are
    /// resolved against registered method addresses at dispatch time)
    pub address: String,
    pub args: Vec<Argument>,
}

impl Message {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(address: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Append one argument (builder style)
    pub fn arg(mut self, arg: impl Into<Argument>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The concrete type tags of this message's arguments
    pub fn type_tags(&self) -> Vec<TypeTag> {
        self.args.iter().map(Argument::type_tag).collect()
    }
}

/// An OSC bundle: a timetag and a list of nested packets
///
/// Every nested bundle's timetag must be ≥ the enclosing bundle's; the codec
/// rejects violations in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub time_tag: TimeTag,
    pub elements: Vec<Packet>,
}

impl Bundle {
    pub fn new(time_tag: TimeTag) -> Self {
        Self {
            time_tag,
            elements: Vec::new(),
        }
    }

    /// Append one element (builder style)
    pub fn element(mut self, packet: impl Into<Packet>) -> Self {
        self.elements.push(packet.into());
        self
    }
}

/// A packet: the two-case sum of message and bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    Message(Message),
    Bundle(Bundle),
}

impl From<Message> for Packet {
    fn from(message: Message) -> Self {
        Packet::Message(message)
    }
}

impl From<Bundle> for Packet {
    fn from(bundle: Bundle) -> Self {
        Packet::Bundle(bundle)
    }
}

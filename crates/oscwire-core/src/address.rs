//! Address validation and pattern matching
//!
//! OSC addresses are slash-delimited paths:
//!
//! ```text
//! /mixer/channel/3/gain
//! /synth/voice/0/filter/cutoff
//! ```
//!
//! Message address patterns may carry wildcards, resolved against registered
//! method addresses:
//!
//! - `?` matches one character within a segment
//! - `*` matches a run of characters within a segment
//! - `[a-z0-9]` matches a run of characters from a set (`!` inverts)
//! - `{foo,bar}` matches the longest listed alternative
//! - `//` matches at any depth, like XPath's descendant axis
//!
//! Registered method addresses are fully qualified: wildcards and the other
//! reserved characters are rejected by [`validate_method_address`].

use crate::error::{Error, Result};

/// Characters that may not appear in a registered method address
pub const RESERVED_CHARS: &[char] = &[' ', '#', ',', '?', '*', '[', ']', '{', '}'];

/// How a message pattern relates to a method address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    /// The pattern does not select the method
    None,
    /// The pattern names a container enclosing the method
    Container,
    /// The pattern selects the method exactly
    Full,
}

/// Check that `address` is usable as a registered method address
pub fn validate_method_address(address: &str) -> Result<()> {
    if !address.starts_with('/') {
        return Err(Error::InvalidAddress(format!(
            "address must start with '/': {address:?}"
        )));
    }
    if let Some(c) = address.chars().find(|c| RESERVED_CHARS.contains(c)) {
        return Err(Error::InvalidAddress(format!(
            "reserved character {c:?} in address {address:?}"
        )));
    }
    Ok(())
}

/// Evaluate a message pattern against a fully qualified method address
pub fn match_pattern(pattern: &str, address: &str) -> MatchKind {
    match_bytes(pattern.as_bytes(), address.as_bytes())
}

fn match_bytes(pattern: &[u8], address: &[u8]) -> MatchKind {
    let mut pi = 0;
    let mut ai = 0;

    while pi < pattern.len() {
        match pattern[pi] {
            b'/' if pattern.get(pi + 1) == Some(&b'/') => {
                // Descendant: retry the remainder at every segment start of
                // the remaining address and keep the best outcome. Recursion
                // depth is bounded by the address's segment count.
                let rest = &pattern[pi + 1..];
                let mut best = MatchKind::None;
                for j in ai..address.len() {
                    if address[j] != b'/' {
                        continue;
                    }
                    best = best.max(match_bytes(rest, &address[j..]));
                    if best == MatchKind::Full {
                        return MatchKind::Full;
                    }
                }
                return best;
            }
            b'?' => {
                // exactly one character, never the segment delimiter
                if ai >= address.len() || address[ai] == b'/' {
                    return MatchKind::None;
                }
                ai += 1;
                pi += 1;
            }
            b'*' => {
                // Greedy within the segment, stopping when the next address
                // character equals the pattern character after the star.
                let next = pattern.get(pi + 1).copied();
                while ai < address.len() && address[ai] != b'/' && Some(address[ai]) != next {
                    ai += 1;
                }
                pi += 1;
            }
            b'[' => match match_char_set(&pattern[pi..], &address[ai..]) {
                Some((pattern_len, matched_len)) => {
                    pi += pattern_len;
                    ai += matched_len;
                }
                None => return MatchKind::None,
            },
            b'{' => match match_alternatives(&pattern[pi..], &address[ai..]) {
                Some((pattern_len, matched_len)) => {
                    pi += pattern_len;
                    ai += matched_len;
                }
                None => return MatchKind::None,
            },
            literal => {
                if ai >= address.len() || address[ai] != literal {
                    return MatchKind::None;
                }
                ai += 1;
                pi += 1;
            }
        }
    }

    classify(pattern, address, ai)
}

/// Outcome once the pattern is exhausted
fn classify(pattern: &[u8], address: &[u8], ai: usize) -> MatchKind {
    if ai == address.len() {
        return MatchKind::Full;
    }
    if address[ai] == b'/' {
        return MatchKind::Container;
    }
    if pattern.last() == Some(&b'/') && ai > 0 && address[ai - 1] == b'/' {
        return MatchKind::Container;
    }
    MatchKind::None
}

/// Match the head of `address` against a leading `[…]` set
///
/// A set absorbs a run of member characters within the segment: at least
/// one, then as many more as possible, stopping (like `*`) when the next
/// pattern character appears in the address. Returns `(pattern length
/// consumed, address length consumed)`, or `None` for a mismatch or a
/// malformed set (unclosed, empty, boundary dash, or one crossing a segment
/// boundary).
fn match_char_set(pattern: &[u8], address: &[u8]) -> Option<(usize, usize)> {
    let close = pattern.iter().position(|&b| b == b']')?;
    let mut set = &pattern[1..close];

    let negated = set.first() == Some(&b'!');
    if negated {
        set = &set[1..];
    }
    if set.is_empty() || set.contains(&b'/') {
        return None;
    }
    if set.first() == Some(&b'-') || set.last() == Some(&b'-') {
        return None;
    }

    let in_set = |ch: u8| {
        let mut matched = false;
        let mut i = 0;
        while i < set.len() {
            if i + 2 < set.len() && set[i + 1] == b'-' {
                if set[i] <= ch && ch <= set[i + 2] {
                    matched = true;
                }
                i += 3;
            } else {
                if set[i] == ch {
                    matched = true;
                }
                i += 1;
            }
        }
        matched != negated
    };

    match address.first() {
        Some(&first) if first != b'/' && in_set(first) => {}
        _ => return None,
    }

    let next = pattern.get(close + 1).copied();
    let mut matched_len = 1;
    while matched_len < address.len()
        && address[matched_len] != b'/'
        && Some(address[matched_len]) != next
        && in_set(address[matched_len])
    {
        matched_len += 1;
    }
    Some((close + 1, matched_len))
}

/// Match the head of `address` against a leading `{…}` alternative list
///
/// Prefers the longest alternative that prefixes the address, not source
/// order. Returns `(pattern length consumed, address length consumed)`, or
/// `None` for a mismatch or a malformed list (unclosed, or an alternative
/// containing the segment delimiter).
fn match_alternatives(pattern: &[u8], address: &[u8]) -> Option<(usize, usize)> {
    let close = pattern.iter().position(|&b| b == b'}')?;
    let body = &pattern[1..close];
    if body.contains(&b'/') {
        return None;
    }

    let mut best: Option<usize> = None;
    for alt in body.split(|&b| b == b',') {
        if address.len() >= alt.len()
            && &address[..alt.len()] == alt
            && best.map_or(true, |len| alt.len() > len)
        {
            best = Some(alt.len());
        }
    }
    best.map(|len| (close + 1, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_full_match() {
        assert_eq!(match_pattern("/a/b/c", "/a/b/c"), MatchKind::Full);
        assert_eq!(match_pattern("/a/b/c", "/a/b/d"), MatchKind::None);
    }

    #[test]
    fn test_container_match() {
        assert_eq!(match_pattern("/a/b", "/a/b/c"), MatchKind::Container);
        assert_eq!(match_pattern("/a/b/", "/a/b/c"), MatchKind::Container);
        assert_eq!(match_pattern("/a/b/c", "/a/b"), MatchKind::None);
    }

    #[test]
    fn test_star_lookahead() {
        assert_eq!(match_pattern("/f*", "/foo"), MatchKind::Full);
        assert_eq!(match_pattern("/f*o", "/fooo"), MatchKind::None);
        assert_eq!(match_pattern("/f*/x", "/foo/x"), MatchKind::Full);
        assert_eq!(match_pattern("/*", "/foo/bar"), MatchKind::Container);
    }

    #[test]
    fn test_char_set() {
        assert_eq!(match_pattern("/f[aeiou]o", "/foo"), MatchKind::Full);
        assert_eq!(match_pattern("/f[!aeiou]o", "/foo"), MatchKind::None);
        assert_eq!(match_pattern("/f[a-z]o", "/foo"), MatchKind::Full);
        assert_eq!(match_pattern("/f[0-9]o", "/foo"), MatchKind::None);
    }

    #[test]
    fn test_malformed_sets_never_match() {
        assert_eq!(match_pattern("/f[]o", "/fo"), MatchKind::None);
        assert_eq!(match_pattern("/f[-a]o", "/fao"), MatchKind::None);
        assert_eq!(match_pattern("/f[a-]o", "/fao"), MatchKind::None);
        assert_eq!(match_pattern("/f[ao", "/fao"), MatchKind::None);
        assert_eq!(match_pattern("/f[a/b]x", "/fax"), MatchKind::None);
    }

    #[test]
    fn test_alternatives_prefer_longest() {
        assert_eq!(match_pattern("/{foo,foobar}", "/foobar"), MatchKind::Full);
        assert_eq!(match_pattern("/{foobar,foo}", "/foobar"), MatchKind::Full);
        assert_eq!(match_pattern("/{foo,bar}/x", "/bar/x"), MatchKind::Full);
        assert_eq!(match_pattern("/{foo,bar}", "/baz"), MatchKind::None);
        assert_eq!(match_pattern("/{fo/o,bar}", "/bar"), MatchKind::None);
        assert_eq!(match_pattern("/{foo,bar", "/bar"), MatchKind::None);
    }

    #[test]
    fn test_descendant() {
        assert_eq!(match_pattern("//gain", "/mixer/ch/1/gain"), MatchKind::Full);
        assert_eq!(match_pattern("//ch/?", "/mixer/ch/1"), MatchKind::Full);
        assert_eq!(
            match_pattern("//ch", "/mixer/ch/1/gain"),
            MatchKind::Container
        );
        assert_eq!(match_pattern("//pan", "/mixer/ch/1/gain"), MatchKind::None);
        assert_eq!(match_pattern("/a//b", "/a/x/y/b"), MatchKind::Full);
    }

    #[test]
    fn test_validate() {
        assert!(validate_method_address("/mixer/ch/1/gain").is_ok());
        assert!(validate_method_address("no/slash").is_err());
        for bad in ["/with space", "/has#mark", "/a,b", "/a?", "/a*", "/a[b]", "/a{b}"] {
            assert!(validate_method_address(bad).is_err(), "accepted {bad:?}");
        }
    }
}

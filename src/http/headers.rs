//! Header merge policy.
//!
//! # Design Decisions
//! - Each header name has exactly one merge rule
//! - `Set-Cookie` is cumulative; every other header is last-writer-wins
//! - A later layer replaces *all* values of an overwritten header, so a
//!   layer that itself carries several values keeps them together

use axum::http::{header, HeaderMap, HeaderName};

/// How values from a later header layer combine with earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRule {
    /// Replace every earlier value.
    Overwrite,
    /// Keep earlier values and add the new ones after them.
    Append,
}

impl HeaderRule {
    pub fn for_name(name: &HeaderName) -> Self {
        if name == header::SET_COOKIE {
            HeaderRule::Append
        } else {
            HeaderRule::Overwrite
        }
    }
}

/// Merge header layers left to right.
pub fn merge_headers<'a, I>(layers: I) -> HeaderMap
where
    I: IntoIterator<Item = &'a HeaderMap>,
{
    let mut merged = HeaderMap::new();
    for layer in layers {
        for name in layer.keys() {
            if HeaderRule::for_name(name) == HeaderRule::Overwrite {
                merged.remove(name);
            }
            for value in layer.get_all(name) {
                merged.append(name.clone(), value.clone());
            }
        }
    }
    merged
}

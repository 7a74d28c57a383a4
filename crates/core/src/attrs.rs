//! Attribute value reconstruction.
//!
//! An embedded quote inside a `value="..."` attribute ends the quoted string
//! early, and the lexer then reads the remainder as further attribute names
//! and values. In the form documents the compiler reads, `value` is always
//! the last real attribute of an element, so everything after it belongs to
//! the value.

use crate::lexer::Attr;

/// Split `attrs` into the attributes before `value` and the reassembled value.
///
/// The content of the `value` token starts the value; the name and content of
/// every later token are appended verbatim, in order. Without a `value` token
/// the list is returned unchanged and the value is `None`.
pub fn reconstruct_value(attrs: Vec<Attr>) -> (Vec<Attr>, Option<String>) {
    let Some(at) = attrs.iter().position(|(name, _)| name == "value") else {
        return (attrs, None);
    };

    let mut rest = attrs;
    let tail = rest.split_off(at);
    let mut tokens = tail.into_iter();

    let mut value = tokens
        .next()
        .and_then(|(_, content)| content)
        .unwrap_or_default();
    for (name, content) in tokens {
        value.push_str(&name);
        if let Some(content) = content {
            value.push_str(&content);
        }
    }
    (rest, Some(value))
}

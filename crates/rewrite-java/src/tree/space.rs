// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Whitespace and padding wrappers.
//!
//! [`Space`] holds the exact whitespace and comments that precede a token.
//! The padding wrappers attach the formatting around punctuation that has no
//! node of its own: [`Trailing`] for the space before a following `,` `;` `.`
//! or closing delimiter, [`Leading`] for the space before a leading `=` `.`
//! or keyword, and [`Delimited`] for a parenthesized, comma separated list.

use std::fmt;
use std::sync::Arc;

use rewrite_core::text;

/// Whitespace and comments preceding a token, kept byte for byte.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Space(Option<Arc<str>>);

impl Space {
    pub const EMPTY: Space = Space(None);

    /// Build a space from raw source text.
    pub fn format(text: &str) -> Space {
        if text.is_empty() {
            Space::EMPTY
        } else {
            Space(Some(Arc::from(text)))
        }
    }

    /// A single blank.
    pub fn single() -> Space {
        Space::format(" ")
    }

    /// A line break followed by `indent`.
    pub fn newline(indent: &str) -> Space {
        Space::format(&format!("\n{}", indent))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn has_newline(&self) -> bool {
        self.as_str().contains('\n')
    }

    /// Indentation after the last line break, if the space contains one.
    pub fn indent(&self) -> Option<&str> {
        text::trailing_indent(self.as_str())
    }

    /// The same space with its last line's indentation replaced.
    pub fn with_indent(&self, indent: &str) -> Space {
        if !self.has_newline() || self.indent() == Some(indent) {
            return self.clone();
        }
        Space::format(&text::with_trailing_indent(self.as_str(), indent))
    }

    /// Comments contained in this space, with their delimiters.
    pub fn comments(&self) -> Vec<&str> {
        let s = self.as_str();
        let mut out = Vec::new();
        let mut rest = s;
        let mut offset = 0;
        while let Some(start) = rest.find('/') {
            let tail = &rest[start..];
            let len = if tail.starts_with("//") {
                tail.find('\n').unwrap_or(tail.len())
            } else if tail.starts_with("/*") {
                tail.find("*/").map(|i| i + 2).unwrap_or(tail.len())
            } else {
                1
            };
            if len > 1 {
                out.push(&s[offset + start..offset + start + len]);
            }
            offset += start + len;
            rest = &s[offset..];
        }
        out
    }
}

impl fmt::Debug for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Space({:?})", self.as_str())
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An element followed by the space before its trailing delimiter.
#[derive(Clone, Debug)]
pub struct Trailing<T> {
    pub element: T,
    pub after: Space,
}

impl<T> Trailing<T> {
    pub fn new(element: T, after: Space) -> Self {
        Trailing { element, after }
    }

    /// An element with no space before its delimiter.
    pub fn bare(element: T) -> Self {
        Trailing {
            element,
            after: Space::EMPTY,
        }
    }

    pub fn with_element(&self, element: T) -> Self {
        Trailing {
            element,
            after: self.after.clone(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Trailing<U> {
        Trailing {
            element: f(self.element),
            after: self.after,
        }
    }
}

/// An element preceded by a delimiter and the space before it.
#[derive(Clone, Debug)]
pub struct Leading<T> {
    pub before: Space,
    pub element: T,
}

impl<T> Leading<T> {
    pub fn new(before: Space, element: T) -> Self {
        Leading { before, element }
    }

    pub fn with_element(&self, element: T) -> Self {
        Leading {
            before: self.before.clone(),
            element,
        }
    }
}

/// A delimited, comma separated list such as an argument list.
///
/// An empty list holds one `Empty` element whose trailing space is the space
/// between the delimiters.
#[derive(Clone, Debug)]
pub struct Delimited<T> {
    pub before: Space,
    pub elements: Vec<Trailing<T>>,
}

impl<T> Delimited<T> {
    pub fn new(before: Space, elements: Vec<Trailing<T>>) -> Self {
        Delimited { before, elements }
    }

    pub fn with_elements(&self, elements: Vec<Trailing<T>>) -> Self {
        Delimited {
            before: self.before.clone(),
            elements,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().map(|e| &e.element)
    }
}

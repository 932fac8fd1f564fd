//! Mapping of resource names onto C identifiers.
use std::collections::HashMap;

use crate::{Error, Result};

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
///
/// The mapping is one character in, one character out, so `a.png` and `a-png`
/// both become `a_png`. Uniqueness is the job of [`Identifiers`].
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if is_ident_char(c) { c } else { '_' })
        .collect()
}

/// Returns `true` if `s` is already a usable C identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic()) && chars.all(is_ident_char)
}

/// Returns `true` for C++ keywords and the standard type names the generated
/// header relies on. These are valid identifiers but unusable as symbol names.
pub fn is_reserved(s: &str) -> bool {
    RESERVED.binary_search(&s).is_ok()
}

// Sorted for `binary_search`.
const RESERVED: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char16_t", "char32_t", "char8_t", "class", "co_await",
    "co_return", "co_yield", "compl", "concept", "const", "const_cast", "consteval",
    "constexpr", "constinit", "continue", "decltype", "default", "delete", "do", "double",
    "dynamic_cast", "else", "enum", "explicit", "export", "extern", "false", "float", "for",
    "friend", "goto", "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept",
    "not", "not_eq", "nullptr", "operator", "or", "or_eq", "private", "protected", "public",
    "register", "reinterpret_cast", "requires", "return", "short", "signed", "size_t", "sizeof",
    "static", "static_assert", "static_cast", "struct", "switch", "template", "this",
    "thread_local", "throw", "true", "try", "typedef", "typeid", "typename", "uint8_t", "union",
    "unsigned", "using", "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
];

const fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// The set of symbols claimed so far in one generated source/header pair.
#[derive(Debug, Default)]
pub(crate) struct Identifiers {
    owners: HashMap<String, String>,
}

impl Identifiers {
    /// Records `identifier` as belonging to `source`.
    ///
    /// # Errors
    /// [`Error::NameCollision`] if another source already owns the identifier,
    /// [`Error::Argument`] if it cannot start a C identifier.
    pub(crate) fn claim(&mut self, identifier: &str, source: &str) -> Result<()> {
        if !is_identifier(identifier) {
            return Err(Error::argument(format!(
                "'{source}' yields identifier '{identifier}', which must start with a letter or underscore (try a prefix)"
            )));
        }
        if let Some(first) = self.owners.get(identifier) {
            return Err(Error::NameCollision {
                identifier: identifier.to_owned(),
                first: first.clone(),
                second: source.to_owned(),
            });
        }
        self.owners.insert(identifier.to_owned(), source.to_owned());
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Translation of SQL `LIKE` patterns into filesystem globs.
//!
//! Rules, applied per path component:
//! - a component that is exactly `%%` matches one or more components
//! - `%` (or a run of them) matches within a single component
//! - everything else, `_` included, is literal
//! - a wildcard never matches the leading `.` of a hidden entry
//!
//! Repeated separators collapse and a trailing separator is ignored.
//!
//! The `wax` expression built here only drives the directory walk. It may
//! match more than the pattern allows (wax has no escape for `\`, and its
//! wildcards match dotfiles), so every walked path is checked again with
//! [`GlobPattern::matches`].

use std::path::Path;

/// One `/`-separated piece of a LIKE pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeComponent {
    /// `%%`: one or more whole components
    Recursive,
    /// Component text, `%` runs being the only wildcard
    Segment(String),
}

/// A glob expression ready for expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    /// The LIKE text as written, kept for logging
    pub like: String,
    /// Glob expression in `wax` syntax
    pub expr: String,
    /// True when the pattern contains no wildcard at all; `literal_path`
    /// then holds the path to check for
    pub literal: bool,
    pub literal_path: String,
    absolute: bool,
    components: Vec<LikeComponent>,
}

/// Characters wax 0.6 accepts after a `\` escape
const WAX_ESCAPABLE: &[char] = &[
    '?', '*', '$', ':', '<', '>', '(', ')', '[', ']', '{', '}', ',',
];

pub fn like_to_glob(like: &str) -> GlobPattern {
    let absolute = like.starts_with('/');
    let components: Vec<LikeComponent> = like
        .split('/')
        .filter(|c| !c.is_empty())
        .map(|c| match c {
            "%%" => LikeComponent::Recursive,
            _ => LikeComponent::Segment(c.to_string()),
        })
        .collect();

    let has_wildcard = like.contains('%');
    let mut parts: Vec<String> = Vec::with_capacity(components.len());
    for component in &components {
        match component {
            // wax rejects adjacent tree wildcards
            LikeComponent::Recursive if parts.last().is_some_and(|p| p == "**") => {}
            LikeComponent::Recursive => parts.push("**".to_string()),
            LikeComponent::Segment(text) => parts.push(segment_to_wax(text)),
        }
    }

    let joined = parts.join("/");
    GlobPattern {
        like: like.to_string(),
        expr: if absolute { format!("/{joined}") } else { joined },
        literal: !has_wildcard,
        literal_path: like.to_string(),
        absolute,
        components,
    }
}

fn segment_to_wax(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '%' => {
                while chars.peek() == Some(&'%') {
                    _ = chars.next();
                }
                out.push('*');
            }
            // Not expressible in wax; narrowed by `matches`
            '\\' => out.push('?'),
            c if WAX_ESCAPABLE.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

impl GlobPattern {
    /// Whether `path`, as produced by walking this pattern, satisfies it
    pub fn matches(&self, path: &Path) -> bool {
        let Some(text) = path.to_str() else {
            return false;
        };
        if text.starts_with('/') != self.absolute {
            return false;
        }
        let names: Vec<&str> = text.split('/').filter(|n| !n.is_empty()).collect();
        match_components(&self.components, &names)
    }
}

fn match_components(pattern: &[LikeComponent], names: &[&str]) -> bool {
    match pattern.split_first() {
        None => names.is_empty(),
        Some((LikeComponent::Recursive, rest)) => (1..=names.len())
            .take_while(|&taken| !is_hidden(names[taken - 1]))
            .any(|taken| match_components(rest, &names[taken..])),
        Some((LikeComponent::Segment(segment), rest)) => match names.split_first() {
            Some((name, remaining)) => {
                match_segment(segment, name) && match_components(rest, remaining)
            }
            None => false,
        },
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Match one component, where a run of `%` matches any characters
fn match_segment(segment: &str, name: &str) -> bool {
    if segment.starts_with('%') && is_hidden(name) {
        return false;
    }

    let pattern: Vec<char> = segment.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() && pattern[p] == '%' {
            while p < pattern.len() && pattern[p] == '%' {
                p += 1;
            }
            backtrack = Some((p, n));
        } else if p < pattern.len() && pattern[p] == name[n] {
            p += 1;
            n += 1;
        } else if let Some((resume, consumed)) = backtrack {
            p = resume;
            n = consumed + 1;
            backtrack = Some((resume, consumed + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '%')
}

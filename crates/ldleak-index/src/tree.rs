//! Header Tree
//!
//! Groups the chosen headers by path segment for a `tree(1)` style view:
//!
//! ```text
//! └── usr
//!     └── include
//!         ├── stdlib.h : malloc
//!         └── string.h : strcmp,strlen
//! ```

use ldleak_core::ResolvedHeader;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Dir(BTreeMap<String, Node>),
    File(Vec<String>),
}

/// Trie of chosen headers, keyed by path segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTree {
    children: BTreeMap<String, Node>,
}

impl HeaderTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tree of every chosen header and the symbols it declares
    pub fn from_resolved(resolved: &ResolvedHeader) -> Self {
        let mut tree = Self::new();
        for (header, symbols) in resolved.by_header() {
            tree.insert(header, symbols.iter().map(|s| s.to_string()).collect());
        }
        tree
    }

    /// Insert a header file with its symbols
    pub fn insert(&mut self, header: &Path, symbols: Vec<String>) {
        let mut segments: Vec<String> = header
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                Component::Prefix(p) => Some(p.as_os_str().to_string_lossy().into_owned()),
                Component::ParentDir => Some("..".to_string()),
                Component::RootDir | Component::CurDir => None,
            })
            .collect();
        let Some(file) = segments.pop() else {
            return;
        };

        let mut children = &mut self.children;
        for segment in segments {
            let node = children
                .entry(segment)
                .or_insert_with(|| Node::Dir(BTreeMap::new()));
            match node {
                Node::Dir(next) => children = next,
                Node::File(_) => return,
            }
        }
        children.insert(file, Node::File(symbols));
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

fn render(
    f: &mut fmt::Formatter<'_>,
    children: &BTreeMap<String, Node>,
    offset: &str,
) -> fmt::Result {
    let count = children.len();
    for (i, (name, node)) in children.iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└── " } else { "├── " };

        match node {
            Node::Dir(grandchildren) => {
                writeln!(f, "{}{}{}", offset, connector, name)?;
                let nested = format!("{}{}", offset, if last { "    " } else { "│   " });
                render(f, grandchildren, &nested)?;
            }
            Node::File(symbols) => {
                writeln!(f, "{}{}{} : {}", offset, connector, name, symbols.join(","))?;
            }
        }
    }
    Ok(())
}

impl fmt::Display for HeaderTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, &self.children, "")
    }
}

//! Page lookup over the menu tree
//!
//! All walks are depth-first in document order; the first match wins.

use super::{MenuNode, MenuTree};

/// A node found in the tree together with its immediate ancestor's label
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub node: &'a MenuNode,
    pub parent_label: Option<&'a str>,
}

/// Stable identity of a page inside the tree: its slug, else its url
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKey {
    Slug(String),
    Url(String),
}

impl PageKey {
    pub fn of(node: &MenuNode) -> Option<Self> {
        match (&node.slug, &node.url) {
            (Some(slug), _) if !slug.is_empty() => Some(PageKey::Slug(slug.clone())),
            (_, Some(url)) if !url.is_empty() => Some(PageKey::Url(url.clone())),
            _ => None,
        }
    }

    fn matches(&self, node: &MenuNode) -> bool {
        match self {
            PageKey::Slug(slug) => node.slug.as_deref() == Some(slug.as_str()),
            PageKey::Url(url) => node.url.as_deref() == Some(url.as_str()),
        }
    }
}

impl MenuTree {
    /// Find the entry whose `slug` equals `slug`
    pub fn find_by_slug(&self, slug: &str) -> Option<Located<'_>> {
        if slug.is_empty() {
            return None;
        }
        find_in(&self.0, None, &|node| node.slug.as_deref() == Some(slug))
    }

    /// Find the entry whose `url` ends with `path` (a page file name)
    pub fn find_by_path(&self, path: &str) -> Option<Located<'_>> {
        if path.is_empty() {
            return None;
        }
        find_in(&self.0, None, &|node| {
            node.url.as_deref().map(|url| url.ends_with(path)).unwrap_or(false)
        })
    }

    /// Resolve the current page: `item` slug first, then the path's file name
    pub fn resolve_page(&self, item: Option<&str>, path: &str) -> Option<Located<'_>> {
        item.and_then(|slug| self.find_by_slug(slug))
            .or_else(|| self.find_by_path(path))
    }

    /// Label of the immediate ancestor of `target`, found by re-walking the tree
    pub fn parent_label_of(&self, target: &MenuNode) -> Option<&str> {
        find_in(&self.0, None, &|node| std::ptr::eq(node, target))
            .and_then(|located| located.parent_label)
    }

    /// Every page (leaf) in depth-first order, with its parent label
    pub fn leaves(&self) -> Vec<Located<'_>> {
        let mut out = Vec::new();
        collect_leaves(&self.0, None, &mut out);
        out
    }

    /// The page identified by `key`
    pub fn find(&self, key: &PageKey) -> Option<Located<'_>> {
        find_in(&self.0, None, &|node| key.matches(node))
    }

    /// Mutable access to the page identified by `key`
    pub fn find_mut(&mut self, key: &PageKey) -> Option<&mut MenuNode> {
        find_mut_in(&mut self.0, key)
    }
}

fn find_in<'a>(
    nodes: &'a [MenuNode],
    parent_label: Option<&'a str>,
    pred: &dyn Fn(&MenuNode) -> bool,
) -> Option<Located<'a>> {
    for node in nodes {
        if pred(node) {
            return Some(Located { node, parent_label });
        }
        if let Some(children) = &node.submenu {
            if let Some(found) = find_in(children, Some(node.label.as_str()), pred) {
                return Some(found);
            }
        }
    }
    None
}

fn collect_leaves<'a>(nodes: &'a [MenuNode], parent_label: Option<&'a str>, out: &mut Vec<Located<'a>>) {
    for node in nodes {
        match &node.submenu {
            Some(children) => collect_leaves(children, Some(node.label.as_str()), out),
            None => out.push(Located { node, parent_label }),
        }
    }
}

fn find_mut_in<'a>(nodes: &'a mut [MenuNode], key: &PageKey) -> Option<&'a mut MenuNode> {
    for node in nodes.iter_mut() {
        if key.matches(node) {
            return Some(node);
        }
        if let Some(children) = node.submenu.as_mut() {
            if let Some(found) = find_mut_in(children, key) {
                return Some(found);
            }
        }
    }
    None
}

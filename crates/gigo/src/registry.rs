//! Parsed files grouped by package.
//!
//! A [`PackageRegistry`] lives for one compilation run. Packages keep the
//! order in which they were first seen, and files keep the order in which
//! they were added.

use indexmap::IndexMap;
use log::debug;

use gigo_core::Tree;

/// Trees by declared package name. Trees without a package clause are
/// filed under the empty name.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    packages: IndexMap<String, Vec<Tree>>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `tree` under its package and return the package name.
    pub fn add(&mut self, tree: Tree) -> String {
        let package = tree
            .find_packages()
            .first()
            .and_then(|&decl| tree.name_of(decl))
            .unwrap_or_default();
        debug!(package = package.as_str(), origin:% = tree.origin(); "Registered tree");
        self.packages.entry(package.clone()).or_default().push(tree);
        package
    }

    /// Trees of `package`, in insertion order.
    pub fn get(&self, package: &str) -> &[Tree] {
        self.packages.get(package).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Package names with their trees, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Tree])> {
        self.packages
            .iter()
            .map(|(name, trees)| (name.as_str(), trees.as_slice()))
    }

    /// Every tree, package by package.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.packages.values().flatten()
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

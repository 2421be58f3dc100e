// Index views over the catalog
// Derived category and type name lists used as the fast membership gate in
// front of the catalog tree. Handlers validate path segments against these
// before touching the data itself.

use indexmap::IndexMap;

use crate::types::Catalog;

/// Snapshot of the category names and of the type names under each category.
///
/// By default the store updates these inside the same mutation that changes
/// the catalog. In stale mode (`--stale-views`) they stay frozen at load
/// time, which reproduces the historical behavior where a freshly added
/// category was invisible to every read endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexViews {
    categories: Vec<String>,
    types: IndexMap<String, Vec<String>>,
}

impl IndexViews {
    /// Capture the current category and type names of a catalog.
    pub fn snapshot(catalog: &Catalog) -> Self {
        let categories = catalog.keys().cloned().collect();
        let types = catalog
            .iter()
            .map(|(category, group)| (category.clone(), group.keys().cloned().collect()))
            .collect();
        Self { categories, types }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Type names under a category, empty when the category is unknown.
    pub fn types_of(&self, category: &str) -> &[String] {
        self.types.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Case-sensitive category membership.
    pub fn contains_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    pub fn contains_type(&self, category: &str, ty: &str) -> bool {
        self.types_of(category).iter().any(|t| t == ty)
    }

    pub fn add_category(&mut self, name: &str) {
        if !self.contains_category(name) {
            self.categories.push(name.to_owned());
        }
        self.types.entry(name.to_owned()).or_default();
    }

    pub fn add_type(&mut self, category: &str, name: &str) {
        let types = self.types.entry(category.to_owned()).or_default();
        if !types.iter().any(|t| t == name) {
            types.push(name.to_owned());
        }
    }
}

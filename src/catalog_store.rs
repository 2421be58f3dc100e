// Flat-file catalog storage
// The whole catalog lives in memory and is serialized back to the backing
// file after every mutation. The file is the durable state; a mutation only
// reports success once the write has completed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

use crate::index_views::IndexViews;
use crate::types::{Catalog, Vehicle, VehicleGroup};

/// Failures surfaced by catalog operations. Handlers map these onto HTTP
/// statuses; anything not listed here is a server fault.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("category {0:?} not found")]
    UnknownCategory(String),
    #[error("type {1:?} not found under category {0:?}")]
    UnknownType(String, String),
    #[error("vehicle {0:?} not found")]
    UnknownVehicle(String),
    #[error("vehicle {0:?} already exists")]
    DuplicateName(String),
    #[error("category {0:?} already exists")]
    CategoryExists(String),
    #[error("type {0:?} already exists")]
    TypeExists(String),
    #[error("failed to persist catalog")]
    Persist(#[source] anyhow::Error),
}

/// The authoritative in-memory catalog plus its backing file.
///
/// Constructed once at startup and shared behind a mutex; every mutating
/// operation rewrites the whole file before returning, so the file and the
/// in-memory tree stay identical after each successful mutation.
pub struct CatalogStore {
    path: PathBuf,
    catalog: Catalog,
    views: IndexViews,
    stale_views: bool,
}

impl CatalogStore {
    /// Read and parse the backing file. A missing or unparsable file is an
    /// error; the caller treats that as fatal at startup.
    ///
    /// With `stale_views` the category/type views are frozen at this point
    /// and never refreshed, reproducing the historical snapshot behavior.
    pub async fn load(path: impl Into<PathBuf>, stale_views: bool) -> Result<Self> {
        let path = path.into();
        let raw = fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read catalog file: {}", path.display()))?;
        let catalog: Catalog = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse catalog file: {}", path.display()))?;
        let views = IndexViews::snapshot(&catalog);

        debug!(
            categories = views.categories().len(),
            stale_views, "catalog loaded from {}", path.display()
        );

        Ok(Self {
            path,
            catalog,
            views,
            stale_views,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn views(&self) -> &IndexViews {
        &self.views
    }

    pub fn category(&self, name: &str) -> Option<&VehicleGroup> {
        self.catalog.get(name)
    }

    pub fn vehicles(&self, category: &str, ty: &str) -> Option<&[Vehicle]> {
        self.catalog
            .get(category)
            .and_then(|group| group.get(ty))
            .map(Vec::as_slice)
    }

    /// First case-insensitive name match under (category, type).
    pub fn find_vehicle(&self, category: &str, ty: &str, name: &str) -> Option<&Vehicle> {
        self.vehicles(category, ty)?
            .iter()
            .find(|v| v.name_matches(name))
    }

    /// Union of vehicles matching `year` across every category and type
    /// known to the views. Records without a parseable year never match.
    pub fn vehicles_by_year(&self, year: i64) -> Vec<Vehicle> {
        let mut matches = Vec::new();
        for category in self.views.categories() {
            for ty in self.views.types_of(category) {
                if let Some(vehicles) = self.vehicles(category, ty) {
                    matches.extend(
                        vehicles
                            .iter()
                            .filter(|v| v.release_year_int() == Some(year))
                            .cloned(),
                    );
                }
            }
        }
        matches
    }

    /// Append a vehicle under (category, type). Fails on an unknown path or
    /// when a vehicle with the same name (case-insensitive) already exists,
    /// in which case the file is left untouched.
    pub async fn insert_vehicle(
        &mut self,
        category: &str,
        ty: &str,
        vehicle: Vehicle,
    ) -> Result<(), CatalogError> {
        self.require_type(category, ty)?;
        let group = self
            .catalog
            .get_mut(category)
            .and_then(|g| g.get_mut(ty))
            .ok_or_else(|| CatalogError::UnknownType(category.into(), ty.into()))?;
        if group.iter().any(|v| v.name_matches(&vehicle.name)) {
            return Err(CatalogError::DuplicateName(vehicle.name));
        }
        group.push(vehicle);
        self.persist().await
    }

    /// Replace every vehicle matching `name` (case-insensitive) under
    /// (category, type) with `vehicle`. Full-record replacement: nothing of
    /// the old records survives.
    pub async fn replace_vehicle(
        &mut self,
        category: &str,
        ty: &str,
        name: &str,
        vehicle: Vehicle,
    ) -> Result<(), CatalogError> {
        self.require_type(category, ty)?;
        let group = self
            .catalog
            .get_mut(category)
            .and_then(|g| g.get_mut(ty))
            .ok_or_else(|| CatalogError::UnknownType(category.into(), ty.into()))?;
        if !group.iter().any(|v| v.name_matches(name)) {
            return Err(CatalogError::UnknownVehicle(name.into()));
        }
        group.retain(|v| !v.name_matches(name));
        group.push(vehicle);
        self.persist().await
    }

    /// Remove every vehicle matching `name` (case-insensitive) under
    /// (category, type).
    pub async fn delete_vehicle(
        &mut self,
        category: &str,
        ty: &str,
        name: &str,
    ) -> Result<(), CatalogError> {
        self.require_type(category, ty)?;
        let group = self
            .catalog
            .get_mut(category)
            .and_then(|g| g.get_mut(ty))
            .ok_or_else(|| CatalogError::UnknownType(category.into(), ty.into()))?;
        if !group.iter().any(|v| v.name_matches(name)) {
            return Err(CatalogError::UnknownVehicle(name.into()));
        }
        group.retain(|v| !v.name_matches(name));
        self.persist().await
    }

    /// Create an empty category. The existence check is case-sensitive and
    /// runs against the views, so in stale mode it sees only the load-time
    /// category list.
    pub async fn add_category(&mut self, name: &str) -> Result<(), CatalogError> {
        if self.views.contains_category(name) {
            return Err(CatalogError::CategoryExists(name.into()));
        }
        self.catalog.insert(name.to_owned(), VehicleGroup::new());
        if !self.stale_views {
            self.views.add_category(name);
        }
        self.persist().await
    }

    /// Create an empty type list under an existing category.
    pub async fn add_type(&mut self, category: &str, name: &str) -> Result<(), CatalogError> {
        if !self.views.contains_category(category) {
            return Err(CatalogError::UnknownCategory(category.into()));
        }
        if self.views.contains_type(category, name) {
            return Err(CatalogError::TypeExists(name.into()));
        }
        self.catalog
            .entry(category.to_owned())
            .or_default()
            .insert(name.to_owned(), Vec::new());
        if !self.stale_views {
            self.views.add_type(category, name);
        }
        self.persist().await
    }

    fn require_type(&self, category: &str, ty: &str) -> Result<(), CatalogError> {
        if !self.views.contains_category(category) {
            return Err(CatalogError::UnknownCategory(category.into()));
        }
        if !self.views.contains_type(category, ty) {
            return Err(CatalogError::UnknownType(category.into(), ty.into()));
        }
        Ok(())
    }

    /// Serialize the whole catalog back to the backing file. Full overwrite,
    /// no partial updates. A crash mid-write can corrupt the store; accepted
    /// risk for this scope.
    async fn persist(&self) -> Result<(), CatalogError> {
        let json = serde_json::to_string(&self.catalog)
            .context("failed to serialize catalog")
            .map_err(CatalogError::Persist)?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("failed to write catalog file: {}", self.path.display()))
            .map_err(CatalogError::Persist)?;
        Ok(())
    }
}

//! Tenant storage.

use super::StoreError;
use crate::models::Tenant;
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use validator::Validate;

/// Trait for tenant storage implementations.
pub trait TenantStore: Send + Sync {
    /// Inserts a tenant. Names are unique, compared case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` for a duplicate name, or a
    /// validation error for an invalid tenant.
    fn insert(&self, tenant: Tenant) -> Result<(), StoreError>;

    /// Looks up a tenant.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no tenant has the id.
    fn get(&self, id: Uuid) -> Result<Tenant, StoreError>;

    /// Lists tenants ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn list(&self) -> Result<Vec<Tenant>, StoreError>;
}

/// In-memory tenant store.
#[derive(Debug, Default)]
pub struct InMemoryTenantStore {
    tenants: Arc<RwLock<Vec<Tenant>>>,
}

impl InMemoryTenantStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TenantStore for InMemoryTenantStore {
    fn insert(&self, tenant: Tenant) -> Result<(), StoreError> {
        tenant
            .validate()
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let mut tenants = self
            .tenants
            .write()
            .map_err(|_| StoreError::LockError("tenant"))?;
        if tenants
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(&tenant.name))
        {
            return Err(StoreError::AlreadyExists {
                kind: "tenant",
                id: tenant.name,
            });
        }
        tenants.push(tenant);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Tenant, StoreError> {
        let tenants = self
            .tenants
            .read()
            .map_err(|_| StoreError::LockError("tenant"))?;
        tenants
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("tenant", id))
    }

    fn list(&self) -> Result<Vec<Tenant>, StoreError> {
        let tenants = self
            .tenants
            .read()
            .map_err(|_| StoreError::LockError("tenant"))?;
        let mut listed = tenants.clone();
        listed.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(listed)
    }
}

//! Metadata registry: entity type -> label and property descriptors
//!
//! Keyed by `TypeId`. Registration is expected once at startup; re-registering
//! the same type or property overwrites the previous entry.

use indexmap::IndexMap;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use super::descriptor::{Entity, PropertyDescriptor};
use super::statement::IDENTITY_KEY;
use super::{ModelError, ModelResult};
use crate::graph::Label;

/// Everything registered for one entity type
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    /// Rust type name, for diagnostics
    pub type_name: &'static str,
    /// Bound label, if any
    pub label: Option<Label>,
    /// Declared properties in registration order
    pub properties: IndexMap<String, PropertyDescriptor>,
}

impl EntityMetadata {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            label: None,
            properties: IndexMap::new(),
        }
    }
}

/// Registry of mapped entity types
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entries: RwLock<HashMap<TypeId, EntityMetadata>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `E` to `label`. Last write wins.
    pub fn register_label<E: 'static>(&self, label: impl Into<Label>) {
        let label = label.into();
        debug!("Registering {} as :{}", type_name::<E>(), label);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(TypeId::of::<E>())
            .or_insert_with(|| EntityMetadata::new(type_name::<E>()))
            .label = Some(label);
    }

    /// Declare a property of `E`. Last write wins per property name.
    ///
    /// `_id` is reserved for the engine identity and cannot be declared.
    pub fn register_property<E: 'static>(
        &self,
        property_name: impl Into<String>,
        descriptor: PropertyDescriptor,
    ) -> ModelResult<()> {
        let property_name = property_name.into();
        if property_name == IDENTITY_KEY {
            return Err(ModelError::ReservedProperty {
                entity: type_name::<E>().to_string(),
                property: property_name,
            });
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(TypeId::of::<E>())
            .or_insert_with(|| EntityMetadata::new(type_name::<E>()))
            .properties
            .insert(property_name, descriptor);
        Ok(())
    }

    /// Register an [`Entity`]'s label and declared properties
    pub fn register<E: Entity>(&self) -> ModelResult<()> {
        // Reject before any write
        if let Some((field, _)) = E::properties().iter().find(|(field, _)| *field == IDENTITY_KEY) {
            return Err(ModelError::ReservedProperty {
                entity: type_name::<E>().to_string(),
                property: field.to_string(),
            });
        }

        self.register_label::<E>(E::LABEL);
        for (field, descriptor) in E::properties() {
            self.register_property::<E>(field, descriptor)?;
        }
        Ok(())
    }

    /// Label bound to `E`
    pub fn label<E: 'static>(&self) -> ModelResult<Label> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&TypeId::of::<E>())
            .and_then(|meta| meta.label.clone())
            .ok_or_else(|| ModelError::UnregisteredEntity(type_name::<E>().to_string()))
    }

    /// Descriptor declared for `E.property_name`
    pub fn property_descriptor<E: 'static>(
        &self,
        property_name: &str,
    ) -> Option<PropertyDescriptor> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&TypeId::of::<E>())
            .and_then(|meta| meta.properties.get(property_name).cloned())
    }

    /// All declared properties of `E`, in registration order
    pub fn properties<E: 'static>(&self) -> Vec<(String, PropertyDescriptor)> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&TypeId::of::<E>())
            .map(|meta| {
                meta.properties
                    .iter()
                    .map(|(name, d)| (name.clone(), d.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of everything registered for `E`
    pub fn metadata<E: 'static>(&self) -> Option<EntityMetadata> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&TypeId::of::<E>()).cloned()
    }

    pub fn is_registered<E: 'static>(&self) -> bool {
        self.label::<E>().is_ok()
    }
}

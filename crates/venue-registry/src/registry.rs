//! The show registry: validation, asset-first image handling and the CRUD operations
//! exposed over HTTP.
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::RegistryError,
    models::{NewShow, Show, ShowFields, ShowPatch},
    services::shows::ShowRepository,
    storage::{AssetStore, Upload},
    telemetry::SHOWS_TOTAL,
};

#[derive(Clone)]
pub struct ShowRegistry {
    repo: Arc<dyn ShowRepository>,
    assets: Arc<dyn AssetStore>,
}

impl ShowRegistry {
    pub fn new(repo: Arc<dyn ShowRepository>, assets: Arc<dyn AssetStore>) -> Self { Self { repo, assets } }

    pub fn assets(&self) -> &Arc<dyn AssetStore> { &self.assets }

    /// Validate, store the image (if any), then insert. A failed image write leaves no record behind.
    pub async fn create(&self, fields: ShowFields, image: Option<Upload>) -> Result<Show, RegistryError> {
        let new_show = NewShow::from_fields(fields)?;
        let image_ref = match image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };
        let id = Uuid::new_v4();
        let show = self.repo.insert(id, &new_show, image_ref.as_deref()).await?;
        info!(show_id=%show.id, date=%show.date, has_image=show.image.is_some(), "show.created");
        Ok(show)
    }

    pub async fn list(&self) -> Result<Vec<Show>, RegistryError> {
        let shows = self.repo.list().await?;
        SHOWS_TOTAL.set(shows.len() as i64);
        Ok(shows)
    }

    /// Merge the supplied fields into an existing show. Without an image the stored reference is kept.
    pub async fn update(&self, id: Uuid, fields: ShowFields, image: Option<Upload>) -> Result<Show, RegistryError> {
        let mut patch = ShowPatch::from_fields(fields)?;
        if !self.repo.exists(id).await? { return Err(show_not_found(id)); }
        if let Some(upload) = image {
            patch.image = Some(self.store_image(upload).await?);
        }
        let show = self.repo.update(id, &patch).await?.ok_or_else(|| show_not_found(id))?;
        info!(show_id=%id, image_replaced=patch.image.is_some(), "show.updated");
        Ok(show)
    }

    /// Remove the record. The image file stays in the asset store.
    pub async fn delete(&self, id: Uuid) -> Result<(), RegistryError> {
        if !self.repo.delete(id).await? { return Err(show_not_found(id)); }
        info!(show_id=%id, "show.deleted");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), RegistryError> {
        self.repo.ping().await.map_err(RegistryError::Storage)
    }

    /// Store an image that is not attached to any show (email fliers).
    pub async fn store_image(&self, upload: Upload) -> Result<String, RegistryError> {
        let stored = self.assets.put(&upload.file_name, upload.bytes).await?;
        Ok(stored.reference)
    }
}

pub fn show_not_found(id: Uuid) -> RegistryError { RegistryError::not_found(format!("Show {id} not found")) }

//! Project folder navigation.

use crate::error::{BridgeError, Result};
use crate::pages::ProjectPage;
use crate::vendor::{lock_api, Handle, SharedApi};

/// A folder in the project tree.
pub struct Folder {
    api: SharedApi,
    handle: Handle,
}

impl Folder {
    /// Wraps a raw folder handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// The vendor handle of this folder.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Full project path, e.g. `/experiments/run7`.
    pub fn path(&self) -> Result<String> {
        lock_api(&self.api)
            .folder_path(self.handle)
            .map_err(BridgeError::vendor)
    }

    /// Folder name (last path component).
    pub fn name(&self) -> Result<String> {
        let path = self.path()?;
        Ok(path.rsplit('/').next().unwrap_or_default().to_string())
    }

    /// Immediate subfolders.
    pub fn subfolders(&self) -> Result<Vec<Folder>> {
        let handles = lock_api(&self.api)
            .subfolders(self.handle)
            .map_err(BridgeError::vendor)?;
        Ok(handles
            .into_iter()
            .map(|handle| Folder::from_handle(self.api.clone(), handle))
            .collect())
    }

    /// Creates a subfolder.
    pub fn create_folder(&self, name: &str) -> Result<Folder> {
        let handle = lock_api(&self.api)
            .create_folder(self.handle, name)
            .map_err(BridgeError::vendor)?;
        Ok(Folder::from_handle(self.api.clone(), handle))
    }

    /// Pages directly inside this folder.
    pub fn pages(&self) -> Result<Vec<ProjectPage>> {
        let handles = lock_api(&self.api)
            .folder_pages(self.handle)
            .map_err(BridgeError::vendor)?;
        handles
            .into_iter()
            .map(|handle| ProjectPage::from_handle(self.api.clone(), handle))
            .collect()
    }

    /// Whether a page with this short or long name exists in this folder.
    pub fn has_page(&self, name: &str) -> Result<bool> {
        for page in self.pages()? {
            if page.name()? == name || page.long_name()? == name {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

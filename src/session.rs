//! Session management for the vendor application.
//!
//! A [`Session`] is the explicit handle to one open project: the vendor
//! holds plenty of hidden global state, and the bridge's answer is to thread
//! one session (and its [`SharedApi`]) through every call instead of
//! reaching for globals. The one process-wide piece of state the bridge
//! keeps itself is the registry of open project paths, which rejects double
//! opens and enforces the configured session limit.
//!
//! Dropping a session saves and shuts the vendor application down when the
//! configuration says so; use [`Session::close`] to decide explicitly.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::folder::Folder;
use crate::layers::XyTemplate;
use crate::pages::{GraphPage, MatrixPage, NotesPage, ProjectPage, WorkbookPage};
use crate::vendor::{lock_api, PageKind, SharedApi};

/// Script variable controlling the vendor window visibility.
const VISIBILITY_VAR: &str = "@VIS";

/// Paths with an active session in this process.
static ACTIVE_PROJECTS: Lazy<Mutex<HashSet<PathBuf>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

fn registry() -> std::sync::MutexGuard<'static, HashSet<PathBuf>> {
    ACTIVE_PROJECTS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Vendor display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Window hidden.
    Hidden,
    /// Window minimized.
    Minimized,
    /// Window shown at normal size.
    Normal,
    /// Window maximized.
    Maximized,
}

impl DisplayMode {
    /// The vendor's numeric display mode.
    pub fn vendor_code(self) -> f64 {
        match self {
            DisplayMode::Hidden => 0.0,
            DisplayMode::Minimized => 1.0,
            DisplayMode::Normal => 2.0,
            DisplayMode::Maximized => 3.0,
        }
    }
}

/// One open project in the vendor application.
pub struct Session {
    api: SharedApi,
    path: PathBuf,
    config: BridgeConfig,
    closed: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Opens a project: loads the file if it exists, otherwise creates a new
    /// project there (when the configuration allows it).
    ///
    /// The parent directory must exist. A second session on the same path,
    /// or one over the configured limit, is rejected before the vendor is
    /// touched.
    pub fn open(api: SharedApi, path: impl Into<PathBuf>, config: BridgeConfig) -> Result<Session> {
        config.validate()?;
        let path = path.into();

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            return Err(BridgeError::ProjectDirNotFound(dir));
        }

        {
            let mut active = registry();
            if active.contains(&path) {
                return Err(BridgeError::SessionConflict(path));
            }
            if active.len() >= config.session.max_sessions {
                return Err(BridgeError::TooManySessions(config.session.max_sessions));
            }
            active.insert(path.clone());
        }

        let mut session = Session {
            api,
            path,
            config,
            closed: false,
        };
        if let Err(err) = session.boot() {
            // Boot never opened a project; suppress the drop-save.
            session.closed = true;
            registry().remove(&session.path);
            return Err(err);
        }
        info!(path = %session.path.display(), "session opened");
        Ok(session)
    }

    fn boot(&mut self) -> Result<()> {
        let mut api = lock_api(&self.api);
        if self.path.exists() {
            api.load(&self.path).map_err(|err| BridgeError::ProjectLoad {
                path: self.path.clone(),
                reason: format!("{err:#}"),
            })?;
        } else if !self.config.session.create_missing {
            return Err(BridgeError::ProjectNotFound(self.path.clone()));
        } else {
            api.save(&self.path).map_err(|err| BridgeError::ProjectLoad {
                path: self.path.clone(),
                reason: format!("{err:#}"),
            })?;
        }
        let visibility = if self.config.session.visible { 100.0 } else { 0.0 };
        api.set_numeric_var(VISIBILITY_VAR, visibility)
            .map_err(BridgeError::vendor)?;
        Ok(())
    }

    /// The shared backend handle, for constructing wrappers directly.
    pub fn api(&self) -> SharedApi {
        self.api.clone()
    }

    /// Path of the open project.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves the project to its current path.
    pub fn save(&self) -> Result<()> {
        lock_api(&self.api)
            .save(&self.path)
            .map_err(BridgeError::vendor)
    }

    /// Saves the project to a new path and re-keys the session to it.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let new_path = path.into();
        {
            let mut active = registry();
            if new_path != self.path && active.contains(&new_path) {
                return Err(BridgeError::SessionConflict(new_path));
            }
            active.remove(&self.path);
            active.insert(new_path.clone());
        }
        lock_api(&self.api)
            .save(&new_path)
            .map_err(BridgeError::vendor)?;
        self.path = new_path;
        Ok(())
    }

    /// Closes the session, optionally saving first.
    pub fn close(mut self, save: bool) -> Result<()> {
        self.finish(save)
    }

    fn finish(&mut self, save: bool) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = {
            let mut api = lock_api(&self.api);
            let save_result = if save {
                api.save(&self.path).map_err(BridgeError::vendor)
            } else {
                Ok(())
            };
            api.shutdown();
            save_result
        };
        registry().remove(&self.path);
        info!(path = %self.path.display(), "session closed");
        result
    }

    /// Executes an application-scope script command.
    ///
    /// `exit` is intercepted and closes the session instead, honoring the
    /// save-on-close setting.
    pub fn execute(&mut self, command: &str) -> Result<()> {
        if command.trim() == "exit" {
            let save = self.config.session.save_on_close;
            return self.finish(save);
        }
        lock_api(&self.api)
            .run_command(command)
            .map_err(BridgeError::vendor)
    }

    /// Reads a numeric script variable.
    pub fn numeric_var(&self, name: &str) -> Result<f64> {
        lock_api(&self.api)
            .numeric_var(name)
            .map_err(BridgeError::vendor)
    }

    /// Sets a numeric script variable.
    pub fn set_numeric_var(&self, name: &str, value: f64) -> Result<()> {
        lock_api(&self.api)
            .set_numeric_var(name, value)
            .map_err(BridgeError::vendor)
    }

    /// Reads a string script variable.
    pub fn string_var(&self, name: &str) -> Result<String> {
        lock_api(&self.api)
            .string_var(name)
            .map_err(BridgeError::vendor)
    }

    /// Sets a string script variable.
    pub fn set_string_var(&self, name: &str, value: &str) -> Result<()> {
        lock_api(&self.api)
            .set_string_var(name, value)
            .map_err(BridgeError::vendor)
    }

    /// Shows or hides the vendor window.
    pub fn set_visible(&self, visible: bool) -> Result<()> {
        self.set_numeric_var(VISIBILITY_VAR, if visible { 100.0 } else { 0.0 })
    }

    /// Sets the vendor window display mode.
    pub fn set_display(&self, mode: DisplayMode) -> Result<()> {
        self.set_numeric_var(VISIBILITY_VAR, mode.vendor_code())
    }

    /// Root folder of the project.
    pub fn root_folder(&self) -> Result<Folder> {
        let handle = lock_api(&self.api)
            .root_folder()
            .map_err(BridgeError::vendor)?;
        Ok(Folder::from_handle(self.api.clone(), handle))
    }

    /// Creates a folder, in the root or under `parent`.
    pub fn make_folder(&self, name: &str, parent: Option<&Folder>) -> Result<Folder> {
        match parent {
            Some(folder) => folder.create_folder(name),
            None => self.root_folder()?.create_folder(name),
        }
    }

    /// All workbook pages.
    pub fn workbooks(&self) -> Result<Vec<WorkbookPage>> {
        let handles = lock_api(&self.api)
            .pages(PageKind::Workbook)
            .map_err(BridgeError::vendor)?;
        Ok(handles
            .into_iter()
            .map(|handle| WorkbookPage::from_handle(self.api.clone(), handle))
            .collect())
    }

    /// All graph pages.
    pub fn graphs(&self) -> Result<Vec<GraphPage>> {
        let handles = lock_api(&self.api)
            .pages(PageKind::Graph)
            .map_err(BridgeError::vendor)?;
        Ok(handles
            .into_iter()
            .map(|handle| GraphPage::from_handle(self.api.clone(), handle))
            .collect())
    }

    /// All matrix book pages.
    pub fn matrices(&self) -> Result<Vec<MatrixPage>> {
        let handles = lock_api(&self.api)
            .pages(PageKind::Matrix)
            .map_err(BridgeError::vendor)?;
        Ok(handles
            .into_iter()
            .map(|handle| MatrixPage::from_handle(self.api.clone(), handle))
            .collect())
    }

    /// All notes pages.
    pub fn notes(&self) -> Result<Vec<NotesPage>> {
        let handles = lock_api(&self.api)
            .pages(PageKind::Notes)
            .map_err(BridgeError::vendor)?;
        Ok(handles
            .into_iter()
            .map(|handle| NotesPage::from_handle(self.api.clone(), handle))
            .collect())
    }

    /// All pages of every kind.
    pub fn pages(&self) -> Result<Vec<ProjectPage>> {
        let mut result = Vec::new();
        for kind in [
            PageKind::Workbook,
            PageKind::Graph,
            PageKind::Matrix,
            PageKind::Notes,
        ] {
            let handles = lock_api(&self.api)
                .pages(kind)
                .map_err(BridgeError::vendor)?;
            for handle in handles {
                result.push(ProjectPage::from_handle(self.api.clone(), handle)?);
            }
        }
        Ok(result)
    }

    fn find_page(&self, kind: PageKind, name: &str) -> Result<Option<crate::vendor::Handle>> {
        let handles = lock_api(&self.api)
            .pages(kind)
            .map_err(BridgeError::vendor)?;
        let mut api = lock_api(&self.api);
        for handle in handles {
            let short = api.name(handle).map_err(BridgeError::vendor)?;
            let long = api.long_name(handle).map_err(BridgeError::vendor)?;
            if short == name || long == name {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    /// Finds a workbook by short or long name.
    pub fn find_book(&self, name: &str) -> Result<Option<WorkbookPage>> {
        Ok(self
            .find_page(PageKind::Workbook, name)?
            .map(|handle| WorkbookPage::from_handle(self.api.clone(), handle)))
    }

    /// Finds a graph page by short or long name.
    pub fn find_graph(&self, name: &str) -> Result<Option<GraphPage>> {
        Ok(self
            .find_page(PageKind::Graph, name)?
            .map(|handle| GraphPage::from_handle(self.api.clone(), handle)))
    }

    /// Finds a matrix book by short or long name.
    pub fn find_matrix(&self, name: &str) -> Result<Option<MatrixPage>> {
        Ok(self
            .find_page(PageKind::Matrix, name)?
            .map(|handle| MatrixPage::from_handle(self.api.clone(), handle)))
    }

    fn new_page(&self, kind: PageKind, name: &str, template: &str) -> Result<crate::vendor::Handle> {
        let root = self.root_folder()?;
        if root.has_page(name)? {
            return Err(BridgeError::NameConflict(name.to_string()));
        }
        lock_api(&self.api)
            .create_page(root.handle(), kind, name, template)
            .map_err(BridgeError::vendor)
    }

    /// Creates a workbook page in the root folder.
    pub fn new_workbook(&self, name: &str, template: Option<&str>) -> Result<WorkbookPage> {
        let handle = self.new_page(PageKind::Workbook, name, template.unwrap_or(""))?;
        Ok(WorkbookPage::from_handle(self.api.clone(), handle))
    }

    /// Creates a graph page in the root folder.
    pub fn new_graph(&self, name: &str, template: XyTemplate) -> Result<GraphPage> {
        let handle = self.new_page(PageKind::Graph, name, template.template_name())?;
        Ok(GraphPage::from_handle(self.api.clone(), handle))
    }

    /// Creates a matrix book page in the root folder.
    pub fn new_matrixbook(&self, name: &str, template: Option<&str>) -> Result<MatrixPage> {
        let handle = self.new_page(PageKind::Matrix, name, template.unwrap_or(""))?;
        Ok(MatrixPage::from_handle(self.api.clone(), handle))
    }

    /// Creates a notes page in the root folder.
    pub fn new_notes(&self, name: &str) -> Result<NotesPage> {
        let handle = self.new_page(PageKind::Notes, name, "")?;
        Ok(NotesPage::from_handle(self.api.clone(), handle))
    }

    /// Waits until the vendor command queue has drained.
    pub fn wait(&self) -> Result<()> {
        lock_api(&self.api)
            .run_command("sec -poc")
            .map_err(BridgeError::vendor)
    }

    /// Waits until pending recalculations have finished.
    pub fn wait_recalculate(&self) -> Result<()> {
        lock_api(&self.api)
            .run_command("run -p au")
            .map_err(BridgeError::vendor)
    }

    /// Flushes pending document updates.
    pub fn flush(&self) -> Result<()> {
        lock_api(&self.api)
            .run_command("doc -uw")
            .map_err(BridgeError::vendor)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            let save = self.config.session.save_on_close;
            if let Err(err) = self.finish(save) {
                warn!(error = %err, "session shutdown on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mode_codes() {
        assert_eq!(DisplayMode::Hidden.vendor_code(), 0.0);
        assert_eq!(DisplayMode::Maximized.vendor_code(), 3.0);
    }
}

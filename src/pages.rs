//! Typed wrappers for project pages.
//!
//! Every wrapper holds a shared backend handle plus the vendor handle of the
//! object it represents. The [`ProjectObject`] trait carries the surface all
//! vendor objects share (names, validity, activation, object-context
//! commands); page types add their own layer accessors on top.

use crate::error::{BridgeError, Result};
use crate::layers::{GraphLayer, Matrixsheet, Worksheet};
use crate::vendor::{lock_api, Handle, PageKind, SharedApi};

/// Surface shared by every vendor-side object wrapper.
pub trait ProjectObject {
    /// The shared backend this wrapper talks through.
    fn api(&self) -> &SharedApi;
    /// The vendor handle of the wrapped object.
    fn handle(&self) -> Handle;

    /// Short name of the object.
    fn name(&self) -> Result<String> {
        lock_api(self.api())
            .name(self.handle())
            .map_err(BridgeError::vendor)
    }

    /// Renames the object.
    fn set_name(&self, name: &str) -> Result<()> {
        lock_api(self.api())
            .set_name(self.handle(), name)
            .map_err(BridgeError::vendor)
    }

    /// Long (display) name of the object.
    fn long_name(&self) -> Result<String> {
        lock_api(self.api())
            .long_name(self.handle())
            .map_err(BridgeError::vendor)
    }

    /// Sets the long name.
    fn set_long_name(&self, name: &str) -> Result<()> {
        lock_api(self.api())
            .set_long_name(self.handle(), name)
            .map_err(BridgeError::vendor)
    }

    /// Whether the handle still refers to a live vendor object.
    fn is_valid(&self) -> bool {
        lock_api(self.api()).is_valid(self.handle())
    }

    /// Makes this the active object in the application.
    fn activate(&self) -> Result<()> {
        lock_api(self.api())
            .activate(self.handle())
            .map_err(BridgeError::vendor)
    }

    /// Destroys the vendor object. The wrapper is useless afterwards.
    fn destroy(&self) -> Result<()> {
        lock_api(self.api())
            .destroy(self.handle())
            .map_err(BridgeError::vendor)
    }

    /// Executes a script command in this object's context.
    fn execute(&self, command: &str) -> Result<()> {
        lock_api(self.api())
            .execute(self.handle(), command)
            .map_err(BridgeError::vendor)
    }
}

macro_rules! project_object {
    ($type:ty) => {
        impl ProjectObject for $type {
            fn api(&self) -> &SharedApi {
                &self.api
            }
            fn handle(&self) -> Handle {
                self.handle
            }
        }
    };
}

pub(crate) use project_object;

/// Workbook page holding worksheet layers.
pub struct WorkbookPage {
    api: SharedApi,
    handle: Handle,
}

impl std::fmt::Debug for WorkbookPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkbookPage")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

project_object!(WorkbookPage);

impl WorkbookPage {
    /// Wraps a raw page handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// All worksheets in this workbook.
    pub fn sheets(&self) -> Result<Vec<Worksheet>> {
        let layers = lock_api(&self.api)
            .layers(self.handle)
            .map_err(BridgeError::vendor)?;
        Ok(layers
            .into_iter()
            .map(|layer| Worksheet::from_handle(self.api.clone(), layer))
            .collect())
    }

    /// Worksheet by index.
    pub fn sheet(&self, index: usize) -> Result<Worksheet> {
        self.sheets()?.into_iter().nth(index).ok_or_else(|| {
            BridgeError::InvalidArgument(format!("worksheet index {index} out of range"))
        })
    }

    /// Appends a worksheet.
    pub fn add_sheet(&self, name: &str) -> Result<Worksheet> {
        let layer = lock_api(&self.api)
            .add_layer(self.handle, name)
            .map_err(BridgeError::vendor)?;
        Ok(Worksheet::from_handle(self.api.clone(), layer))
    }
}

/// Graph page holding graph layers.
pub struct GraphPage {
    api: SharedApi,
    handle: Handle,
}

impl std::fmt::Debug for GraphPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphPage")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

project_object!(GraphPage);

impl GraphPage {
    /// Wraps a raw page handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// All graph layers in this page.
    pub fn layers(&self) -> Result<Vec<GraphLayer>> {
        let layers = lock_api(&self.api)
            .layers(self.handle)
            .map_err(BridgeError::vendor)?;
        Ok(layers
            .into_iter()
            .map(|layer| GraphLayer::from_handle(self.api.clone(), layer))
            .collect())
    }

    /// Graph layer by index.
    pub fn layer(&self, index: usize) -> Result<GraphLayer> {
        self.layers()?.into_iter().nth(index).ok_or_else(|| {
            BridgeError::InvalidArgument(format!("graph layer index {index} out of range"))
        })
    }

    /// Appends a graph layer.
    pub fn add_layer(&self, name: &str) -> Result<GraphLayer> {
        let layer = lock_api(&self.api)
            .add_layer(self.handle, name)
            .map_err(BridgeError::vendor)?;
        Ok(GraphLayer::from_handle(self.api.clone(), layer))
    }

    /// Page width in vendor units.
    pub fn width(&self) -> Result<f64> {
        lock_api(&self.api)
            .num_prop(self.handle, "width")
            .map_err(BridgeError::vendor)
    }

    /// Sets the page width.
    pub fn set_width(&self, width: f64) -> Result<()> {
        lock_api(&self.api)
            .set_num_prop(self.handle, "width", width)
            .map_err(BridgeError::vendor)
    }

    /// Page height in vendor units.
    pub fn height(&self) -> Result<f64> {
        lock_api(&self.api)
            .num_prop(self.handle, "height")
            .map_err(BridgeError::vendor)
    }

    /// Sets the page height.
    pub fn set_height(&self, height: f64) -> Result<()> {
        lock_api(&self.api)
            .set_num_prop(self.handle, "height", height)
            .map_err(BridgeError::vendor)
    }
}

/// Matrix book page holding matrix sheets.
pub struct MatrixPage {
    api: SharedApi,
    handle: Handle,
}

project_object!(MatrixPage);

impl MatrixPage {
    /// Wraps a raw page handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// All matrix sheets in this page.
    pub fn sheets(&self) -> Result<Vec<Matrixsheet>> {
        let layers = lock_api(&self.api)
            .layers(self.handle)
            .map_err(BridgeError::vendor)?;
        Ok(layers
            .into_iter()
            .map(|layer| Matrixsheet::from_handle(self.api.clone(), layer))
            .collect())
    }

    /// Matrix sheet by index.
    pub fn sheet(&self, index: usize) -> Result<Matrixsheet> {
        self.sheets()?.into_iter().nth(index).ok_or_else(|| {
            BridgeError::InvalidArgument(format!("matrix sheet index {index} out of range"))
        })
    }
}

/// Notes page holding plain text.
pub struct NotesPage {
    api: SharedApi,
    handle: Handle,
}

project_object!(NotesPage);

impl NotesPage {
    /// Wraps a raw page handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// Text content of the notes window.
    pub fn text(&self) -> Result<String> {
        lock_api(&self.api)
            .str_prop(self.handle, "text")
            .map_err(BridgeError::vendor)
    }

    /// Replaces the text content.
    pub fn set_text(&self, text: &str) -> Result<()> {
        lock_api(&self.api)
            .set_str_prop(self.handle, "text", text)
            .map_err(BridgeError::vendor)
    }
}

/// A page of any kind, as returned by folder enumeration.
pub enum ProjectPage {
    /// Workbook page.
    Workbook(WorkbookPage),
    /// Graph page.
    Graph(GraphPage),
    /// Matrix book page.
    Matrix(MatrixPage),
    /// Notes page.
    Notes(NotesPage),
}

impl ProjectPage {
    /// Wraps a raw page handle according to its vendor-reported kind.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Result<Self> {
        let kind = lock_api(&api)
            .page_kind(handle)
            .map_err(BridgeError::vendor)?;
        Ok(match kind {
            PageKind::Workbook => ProjectPage::Workbook(WorkbookPage::from_handle(api, handle)),
            PageKind::Graph => ProjectPage::Graph(GraphPage::from_handle(api, handle)),
            PageKind::Matrix => ProjectPage::Matrix(MatrixPage::from_handle(api, handle)),
            PageKind::Notes => ProjectPage::Notes(NotesPage::from_handle(api, handle)),
        })
    }

    /// Kind of the wrapped page.
    pub fn kind(&self) -> PageKind {
        match self {
            ProjectPage::Workbook(_) => PageKind::Workbook,
            ProjectPage::Graph(_) => PageKind::Graph,
            ProjectPage::Matrix(_) => PageKind::Matrix,
            ProjectPage::Notes(_) => PageKind::Notes,
        }
    }

    /// Short name of the wrapped page.
    pub fn name(&self) -> Result<String> {
        match self {
            ProjectPage::Workbook(page) => page.name(),
            ProjectPage::Graph(page) => page.name(),
            ProjectPage::Matrix(page) => page.name(),
            ProjectPage::Notes(page) => page.name(),
        }
    }

    /// Long name of the wrapped page.
    pub fn long_name(&self) -> Result<String> {
        match self {
            ProjectPage::Workbook(page) => page.long_name(),
            ProjectPage::Graph(page) => page.long_name(),
            ProjectPage::Matrix(page) => page.long_name(),
            ProjectPage::Notes(page) => page.long_name(),
        }
    }
}

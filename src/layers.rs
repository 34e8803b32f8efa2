//! Typed wrappers for layers: worksheets, graph layers, matrix sheets, and
//! the vendor constant enums that go with them.

use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::capability::{self, AxisKind, OpArgs, Operation};
use crate::error::{BridgeError, Result};
use crate::pages::{project_object, ProjectObject};
use crate::vendor::{lock_api, Handle, SharedApi};

/// Vendor plot type constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotType {
    /// Line plot.
    Line,
    /// Scatter plot.
    Scatter,
    /// Line + symbol plot.
    LineSymbol,
    /// Column plot.
    Column,
    /// Area plot.
    Area,
    /// Contour plot.
    Contour,
}

impl PlotType {
    /// The vendor's numeric plot type id.
    pub fn vendor_code(self) -> i32 {
        match self {
            PlotType::Line => 200,
            PlotType::Scatter => 201,
            PlotType::LineSymbol => 202,
            PlotType::Column => 203,
            PlotType::Area => 204,
            PlotType::Contour => 226,
        }
    }
}

/// Vendor color map constants for plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMap {
    /// Rainbow map.
    Rainbow,
    /// Fire map.
    Fire,
    /// Gray scale map.
    GrayScale,
    /// Blue-to-red map.
    BlueRed,
    /// Viridis map.
    Viridis,
}

impl ColorMap {
    /// The vendor's numeric color map id.
    pub fn vendor_code(self) -> i32 {
        match self {
            ColorMap::Rainbow => 1,
            ColorMap::Fire => 2,
            ColorMap::GrayScale => 3,
            ColorMap::BlueRed => 4,
            ColorMap::Viridis => 5,
        }
    }

    /// Maps a vendor numeric id back to a color map.
    pub fn from_vendor_code(code: i32) -> Result<Self> {
        [
            ColorMap::Rainbow,
            ColorMap::Fire,
            ColorMap::GrayScale,
            ColorMap::BlueRed,
            ColorMap::Viridis,
        ]
        .into_iter()
        .find(|map| map.vendor_code() == code)
        .ok_or_else(|| BridgeError::Vendor(format!("unrecognized color map code {code}")))
    }
}

/// How plots in a layer are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupMode {
    /// Each plot styled independently.
    Independent,
    /// Plots grouped and styled as a family.
    Grouped,
}

impl GroupMode {
    /// The vendor's numeric group mode.
    pub fn vendor_code(self) -> i32 {
        match self {
            GroupMode::Independent => 0,
            GroupMode::Grouped => 1,
        }
    }
}

/// Vendor graph templates for new graph pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum XyTemplate {
    /// Line graph template.
    Line,
    /// Scatter graph template.
    Scatter,
    /// Line + symbol template.
    LineSymbol,
    /// Column template.
    Column,
    /// 3D line template.
    Line3d,
}

impl XyTemplate {
    /// The vendor's template name.
    pub fn template_name(self) -> &'static str {
        match self {
            XyTemplate::Line => "line",
            XyTemplate::Scatter => "scatter",
            XyTemplate::LineSymbol => "linesymb",
            XyTemplate::Column => "column",
            XyTemplate::Line3d => "line3d",
        }
    }
}

/// Worksheet layer holding columns of data.
pub struct Worksheet {
    api: SharedApi,
    handle: Handle,
}

project_object!(Worksheet);

impl Worksheet {
    /// Wraps a raw layer handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// Number of columns.
    pub fn column_count(&self) -> Result<usize> {
        lock_api(&self.api)
            .column_count(self.handle)
            .map_err(BridgeError::vendor)
    }

    /// Grows or shrinks the worksheet to `count` columns.
    pub fn set_column_count(&self, count: usize) -> Result<()> {
        lock_api(&self.api)
            .set_column_count(self.handle, count)
            .map_err(BridgeError::vendor)
    }

    /// Number of rows (longest column).
    pub fn row_count(&self) -> Result<usize> {
        lock_api(&self.api)
            .row_count(self.handle)
            .map_err(BridgeError::vendor)
    }

    /// Column by zero-based index.
    pub fn column(&self, index: usize) -> Result<Column> {
        let handle = lock_api(&self.api)
            .column(self.handle, index)
            .map_err(BridgeError::vendor)?;
        Ok(Column::from_handle(self.api.clone(), handle))
    }

    /// Loads values into a column, growing the sheet if needed, and sets
    /// the column metadata in one go.
    pub fn from_slice(
        &self,
        index: usize,
        values: &[f64],
        long_name: &str,
        units: &str,
        comments: &str,
    ) -> Result<()> {
        if self.column_count()? <= index {
            self.set_column_count(index + 1)?;
        }
        let column = self.column(index)?;
        column.set_values(values)?;
        if !long_name.is_empty() {
            column.set_long_name(long_name)?;
        }
        if !units.is_empty() {
            column.set_units(units)?;
        }
        if !comments.is_empty() {
            column.set_comments(comments)?;
        }
        Ok(())
    }

    /// Single cell value.
    pub fn cell(&self, row: usize, col: usize) -> Result<f64> {
        lock_api(&self.api)
            .cell(self.handle, row, col)
            .map_err(BridgeError::vendor)
    }
}

/// A column in a worksheet.
pub struct Column {
    api: SharedApi,
    handle: Handle,
}

project_object!(Column);

impl Column {
    /// Wraps a raw column handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// Values in this column.
    pub fn values(&self) -> Result<Vec<f64>> {
        lock_api(&self.api)
            .column_values(self.handle)
            .map_err(BridgeError::vendor)
    }

    /// Replaces the values in this column.
    pub fn set_values(&self, values: &[f64]) -> Result<()> {
        lock_api(&self.api)
            .set_column_values(self.handle, values)
            .map_err(BridgeError::vendor)
    }

    /// Units annotation.
    pub fn units(&self) -> Result<String> {
        lock_api(&self.api)
            .str_prop(self.handle, "units")
            .map_err(BridgeError::vendor)
    }

    /// Sets the units annotation.
    pub fn set_units(&self, units: &str) -> Result<()> {
        lock_api(&self.api)
            .set_str_prop(self.handle, "units", units)
            .map_err(BridgeError::vendor)
    }

    /// Comments annotation.
    pub fn comments(&self) -> Result<String> {
        lock_api(&self.api)
            .str_prop(self.handle, "comments")
            .map_err(BridgeError::vendor)
    }

    /// Sets the comments annotation.
    pub fn set_comments(&self, comments: &str) -> Result<()> {
        lock_api(&self.api)
            .set_str_prop(self.handle, "comments", comments)
            .map_err(BridgeError::vendor)
    }
}

/// Graph layer holding plots and axes.
pub struct GraphLayer {
    api: SharedApi,
    handle: Handle,
}

project_object!(GraphLayer);

impl GraphLayer {
    /// Wraps a raw layer handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// An axis of this layer.
    pub fn axis(&self, kind: AxisKind) -> Axis {
        Axis::from_handle(self.api.clone(), self.handle, kind)
    }

    /// The X axis.
    pub fn x_axis(&self) -> Axis {
        self.axis(AxisKind::X)
    }

    /// The Y axis.
    pub fn y_axis(&self) -> Axis {
        self.axis(AxisKind::Y)
    }

    /// The Z axis (3D layers).
    pub fn z_axis(&self) -> Axis {
        self.axis(AxisKind::Z)
    }

    /// The error-bar axis.
    pub fn error_axis(&self) -> Axis {
        self.axis(AxisKind::Error)
    }

    /// X axis range.
    pub fn x_range(&self) -> Result<(f64, f64)> {
        self.x_axis().range()
    }

    /// Sets the X axis range.
    pub fn set_x_range(&self, from: f64, to: f64) -> Result<()> {
        self.x_axis().set_range(from, to)
    }

    /// Y axis range.
    pub fn y_range(&self) -> Result<(f64, f64)> {
        self.y_axis().range()
    }

    /// Sets the Y axis range.
    pub fn set_y_range(&self, from: f64, to: f64) -> Result<()> {
        self.y_axis().set_range(from, to)
    }

    /// Z axis range (3D layers).
    pub fn z_range(&self) -> Result<(f64, f64)> {
        self.z_axis().range()
    }

    /// Sets the Z axis range (3D layers).
    pub fn set_z_range(&self, from: f64, to: f64) -> Result<()> {
        self.z_axis().set_range(from, to)
    }

    /// Rescales the layer to its plotted data.
    pub fn rescale(&self) -> Result<()> {
        let mut api = lock_api(&self.api);
        capability::resolve(
            &mut *api,
            self.handle,
            Operation::Rescale,
            AxisKind::X,
            &OpArgs::None,
        )?;
        Ok(())
    }

    /// Sets how plots in this layer are grouped.
    pub fn set_group_mode(&self, mode: GroupMode) -> Result<()> {
        lock_api(&self.api)
            .set_num_prop(self.handle, "group", f64::from(mode.vendor_code()))
            .map_err(BridgeError::vendor)
    }

    /// Plots an XY pair of worksheet columns into this layer.
    ///
    /// Column indices are zero-based; the vendor range designation is
    /// composed from the workbook and sheet names.
    pub fn add_xy_plot(
        &self,
        sheet: &Worksheet,
        x_col: usize,
        y_col: usize,
        plot_type: PlotType,
    ) -> Result<DataPlot> {
        let mut api = lock_api(&self.api);
        let page = api.page_of(sheet.handle()).map_err(BridgeError::vendor)?;
        let book_name = api.name(page).map_err(BridgeError::vendor)?;
        let sheet_name = api.name(sheet.handle()).map_err(BridgeError::vendor)?;
        let range = format!("[{book_name}]{sheet_name}!({},{})", x_col + 1, y_col + 1);
        let plot = api
            .add_plot(self.handle, &range, plot_type.vendor_code())
            .map_err(BridgeError::vendor)?;
        Ok(DataPlot::from_handle(self.api.clone(), plot))
    }
}

/// Matrix sheet layer for 2D array data.
pub struct Matrixsheet {
    api: SharedApi,
    handle: Handle,
}

project_object!(Matrixsheet);

impl Matrixsheet {
    /// Wraps a raw layer handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// Reshapes the matrix.
    pub fn set_shape(&self, rows: usize, cols: usize, keep_data: bool) -> Result<()> {
        lock_api(&self.api)
            .set_matrix_shape(self.handle, rows, cols, keep_data)
            .map_err(BridgeError::vendor)
    }

    /// Matrix shape as `(rows, cols)`.
    pub fn shape(&self) -> Result<(usize, usize)> {
        let mut api = lock_api(&self.api);
        let rows = api
            .num_prop(self.handle, "rows")
            .map_err(BridgeError::vendor)?;
        let cols = api
            .num_prop(self.handle, "cols")
            .map_err(BridgeError::vendor)?;
        Ok((rows as usize, cols as usize))
    }
}

/// A data plot inside a graph layer.
pub struct DataPlot {
    api: SharedApi,
    handle: Handle,
}

project_object!(DataPlot);

impl DataPlot {
    /// Wraps a raw plot handle.
    pub fn from_handle(api: SharedApi, handle: Handle) -> Self {
        Self { api, handle }
    }

    /// Color map applied to this plot.
    pub fn color_map(&self) -> Result<ColorMap> {
        let code = lock_api(&self.api)
            .num_prop(self.handle, "colormap")
            .map_err(BridgeError::vendor)?;
        ColorMap::from_vendor_code(code as i32)
    }

    /// Applies a color map to this plot.
    pub fn set_color_map(&self, map: ColorMap) -> Result<()> {
        lock_api(&self.api)
            .set_num_prop(self.handle, "colormap", f64::from(map.vendor_code()))
            .map_err(BridgeError::vendor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_type_codes_are_distinct() {
        let codes: Vec<i32> = [
            PlotType::Line,
            PlotType::Scatter,
            PlotType::LineSymbol,
            PlotType::Column,
            PlotType::Area,
            PlotType::Contour,
        ]
        .iter()
        .map(|p| p.vendor_code())
        .collect();
        let mut deduped = codes.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(codes.len(), deduped.len());
    }

    #[test]
    fn test_color_map_code_roundtrip() {
        for map in [
            ColorMap::Rainbow,
            ColorMap::Fire,
            ColorMap::GrayScale,
            ColorMap::BlueRed,
            ColorMap::Viridis,
        ] {
            assert_eq!(
                ColorMap::from_vendor_code(map.vendor_code()).expect("code"),
                map
            );
        }
    }
}

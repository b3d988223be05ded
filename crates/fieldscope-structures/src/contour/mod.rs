//! Filled contour plots of a scalar grid.
//!
//! [`ContourPlot`] copies one component of a [`GridData`] into a working
//! array (downsampling large grids on the way), then sweeps every cell of
//! that array through an evenly spaced set of levels. Each level produces a
//! filled band polygon per cell and the contour line segments at the level.

#![allow(clippy::cast_precision_loss)]

mod accumulator;
mod cell;

pub use accumulator::{AccumulatorPass, LineAccumulator, LineSegment};
pub use cell::{trace_cell, CellSink, CellTrace, ContourVertex, LevelSweep, SweepStrategy};

use glam::{DVec2, Vec4};
use serde::{Deserialize, Serialize};

use fieldscope_core::{
    ArrayData, ColorMapper, DrawCommand, DrawList, FieldscopeError, GridData, Options, Palette,
    Result, StateStore, ZExpansion,
};

/// Serializable snapshot of the user-facing plot settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourSettings {
    pub autoscale: bool,
    pub floor: f64,
    pub ceiling: f64,
    pub symmetric: bool,
    pub levels: usize,
    pub palette: Palette,
    /// Colors of a [`Palette::Custom`] palette.
    pub custom_colors: Option<Vec<Vec4>>,
    /// Expansion factor when the z scale is expanded.
    pub expansion: Option<f64>,
    pub line_color: Vec4,
    pub floor_color: Vec4,
    pub ceil_color: Vec4,
    pub show_lines: bool,
    pub show_levels: bool,
    pub interpolate_large_grids: bool,
    pub visible: bool,
    pub strategy: SweepStrategy,
}

impl Default for ContourSettings {
    fn default() -> Self {
        ContourPlot::new().settings()
    }
}

/// A contour plot of one grid component.
pub struct ContourPlot {
    options: Options,
    grid: Option<Box<dyn GridData>>,
    component: usize,
    /// Working array, `[ix * ny + iy]`.
    working: Vec<f64>,
    nx: usize,
    ny: usize,
    levels: usize,
    zmin: f64,
    zmax: f64,
    autoscale: bool,
    symmetric: bool,
    interpolate_large_grids: bool,
    expansion: Option<ZExpansion>,
    color_map: ColorMapper,
    line_color: Vec4,
    show_lines: bool,
    show_levels: bool,
    visible: bool,
    strategy: SweepStrategy,
    accumulator: LineAccumulator,
}

impl Default for ContourPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContourPlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContourPlot")
            .field("grid", &self.grid.as_ref().map(|g| (g.nx(), g.ny())))
            .field("working", &(self.nx, self.ny))
            .field("levels", &self.levels)
            .field("z", &(self.zmin, self.zmax))
            .field("autoscale", &self.autoscale)
            .field("palette", &self.color_map.palette())
            .finish_non_exhaustive()
    }
}

impl ContourPlot {
    /// Creates an empty plot with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&Options::default())
    }

    /// Creates an empty plot configured from `options`.
    #[must_use]
    pub fn with_options(options: &Options) -> Self {
        let levels = options.default_levels;
        Self {
            options: options.clone(),
            grid: None,
            component: 0,
            working: Vec::new(),
            nx: 0,
            ny: 0,
            levels,
            zmin: 0.0,
            zmax: 1.0,
            autoscale: true,
            symmetric: false,
            interpolate_large_grids: options.interpolate_large_grids,
            expansion: None,
            color_map: ColorMapper::new(levels, 0.0, 1.0, Palette::Spectrum),
            line_color: options.line_color,
            show_lines: true,
            show_levels: true,
            visible: true,
            strategy: SweepStrategy::default(),
            accumulator: LineAccumulator::new(),
        }
    }

    /// Creates a plot of `grid` and computes its working data.
    pub fn with_grid(grid: Box<dyn GridData>) -> Result<Self> {
        let mut plot = Self::new();
        plot.set_grid_data(grid);
        plot.update()?;
        Ok(plot)
    }

    /// Replaces the plotted grid. Call [`update`](Self::update) afterwards.
    pub fn set_grid_data(&mut self, grid: Box<dyn GridData>) {
        self.grid = Some(grid);
        self.resize_working();
    }

    /// Removes the grid; an empty plot draws nothing.
    pub fn clear_grid_data(&mut self) -> Option<Box<dyn GridData>> {
        let grid = self.grid.take();
        self.resize_working();
        grid
    }

    #[must_use]
    pub fn grid_data(&self) -> Option<&dyn GridData> {
        self.grid.as_deref()
    }

    pub fn grid_data_mut(&mut self) -> Option<&mut (dyn GridData + 'static)> {
        self.grid.as_deref_mut()
    }

    fn working_size(&self, n: usize) -> usize {
        if self.interpolate_large_grids && n > self.options.max_grid_size {
            self.options.interpolated_grid_size.max(2)
        } else {
            n
        }
    }

    /// Re-dimensions the working array for the current grid and interpolation flag.
    fn resize_working(&mut self) {
        let (nx, ny) = match &self.grid {
            Some(grid) => (self.working_size(grid.nx()), self.working_size(grid.ny())),
            None => (0, 0),
        };
        self.nx = nx;
        self.ny = ny;
        self.working = vec![0.0; nx * ny];
    }

    /// Working array dimensions; smaller than the grid when it is downsampled.
    #[must_use]
    pub fn working_dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Working value at `(ix, iy)`, after any z expansion.
    #[must_use]
    pub fn working_value(&self, ix: usize, iy: usize) -> Option<f64> {
        if ix >= self.nx || iy >= self.ny {
            return None;
        }
        self.working.get(ix * self.ny + iy).copied()
    }

    /// Recomputes the z range (when autoscaling) and the working array.
    pub fn update(&mut self) -> Result<()> {
        let Some(grid) = self.grid.as_deref() else {
            return Ok(());
        };
        grid.check_index(0, 0, self.component)?;

        if self.autoscale {
            let (min, max) = grid.z_range(self.component)?;
            if self.symmetric {
                self.zmax = min.abs().max(max.abs());
                self.zmin = -self.zmax;
            } else {
                self.zmin = min;
                self.zmax = max;
            }
            if let Some(expansion) = &mut self.expansion {
                expansion.set_min_max(self.zmin, self.zmax);
            }
            self.color_map.set_scale(self.zmin, self.zmax);
        }

        let (nx, ny) = (self.nx, self.ny);
        let c = self.component;
        if nx != grid.nx() || ny != grid.ny() {
            let left = grid.left();
            let top = grid.top();
            // A one-sample axis is never downsampled; keep it at its bound.
            let dx = (grid.right() - left) / (nx.max(2) - 1) as f64;
            let dy = -(top - grid.bottom()) / (ny.max(2) - 1) as f64;
            for ix in 0..nx {
                let x = left + dx * ix as f64;
                for iy in 0..ny {
                    let y = top + dy * iy as f64;
                    self.working[ix * ny + iy] = grid.interpolate(x, y, c);
                }
            }
        } else {
            let values = grid.values();
            for ix in 0..nx {
                for iy in 0..ny {
                    self.working[ix * ny + iy] = values[grid.offset(ix, iy, c)];
                }
            }
        }
        if let Some(expansion) = &self.expansion {
            for v in &mut self.working {
                *v = expansion.evaluate(*v);
            }
        }

        log::debug!(
            "contour update: grid {}x{}, working {nx}x{ny}, z [{}, {}]",
            grid.nx(),
            grid.ny(),
            self.zmin,
            self.zmax
        );
        Ok(())
    }

    /// Spacing between consecutive levels.
    #[must_use]
    pub fn level_step(&self) -> f64 {
        (self.zmax - self.zmin) / (self.levels + 1) as f64
    }

    /// Every level swept per cell: from the floor through one step above the
    /// last visible level.
    #[must_use]
    pub fn levels(&self) -> Vec<f64> {
        let step = self.level_step();
        (0..self.levels + 2)
            .map(|i| self.zmin + step * i as f64)
            .collect()
    }

    /// Fill color of each band, indexed like [`levels`](Self::levels).
    #[must_use]
    pub fn level_colors(&self) -> Vec<Vec4> {
        let last = self.levels + 1;
        self.levels()
            .into_iter()
            .enumerate()
            .map(|(i, z)| {
                if !self.autoscale && i == last {
                    self.color_map.ceil_color()
                } else {
                    self.color_map.double_to_color(z)
                }
            })
            .collect()
    }

    /// Appends the plot to `list` in world coordinates.
    ///
    /// Order: floor fill (fixed scale only), band polygons cell by cell, then
    /// one batch of contour lines and the bounding rectangle.
    pub fn draw(&self, list: &mut DrawList) {
        let Some(grid) = self.grid.as_deref() else {
            return;
        };
        if !self.visible {
            return;
        }
        if !self.autoscale && self.show_levels {
            list.push(DrawCommand::FillViewport {
                color: self.color_map.floor_color(),
            });
        }

        let colors = self.level_colors();
        let fill = self.show_levels
            && !matches!(
                self.color_map.palette(),
                Palette::Wireframe | Palette::NoRender
            );
        let mut pass = self.accumulator.begin_pass();
        let before = list.len();

        if self.nx >= 2 && self.ny >= 2 {
            let sweep = LevelSweep {
                start: self.zmin,
                step: self.level_step(),
                count: self.levels + 2,
            };
            let dx = (grid.right() - grid.left()) / (self.nx - 1) as f64;
            let dy = -(grid.top() - grid.bottom()) / (self.ny - 1) as f64;
            let mut sink = PlotSink {
                list: &mut *list,
                pass: &mut pass,
                colors: &colors,
                fill,
                lines: self.show_lines,
            };
            let ny = self.ny;
            for ix in 0..self.nx - 1 {
                let x = grid.left() + dx * ix as f64;
                for iy in 0..ny - 1 {
                    let y = grid.top() + dy * iy as f64;
                    let corners = [
                        ContourVertex::new(x, y, self.working[ix * ny + iy]),
                        ContourVertex::new(x, y + dy, self.working[ix * ny + iy + 1]),
                        ContourVertex::new(x + dx, y + dy, self.working[(ix + 1) * ny + iy + 1]),
                        ContourVertex::new(x + dx, y, self.working[(ix + 1) * ny + iy]),
                    ];
                    trace_cell(&corners, &sweep, self.strategy, &mut sink);
                }
            }
        }

        if self.show_lines {
            let segments = pass
                .to_vec()
                .iter()
                .map(|segment| [segment.start(), segment.end()])
                .collect();
            list.push(DrawCommand::StrokeSegments {
                segments,
                color: self.line_color,
            });
            list.push(DrawCommand::StrokeRect {
                min: DVec2::new(grid.left(), grid.bottom()),
                max: DVec2::new(grid.right(), grid.top()),
                color: self.line_color,
            });
        }
        log::debug!(
            "contour draw: {} commands, {} line segments",
            list.len() - before,
            pass.len()
        );
    }

    /// Segments traced by the most recent draw.
    #[must_use]
    pub fn segments(&self) -> Vec<LineSegment> {
        self.accumulator.snapshot()
    }

    /// Sets autoscaling, or fixes the z range to `[floor, ceil]`.
    pub fn set_autoscale_z(&mut self, autoscale: bool, floor: f64, ceil: f64) -> Result<()> {
        self.autoscale = autoscale;
        if autoscale {
            return self.update();
        }
        self.zmin = floor;
        self.zmax = ceil;
        if let Some(expansion) = &mut self.expansion {
            expansion.set_min_max(floor, ceil);
        }
        self.color_map.set_scale(floor, ceil);
        Ok(())
    }

    #[must_use]
    pub fn is_autoscale_z(&self) -> bool {
        self.autoscale
    }

    /// Makes autoscaling symmetric about zero. Takes effect on the next update.
    pub fn set_symmetric_z(&mut self, symmetric: bool) {
        self.symmetric = symmetric;
    }

    #[must_use]
    pub fn is_symmetric_z(&self) -> bool {
        self.symmetric
    }

    #[must_use]
    pub fn floor(&self) -> f64 {
        self.color_map.floor()
    }

    #[must_use]
    pub fn ceiling(&self) -> f64 {
        self.color_map.ceil()
    }

    /// Expands the z scale to enhance values near the middle of the range.
    pub fn set_expanded_z(&mut self, expanded: bool, factor: f64) -> Result<()> {
        if expanded {
            let mut expansion = ZExpansion::new(factor)?;
            expansion.set_min_max(self.zmin, self.zmax);
            self.expansion = Some(expansion);
        } else {
            self.expansion = None;
        }
        Ok(())
    }

    #[must_use]
    pub fn expansion(&self) -> Option<&ZExpansion> {
        self.expansion.as_ref()
    }

    /// Downsampling of large grids. Re-dimensions the working array.
    pub fn set_interpolate_large_grids(&mut self, interpolate: bool) {
        self.interpolate_large_grids = interpolate;
        self.resize_working();
    }

    #[must_use]
    pub fn is_interpolate_large_grids(&self) -> bool {
        self.interpolate_large_grids
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.color_map.set_palette(palette);
    }

    /// Selects a palette by its legacy integer code.
    pub fn set_palette_index(&mut self, index: i32) -> Result<()> {
        let palette = Palette::from_index(index).ok_or_else(|| {
            FieldscopeError::InvalidArgument(format!("unknown palette index {index}"))
        })?;
        self.set_palette(palette);
        Ok(())
    }

    /// Uses caller-supplied band colors.
    pub fn set_color_palette(&mut self, colors: Vec<Vec4>) -> Result<()> {
        self.color_map.set_custom_colors(colors)
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        self.color_map.palette()
    }

    pub fn set_floor_ceil_color(&mut self, floor_color: Vec4, ceil_color: Vec4) {
        self.color_map.set_floor_ceil_colors(floor_color, ceil_color);
    }

    #[must_use]
    pub fn color_mapper(&self) -> &ColorMapper {
        &self.color_map
    }

    pub fn set_number_of_levels(&mut self, n: usize) {
        self.levels = n;
        self.color_map.set_number_of_colors(n);
    }

    #[must_use]
    pub fn number_of_levels(&self) -> usize {
        self.levels
    }

    /// Selects the plotted component. Only the first index is used.
    pub fn set_indexes(&mut self, indexes: &[usize]) -> Result<()> {
        let &component = indexes.first().ok_or_else(|| {
            FieldscopeError::InvalidArgument("at least one component index is required".into())
        })?;
        if let Some(grid) = &self.grid {
            if component >= grid.component_count() {
                return Err(FieldscopeError::index(
                    "component",
                    component,
                    grid.component_count(),
                ));
            }
        }
        self.component = component;
        Ok(())
    }

    #[must_use]
    pub fn component(&self) -> usize {
        self.component
    }

    pub fn set_show_grid_lines(&mut self, show: bool) {
        self.show_lines = show;
    }

    #[must_use]
    pub fn is_show_grid_lines(&self) -> bool {
        self.show_lines
    }

    pub fn set_grid_line_color(&mut self, color: Vec4) {
        self.line_color = color;
    }

    #[must_use]
    pub fn grid_line_color(&self) -> Vec4 {
        self.line_color
    }

    pub fn set_show_colored_levels(&mut self, show: bool) {
        self.show_levels = show;
    }

    #[must_use]
    pub fn is_show_colored_levels(&self) -> bool {
        self.show_levels
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_sweep_strategy(&mut self, strategy: SweepStrategy) {
        self.strategy = strategy;
    }

    #[must_use]
    pub fn sweep_strategy(&self) -> SweepStrategy {
        self.strategy
    }

    /// Replaces component 0 with `values[ix][iy]` and updates.
    ///
    /// A grid of a different shape is replaced by a new single-component
    /// [`ArrayData`]. Other storage kinds are rejected.
    pub fn set_all(&mut self, values: &[Vec<f64>]) -> Result<()> {
        self.copy_values(values)?;
        self.update()
    }

    /// Like [`set_all`](Self::set_all), also setting the scale (cell or
    /// lattice, as the grid already is).
    pub fn set_all_with_scale(
        &mut self,
        values: &[Vec<f64>],
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
    ) -> Result<()> {
        self.copy_values(values)?;
        if let Some(grid) = self.grid.as_deref_mut() {
            if grid.is_cell_data() {
                grid.set_cell_scale(xmin, xmax, ymin, ymax);
            } else {
                grid.set_scale(xmin, xmax, ymin, ymax);
            }
        }
        self.update()
    }

    fn copy_values(&mut self, values: &[Vec<f64>]) -> Result<()> {
        let nx = values.len();
        let ny = values.first().map_or(0, Vec::len);
        if let Some(grid) = &self.grid {
            if !grid.as_any().is::<ArrayData>() {
                return Err(FieldscopeError::IllegalState(
                    "set_all only supports ArrayData storage".into(),
                ));
            }
        }
        let reshape = self
            .grid
            .as_ref()
            .map_or(true, |grid| grid.nx() != nx || grid.ny() != ny);
        if reshape {
            // Filled before it replaces the current grid, so a rejected
            // input leaves the plot untouched.
            let mut array = ArrayData::new(nx, ny, 1)?;
            array.set_component(0, values)?;
            self.set_grid_data(Box::new(array));
            return Ok(());
        }
        let array = self
            .grid
            .as_mut()
            .and_then(|grid| grid.as_any_mut().downcast_mut::<ArrayData>())
            .ok_or_else(|| FieldscopeError::IllegalState("no array grid to fill".into()))?;
        array.set_component(0, values)
    }

    pub fn index_to_x(&self, i: usize) -> Option<f64> {
        self.grid.as_ref().map(|g| g.index_to_x(i))
    }

    pub fn index_to_y(&self, i: usize) -> Option<f64> {
        self.grid.as_ref().map(|g| g.index_to_y(i))
    }

    pub fn x_to_index(&self, x: f64) -> Option<usize> {
        self.grid.as_ref().map(|g| g.x_to_index(x))
    }

    pub fn y_to_index(&self, y: f64) -> Option<usize> {
        self.grid.as_ref().map(|g| g.y_to_index(y))
    }

    /// Whether the plot has a grid and therefore measurable bounds.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.grid.is_some()
    }

    pub fn x_min(&self) -> Option<f64> {
        self.grid.as_ref().map(|g| g.left())
    }

    pub fn x_max(&self) -> Option<f64> {
        self.grid.as_ref().map(|g| g.right())
    }

    pub fn y_min(&self) -> Option<f64> {
        self.grid.as_ref().map(|g| g.bottom())
    }

    pub fn y_max(&self) -> Option<f64> {
        self.grid.as_ref().map(|g| g.top())
    }

    /// Snapshot of the user-facing settings.
    #[must_use]
    pub fn settings(&self) -> ContourSettings {
        let palette = self.color_map.palette();
        ContourSettings {
            autoscale: self.autoscale,
            floor: self.zmin,
            ceiling: self.zmax,
            symmetric: self.symmetric,
            levels: self.levels,
            palette,
            custom_colors: (palette == Palette::Custom).then(|| self.color_map.colors().to_vec()),
            expansion: self.expansion.as_ref().map(ZExpansion::factor),
            line_color: self.line_color,
            floor_color: self.color_map.floor_color(),
            ceil_color: self.color_map.ceil_color(),
            show_lines: self.show_lines,
            show_levels: self.show_levels,
            interpolate_large_grids: self.interpolate_large_grids,
            visible: self.visible,
            strategy: self.strategy,
        }
    }

    /// Restores settings taken with [`settings`](Self::settings).
    pub fn apply_settings(&mut self, settings: &ContourSettings) -> Result<()> {
        self.set_number_of_levels(settings.levels);
        match (&settings.palette, &settings.custom_colors) {
            (Palette::Custom, Some(colors)) => self.set_color_palette(colors.clone())?,
            (palette, _) => self.set_palette(*palette),
        }
        self.set_floor_ceil_color(settings.floor_color, settings.ceil_color);
        self.line_color = settings.line_color;
        self.show_lines = settings.show_lines;
        self.show_levels = settings.show_levels;
        self.visible = settings.visible;
        self.strategy = settings.strategy;
        self.symmetric = settings.symmetric;
        if settings.interpolate_large_grids != self.interpolate_large_grids {
            self.set_interpolate_large_grids(settings.interpolate_large_grids);
        }
        // The range must be in place before the expansion picks it up.
        self.zmin = settings.floor;
        self.zmax = settings.ceiling;
        match settings.expansion {
            Some(factor) => self.set_expanded_z(true, factor)?,
            None => self.set_expanded_z(false, 0.0)?,
        }
        self.set_autoscale_z(settings.autoscale, settings.floor, settings.ceiling)
    }

    /// Saves the settings into `store` under `key`.
    pub fn save_state(&self, store: &mut StateStore, key: &str) -> Result<()> {
        store.save(key, &self.settings())
    }

    /// Restores settings saved under `key`. Returns false if there were none.
    pub fn restore_state(&mut self, store: &StateStore, key: &str) -> Result<bool> {
        match store.restore::<ContourSettings>(key)? {
            Some(settings) => {
                self.apply_settings(&settings)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Routes cell output into a draw list and the line accumulator.
struct PlotSink<'a, 'p> {
    list: &'a mut DrawList,
    pass: &'a mut AccumulatorPass<'p>,
    colors: &'a [Vec4],
    fill: bool,
    lines: bool,
}

impl CellSink for PlotSink<'_, '_> {
    fn polygon(&mut self, index: usize, points: &[DVec2]) {
        if !self.fill {
            return;
        }
        if let Some(&color) = self.colors.get(index) {
            self.list.push(DrawCommand::FillPolygon {
                points: points.to_vec(),
                color,
            });
        }
    }

    fn segment(&mut self, _index: usize, level: f64, from: DVec2, to: DVec2) {
        if self.lines {
            self.pass.add_line(from, to, level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldscope_core::{polygon_area, CoordinateSpace, FlatData};

    fn example_plot() -> ContourPlot {
        let mut plot = ContourPlot::new();
        plot.set_all_with_scale(&[vec![0.0, 10.0], vec![20.0, 30.0]], 0.0, 1.0, 0.0, 1.0)
            .unwrap();
        plot
    }

    fn ramp(nx: usize, ny: usize) -> Vec<Vec<f64>> {
        (0..nx)
            .map(|ix| (0..ny).map(|iy| (ix + 2 * iy) as f64).collect())
            .collect()
    }

    #[test]
    fn test_example_range_and_levels() {
        let plot = example_plot();
        assert_eq!(plot.floor(), 0.0);
        assert_eq!(plot.ceiling(), 30.0);
        let levels = plot.levels();
        assert_eq!(levels.len(), 14);
        assert_eq!(levels[0], 0.0);
        assert!((levels[13] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_level_example() {
        let mut plot = example_plot();
        plot.set_number_of_levels(1);
        plot.set_autoscale_z(false, 0.0, 30.0).unwrap();
        let mut list = DrawList::new(CoordinateSpace::World);
        plot.draw(&mut list);

        // The top level only touches the maximum corner.
        let segments: Vec<LineSegment> = plot
            .segments()
            .into_iter()
            .filter(|s| s.level == 15.0)
            .collect();
        assert_eq!(segments.len(), 1);
        assert!((segments[0].start() - DVec2::new(0.25, 0.0)).length() < 1e-9);
        assert!((segments[0].end() - DVec2::new(0.75, 1.0)).length() < 1e-9);

        let areas: Vec<f64> = list
            .filled_polygons()
            .map(|(points, _)| polygon_area(points).abs())
            .collect();
        assert!((areas[0] - 1.0).abs() < 1e-9);
        assert!((areas[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_draw_order() {
        let mut plot = example_plot();
        plot.set_autoscale_z(false, -5.0, 35.0).unwrap();
        let mut list = DrawList::new(CoordinateSpace::World);
        plot.draw(&mut list);
        let commands = list.commands();
        assert!(matches!(commands[0], DrawCommand::FillViewport { .. }));
        assert!(matches!(
            commands[commands.len() - 2],
            DrawCommand::StrokeSegments { .. }
        ));
        match &commands[commands.len() - 1] {
            DrawCommand::StrokeRect { min, max, color } => {
                assert_eq!(*min, DVec2::new(0.0, 0.0));
                assert_eq!(*max, DVec2::new(1.0, 1.0));
                assert_eq!(*color, plot.grid_line_color());
            }
            other => panic!("expected bounding rectangle, got {other:?}"),
        }
    }

    #[test]
    fn test_hidden_or_empty_plot_draws_nothing() {
        let mut list = DrawList::new(CoordinateSpace::World);
        ContourPlot::new().draw(&mut list);
        assert!(list.is_empty());

        let mut plot = example_plot();
        plot.set_visible(false);
        plot.draw(&mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn test_wireframe_has_lines_only() {
        let mut plot = example_plot();
        plot.set_palette(Palette::Wireframe);
        let mut list = DrawList::new(CoordinateSpace::World);
        plot.draw(&mut list);
        assert_eq!(list.filled_polygons().count(), 0);
        assert!(!plot.segments().is_empty());
    }

    #[test]
    fn test_lines_disabled() {
        let mut plot = example_plot();
        plot.set_show_grid_lines(false);
        let mut list = DrawList::new(CoordinateSpace::World);
        plot.draw(&mut list);
        assert!(plot.segments().is_empty());
        assert!(list
            .iter()
            .all(|c| !matches!(c, DrawCommand::StrokeRect { .. })));
    }

    #[test]
    fn test_symmetric_autoscale() {
        let mut plot = ContourPlot::new();
        plot.set_symmetric_z(true);
        plot.set_all(&[vec![-2.0, 1.0], vec![3.0, 0.5]]).unwrap();
        assert_eq!(plot.ceiling(), 3.0);
        assert_eq!(plot.floor(), -3.0);
    }

    #[test]
    fn test_fixed_scale_uses_ceiling_color_last() {
        let mut plot = example_plot();
        plot.set_autoscale_z(false, 0.0, 30.0).unwrap();
        let colors = plot.level_colors();
        assert_eq!(*colors.last().unwrap(), plot.color_mapper().ceil_color());
    }

    #[test]
    fn test_set_all_rejects_other_storage() {
        let mut plot = ContourPlot::new();
        plot.set_grid_data(Box::new(FlatData::new(2, 2, 1).unwrap()));
        let err = plot.set_all(&[vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, FieldscopeError::IllegalState(_)));
    }

    #[test]
    fn test_set_all_reshapes() {
        let mut plot = example_plot();
        plot.set_all(&ramp(3, 4)).unwrap();
        let grid = plot.grid_data().unwrap();
        assert_eq!((grid.nx(), grid.ny()), (3, 4));
        assert_eq!(plot.working_value(2, 3), Some(8.0));
    }

    #[test]
    fn test_set_all_ragged_input() {
        let mut plot = ContourPlot::new();
        let err = plot.set_all(&[vec![0.0, 1.0], vec![2.0]]).unwrap_err();
        assert!(matches!(err, FieldscopeError::SizeMismatch { .. }));
        assert!(plot.set_all(&[]).is_err());
        assert!(plot.grid_data().is_none());
    }

    #[test]
    fn test_failed_set_all_keeps_previous_grid() {
        let mut plot = ContourPlot::new();
        plot.set_all(&ramp(3, 3)).unwrap();
        assert_eq!(plot.ceiling(), 6.0);

        let err = plot.set_all(&[vec![0.0, 1.0], vec![2.0]]).unwrap_err();
        assert!(matches!(err, FieldscopeError::SizeMismatch { .. }));
        let grid = plot.grid_data().unwrap();
        assert_eq!((grid.nx(), grid.ny()), (3, 3));
        assert_eq!(grid.value(2, 2, 0).unwrap(), 6.0);
        assert_eq!(plot.working_dimensions(), (3, 3));

        // Same shape, ragged column: rejected before any value is written.
        assert!(plot.set_all(&[vec![9.0; 3], vec![9.0; 3], vec![9.0; 2]]).is_err());
        assert_eq!(plot.grid_data().unwrap().value(0, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_large_grid_downsampled() {
        let mut plot = ContourPlot::new();
        plot.set_all(&ramp(60, 60)).unwrap();
        assert_eq!(plot.working_dimensions(), (32, 32));
        // Corners survive downsampling exactly.
        assert!((plot.working_value(0, 0).unwrap() - 0.0).abs() < 1e-9);
        assert!((plot.working_value(31, 31).unwrap() - 177.0).abs() < 1e-9);

        plot.set_interpolate_large_grids(false);
        plot.update().unwrap();
        assert_eq!(plot.working_dimensions(), (60, 60));
        assert_eq!(plot.working_value(59, 59), Some(177.0));
    }

    #[test]
    fn test_only_the_large_axis_is_downsampled() {
        let mut plot = ContourPlot::new();
        plot.set_all(&ramp(100, 10)).unwrap();
        assert_eq!(plot.working_dimensions(), (32, 10));
    }

    #[test]
    fn test_expanded_z() {
        let mut plot = example_plot();
        assert!(plot.set_expanded_z(true, 0.0).is_err());
        plot.set_expanded_z(true, 3.0).unwrap();
        plot.update().unwrap();
        // End points are fixed by the expansion.
        assert!((plot.working_value(0, 0).unwrap() - 0.0).abs() < 1e-9);
        assert!((plot.working_value(1, 1).unwrap() - 30.0).abs() < 1e-9);
        // Values move away from the centre of the range.
        assert!(plot.working_value(0, 1).unwrap() < 10.0);
        plot.set_expanded_z(false, 0.0).unwrap();
        assert!(plot.expansion().is_none());
    }

    #[test]
    fn test_set_indexes() {
        let mut plot = example_plot();
        assert!(plot.set_indexes(&[]).is_err());
        assert!(matches!(
            plot.set_indexes(&[1]),
            Err(FieldscopeError::IndexOutOfRange { .. })
        ));
        plot.set_indexes(&[0, 4]).unwrap();
        assert_eq!(plot.component(), 0);
    }

    #[test]
    fn test_palette_index() {
        let mut plot = ContourPlot::new();
        plot.set_palette_index(1).unwrap();
        assert_eq!(plot.palette(), Palette::Grayscale);
        assert!(plot.set_palette_index(42).is_err());
    }

    #[test]
    fn test_bounds_and_index_conversion() {
        let plot = example_plot();
        assert_eq!(plot.x_min(), Some(0.0));
        assert_eq!(plot.x_max(), Some(1.0));
        assert_eq!(plot.y_min(), Some(0.0));
        assert_eq!(plot.y_max(), Some(1.0));
        assert_eq!(plot.index_to_y(0), Some(1.0));
        assert!(ContourPlot::new().x_min().is_none());
    }

    #[test]
    fn test_state_round_trip() {
        let mut plot = example_plot();
        plot.set_number_of_levels(5);
        plot.set_palette(Palette::RedBlueShade);
        plot.set_expanded_z(true, 2.0).unwrap();
        plot.set_autoscale_z(false, -1.0, 4.0).unwrap();
        plot.set_sweep_strategy(SweepStrategy::Recompute);

        let mut store = StateStore::new();
        plot.save_state(&mut store, "contour").unwrap();

        let mut restored = example_plot();
        assert!(restored.restore_state(&store, "contour").unwrap());
        assert_eq!(restored.settings(), plot.settings());
        assert_eq!(restored.floor(), -1.0);
        assert!(!restored.restore_state(&store, "missing").unwrap());
    }

    #[test]
    fn test_custom_palette_survives_settings() {
        let mut plot = ContourPlot::new();
        let colors = vec![Vec4::new(1.0, 0.0, 0.0, 1.0), Vec4::new(0.0, 0.0, 1.0, 1.0)];
        plot.set_color_palette(colors.clone()).unwrap();
        let settings = plot.settings();
        assert_eq!(settings.custom_colors.as_deref(), Some(colors.as_slice()));

        let mut other = ContourPlot::new();
        other.apply_settings(&settings).unwrap();
        assert_eq!(other.palette(), Palette::Custom);
        assert_eq!(other.color_mapper().colors(), colors.as_slice());
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ratatui::layout::Rect as CellRect;

use crate::model::{Point, Rect};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;
const MIN_SCALE: f64 = 2.0;
const MAX_SCALE: f64 = 80.0;
const DEFAULT_SCALE: f64 = 8.0;
const FIT_PADDING: f64 = 40.0;

/// Maps terminal cells of the canvas area onto scene coordinates.
///
/// `origin` is the scene point shown at the top-left cell; `scale` is scene units per
/// column (rows cover `scale * CELL_ASPECT`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Viewport {
    origin: Point,
    scale: f64,
    area: CellRect,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Point::finite_or_origin(-FIT_PADDING, -FIT_PADDING),
            scale: DEFAULT_SCALE,
            area: CellRect::default(),
        }
    }
}

impl Viewport {
    pub(crate) fn area(&self) -> CellRect {
        self.area
    }

    pub(crate) fn set_area(&mut self, area: CellRect) {
        self.area = area;
    }

    pub(crate) fn scale(&self) -> f64 {
        self.scale
    }

    fn row_scale(&self) -> f64 {
        self.scale * CELL_ASPECT
    }

    /// Scene point under the center of a cell, `None` outside the canvas area.
    pub(crate) fn to_scene(&self, column: u16, row: u16) -> Option<Point> {
        let inside = column >= self.area.x
            && column < self.area.x.saturating_add(self.area.width)
            && row >= self.area.y
            && row < self.area.y.saturating_add(self.area.height);
        if !inside {
            return None;
        }
        let dx = (f64::from(column - self.area.x) + 0.5) * self.scale;
        let dy = (f64::from(row - self.area.y) + 0.5) * self.row_scale();
        Some(self.origin.offset(dx, dy))
    }

    /// Scene point of the canvas cell nearest to `(column, row)`.
    pub(crate) fn to_scene_clamped(&self, column: u16, row: u16) -> Option<Point> {
        if self.area.width == 0 || self.area.height == 0 {
            return None;
        }
        let column = column.clamp(self.area.x, self.area.x + self.area.width - 1);
        let row = row.clamp(self.area.y, self.area.y + self.area.height - 1);
        self.to_scene(column, row)
    }

    /// Cell containing a scene point, if it is visible.
    pub(crate) fn to_cell(&self, point: Point) -> Option<(u16, u16)> {
        let dx = ((point.x() - self.origin.x()) / self.scale).floor();
        let dy = ((point.y() - self.origin.y()) / self.row_scale()).floor();
        if dx < 0.0 || dy < 0.0 || dx >= f64::from(self.area.width) || dy >= f64::from(self.area.height)
        {
            return None;
        }
        Some((self.area.x + dx as u16, self.area.y + dy as u16))
    }

    /// Horizontal scene range, for the canvas widget.
    pub(crate) fn x_bounds(&self) -> [f64; 2] {
        let left = self.origin.x();
        [left, left + f64::from(self.area.width) * self.scale]
    }

    /// Vertical scene range with the axis flipped: the canvas widget grows upwards while
    /// scene y grows downwards.
    pub(crate) fn y_bounds(&self) -> [f64; 2] {
        let top = self.origin.y();
        [-(top + f64::from(self.area.height) * self.row_scale()), -top]
    }

    pub(crate) fn pan(&mut self, columns: i32, rows: i32) {
        self.origin =
            self.origin.offset(f64::from(columns) * self.scale, f64::from(rows) * self.row_scale());
    }

    /// Zooms around the center of the area; `factor > 1` zooms out.
    pub(crate) fn zoom(&mut self, factor: f64) {
        let center = self.center();
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.center_on(center);
    }

    pub(crate) fn center(&self) -> Point {
        self.origin.offset(
            f64::from(self.area.width) * self.scale / 2.0,
            f64::from(self.area.height) * self.row_scale() / 2.0,
        )
    }

    pub(crate) fn center_on(&mut self, point: Point) {
        self.origin = point.offset(
            -f64::from(self.area.width) * self.scale / 2.0,
            -f64::from(self.area.height) * self.row_scale() / 2.0,
        );
    }

    /// Picks the largest zoom that shows all of `bounds` (plus padding) and centers on it.
    pub(crate) fn fit(&mut self, bounds: Rect) {
        if self.area.width == 0 || self.area.height == 0 {
            return;
        }
        let width = bounds.size().width + 2.0 * FIT_PADDING;
        let height = bounds.size().height + 2.0 * FIT_PADDING;
        let by_width = width / f64::from(self.area.width);
        let by_height = height / (f64::from(self.area.height) * CELL_ASPECT);
        self.scale = by_width.max(by_height).clamp(MIN_SCALE, MAX_SCALE);
        self.center_on(bounds.center());
    }
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect as CellRect;

    use super::Viewport;
    use crate::model::{Point, Rect, Size};

    fn viewport() -> Viewport {
        let mut viewport = Viewport::default();
        viewport.set_area(CellRect::new(1, 1, 80, 20));
        viewport
    }

    #[test]
    fn cells_map_to_scene_and_back() {
        let viewport = viewport();
        let point = viewport.to_scene(11, 6).expect("inside area");
        assert_eq!(point, Point::new(-40.0 + 10.5 * 8.0, -40.0 + 5.5 * 16.0).expect("point"));
        assert_eq!(viewport.to_cell(point), Some((11, 6)));
    }

    #[test]
    fn cells_outside_the_area_have_no_scene_point() {
        let viewport = viewport();
        assert_eq!(viewport.to_scene(0, 5), None);
        assert_eq!(viewport.to_scene(81, 5), None);
        assert_eq!(viewport.to_scene(10, 21), None);
        assert_eq!(viewport.to_cell(Point::new(-100.0, 0.0).expect("point")), None);
    }

    #[test]
    fn clamped_cells_snap_to_the_nearest_edge() {
        let viewport = viewport();
        assert_eq!(viewport.to_scene_clamped(0, 5), viewport.to_scene(1, 5));
        assert_eq!(viewport.to_scene_clamped(200, 30), viewport.to_scene(80, 20));
        assert_eq!(viewport.to_scene_clamped(11, 6), viewport.to_scene(11, 6));
        assert_eq!(Viewport::default().to_scene_clamped(0, 0), None);
    }

    #[test]
    fn y_bounds_are_flipped_scene_range() {
        let viewport = viewport();
        assert_eq!(viewport.x_bounds(), [-40.0, 600.0]);
        assert_eq!(viewport.y_bounds(), [-280.0, 40.0]);
    }

    #[test]
    fn fit_centers_bounds_and_keeps_them_visible() {
        let mut viewport = viewport();
        let bounds = Rect::new(Point::new(0.0, 0.0).expect("point"), Size::new(1200.0, 300.0));
        viewport.fit(bounds);

        assert_eq!(viewport.center(), bounds.center());
        assert!(viewport.to_cell(Point::ORIGIN).is_some());
        assert!(viewport.to_cell(Point::new(1199.0, 299.0).expect("point")).is_some());
    }

    #[test]
    fn zoom_is_clamped_and_keeps_center() {
        let mut viewport = viewport();
        let center = viewport.center();
        for _ in 0..20 {
            viewport.zoom(0.5);
        }
        assert_eq!(viewport.scale(), 2.0);
        assert_eq!(viewport.center(), center);
    }

    #[test]
    fn pan_moves_by_whole_cells() {
        let mut viewport = viewport();
        let before = viewport.to_scene(10, 10).expect("inside");
        viewport.pan(2, -1);
        let after = viewport.to_scene(10, 10).expect("inside");
        assert_eq!(after, before.offset(16.0, -16.0));
    }
}

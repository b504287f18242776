use eframe::egui;
use log::debug;

use crate::error::GridError;
use crate::model::HexColor;

pub const GRID_ROWS: usize = 4;
pub const GRID_COLS: usize = 5;
pub const CELL_COUNT: usize = GRID_ROWS * GRID_COLS;

/// Active color after a reset (purple).
pub const DEFAULT_ACTIVE_COLOR: HexColor = HexColor::rgb(0x80, 0x00, 0x80);

/// Fixed palette, laid out three swatches per row.
pub const PALETTE: [HexColor; 12] = [
    HexColor::rgb(0x00, 0x00, 0x00),
    HexColor::rgb(0x00, 0x00, 0xff),
    HexColor::rgb(0x80, 0x00, 0x00),
    HexColor::rgb(0x80, 0x80, 0x80),
    HexColor::rgb(0x00, 0x80, 0x00),
    HexColor::rgb(0xff, 0xa5, 0x00),
    HexColor::rgb(0xff, 0xc0, 0xcb),
    HexColor::rgb(0x80, 0x00, 0x80),
    HexColor::rgb(0xff, 0x00, 0x00),
    HexColor::rgb(0xff, 0xff, 0x00),
    HexColor::rgb(0x00, 0xff, 0xff),
    HexColor::rgb(0xf5, 0xf5, 0xdc),
];
const PALETTE_COLUMNS: usize = 3;

const CELL_SIZE: f32 = 40.0;
const SWATCH_SIZE: f32 = 24.0;

/// Coarse color layout query: a 4×5 matrix of painted cells, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorGrid {
    cells: [HexColor; CELL_COUNT],
    active: HexColor,
}

impl Default for ColorGrid {
    fn default() -> Self {
        Self {
            cells: [HexColor::WHITE; CELL_COUNT],
            active: DEFAULT_ACTIVE_COLOR,
        }
    }
}

impl ColorGrid {
    pub fn cells(&self) -> &[HexColor] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<HexColor> {
        self.cells.get(index).copied()
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<HexColor> {
        if row >= GRID_ROWS || col >= GRID_COLS {
            return None;
        }
        self.cell(row * GRID_COLS + col)
    }

    pub fn active_color(&self) -> HexColor {
        self.active
    }

    pub fn paint_cell(&mut self, index: usize, color: HexColor) -> Result<(), GridError> {
        let cell = self.cells.get_mut(index).ok_or(GridError::CellOutOfRange {
            index,
            len: CELL_COUNT,
        })?;
        *cell = color;
        Ok(())
    }

    /// Paints a cell with the active palette color.
    pub fn paint_selected(&mut self, index: usize) -> Result<(), GridError> {
        self.paint_cell(index, self.active)
    }

    pub fn paint_all(&mut self, color: HexColor) {
        self.cells = [color; CELL_COUNT];
    }

    pub fn select_palette_color(&mut self, color: HexColor) {
        self.active = color;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.label("Search by color region");
        ui.horizontal(|ui| {
            if ui.small_button("Reset").clicked() {
                self.reset();
            }
            if ui.small_button("Select all").clicked() {
                self.paint_all(self.active_color());
            }
        });
        ui.add_space(4.0);

        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                let (preview, _) =
                    ui.allocate_exact_size(egui::vec2(56.0, 56.0), egui::Sense::hover());
                ui.painter()
                    .rect_filled(preview, 4.0, self.active_color().to_egui());
                ui.painter().rect_stroke(
                    preview,
                    4.0,
                    egui::Stroke::new(2.0, egui::Color32::from_gray(40)),
                    egui::StrokeKind::Inside,
                );
                ui.add_space(6.0);
                for row in PALETTE.chunks(PALETTE_COLUMNS) {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing = egui::vec2(2.0, 2.0);
                        for &color in row {
                            if swatch(ui, color, SWATCH_SIZE, color == self.active).clicked() {
                                self.select_palette_color(color);
                            }
                        }
                    });
                }
            });

            ui.vertical(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(0.0, 0.0);
                for row in 0..GRID_ROWS {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing = egui::vec2(0.0, 0.0);
                        for col in 0..GRID_COLS {
                            let color = self.cell_at(row, col).unwrap_or_default();
                            if swatch(ui, color, CELL_SIZE, false).clicked() {
                                if let Err(err) = self.paint_selected(row * GRID_COLS + col) {
                                    debug!("ignoring cell click: {err}");
                                }
                            }
                        }
                    });
                }
                ui.add_space(4.0);
                ui.small("5×4 grid. Pick a color on the left, click cells to paint.");
            });
        });
    }
}

fn swatch(ui: &mut egui::Ui, color: HexColor, size: f32, highlighted: bool) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
    let painter = ui.painter();
    painter.rect_filled(rect, 0.0, color.to_egui());
    let stroke = if highlighted || response.hovered() {
        egui::Stroke::new(2.0, egui::Color32::from_gray(60))
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_gray(160))
    };
    painter.rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Inside);
    response.on_hover_text(color.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORANGE: HexColor = HexColor::rgb(0xff, 0xa5, 0x00);

    #[test]
    fn test_defaults_are_white_with_purple_active() {
        let grid = ColorGrid::default();
        assert_eq!(grid.cells().len(), 20);
        assert!(grid.cells().iter().all(|&c| c == HexColor::WHITE));
        assert_eq!(grid.active_color().to_string(), "#800080");
    }

    #[test]
    fn test_paint_cell_overwrites() {
        let mut grid = ColorGrid::default();
        grid.paint_cell(7, ORANGE).unwrap();
        grid.paint_cell(7, PALETTE[0]).unwrap();
        assert_eq!(grid.cell(7), Some(PALETTE[0]));
        assert_eq!(grid.cell_at(1, 2), Some(PALETTE[0]));
        assert_eq!(grid.cell(6), Some(HexColor::WHITE));
    }

    #[test]
    fn test_paint_cell_out_of_range() {
        let mut grid = ColorGrid::default();
        assert_eq!(
            grid.paint_cell(20, ORANGE),
            Err(GridError::CellOutOfRange { index: 20, len: 20 })
        );
        assert_eq!(grid, ColorGrid::default());
        assert_eq!(grid.cell(20), None);
        assert_eq!(grid.cell_at(4, 0), None);
        assert_eq!(grid.cell_at(0, 5), None);
    }

    #[test]
    fn test_paint_all_sets_every_cell() {
        let mut grid = ColorGrid::default();
        grid.paint_all(ORANGE);
        for index in 0..CELL_COUNT {
            assert_eq!(grid.cell(index), Some(ORANGE));
        }
    }

    #[test]
    fn test_select_palette_color_does_not_paint() {
        let mut grid = ColorGrid::default();
        grid.select_palette_color(PALETTE[4]);
        assert_eq!(grid.active_color(), PALETTE[4]);
        assert!(grid.cells().iter().all(|&c| c == HexColor::WHITE));

        grid.paint_selected(0).unwrap();
        assert_eq!(grid.cell(0), Some(PALETTE[4]));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut grid = ColorGrid::default();
        grid.select_palette_color(ORANGE);
        grid.paint_all(ORANGE);
        grid.reset();
        assert_eq!(grid, ColorGrid::default());
        grid.reset();
        assert_eq!(grid, ColorGrid::default());
    }

    #[test]
    fn test_palette_is_fixed() {
        assert_eq!(PALETTE.len(), 12);
        assert!(PALETTE.contains(&DEFAULT_ACTIVE_COLOR));
        assert_eq!(PALETTE[11].to_string(), "#f5f5dc");
    }
}

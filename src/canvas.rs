use eframe::egui;
use log::debug;

use crate::error::DragError;
use crate::model::{AnnotatedRegion, ObjectLabel, Point, Rectangle};

pub const SURFACE_WIDTH: f32 = 320.0;
pub const SURFACE_HEIGHT: f32 = 240.0;
/// A drawn box is kept only when it is strictly larger than this on both axes.
pub const MIN_REGION_SIZE: f32 = 10.0;
/// Vertical distance between a box's top edge and its tag.
pub const LABEL_OFFSET: f32 = 25.0;
const GUIDE_SPACING: f32 = 80.0;

const COMMITTED_COLOR: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
const DRAWING_COLOR: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);

// ── Drag State Machine ──────────────────────────────────────────────────────

/// The box being dragged out. Width and height are signed so the pointer can
/// move in any direction from the anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawingSession {
    pub anchor: Point,
    pub width: f32,
    pub height: f32,
}

impl DrawingSession {
    fn rect(&self) -> Rectangle {
        Rectangle::from_signed(self.anchor, self.width, self.height)
    }

    fn is_large_enough(&self) -> bool {
        self.width.abs() > MIN_REGION_SIZE && self.height.abs() > MIN_REGION_SIZE
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DrawingSession),
}

/// One box to paint on the surface, committed or in progress.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayBox {
    pub rect: Rectangle,
    pub label: Option<ObjectLabel>,
    pub committed: bool,
}

impl OverlayBox {
    /// Where the tag goes: just above the top-left corner.
    pub fn label_anchor(&self) -> Point {
        Point::new(self.rect.x, self.rect.y - LABEL_OFFSET)
    }
}

#[derive(Debug, Default)]
pub struct AnnotationCanvas {
    regions: Vec<AnnotatedRegion>,
    drag: DragState,
    selected: Option<ObjectLabel>,
}

impl AnnotationCanvas {
    pub fn regions(&self) -> &[AnnotatedRegion] {
        &self.regions
    }

    pub fn selected_label(&self) -> Option<ObjectLabel> {
        self.selected
    }

    pub fn select_label(&mut self, label: Option<ObjectLabel>) {
        self.selected = label;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging(_))
    }

    pub fn begin_drag(&mut self, pos: Point) -> Result<(), DragError> {
        if self.is_dragging() {
            return Err(DragError::AlreadyDragging);
        }
        self.drag = DragState::Dragging(DrawingSession {
            anchor: pos,
            width: 0.0,
            height: 0.0,
        });
        Ok(())
    }

    pub fn update_drag(&mut self, pos: Point) -> Result<(), DragError> {
        let DragState::Dragging(session) = &mut self.drag else {
            return Err(DragError::NotDragging);
        };
        session.width = pos.x - session.anchor.x;
        session.height = pos.y - session.anchor.y;
        Ok(())
    }

    /// Finishes the drag, returning the region if one was committed. The
    /// canvas is idle afterwards whatever the outcome.
    pub fn end_drag(&mut self) -> Result<Option<AnnotatedRegion>, DragError> {
        let DragState::Dragging(session) = std::mem::take(&mut self.drag) else {
            return Err(DragError::NotDragging);
        };
        let Some(object) = self.selected else {
            return Ok(None);
        };
        if !session.is_large_enough() {
            return Ok(None);
        }
        let region = AnnotatedRegion {
            rect: session.rect(),
            object,
        };
        self.regions.push(region.clone());
        Ok(Some(region))
    }

    pub fn remove_last(&mut self) -> Option<AnnotatedRegion> {
        self.regions.pop()
    }

    pub fn clear_all(&mut self) {
        self.regions.clear();
        self.drag = DragState::Idle;
    }

    pub fn reset(&mut self) {
        self.clear_all();
        self.selected = None;
    }

    /// Committed regions in insertion order, then the in-progress box.
    pub fn overlay(&self) -> Vec<OverlayBox> {
        let mut boxes: Vec<OverlayBox> = self
            .regions
            .iter()
            .map(|region| OverlayBox {
                rect: region.rect,
                label: Some(region.object),
                committed: true,
            })
            .collect();
        if let DragState::Dragging(session) = self.drag {
            boxes.push(OverlayBox {
                rect: session.rect(),
                label: self.selected,
                committed: false,
            });
        }
        boxes
    }

    pub fn summary(&self) -> Option<String> {
        if self.regions.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.regions.iter().map(|r| r.object.as_str()).collect();
        Some(format!(
            "✓ {} object(s): {}",
            self.regions.len(),
            names.join(", ")
        ))
    }

    // ── egui adapter ────────────────────────────────────────────────────────

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.label("Search by object");
        egui::ComboBox::from_id_salt("object_label")
            .width(SURFACE_WIDTH)
            .selected_text(
                self.selected_label()
                    .map_or("Choose object...", ObjectLabel::display_name),
            )
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.selected, None, "Choose object...");
                for label in ObjectLabel::ALL {
                    ui.selectable_value(&mut self.selected, Some(label), label.display_name());
                }
            });
        ui.add_space(4.0);

        let (_, surface) = ui.allocate_space(egui::vec2(SURFACE_WIDTH, SURFACE_HEIGHT));
        let response = ui.interact(surface, surface_id(), egui::Sense::drag());
        let painter = ui.painter_at(surface);
        painter.rect_filled(surface, 4.0, egui::Color32::WHITE);
        draw_guides(&painter, surface);
        painter.rect_stroke(
            surface,
            4.0,
            egui::Stroke::new(2.0, egui::Color32::from_gray(200)),
            egui::StrokeKind::Inside,
        );
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }

        self.handle_pointer(ui, &response);
        self.draw_overlay(ui.painter(), surface.min);

        if let Some(summary) = self.summary() {
            ui.colored_label(egui::Color32::from_rgb(22, 163, 74), summary);
        }
        ui.horizontal(|ui| {
            if ui.small_button("Clear all").clicked() {
                self.clear_all();
            }
            if !self.regions.is_empty() && ui.small_button("Remove last").clicked() {
                self.remove_last();
            }
        });
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let origin = response.rect.min;
        let to_local = |pos: egui::Pos2| {
            let rel = pos - origin;
            Point::new(
                rel.x.clamp(0.0, SURFACE_WIDTH),
                rel.y.clamp(0.0, SURFACE_HEIGHT),
            )
        };

        if response.drag_started_by(egui::PointerButton::Primary) {
            let start = ui
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(pos) = start {
                if let Err(err) = self.begin_drag(to_local(pos)) {
                    debug!("ignoring drag start: {err}");
                }
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Err(err) = self.update_drag(to_local(pos)) {
                    debug!("ignoring drag update: {err}");
                }
            }
        }

        if response.drag_stopped_by(egui::PointerButton::Primary) {
            if let Some(pos) = ui.input(|i| i.pointer.latest_pos()) {
                let _ = self.update_drag(to_local(pos));
            }
            match self.end_drag() {
                Ok(Some(region)) => {
                    debug!("committed {} region {:?}", region.object, region.rect)
                }
                Ok(None) => debug!("discarded drag: too small or no object selected"),
                Err(err) => debug!("ignoring drag end: {err}"),
            }
        }
    }

    fn draw_overlay(&self, painter: &egui::Painter, origin: egui::Pos2) {
        for item in self.overlay() {
            let color = if item.committed {
                COMMITTED_COLOR
            } else {
                DRAWING_COLOR
            };
            painter.rect_stroke(
                item.rect.to_egui(origin),
                0.0,
                egui::Stroke::new(2.0, color),
                egui::StrokeKind::Middle,
            );
            if let Some(label) = item.label {
                let anchor = item.label_anchor();
                let pos = origin + egui::vec2(anchor.x, anchor.y);
                let galley = painter.layout_no_wrap(
                    label.as_str().to_string(),
                    egui::FontId::proportional(11.0),
                    egui::Color32::WHITE,
                );
                let padding = egui::vec2(6.0, 4.0);
                let tag = egui::Rect::from_min_size(pos, galley.size() + padding * 2.0);
                painter.rect_filled(tag, 3.0, color);
                painter.galley(pos + padding, galley, egui::Color32::WHITE);
            }
        }
    }
}

fn surface_id() -> egui::Id {
    egui::Id::new("annotation_surface")
}

fn draw_guides(painter: &egui::Painter, surface: egui::Rect) {
    let stroke = egui::Stroke::new(
        1.0,
        egui::Color32::from_rgba_unmultiplied(150, 150, 150, 100),
    );
    let mut x = surface.min.x + GUIDE_SPACING;
    while x < surface.max.x {
        painter.line_segment(
            [egui::pos2(x, surface.min.y), egui::pos2(x, surface.max.y)],
            stroke,
        );
        x += GUIDE_SPACING;
    }
    let mut y = surface.min.y + GUIDE_SPACING;
    while y < surface.max.y {
        painter.line_segment(
            [egui::pos2(surface.min.x, y), egui::pos2(surface.max.x, y)],
            stroke,
        );
        y += GUIDE_SPACING;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(canvas: &mut AnnotationCanvas, from: (f32, f32), to: (f32, f32)) -> Option<AnnotatedRegion> {
        canvas.begin_drag(Point::new(from.0, from.1)).unwrap();
        canvas.update_drag(Point::new(to.0, to.1)).unwrap();
        canvas.end_drag().unwrap()
    }

    fn labeled(label: ObjectLabel) -> AnnotationCanvas {
        let mut canvas = AnnotationCanvas::default();
        canvas.select_label(Some(label));
        canvas
    }

    #[test]
    fn test_drag_commits_labeled_region() {
        let mut canvas = labeled(ObjectLabel::Car);
        let region = drag(&mut canvas, (50.0, 50.0), (120.0, 130.0)).unwrap();

        assert_eq!(
            region.rect,
            Rectangle {
                x: 50.0,
                y: 50.0,
                width: 70.0,
                height: 80.0
            }
        );
        assert_eq!(region.object, ObjectLabel::Car);
        assert_eq!(canvas.regions(), &[region]);
        assert!(!canvas.is_dragging());
    }

    #[test]
    fn test_small_drag_is_discarded() {
        let mut canvas = labeled(ObjectLabel::Person);
        drag(&mut canvas, (10.0, 10.0), (100.0, 100.0));
        assert_eq!(canvas.regions().len(), 1);

        assert!(drag(&mut canvas, (50.0, 50.0), (55.0, 52.0)).is_none());
        assert_eq!(canvas.regions().len(), 1);
        assert!(!canvas.is_dragging());
    }

    #[test]
    fn test_threshold_is_strict_on_both_axes() {
        let mut canvas = labeled(ObjectLabel::Dog);
        assert!(drag(&mut canvas, (0.0, 0.0), (10.0, 50.0)).is_none());
        assert!(drag(&mut canvas, (0.0, 0.0), (50.0, 10.0)).is_none());
        assert!(drag(&mut canvas, (0.0, 0.0), (-10.0, -10.0)).is_none());
        assert!(drag(&mut canvas, (0.0, 0.0), (10.5, 10.5)).is_some());
        assert_eq!(canvas.regions().len(), 1);
    }

    #[test]
    fn test_no_label_discards_region() {
        let mut canvas = AnnotationCanvas::default();
        assert!(drag(&mut canvas, (50.0, 50.0), (200.0, 200.0)).is_none());
        assert!(canvas.regions().is_empty());
        assert!(!canvas.is_dragging());
    }

    #[test]
    fn test_normalization_in_all_directions() {
        let mut canvas = labeled(ObjectLabel::Cat);
        let (x0, y0) = (150.0, 120.0);
        for (x1, y1) in [(200.0, 180.0), (100.0, 180.0), (200.0, 60.0), (100.0, 60.0)] {
            let region = drag(&mut canvas, (x0, y0), (x1, y1)).unwrap();
            assert_eq!(region.rect.x, f32::min(x0, x1));
            assert_eq!(region.rect.y, f32::min(y0, y1));
            assert_eq!(region.rect.width, (x1 - x0).abs());
            assert_eq!(region.rect.height, (y1 - y0).abs());
        }
        assert_eq!(canvas.regions().len(), 4);
    }

    #[test]
    fn test_update_uses_latest_position_only() {
        let mut canvas = labeled(ObjectLabel::Bus);
        canvas.begin_drag(Point::new(100.0, 100.0)).unwrap();
        canvas.update_drag(Point::new(300.0, 200.0)).unwrap();
        canvas.update_drag(Point::new(104.0, 103.0)).unwrap();
        assert_eq!(canvas.end_drag().unwrap(), None);
    }

    #[test]
    fn test_verbs_out_of_order_are_rejected() {
        let mut canvas = labeled(ObjectLabel::Car);
        assert_eq!(
            canvas.update_drag(Point::new(1.0, 1.0)),
            Err(DragError::NotDragging)
        );
        assert_eq!(canvas.end_drag(), Err(DragError::NotDragging));

        canvas.begin_drag(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(
            canvas.begin_drag(Point::new(80.0, 80.0)),
            Err(DragError::AlreadyDragging)
        );
        canvas.update_drag(Point::new(40.0, 40.0)).unwrap();
        let region = canvas.end_drag().unwrap().unwrap();
        assert_eq!(region.rect.x, 5.0);
    }

    #[test]
    fn test_remove_last_on_empty_is_noop() {
        let mut canvas = AnnotationCanvas::default();
        assert!(canvas.remove_last().is_none());
        assert!(canvas.regions().is_empty());
    }

    #[test]
    fn test_remove_last_pops_most_recent() {
        let mut canvas = labeled(ObjectLabel::Car);
        drag(&mut canvas, (0.0, 0.0), (50.0, 50.0));
        canvas.select_label(Some(ObjectLabel::Boat));
        drag(&mut canvas, (60.0, 60.0), (120.0, 120.0));

        let removed = canvas.remove_last().unwrap();
        assert_eq!(removed.object, ObjectLabel::Boat);
        assert_eq!(canvas.regions().len(), 1);
        assert_eq!(canvas.regions()[0].object, ObjectLabel::Car);
    }

    #[test]
    fn test_overlapping_regions_are_kept() {
        let mut canvas = labeled(ObjectLabel::Chair);
        drag(&mut canvas, (20.0, 20.0), (90.0, 90.0));
        drag(&mut canvas, (20.0, 20.0), (90.0, 90.0));
        assert_eq!(canvas.regions().len(), 2);
    }

    #[test]
    fn test_clear_all_cancels_session_but_keeps_label() {
        let mut canvas = labeled(ObjectLabel::Cup);
        drag(&mut canvas, (0.0, 0.0), (50.0, 50.0));
        canvas.begin_drag(Point::new(10.0, 10.0)).unwrap();

        canvas.clear_all();
        assert!(canvas.regions().is_empty());
        assert!(!canvas.is_dragging());
        assert_eq!(canvas.selected_label(), Some(ObjectLabel::Cup));
        assert_eq!(canvas.end_drag(), Err(DragError::NotDragging));
    }

    #[test]
    fn test_reset_clears_label() {
        let mut canvas = labeled(ObjectLabel::Tv);
        drag(&mut canvas, (0.0, 0.0), (50.0, 50.0));
        canvas.reset();
        assert!(canvas.regions().is_empty());
        assert_eq!(canvas.selected_label(), None);
    }

    #[test]
    fn test_overlay_includes_in_progress_box() {
        let mut canvas = labeled(ObjectLabel::Bird);
        drag(&mut canvas, (50.0, 50.0), (120.0, 130.0));
        canvas.begin_drag(Point::new(200.0, 200.0)).unwrap();
        canvas.update_drag(Point::new(150.0, 170.0)).unwrap();

        let overlay = canvas.overlay();
        assert_eq!(overlay.len(), 2);
        assert!(overlay[0].committed);
        assert!(!overlay[1].committed);
        assert_eq!(overlay[1].label, Some(ObjectLabel::Bird));
        assert_eq!(
            overlay[1].rect,
            Rectangle {
                x: 150.0,
                y: 170.0,
                width: 50.0,
                height: 30.0
            }
        );
        assert_eq!(overlay[0].label_anchor(), Point::new(50.0, 25.0));
    }

    #[test]
    fn test_summary_lists_labels() {
        let mut canvas = labeled(ObjectLabel::Person);
        assert_eq!(canvas.summary(), None);
        drag(&mut canvas, (0.0, 0.0), (50.0, 50.0));
        canvas.select_label(Some(ObjectLabel::Car));
        drag(&mut canvas, (0.0, 0.0), (50.0, 50.0));
        assert_eq!(canvas.summary().unwrap(), "✓ 2 object(s): person, car");
    }

    fn run_frame(ctx: &egui::Context, canvas: &mut AnnotationCanvas, events: Vec<egui::Event>) {
        let input = egui::RawInput {
            events,
            ..Default::default()
        };
        let _output = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| canvas.show(ui));
        });
    }

    /// Presses at `from`, moves to `to` in two steps and releases there.
    fn pointer_drag(
        ctx: &egui::Context,
        canvas: &mut AnnotationCanvas,
        from: egui::Pos2,
        to: egui::Pos2,
    ) {
        let button = |pos, pressed| egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        };
        run_frame(ctx, canvas, vec![egui::Event::PointerMoved(from), button(from, true)]);
        run_frame(ctx, canvas, vec![egui::Event::PointerMoved(from.lerp(to, 0.5))]);
        run_frame(ctx, canvas, vec![egui::Event::PointerMoved(to)]);
        run_frame(ctx, canvas, vec![button(to, false)]);
        run_frame(ctx, canvas, Vec::new());
    }

    fn assert_near(rect: Rectangle, expected: [f32; 4]) {
        let actual = [rect.x, rect.y, rect.width, rect.height];
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_pointer_drag_is_anchored_at_press_and_clamped() {
        let ctx = egui::Context::default();
        let mut canvas = labeled(ObjectLabel::Car);
        run_frame(&ctx, &mut canvas, Vec::new());
        let origin = ctx.read_response(surface_id()).unwrap().rect.min;

        pointer_drag(
            &ctx,
            &mut canvas,
            origin + egui::vec2(50.0, 50.0),
            origin + egui::vec2(120.0, 130.0),
        );
        assert_eq!(canvas.regions().len(), 1);
        assert_eq!(canvas.regions()[0].object, ObjectLabel::Car);
        assert_near(canvas.regions()[0].rect, [50.0, 50.0, 70.0, 80.0]);

        pointer_drag(
            &ctx,
            &mut canvas,
            origin + egui::vec2(200.0, 150.0),
            origin + egui::vec2(500.0, 400.0),
        );
        assert_eq!(canvas.regions().len(), 2);
        assert_near(
            canvas.regions()[1].rect,
            [200.0, 150.0, SURFACE_WIDTH - 200.0, SURFACE_HEIGHT - 150.0],
        );
        assert!(!canvas.is_dragging());
    }
}

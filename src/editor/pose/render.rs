use image::{imageops, RgbaImage};

use super::{Line, PoseEditor};
use crate::canvas::{encode_png_data_url, fill, fill_disc, stroke_circle, stroke_polyline};
use crate::editor::EditorResult;
use crate::geometry::{CanvasSize, Color, Point};

pub const STROKE_WIDTH: f64 = 5.0;
pub const HANDLE_RADIUS: f64 = 8.0;
const INDICATOR_LENGTH_RATIO: f64 = 0.8;

const SKELETON_COLOR: Color = Color::WHITE;
const EXPORT_BACKGROUND: Color = Color::BLACK;
const EDIT_BACKGROUND: Color = Color::rgb(0x1f, 0x29, 0x37);
const HANDLE_COLOR: Color = Color::rgba(0, 255, 255, 102);
const HANDLE_HOVER_COLOR: Color = Color::rgba(0, 255, 255, 204);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub draw_direction_indicator: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            draw_direction_indicator: true,
        }
    }
}

impl PoseEditor {
    /// Draws the skeleton, the inferred head and, unless suppressed, the facing indicator.
    pub fn render(&self, surface: &mut RgbaImage, options: RenderOptions) {
        let size = CanvasSize::new(surface.width(), surface.height());
        for line in self.lines() {
            stroke_line(surface, line, size);
        }

        let Some(head) = self.head() else {
            return;
        };
        let center = head.center.to_pixel(size);
        let radius = head.radius * f64::from(size.height);
        stroke_circle(surface, center, radius, STROKE_WIDTH, SKELETON_COLOR);

        if !options.draw_direction_indicator {
            return;
        }
        if let Some((dx, dy)) = self.face_direction().indicator_vector() {
            let length = radius * INDICATOR_LENGTH_RATIO;
            let tip = Point::new(center.x + dx * length, center.y + dy * length);
            stroke_polyline(surface, &[center, tip], STROKE_WIDTH, SKELETON_COLOR);
        }
    }

    /// Editing view: background, skeleton with indicator, and endpoint handles.
    pub fn render_view(&self) -> RgbaImage {
        let size = self.size();
        let mut surface = match self.background() {
            Some(image) if image.dimensions() == (size.width, size.height) => image.clone(),
            Some(image) => imageops::resize(
                image,
                size.width,
                size.height,
                imageops::FilterType::Triangle,
            ),
            None => {
                let mut surface = RgbaImage::new(size.width, size.height);
                fill(&mut surface, EDIT_BACKGROUND);
                surface
            }
        };
        self.render(&mut surface, RenderOptions::default());

        let hover = self.hover();
        for line in self.lines() {
            for point in [line.p1, line.p2] {
                let center = point.to_pixel(size);
                let hovered = hover
                    .is_some_and(|hover| hover.distance_sq(center) < HANDLE_RADIUS * HANDLE_RADIUS);
                let color = if hovered {
                    HANDLE_HOVER_COLOR
                } else {
                    HANDLE_COLOR
                };
                fill_disc(&mut surface, center, HANDLE_RADIUS, color);
            }
        }
        surface
    }

    /// Clean skeleton on black, without indicator or handles.
    pub fn export_raster_image(&self) -> RgbaImage {
        let size = self.size();
        let mut surface = RgbaImage::new(size.width, size.height);
        fill(&mut surface, EXPORT_BACKGROUND);
        self.render(
            &mut surface,
            RenderOptions {
                draw_direction_indicator: false,
            },
        );
        surface
    }

    pub fn export_raster(&self) -> EditorResult<String> {
        Ok(encode_png_data_url(&self.export_raster_image())?)
    }
}

fn stroke_line(surface: &mut RgbaImage, line: &Line, size: CanvasSize) {
    let p1 = line.p1.to_pixel(size);
    let p2 = line.p2.to_pixel(size);
    stroke_polyline(surface, &[p1, p2], STROKE_WIDTH, SKELETON_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::decode_data_url;
    use crate::editor::pose::{FaceDirection, POSE_TEMPLATES};

    const WHITE: image::Rgba<u8> = image::Rgba([255, 255, 255, 255]);
    const BLACK: image::Rgba<u8> = image::Rgba([0, 0, 0, 255]);

    fn standing(width: u32) -> PoseEditor {
        let mut editor = PoseEditor::new(width);
        editor.apply_template(&POSE_TEMPLATES[0]);
        editor
    }

    fn render_on_black(editor: &PoseEditor) -> RgbaImage {
        let mut surface = RgbaImage::from_pixel(200, 200, BLACK);
        editor.render(&mut surface, RenderOptions::default());
        surface
    }

    #[test]
    fn export_raster_is_white_skeleton_on_black() {
        let editor = standing(200);
        let raster = editor.export_raster_image();

        assert_eq!(raster.dimensions(), (200, 200));
        // torso runs down x = 100 from y = 70 to y = 120
        assert_eq!(*raster.get_pixel(99, 95), WHITE);
        assert_eq!(*raster.get_pixel(5, 5), BLACK);
        assert!(raster
            .pixels()
            .all(|pixel| pixel[0] == pixel[1] && pixel[1] == pixel[2] && pixel[3] == 255));
    }

    #[test]
    fn export_raster_ignores_direction_and_handles() {
        let mut editor = standing(200);
        let front = editor.export_raster_image();
        editor.set_face_direction(FaceDirection::Right);
        editor.pointer_move(Some(Point::new(100.0, 30.0)));
        assert_eq!(editor.export_raster_image(), front);
    }

    #[test]
    fn indicator_points_toward_face_direction() {
        let mut editor = standing(200);
        // head center (100, 52.5), radius 22.5, indicator 18 px long
        assert_eq!(*render_on_black(&editor).get_pixel(110, 52), BLACK);

        editor.set_face_direction(FaceDirection::Right);
        assert_eq!(*render_on_black(&editor).get_pixel(110, 52), WHITE);
        assert_eq!(*render_on_black(&editor).get_pixel(89, 52), BLACK);

        editor.set_face_direction(FaceDirection::Left);
        assert_eq!(*render_on_black(&editor).get_pixel(89, 52), WHITE);
    }

    #[test]
    fn head_circle_is_drawn_at_inferred_radius() {
        let editor = standing(200);
        let surface = render_on_black(&editor);
        // leftmost point of the circle: 100 - 22.5 = 77.5
        assert_eq!(*surface.get_pixel(77, 52), WHITE);
    }

    #[test]
    fn flat_pose_draws_lines_but_no_head() {
        let mut editor = PoseEditor::new(200);
        editor.set_pose_flat(&[[0.1, 0.5, 0.9, 0.5]]);
        editor.set_face_direction(FaceDirection::Up);
        let surface = render_on_black(&editor);

        assert_eq!(*surface.get_pixel(100, 99), WHITE);
        let lit = surface.pixels().filter(|pixel| pixel[0] > 0).count();
        // a 160x5 capsule, nothing else
        assert!(lit < 200 * 8, "unexpected extra drawing: {lit} pixels lit");
    }

    #[test]
    fn handles_highlight_on_hover() {
        let mut editor = PoseEditor::new(200);
        editor.set_pose_flat(&[[0.25, 0.5, 0.75, 0.5]]);

        let idle = editor.render_view();
        assert_eq!(*idle.get_pixel(50, 100), image::Rgba([153, 255, 255, 255]));

        editor.pointer_move(Some(Point::new(52.0, 100.0)));
        let hovered = editor.render_view();
        assert_eq!(*hovered.get_pixel(50, 100), image::Rgba([51, 255, 255, 255]));
        assert_eq!(*hovered.get_pixel(150, 100), image::Rgba([153, 255, 255, 255]));
    }

    #[test]
    fn view_uses_background_image_when_present() {
        let mut editor = PoseEditor::new(100);
        editor.set_background(Some(RgbaImage::from_pixel(
            200,
            100,
            image::Rgba([10, 200, 30, 255]),
        )));
        let view = editor.render_view();
        assert_eq!(view.dimensions(), (100, 50));
        assert_eq!(*view.get_pixel(3, 3), image::Rgba([10, 200, 30, 255]));
    }

    #[test]
    fn export_data_url_decodes() {
        let url = standing(120).export_raster().expect("raster should encode");
        let decoded = decode_data_url(&url).expect("raster should decode");
        assert_eq!(decoded.dimensions(), (120, 120));
    }
}

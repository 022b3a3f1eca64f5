//! Requests to the external image generation service.
//!
//! The service itself is a black box behind [`GenerationBackend`]. This module
//! validates editor artifacts before anything is sent, assembles the image and
//! text parts for each tool, and checks what comes back. Editors are only
//! borrowed immutably, so a failed call leaves them ready for a retry.

mod prompt;
mod response;

use serde::Serialize;
use thiserror::Error;

use crate::canvas::{decode_image_bytes, CanvasError, DataUrl};
use crate::editor::{
    ArtifactEditor, Compositor, DetectionBox, EditorError, MaskPainter, PoseEditor,
    ScribbleEditor,
};

pub use response::{parse_detections, parse_pose_lines};

/// Encoded artifacts shorter than this are treated as empty canvases.
pub const MIN_ARTIFACT_LEN: usize = 100;
/// A blank 512 px scribble pad still encodes to a few hundred characters.
pub const MIN_SCRIBBLE_LEN: usize = 200;

/// Drawing styles offered for scribble generation; the first is the default.
pub const SCRIBBLE_STYLES: [&str; 6] = [
    "劇画",
    "少女漫画",
    "アメコミ風",
    "メルヘン",
    "いわさきちひろ風",
    "ジブリ風",
];

pub const DEFAULT_DETECTION_SENSITIVITY: u8 = 50;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{what} is empty")]
    EmptyArtifact { what: &'static str },
    #[error("a prompt is required")]
    MissingPrompt,
    #[error("select at least one detection type")]
    NoDetectionTypes,
    #[error("generation backend failed: {message}")]
    Backend { message: String },
    #[error("malformed generation response: {message}")]
    MalformedResponse { message: String },
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// An inline image as sent to the service: mime type plus base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePart {
    pub mime_type: String,
    pub data: String,
}

impl ImagePart {
    pub fn from_data_url(data_url: &str) -> GenerationResult<Self> {
        let url = DataUrl::parse(data_url)?;
        Ok(Self {
            mime_type: url.mime_type,
            data: url.payload,
        })
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        let url = DataUrl::from_bytes(mime_type, bytes);
        Self {
            mime_type: url.mime_type,
            data: url.payload,
        }
    }

    pub fn to_data_url(&self) -> String {
        DataUrl {
            mime_type: self.mime_type.clone(),
            payload: self.data.clone(),
        }
        .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    InlineData(ImagePart),
    Text(String),
}

/// What to look for when asking the service to locate debris in a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRequest {
    pub types: Vec<String>,
    pub colors: Vec<String>,
    /// 0..=100; higher reports only the more obvious items.
    pub sensitivity: u8,
}

impl Default for DetectionRequest {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            colors: Vec::new(),
            sensitivity: DEFAULT_DETECTION_SENSITIVITY,
        }
    }
}

impl DetectionRequest {
    pub fn new(types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_colors(mut self, colors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: u8) -> Self {
        self.sensitivity = sensitivity.min(100);
        self
    }
}

pub trait GenerationBackend {
    /// Sends `parts` and returns the generated image as a data URL.
    fn generate_image(&self, parts: &[Part]) -> GenerationResult<String>;
    /// Sends `parts` and returns the raw JSON text of the answer.
    fn generate_json(&self, parts: &[Part]) -> GenerationResult<String>;
}

/// Rejects artifacts that are empty or too short to hold an image.
pub fn validate_artifact(what: &'static str, data_url: &str) -> GenerationResult<()> {
    if data_url.len() < MIN_ARTIFACT_LEN {
        return Err(GenerationError::EmptyArtifact { what });
    }
    Ok(())
}

fn required_prompt(prompt: &str) -> GenerationResult<&str> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(GenerationError::MissingPrompt);
    }
    Ok(prompt)
}

fn export_artifact(
    what: &'static str,
    editor: &impl ArtifactEditor,
) -> GenerationResult<ImagePart> {
    if editor.is_blank() {
        return Err(GenerationError::EmptyArtifact { what });
    }
    let data_url = editor.export()?;
    validate_artifact(what, &data_url)?;
    ImagePart::from_data_url(&data_url)
}

pub fn inpaint_parts(
    source: &ImagePart,
    painter: &MaskPainter,
    instruction: &str,
) -> GenerationResult<Vec<Part>> {
    let instruction = required_prompt(instruction)?;
    let mask = export_artifact("mask", painter)?;
    Ok(vec![
        Part::InlineData(source.clone()),
        Part::InlineData(mask),
        Part::Text(prompt::inpaint(instruction)),
    ])
}

pub fn pose_transfer_parts(
    source: &ImagePart,
    editor: &PoseEditor,
) -> GenerationResult<Vec<Part>> {
    let pose = export_artifact("pose", editor)?;
    Ok(vec![
        Part::InlineData(source.clone()),
        Part::InlineData(pose),
        Part::Text(prompt::pose_transfer(editor.face_direction())),
    ])
}

pub fn outpaint_parts(compositor: &Compositor, theme: Option<&str>) -> GenerationResult<Vec<Part>> {
    let canvas = export_artifact("outpaint canvas", compositor)?;
    Ok(vec![
        Part::InlineData(canvas),
        Part::Text(prompt::outpaint(theme)),
    ])
}

pub fn extract_pose_parts(source: &ImagePart) -> Vec<Part> {
    vec![
        Part::InlineData(source.clone()),
        Part::Text(prompt::EXTRACT_POSE_PROMPT.to_string()),
    ]
}

/// Scribble plus prompt. An empty `style` falls back to the first of [`SCRIBBLE_STYLES`].
pub fn scribble_parts(
    editor: &ScribbleEditor,
    style: &str,
    subject: &str,
) -> GenerationResult<Vec<Part>> {
    let subject = required_prompt(subject)?;
    if editor.is_blank() {
        return Err(GenerationError::EmptyArtifact { what: "scribble" });
    }
    let data_url = editor.export()?;
    if data_url.len() < MIN_SCRIBBLE_LEN {
        return Err(GenerationError::EmptyArtifact { what: "scribble" });
    }
    let style = Some(style.trim())
        .filter(|style| !style.is_empty())
        .unwrap_or(SCRIBBLE_STYLES[0]);
    Ok(vec![
        Part::InlineData(ImagePart::from_data_url(&data_url)?),
        Part::Text(prompt::scribble(style, subject)),
    ])
}

/// Background, subject and a mask painted over the background, in that order.
pub fn poster_parts(
    background: &ImagePart,
    subject: &ImagePart,
    painter: &MaskPainter,
    instructions: Option<&str>,
) -> GenerationResult<Vec<Part>> {
    let mask = export_artifact("poster mask", painter)?;
    Ok(vec![
        Part::InlineData(background.clone()),
        Part::InlineData(subject.clone()),
        Part::InlineData(mask),
        Part::Text(prompt::poster(instructions)),
    ])
}

pub fn detection_parts(
    source: &ImagePart,
    request: &DetectionRequest,
) -> GenerationResult<Vec<Part>> {
    if request.types.is_empty() {
        return Err(GenerationError::NoDetectionTypes);
    }
    Ok(vec![
        Part::InlineData(source.clone()),
        Part::Text(prompt::detection(
            &request.types,
            &request.colors,
            request.sensitivity.min(100),
        )),
    ])
}

/// Checks that a returned data URL really carries a decodable image.
fn validate_image_response(image: &str) -> GenerationResult<()> {
    let malformed = |message: String| GenerationError::MalformedResponse { message };
    let url = DataUrl::parse(image).map_err(|err| malformed(err.to_string()))?;
    if !url.mime_type.starts_with("image/") {
        return Err(malformed(format!("expected an image, got {}", url.mime_type)));
    }
    let bytes = url
        .decode_payload()
        .map_err(|err| malformed(err.to_string()))?;
    decode_image_bytes(&bytes).map_err(|err| malformed(err.to_string()))?;
    Ok(())
}

fn run_image_request(
    backend: &dyn GenerationBackend,
    tool: &'static str,
    parts: &[Part],
) -> GenerationResult<String> {
    tracing::info!(tool, parts = parts.len(), "submitting generation request");
    let result = backend.generate_image(parts).and_then(|image| {
        validate_image_response(&image)?;
        Ok(image)
    });
    match &result {
        Ok(_) => tracing::info!(tool, "generation request completed"),
        Err(err) => tracing::warn!(tool, %err, "generation request failed"),
    }
    result
}

pub fn submit_inpaint(
    backend: &dyn GenerationBackend,
    source: &ImagePart,
    painter: &MaskPainter,
    instruction: &str,
) -> GenerationResult<String> {
    let parts = inpaint_parts(source, painter, instruction)?;
    run_image_request(backend, "inpaint", &parts)
}

pub fn submit_pose_transfer(
    backend: &dyn GenerationBackend,
    source: &ImagePart,
    editor: &PoseEditor,
) -> GenerationResult<String> {
    let parts = pose_transfer_parts(source, editor)?;
    run_image_request(backend, "pose", &parts)
}

pub fn submit_outpaint(
    backend: &dyn GenerationBackend,
    compositor: &Compositor,
    theme: Option<&str>,
) -> GenerationResult<String> {
    let parts = outpaint_parts(compositor, theme)?;
    run_image_request(backend, "outpaint", &parts)
}

pub fn submit_scribble(
    backend: &dyn GenerationBackend,
    editor: &ScribbleEditor,
    style: &str,
    subject: &str,
) -> GenerationResult<String> {
    let parts = scribble_parts(editor, style, subject)?;
    run_image_request(backend, "scribble", &parts)
}

pub fn submit_poster(
    backend: &dyn GenerationBackend,
    background: &ImagePart,
    subject: &ImagePart,
    painter: &MaskPainter,
    instructions: Option<&str>,
) -> GenerationResult<String> {
    let parts = poster_parts(background, subject, painter, instructions)?;
    run_image_request(backend, "poster", &parts)
}

/// Asks the service to locate debris; returns normalized boxes ready for
/// [`mask_from_boxes`](crate::editor::mask_from_boxes) or
/// [`MaskPainter::load_detections`].
pub fn detect_debris(
    backend: &dyn GenerationBackend,
    source: &ImagePart,
    request: &DetectionRequest,
) -> GenerationResult<Vec<DetectionBox>> {
    let parts = detection_parts(source, request)?;
    tracing::info!(types = request.types.len(), "requesting debris detection");
    let json = backend.generate_json(&parts).inspect_err(|err| {
        tracing::warn!(%err, "debris detection failed");
    })?;
    let boxes = parse_detections(&json)?;
    tracing::info!(found = boxes.len(), "debris detection completed");
    Ok(boxes)
}

/// Asks the service for the subject's pose as normalized line segments.
pub fn extract_pose(
    backend: &dyn GenerationBackend,
    source: &ImagePart,
) -> GenerationResult<Vec<[f64; 4]>> {
    let parts = extract_pose_parts(source);
    tracing::info!("requesting pose extraction");
    let json = backend.generate_json(&parts).inspect_err(|err| {
        tracing::warn!(%err, "pose extraction failed");
    })?;
    parse_pose_lines(&json)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use image::RgbaImage;

    use super::*;
    use crate::canvas::encode_png_data_url;
    use crate::editor::{AspectRatio, FaceDirection, POSE_TEMPLATES};
    use crate::geometry::Point;

    struct FakeBackend {
        image: Result<String, String>,
        json: String,
        calls: RefCell<Vec<Vec<Part>>>,
    }

    impl FakeBackend {
        fn returning(image: Result<String, String>) -> Self {
            Self {
                image,
                json: String::new(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl GenerationBackend for FakeBackend {
        fn generate_image(&self, parts: &[Part]) -> GenerationResult<String> {
            self.calls.borrow_mut().push(parts.to_vec());
            self.image
                .clone()
                .map_err(|message| GenerationError::Backend { message })
        }

        fn generate_json(&self, parts: &[Part]) -> GenerationResult<String> {
            self.calls.borrow_mut().push(parts.to_vec());
            Ok(self.json.clone())
        }
    }

    fn source_part() -> ImagePart {
        let url = encode_png_data_url(&RgbaImage::from_pixel(16, 16, image::Rgba([9, 9, 9, 255])))
            .expect("png should encode");
        ImagePart::from_data_url(&url).expect("part should parse")
    }

    fn result_image() -> String {
        encode_png_data_url(&RgbaImage::new(2, 2)).expect("png should encode")
    }

    fn painted_painter() -> MaskPainter {
        let mut painter = MaskPainter::new(32);
        painter
            .load_image(&RgbaImage::from_pixel(32, 32, image::Rgba([90, 90, 90, 255])))
            .expect("image should load");
        painter.paint(&[Point::new(4.0, 4.0), Point::new(28.0, 28.0)], 8);
        painter
    }

    #[test]
    fn image_part_splits_data_url() {
        let part = ImagePart::from_data_url("data:image/webp;base64,AAAA").expect("part");
        assert_eq!(part.mime_type, "image/webp");
        assert_eq!(part.data, "AAAA");
        assert_eq!(part.to_data_url(), "data:image/webp;base64,AAAA");
    }

    #[test]
    fn short_artifacts_are_rejected() {
        assert!(matches!(
            validate_artifact("mask", ""),
            Err(GenerationError::EmptyArtifact { what: "mask" })
        ));
        assert!(validate_artifact("mask", &"x".repeat(MIN_ARTIFACT_LEN)).is_ok());
    }

    #[test]
    fn inpaint_without_strokes_never_calls_backend() {
        let backend = FakeBackend::returning(Ok(result_image()));
        let mut painter = MaskPainter::new(32);
        painter
            .load_image(&RgbaImage::from_pixel(32, 32, image::Rgba([90, 90, 90, 255])))
            .expect("image should load");

        let err = submit_inpaint(&backend, &source_part(), &painter, "add a cat")
            .expect_err("blank mask should be rejected");
        assert!(matches!(err, GenerationError::EmptyArtifact { what: "mask" }));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn inpaint_requires_prompt() {
        let backend = FakeBackend::returning(Ok(result_image()));
        let err = submit_inpaint(&backend, &source_part(), &painted_painter(), "  ")
            .expect_err("empty prompt should be rejected");
        assert!(matches!(err, GenerationError::MissingPrompt));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn inpaint_sends_source_mask_and_prompt() {
        let backend = FakeBackend::returning(Ok(result_image()));
        let image = submit_inpaint(&backend, &source_part(), &painted_painter(), "add a cat")
            .expect("inpaint should succeed");
        assert_eq!(image, result_image());

        let calls = backend.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0], Part::InlineData(source_part()));
        assert!(matches!(&calls[0][1], Part::InlineData(mask) if mask.mime_type == "image/png"));
        assert!(matches!(&calls[0][2], Part::Text(text) if text.contains("add a cat")));
    }

    #[test]
    fn backend_failure_preserves_editor_state() {
        let backend = FakeBackend::returning(Err("quota exceeded".to_string()));
        let painter = painted_painter();
        let before = painter.export_mask().expect("mask");

        let err = submit_inpaint(&backend, &source_part(), &painter, "add a cat")
            .expect_err("backend failure should surface");
        assert!(matches!(err, GenerationError::Backend { .. }));
        assert_eq!(painter.export_mask().expect("mask"), before);
    }

    #[test]
    fn non_image_response_is_malformed() {
        let backend = FakeBackend::returning(Ok("sorry, no image".to_string()));
        let err = submit_inpaint(&backend, &source_part(), &painted_painter(), "add a cat")
            .expect_err("text response should be rejected");
        assert!(matches!(err, GenerationError::MalformedResponse { .. }));
    }

    #[test]
    fn undecodable_image_response_is_malformed() {
        for response in [
            "data:image/png;base64,!!!",
            "data:text/plain;base64,AAAA",
            "data:image/png;base64,AAAA",
        ] {
            let backend = FakeBackend::returning(Ok(response.to_string()));
            let err = submit_inpaint(&backend, &source_part(), &painted_painter(), "add a cat")
                .expect_err("response should be rejected");
            assert!(
                matches!(err, GenerationError::MalformedResponse { .. }),
                "{response} should be malformed"
            );
        }
    }

    #[test]
    fn pose_transfer_rejects_empty_pose() {
        let backend = FakeBackend::returning(Ok(result_image()));
        let editor = PoseEditor::new(64);
        let err = submit_pose_transfer(&backend, &source_part(), &editor)
            .expect_err("empty pose should be rejected");
        assert!(matches!(err, GenerationError::EmptyArtifact { what: "pose" }));
    }

    #[test]
    fn pose_transfer_includes_direction_prompt() {
        let mut editor = PoseEditor::new(64);
        editor.apply_template(&POSE_TEMPLATES[2]);
        editor.set_face_direction(FaceDirection::Up);

        let parts = pose_transfer_parts(&source_part(), &editor).expect("parts");
        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[2], Part::Text(text) if text.contains("upwards")));
    }

    #[test]
    fn outpaint_requires_a_composed_canvas() {
        let backend = FakeBackend::returning(Ok(result_image()));
        let mut compositor = Compositor::new(256);
        let err = submit_outpaint(&backend, &compositor, None)
            .expect_err("nothing composed yet");
        assert!(matches!(err, GenerationError::EmptyArtifact { .. }));

        compositor.set_ratio(AspectRatio::new(16, 9));
        compositor
            .compose(&RgbaImage::from_pixel(40, 40, image::Rgba([200, 10, 10, 255])))
            .expect("compose");
        submit_outpaint(&backend, &compositor, Some("a beach")).expect("outpaint");
        assert_eq!(backend.calls.borrow().len(), 1);
    }

    #[test]
    fn extract_pose_parses_backend_json() {
        let mut backend = FakeBackend::returning(Ok(result_image()));
        backend.json = r#"{"lines": [[0.5, 0.1, 0.5, 0.4], [0.5, 0.4, 0.4, 0.7]]}"#.to_string();

        let lines = extract_pose(&backend, &source_part()).expect("pose should parse");
        assert_eq!(lines, vec![[0.5, 0.1, 0.5, 0.4], [0.5, 0.4, 0.4, 0.7]]);
    }

    #[test]
    fn scribble_requires_strokes_and_subject() {
        let backend = FakeBackend::returning(Ok(result_image()));
        let mut editor = ScribbleEditor::default();
        assert!(matches!(
            submit_scribble(&backend, &editor, "", "a fox"),
            Err(GenerationError::EmptyArtifact { what: "scribble" })
        ));

        editor.paint(&[Point::new(100.0, 100.0), Point::new(400.0, 300.0)]);
        assert!(matches!(
            submit_scribble(&backend, &editor, "", " "),
            Err(GenerationError::MissingPrompt)
        ));
        assert!(backend.calls.borrow().is_empty());

        submit_scribble(&backend, &editor, "", "a fox").expect("scribble should succeed");
        let calls = backend.calls.borrow();
        assert_eq!(calls[0].len(), 2);
        assert!(matches!(&calls[0][1], Part::Text(text) if text.contains(SCRIBBLE_STYLES[0])));
    }

    #[test]
    fn poster_sends_background_subject_and_mask() {
        let backend = FakeBackend::returning(Ok(result_image()));
        let subject = ImagePart::from_bytes("image/jpeg", &[1, 2, 3]);
        submit_poster(&backend, &source_part(), &subject, &painted_painter(), None)
            .expect("poster should succeed");

        let calls = backend.calls.borrow();
        assert_eq!(calls[0].len(), 4);
        assert_eq!(calls[0][0], Part::InlineData(source_part()));
        assert_eq!(calls[0][1], Part::InlineData(subject));
        assert!(matches!(&calls[0][2], Part::InlineData(mask) if mask.mime_type == "image/png"));
        assert!(matches!(&calls[0][3], Part::Text(text) if text.contains("\"None.\"")));
    }

    #[test]
    fn poster_without_mask_is_rejected() {
        let backend = FakeBackend::returning(Ok(result_image()));
        let mut painter = MaskPainter::new(32);
        painter
            .load_image(&RgbaImage::from_pixel(32, 32, image::Rgba([90, 90, 90, 255])))
            .expect("image should load");
        let err = submit_poster(&backend, &source_part(), &source_part(), &painter, Some("x"))
            .expect_err("blank mask should be rejected");
        assert!(matches!(err, GenerationError::EmptyArtifact { what: "poster mask" }));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn detection_needs_a_type() {
        let backend = FakeBackend::returning(Ok(result_image()));
        let err = detect_debris(&backend, &source_part(), &DetectionRequest::default())
            .expect_err("no types should be rejected");
        assert!(matches!(err, GenerationError::NoDetectionTypes));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn detection_boxes_become_a_loadable_mask() {
        let mut backend = FakeBackend::returning(Ok(result_image()));
        backend.json = r#"{"detections": [{"box": [0.25, 0.25, 0.75, 0.5]}]}"#.to_string();
        let request = DetectionRequest::new(["hair"])
            .with_colors(["white"])
            .with_sensitivity(250);
        assert_eq!(request.sensitivity, 100);

        let boxes = detect_debris(&backend, &source_part(), &request).expect("detect");
        assert_eq!(boxes, vec![[0.25, 0.25, 0.75, 0.5]]);
        assert!(matches!(
            &backend.calls.borrow()[0][1],
            Part::Text(text) if text.contains("types: hair.") && text.contains("100/100")
        ));

        let mask = encode_png_data_url(&crate::editor::mask_from_boxes(32, 32, &boxes))
            .expect("mask should encode");
        let mut painter = MaskPainter::new(32);
        painter
            .load_image(&RgbaImage::from_pixel(32, 32, image::Rgba([90, 90, 90, 255])))
            .expect("image should load");
        painter.load_mask(&mask).expect("mask should load");
        assert_eq!(painter.masked_pixel_count(), 16 * 8);
    }
}

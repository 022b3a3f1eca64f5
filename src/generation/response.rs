use serde_json::Value;

use super::{GenerationError, GenerationResult};

fn malformed(message: impl Into<String>) -> GenerationError {
    GenerationError::MalformedResponse {
        message: message.into(),
    }
}

/// Drops a surrounding markdown code fence, which models sometimes add around JSON.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses `{"lines": [[x1, y1, x2, y2], ...]}` into flat segments.
///
/// Every segment must hold exactly four numbers; anything else rejects the whole response.
pub fn parse_pose_lines(json: &str) -> GenerationResult<Vec<[f64; 4]>> {
    let value: Value = serde_json::from_str(strip_code_fence(json))
        .map_err(|err| malformed(format!("invalid json: {err}")))?;
    let lines = value
        .get("lines")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing `lines` array"))?;

    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let coords = line
                .as_array()
                .filter(|coords| coords.len() == 4)
                .ok_or_else(|| malformed(format!("line {index} is not four numbers")))?;
            let mut flat = [0.0; 4];
            for (slot, coord) in flat.iter_mut().zip(coords) {
                *slot = coord
                    .as_f64()
                    .ok_or_else(|| malformed(format!("line {index} has a non-numeric value")))?;
            }
            Ok(flat)
        })
        .collect()
}

/// Parses `{"detections": [{"box": [x_min, y_min, x_max, y_max]}, ...]}` into boxes.
///
/// Coordinates are taken as given; clamping happens when the boxes are rasterized.
pub fn parse_detections(json: &str) -> GenerationResult<Vec<[f64; 4]>> {
    let value: Value = serde_json::from_str(strip_code_fence(json))
        .map_err(|err| malformed(format!("invalid json: {err}")))?;
    let detections = value
        .get("detections")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing `detections` array"))?;

    detections
        .iter()
        .enumerate()
        .map(|(index, detection)| {
            let coords = detection
                .get("box")
                .and_then(Value::as_array)
                .filter(|coords| coords.len() == 4)
                .ok_or_else(|| malformed(format!("detection {index} has no four-number box")))?;
            let mut bbox = [0.0; 4];
            for (slot, coord) in bbox.iter_mut().zip(coords) {
                *slot = coord.as_f64().ok_or_else(|| {
                    malformed(format!("detection {index} has a non-numeric value"))
                })?;
            }
            Ok(bbox)
        })
        .collect()
}

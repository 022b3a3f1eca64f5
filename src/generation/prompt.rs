use crate::editor::FaceDirection;

pub(super) const DEFAULT_OUTPAINT_THEME: &str = "Extend the existing scene seamlessly.";

pub(super) const EXTRACT_POSE_PROMPT: &str = "Analyze the image and identify the pose of the \
primary human subject as a simple stick figure. Respond with a JSON object with a single key \
'lines' whose value is an array of line segments (torso, arms, legs, head). Each segment is an \
array of four numbers [x1, y1, x2, y2], normalized so the top-left of the image is [0, 0] and \
the bottom-right is [1, 1].";

pub(super) fn inpaint(instruction: &str) -> String {
    format!(
        "Using the first image as the source and the second image as a mask (black areas mark \
         the region to edit), inpaint the masked area according to this instruction: \
         \"{instruction}\". Leave the rest of the image unchanged."
    )
}

pub(super) fn outpaint(theme: Option<&str>) -> String {
    let theme = theme
        .map(str::trim)
        .filter(|theme| !theme.is_empty())
        .unwrap_or(DEFAULT_OUTPAINT_THEME);
    format!(
        "This is an outpainting task. The image has transparent areas around the original \
         picture. Fill those areas so the scene extends naturally, using the prompt as a theme \
         for the new areas. Prompt: \"{theme}\""
    )
}

fn face_direction(direction: FaceDirection) -> &'static str {
    match direction {
        FaceDirection::Front => "The person should face forward, looking directly at the camera.",
        FaceDirection::Left => {
            "The person's head should be turned to their left, showing their right profile."
        }
        FaceDirection::Right => {
            "The person's head should be turned to their right, showing their left profile."
        }
        FaceDirection::Up => "The person should look upwards, chin tilted up.",
        FaceDirection::Down => "The person should look downwards, chin tilted down.",
    }
}

pub(super) fn pose_transfer(direction: FaceDirection) -> String {
    format!(
        "Change the pose of the person in the first image to match the stick figure in the \
         second image exactly. Keep the person's identity, appearance, clothing and the \
         background of the first image unchanged; only the pose may change. {}",
        face_direction(direction)
    )
}

pub(super) fn scribble(style: &str, subject: &str) -> String {
    format!(
        "Using this rough scribble/sketch as a structural guide, generate a detailed image in a \
         \"{style}\" style. The subject of the image is: \"{subject}\". Adhere to the \
         composition and shapes in the scribble."
    )
}

pub(super) fn poster(instructions: Option<&str>) -> String {
    let instructions = instructions
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or("None.");
    format!(
        "Use the first image as the background. Use the third image (mask) to define a region \
         on the background. Inpaint the person from the second image into the masked (black) \
         area of the background. Blend the subject naturally with the background's lighting \
         and style. Additional instructions: \"{instructions}\""
    )
}

pub(super) fn detection(types: &[String], colors: &[String], sensitivity: u8) -> String {
    let types = if types.is_empty() {
        "Identify all instances of dust, debris, and hair-like objects.".to_string()
    } else {
        format!("Identify all instances of the following types: {}.", types.join(", "))
    };
    let colors = if colors.is_empty() {
        "Consider items of all colors.".to_string()
    } else {
        format!("Focus on items with these colors: {}.", colors.join(", "))
    };
    format!(
        "Analyze the provided image to detect and locate specific types of debris. {types} \
         {colors} The detection sensitivity should be set to {sensitivity}/100; a higher value \
         means stricter detection, finding only more obvious items, while a lower value means \
         looser detection, finding more subtle items. For each detected item, provide its \
         bounding box coordinates. The output must be a JSON object containing a single key \
         \"detections\", which is an array of objects. Each object in the array should \
         represent a detected item and have a \"box\" property, which is an array of four \
         numbers [x_min, y_min, x_max, y_max]. The coordinates must be normalized to the image \
         dimensions (0.0 to 1.0). If no items are found, return an empty \"detections\" array."
    )
}

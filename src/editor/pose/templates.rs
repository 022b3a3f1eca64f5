/// Built-in starting poses, in normalized `[x1, y1, x2, y2]` form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseTemplate {
    pub name: &'static str,
    pub lines: &'static [[f64; 4]],
}

impl PoseTemplate {
    pub fn find(name: &str) -> Option<&'static PoseTemplate> {
        POSE_TEMPLATES
            .iter()
            .find(|template| template.name.eq_ignore_ascii_case(name))
    }
}

pub static POSE_TEMPLATES: [PoseTemplate; 4] = [
    PoseTemplate {
        name: "standing",
        lines: &[
            [0.5, 0.35, 0.5, 0.6],
            [0.5, 0.15, 0.5, 0.35],
            [0.5, 0.35, 0.4, 0.48],
            [0.4, 0.48, 0.35, 0.6],
            [0.35, 0.6, 0.33, 0.62],
            [0.5, 0.35, 0.6, 0.48],
            [0.6, 0.48, 0.65, 0.6],
            [0.65, 0.6, 0.67, 0.62],
            [0.5, 0.6, 0.45, 0.75],
            [0.45, 0.75, 0.4, 0.9],
            [0.4, 0.9, 0.35, 0.9],
            [0.5, 0.6, 0.55, 0.75],
            [0.55, 0.75, 0.6, 0.9],
            [0.6, 0.9, 0.65, 0.9],
        ],
    },
    PoseTemplate {
        name: "walking",
        lines: &[
            [0.5, 0.35, 0.5, 0.6],
            [0.5, 0.15, 0.5, 0.35],
            [0.5, 0.35, 0.6, 0.45],
            [0.6, 0.45, 0.7, 0.5],
            [0.7, 0.5, 0.72, 0.52],
            [0.5, 0.35, 0.4, 0.45],
            [0.4, 0.45, 0.3, 0.4],
            [0.3, 0.4, 0.28, 0.38],
            [0.5, 0.6, 0.4, 0.75],
            [0.4, 0.75, 0.35, 0.9],
            [0.35, 0.9, 0.3, 0.9],
            [0.5, 0.6, 0.6, 0.75],
            [0.6, 0.75, 0.65, 0.9],
            [0.65, 0.9, 0.7, 0.9],
        ],
    },
    PoseTemplate {
        name: "running",
        lines: &[
            [0.5, 0.35, 0.5, 0.6],
            [0.5, 0.15, 0.5, 0.35],
            [0.5, 0.35, 0.65, 0.35],
            [0.65, 0.35, 0.6, 0.25],
            [0.6, 0.25, 0.62, 0.23],
            [0.5, 0.35, 0.35, 0.4],
            [0.35, 0.4, 0.4, 0.5],
            [0.4, 0.5, 0.42, 0.52],
            [0.5, 0.6, 0.6, 0.7],
            [0.6, 0.7, 0.7, 0.8],
            [0.7, 0.8, 0.72, 0.78],
            [0.5, 0.6, 0.4, 0.65],
            [0.4, 0.65, 0.3, 0.8],
            [0.3, 0.8, 0.25, 0.8],
        ],
    },
    PoseTemplate {
        name: "sitting",
        lines: &[
            [0.5, 0.3, 0.5, 0.55],
            [0.5, 0.1, 0.5, 0.3],
            [0.5, 0.3, 0.4, 0.4],
            [0.4, 0.4, 0.35, 0.55],
            [0.35, 0.55, 0.33, 0.57],
            [0.5, 0.3, 0.6, 0.4],
            [0.6, 0.4, 0.65, 0.55],
            [0.65, 0.55, 0.67, 0.57],
            [0.5, 0.55, 0.3, 0.6],
            [0.3, 0.6, 0.3, 0.8],
            [0.3, 0.8, 0.35, 0.8],
            [0.5, 0.55, 0.7, 0.6],
            [0.7, 0.6, 0.7, 0.8],
            [0.7, 0.8, 0.65, 0.8],
        ],
    },
];

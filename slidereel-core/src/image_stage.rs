use crate::config::RenderConfig;
use crate::effects::{KenBurnsTrajectory, select_trajectory};
use crate::graph::{FilterStage, StreamLabel};

/// Precision used for zoom factors in pan/zoom expressions
const ZOOM_PRECISION: usize = 2;
/// Precision used for crop-centre offsets in pan/zoom expressions
const OFFSET_PRECISION: usize = 3;

/// Fit inside the output frame (shrink only), centre on black, normalise to BT.709.
pub fn scale_pad_filters(config: &RenderConfig) -> Vec<String> {
    let (w, h) = (config.output_width, config.output_height);
    vec![
        format!("scale={w}:{h}:force_original_aspect_ratio=decrease"),
        format!("pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black"),
        "setsar=1".to_string(),
        "format=yuv420p".to_string(),
        "colorspace=all=bt709:iall=bt601-6-625:fast=1".to_string(),
    ]
}

/// Build the stage for one image, reading input `input_index` and producing `v{input_index}`.
///
/// `image_index` picks the pan/zoom trajectory when motion is enabled.
pub fn build_image_stage(
    input_index: usize,
    image_index: usize,
    config: &RenderConfig,
) -> FilterStage {
    let mut stage = FilterStage::new(
        vec![StreamLabel::Input(input_index)],
        format!("v{input_index}"),
    );
    for filter in scale_pad_filters(config) {
        stage = stage.filter(filter);
    }

    if config.ken_burns {
        let trajectory = select_trajectory(image_index);
        log::debug!("Image {image_index}: {}", trajectory.name);
        stage = stage.filter(zoompan_filter(&trajectory, config));
    }
    stage
}

/// `zoompan` driven by a trajectory, interpolated over exactly `frame_count` frames.
///
/// Past the last frame the end pose is held, so inputs extended for a
/// crossfade do not overshoot.
pub fn zoompan_filter(trajectory: &KenBurnsTrajectory, config: &RenderConfig) -> String {
    let frames = config.frame_count();
    let zoom = lerp_expr(
        trajectory.start_zoom,
        trajectory.end_zoom,
        ZOOM_PRECISION,
        frames,
    );
    let centre_x = lerp_expr(
        trajectory.start_x,
        trajectory.end_x,
        OFFSET_PRECISION,
        frames,
    );
    let centre_y = lerp_expr(
        trajectory.start_y,
        trajectory.end_y,
        OFFSET_PRECISION,
        frames,
    );

    format!(
        "zoompan=z='{zoom}'\
         :x='max(0,min(iw-iw/zoom,iw*{centre_x}-iw/zoom/2))'\
         :y='max(0,min(ih-ih/zoom,ih*{centre_y}-ih/zoom/2))'\
         :d=1:s={w}x{h}:fps={fps}",
        w = config.output_width,
        h = config.output_height,
        fps = config.frame_rate,
    )
}

// Rust float formatting never uses a locale decimal comma, which the
// filtergraph parser would read as an argument separator.
fn lerp_expr(start: f64, end: f64, precision: usize, frames: u32) -> String {
    format!(
        "({start:.p$}+({end:.p$}-{start:.p$})*min(on,{frames})/{frames})",
        p = precision
    )
}

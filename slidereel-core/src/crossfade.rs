//! Crossfade chain assembly for multi-image slideshows.

use crate::config::RenderConfig;
use crate::error::{Result, SlideshowError};
use crate::graph::{FilterGraph, FilterStage, OUTPUT_LABEL, StreamLabel};
use crate::image_stage::build_image_stage;

/// Left-to-right transition state: the stream accumulated so far and how
/// many transitions have been emitted.
#[derive(Debug, Clone)]
pub struct CrossfadeChain {
    current: StreamLabel,
    emitted: usize,
    interval_secs: f64,
    fade_secs: f64,
}

impl CrossfadeChain {
    pub fn new(first: StreamLabel, config: &RenderConfig) -> Self {
        Self {
            current: first,
            emitted: 0,
            interval_secs: f64::from(config.image_duration_secs) - config.fade_duration_secs,
            fade_secs: config.fade_duration_secs,
        }
    }

    /// Offset of the next transition.
    ///
    /// Each transition starts one `image - fade` interval after the previous one.
    pub fn next_offset(&self) -> f64 {
        self.interval_secs * (self.emitted + 1) as f64
    }

    /// Fade `next` in over the current stream; the last transition writes `out`.
    pub fn push(&mut self, next: StreamLabel, is_last: bool) -> FilterStage {
        let output = if is_last {
            OUTPUT_LABEL.to_string()
        } else {
            format!("x{}", self.emitted + 1)
        };
        let left = std::mem::replace(&mut self.current, StreamLabel::named(output.clone()));
        let stage = FilterStage::new(vec![left, next], output).filter(format!(
            "xfade=transition=fade:duration={:.3}:offset={:.3}",
            self.fade_secs,
            self.next_offset()
        ));
        self.emitted += 1;
        stage
    }

    pub fn transitions(&self) -> usize {
        self.emitted
    }
}

/// Graph for two or more images joined by crossfades.
///
/// Image `i` is read from input `i`; every input must be fed for
/// `image + fade` seconds so both sides of each fade have frames.
pub fn build_crossfade_graph(image_count: usize, config: &RenderConfig) -> Result<FilterGraph> {
    if image_count < 2 {
        return Err(SlideshowError::invalid_config(format!(
            "crossfade needs at least 2 images, got {image_count}"
        )));
    }
    config.validate_crossfade()?;

    let mut graph = FilterGraph::new();
    for index in 0..image_count {
        graph.push(build_image_stage(index, index, config));
    }

    let mut chain = CrossfadeChain::new(StreamLabel::image(0), config);
    for index in 1..image_count {
        let stage = chain.push(StreamLabel::image(index), index == image_count - 1);
        graph.push(stage);
    }
    log::debug!(
        "Built crossfade graph: {image_count} images, {} transitions",
        chain.transitions()
    );

    graph.validate()?;
    Ok(graph)
}

/// Graph for a lone image: its stage passed straight through to `out`
pub fn build_single_image_graph(config: &RenderConfig) -> Result<FilterGraph> {
    let mut graph = FilterGraph::new();
    let stage = build_image_stage(0, 0, config);
    let label = stage.output_label();
    graph.push(stage);
    graph.push(FilterStage::new(vec![label], OUTPUT_LABEL).filter("null"));
    graph.validate()?;
    Ok(graph)
}

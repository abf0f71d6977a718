//! Typed filter-graph model.
//!
//! Stages are collected as values and serialized once into the text passed to
//! `-filter_complex`, after label usage has been checked.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{Result, SlideshowError};

/// Label of the stream mapped to the encoder
pub const OUTPUT_LABEL: &str = "out";

/// A stream consumed by a stage: either the video of an input file or a
/// label produced by an earlier stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamLabel {
    Input(usize),
    Named(String),
}

impl StreamLabel {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Per-image stream label `v{index}`
    pub fn image(input_index: usize) -> Self {
        Self::Named(format!("v{input_index}"))
    }

    pub fn output() -> Self {
        Self::Named(OUTPUT_LABEL.to_string())
    }
}

impl fmt::Display for StreamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamLabel::Input(index) => write!(f, "[{index}:v]"),
            StreamLabel::Named(name) => write!(f, "[{name}]"),
        }
    }
}

/// One filter chain: inputs, comma-joined filters, one named output
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStage {
    inputs: Vec<StreamLabel>,
    filters: Vec<String>,
    output: String,
}

impl FilterStage {
    pub fn new(inputs: Vec<StreamLabel>, output: impl Into<String>) -> Self {
        Self {
            inputs,
            filters: Vec::new(),
            output: output.into(),
        }
    }

    /// Append a filter to the chain
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn inputs(&self) -> &[StreamLabel] {
        &self.inputs
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn output_label(&self) -> StreamLabel {
        StreamLabel::named(self.output.clone())
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "{input}")?;
        }
        write!(f, "{}[{}]", self.filters.join(","), self.output)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    stages: Vec<FilterStage>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: FilterStage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Check label usage.
    ///
    /// Every named label is produced once and consumed exactly once by a later
    /// stage, except `out`, which is produced once and never consumed. Each
    /// input file is read by at most one stage.
    pub fn validate(&self) -> Result<()> {
        let mut produced_at: HashMap<&str, usize> = HashMap::new();
        for (position, stage) in self.stages.iter().enumerate() {
            if stage.filters.is_empty() {
                return Err(SlideshowError::invalid_graph(format!(
                    "stage producing [{}] has no filters",
                    stage.output
                )));
            }
            if produced_at.insert(stage.output.as_str(), position).is_some() {
                return Err(SlideshowError::invalid_graph(format!(
                    "label [{}] is produced more than once",
                    stage.output
                )));
            }
        }

        let mut consumed: HashSet<&str> = HashSet::new();
        let mut inputs_read: HashSet<usize> = HashSet::new();
        for (position, stage) in self.stages.iter().enumerate() {
            for input in &stage.inputs {
                match input {
                    StreamLabel::Input(index) => {
                        if !inputs_read.insert(*index) {
                            return Err(SlideshowError::invalid_graph(format!(
                                "input {index} is read more than once"
                            )));
                        }
                    }
                    StreamLabel::Named(name) => {
                        match produced_at.get(name.as_str()) {
                            Some(&at) if at < position => {}
                            _ => {
                                return Err(SlideshowError::invalid_graph(format!(
                                    "label [{name}] is consumed before it is produced"
                                )));
                            }
                        }
                        if name == OUTPUT_LABEL {
                            return Err(SlideshowError::invalid_graph(
                                "label [out] must not be consumed",
                            ));
                        }
                        if !consumed.insert(name.as_str()) {
                            return Err(SlideshowError::invalid_graph(format!(
                                "label [{name}] is consumed more than once"
                            )));
                        }
                    }
                }
            }
        }

        if !produced_at.contains_key(OUTPUT_LABEL) {
            return Err(SlideshowError::invalid_graph("no stage produces [out]"));
        }
        let mut dangling: Vec<&str> = produced_at
            .keys()
            .copied()
            .filter(|name| *name != OUTPUT_LABEL && !consumed.contains(name))
            .collect();
        if !dangling.is_empty() {
            dangling.sort_unstable();
            return Err(SlideshowError::invalid_graph(format!(
                "labels never consumed: {}",
                dangling.join(", ")
            )));
        }
        Ok(())
    }

    /// Validate and serialize to `-filter_complex` text
    pub fn to_filter_complex(&self) -> Result<String> {
        self.validate()?;
        Ok(self.to_string())
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{stage}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_image_graph() -> FilterGraph {
        let mut graph = FilterGraph::new();
        graph.push(FilterStage::new(vec![StreamLabel::Input(0)], "v0").filter("null"));
        graph.push(FilterStage::new(vec![StreamLabel::Input(1)], "v1").filter("null"));
        graph.push(
            FilterStage::new(vec![StreamLabel::image(0), StreamLabel::image(1)], OUTPUT_LABEL)
                .filter("xfade"),
        );
        graph
    }

    #[test]
    fn test_serializes_stages_with_semicolons() {
        let graph = two_image_graph();
        assert_eq!(
            graph.to_filter_complex().unwrap(),
            "[0:v]null[v0];[1:v]null[v1];[v0][v1]xfade[out]"
        );
    }

    #[test]
    fn test_filters_joined_with_commas() {
        let stage = FilterStage::new(vec![StreamLabel::Input(3)], "v3")
            .filter("scale=1:1")
            .filter("setsar=1");
        assert_eq!(stage.to_string(), "[3:v]scale=1:1,setsar=1[v3]");
    }

    #[test]
    fn test_rejects_duplicate_output() {
        let mut graph = two_image_graph();
        graph.push(FilterStage::new(vec![StreamLabel::Input(2)], "v1").filter("null"));
        assert!(matches!(
            graph.validate(),
            Err(SlideshowError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_rejects_unconsumed_label() {
        let mut graph = FilterGraph::new();
        graph.push(FilterStage::new(vec![StreamLabel::Input(0)], "v0").filter("null"));
        graph.push(FilterStage::new(vec![StreamLabel::Input(1)], OUTPUT_LABEL).filter("null"));
        let err = graph.validate().unwrap_err().to_string();
        assert!(err.contains("v0"), "{err}");
    }

    #[test]
    fn test_rejects_double_consumption() {
        let mut graph = FilterGraph::new();
        graph.push(FilterStage::new(vec![StreamLabel::Input(0)], "v0").filter("null"));
        graph.push(
            FilterStage::new(vec![StreamLabel::image(0), StreamLabel::image(0)], OUTPUT_LABEL)
                .filter("xfade"),
        );
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_rejects_forward_reference() {
        let mut graph = FilterGraph::new();
        graph.push(FilterStage::new(vec![StreamLabel::image(0)], OUTPUT_LABEL).filter("null"));
        graph.push(FilterStage::new(vec![StreamLabel::Input(0)], "v0").filter("null"));
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_rejects_consumed_out_and_missing_out() {
        let mut graph = FilterGraph::new();
        graph.push(FilterStage::new(vec![StreamLabel::Input(0)], OUTPUT_LABEL).filter("null"));
        graph.push(FilterStage::new(vec![StreamLabel::output()], "tail").filter("null"));
        assert!(graph.validate().is_err());

        let mut graph = FilterGraph::new();
        graph.push(FilterStage::new(vec![StreamLabel::Input(0)], "v0").filter("null"));
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_rejects_input_read_twice() {
        let mut graph = FilterGraph::new();
        graph.push(FilterStage::new(vec![StreamLabel::Input(0)], "v0").filter("null"));
        graph.push(
            FilterStage::new(vec![StreamLabel::image(0), StreamLabel::Input(0)], OUTPUT_LABEL)
                .filter("xfade"),
        );
        assert!(graph.validate().is_err());
    }
}

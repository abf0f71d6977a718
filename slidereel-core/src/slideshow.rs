use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::assets::ImageSequence;
use crate::concat::{ConcatManifest, build_concat_manifest};
use crate::config::RenderConfig;
use crate::crossfade::{build_crossfade_graph, build_single_image_graph};
use crate::error::Result;
use crate::ffmpeg_wrapper::{FFMPEG_PROGRAM, FFmpegCommand};
use crate::image_stage::scale_pad_filters;

/// Stand-in for the manifest path when no file has been written yet
pub const MANIFEST_PLACEHOLDER: &str = "<concat-manifest>";

/// How the images are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// One image, no transition
    SingleImage,
    /// Hard cuts through the concat demuxer
    Concat,
    /// Chained crossfades through a filter graph
    Crossfade,
}

impl RenderMode {
    pub fn choose(image_count: usize, config: &RenderConfig) -> Self {
        if image_count <= 1 {
            RenderMode::SingleImage
        } else if config.crossfade_enabled() {
            RenderMode::Crossfade
        } else {
            RenderMode::Concat
        }
    }
}

/// Everything needed to launch the encoder for one run
#[derive(Debug, Clone, Serialize)]
pub struct RenderPlan {
    pub mode: RenderMode,
    pub config: RenderConfig,
    pub images: ImageSequence,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_graph: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ConcatManifest>,
}

impl RenderPlan {
    pub fn new(
        images: ImageSequence,
        config: RenderConfig,
        output: impl AsRef<Path>,
    ) -> Result<Self> {
        config.validate()?;
        let mode = RenderMode::choose(images.len(), &config);
        log::info!("Rendering {} image(s) in {:?} mode", images.len(), mode);

        let (filter_graph, manifest) = match mode {
            RenderMode::SingleImage => {
                let graph = build_single_image_graph(&config)?;
                (Some(graph.to_filter_complex()?), None)
            }
            RenderMode::Crossfade => {
                let graph = build_crossfade_graph(images.len(), &config)?;
                (Some(graph.to_filter_complex()?), None)
            }
            RenderMode::Concat => {
                if config.ken_burns {
                    log::warn!(
                        "Ken Burns motion is not supported without crossfades; \
                         images will be scaled without pan/zoom"
                    );
                }
                (
                    None,
                    Some(build_concat_manifest(&images, config.image_duration_secs)),
                )
            }
        };

        if let Some(ref graph) = filter_graph {
            log::debug!("Filter graph: {}", graph);
        }

        Ok(Self {
            mode,
            config,
            images,
            output: output.as_ref().to_path_buf(),
            filter_graph,
            manifest,
        })
    }

    /// Length of the rendered video in seconds
    pub fn expected_duration_secs(&self) -> f64 {
        let image = f64::from(self.config.image_duration_secs);
        let count = self.images.len() as f64;
        match self.mode {
            RenderMode::SingleImage => image,
            RenderMode::Concat => image * count,
            RenderMode::Crossfade => {
                let fade = self.config.fade_duration_secs;
                (count - 1.0) * (image - fade) + image + fade
            }
        }
    }

    /// Encoder invocation for this plan.
    ///
    /// `manifest_path` is where the concat manifest was written; it is only
    /// read in concat mode.
    pub fn command(&self, manifest_path: Option<&Path>) -> FFmpegCommand {
        let mut cmd = FFmpegCommand::new(&self.output)
            .frame_rate(self.config.frame_rate)
            .overwrite();

        match self.mode {
            RenderMode::SingleImage => {
                for path in self.images.iter() {
                    cmd = cmd.looped_image(path, f64::from(self.config.image_duration_secs));
                }
            }
            RenderMode::Crossfade => {
                let duration = self.config.extended_input_duration_secs();
                for path in self.images.iter() {
                    cmd = cmd.looped_image(path, duration);
                }
            }
            RenderMode::Concat => {
                cmd = cmd.concat_list(
                    manifest_path.unwrap_or_else(|| Path::new(MANIFEST_PLACEHOLDER)),
                );
                for filter in scale_pad_filters(&self.config) {
                    cmd = cmd.video_filter(filter);
                }
            }
        }

        if let Some(ref graph) = self.filter_graph {
            cmd = cmd.filter_complex(graph.clone());
        }
        cmd
    }

    /// Pretty JSON of the plan and the encoder arguments it would run
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct DryRun<'a> {
            #[serde(flatten)]
            plan: &'a RenderPlan,
            expected_duration_secs: f64,
            ffmpeg_args: Vec<String>,
        }

        let report = DryRun {
            plan: self,
            expected_duration_secs: self.expected_duration_secs(),
            ffmpeg_args: self.command(None).args(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

/// Turns a directory of images into a slideshow video
pub struct Slideshow {
    input_dir: PathBuf,
    output_path: PathBuf,
    config: RenderConfig,
    program: OsString,
}

impl Slideshow {
    pub fn new(input_dir: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_path: output.as_ref().to_path_buf(),
            config: RenderConfig::default(),
            program: OsString::from(FFMPEG_PROGRAM),
        }
    }

    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn image_duration(mut self, seconds: u32) -> Self {
        self.config = self.config.image_duration(seconds);
        self
    }

    pub fn fade_duration(mut self, seconds: f64) -> Self {
        self.config = self.config.fade_duration(seconds);
        self
    }

    pub fn ken_burns(mut self, enabled: bool) -> Self {
        self.config = self.config.ken_burns(enabled);
        self
    }

    /// Encoder executable, `ffmpeg` by default
    pub fn program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Enumerate the inputs and build the plan without running anything
    pub fn plan(&self) -> Result<RenderPlan> {
        let images = ImageSequence::from_dir(&self.input_dir)?;
        RenderPlan::new(images, self.config.clone(), &self.output_path)
    }

    /// Build the plan and run the encoder to completion
    pub fn process(&self) -> Result<()> {
        let plan = self.plan()?;

        // Removed when dropped, on success and on failure
        let manifest_file = match plan.manifest {
            Some(ref manifest) => Some(manifest.write_temp()?),
            None => None,
        };
        let cmd = plan
            .command(manifest_file.as_ref().map(|file| file.path()))
            .program(&self.program);
        log::debug!("FFmpeg arguments: {:?}", cmd.args());

        // Set up progress bar
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
                .progress_chars("#>-"),
        );

        let total = plan.expected_duration_secs();
        let pb_clone = pb.clone();
        let result = cmd.execute(move |progress| {
            let percent = (progress.seconds / total * 100.0).clamp(0.0, 100.0);
            pb_clone.set_position(percent as u64);
            pb_clone.set_message(format!("{:.1}s / {:.1}s", progress.seconds, total));
        });

        if result.is_ok() {
            pb.finish_with_message("Rendering complete!");
        } else {
            pb.abandon_with_message("Rendering failed");
        }
        drop(manifest_file);
        result?;

        log::info!("Slideshow rendered successfully!");
        log::info!("Output saved to: {:?}", self.output_path);
        Ok(())
    }
}

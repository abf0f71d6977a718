use regex::Regex;
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::error::{Result, SlideshowError};
use crate::graph::OUTPUT_LABEL;

pub const FFMPEG_PROGRAM: &str = "ffmpeg";

// Fixed output profile
pub const VIDEO_CODEC: &str = "libx264";
pub const QUALITY_CRF: u8 = 20;
pub const ENCODER_PRESET: &str = "medium";
pub const PIXEL_FORMAT: &str = "yuv420p";
pub const COLOR_STANDARD: &str = "bt709";

static PROGRESS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("progress pattern is valid")
});

/// A source handed to FFmpeg with `-i`
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// A still image looped at the output frame rate for a fixed time
    LoopedImage { path: PathBuf, duration_secs: f64 },
    /// A concat-demuxer list file
    ConcatList { path: PathBuf },
}

/// Progress reported while FFmpeg runs
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Output time reached so far
    pub seconds: f64,
    /// Raw line the time was read from
    pub line: String,
}

/// FFmpeg command builder with fluent interface
#[derive(Debug, Clone)]
pub struct FFmpegCommand {
    program: OsString,
    inputs: Vec<InputSource>,
    output: PathBuf,
    filter_complex: Option<String>,
    video_filters: Vec<String>,
    frame_rate: u32,
    overwrite: bool,
}

impl FFmpegCommand {
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            program: OsString::from(FFMPEG_PROGRAM),
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            filter_complex: None,
            video_filters: Vec::new(),
            frame_rate: crate::config::FRAME_RATE,
            overwrite: false,
        }
    }

    /// Use a different executable instead of `ffmpeg` from PATH
    pub fn program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn input(mut self, input: InputSource) -> Self {
        self.inputs.push(input);
        self
    }

    /// Add a still image, looped for `duration_secs`
    pub fn looped_image(self, path: impl AsRef<Path>, duration_secs: f64) -> Self {
        self.input(InputSource::LoopedImage {
            path: path.as_ref().to_path_buf(),
            duration_secs,
        })
    }

    /// Add a concat-demuxer list file
    pub fn concat_list(self, path: impl AsRef<Path>) -> Self {
        self.input(InputSource::ConcatList {
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Set the filter graph; its `out` label is mapped to the encoder
    pub fn filter_complex(mut self, graph: impl Into<String>) -> Self {
        self.filter_complex = Some(graph.into());
        self
    }

    /// Add a simple video filter (ignored when a filter graph is set)
    pub fn video_filter(mut self, filter: impl Into<String>) -> Self {
        self.video_filters.push(filter.into());
        self
    }

    pub fn frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = fps;
        self
    }

    /// Enable overwrite without asking
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    fn os_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        push_args(&mut args, &["-hide_banner"]);
        if self.overwrite {
            push_args(&mut args, &["-y"]);
        }
        // Progress goes to stdout as key=value lines, diagnostics stay on stderr
        push_args(&mut args, &["-nostats", "-progress", "pipe:1"]);

        let fps = self.frame_rate.to_string();
        for input in &self.inputs {
            match input {
                InputSource::LoopedImage {
                    path,
                    duration_secs,
                } => {
                    let duration = format!("{duration_secs:.3}");
                    push_args(
                        &mut args,
                        &["-loop", "1", "-framerate", &fps, "-t", &duration, "-i"],
                    );
                    args.push(path.as_os_str().to_os_string());
                }
                InputSource::ConcatList { path } => {
                    push_args(&mut args, &["-f", "concat", "-safe", "0", "-i"]);
                    args.push(path.as_os_str().to_os_string());
                }
            }
        }

        if let Some(ref graph) = self.filter_complex {
            let map = format!("[{OUTPUT_LABEL}]");
            push_args(&mut args, &["-filter_complex", graph.as_str(), "-map", &map]);
        } else if !self.video_filters.is_empty() {
            push_args(&mut args, &["-vf", &self.video_filters.join(",")]);
        }

        let crf = QUALITY_CRF.to_string();
        push_args(
            &mut args,
            &[
                "-c:v",
                VIDEO_CODEC,
                "-preset",
                ENCODER_PRESET,
                "-crf",
                &crf,
                "-r",
                &fps,
                "-pix_fmt",
                PIXEL_FORMAT,
                "-colorspace",
                COLOR_STANDARD,
                "-color_primaries",
                COLOR_STANDARD,
                "-color_trc",
                COLOR_STANDARD,
                "-movflags",
                "+faststart",
            ],
        );

        args.push(self.output.as_os_str().to_os_string());
        args
    }

    /// Argument list as text, for logging and dry runs
    pub fn args(&self) -> Vec<String> {
        self.os_args()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    /// Build the FFmpeg command
    pub fn build(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.os_args());
        cmd
    }

    /// Execute the FFmpeg command with progress tracking
    pub fn execute<F>(&self, progress_callback: F) -> Result<()>
    where
        F: Fn(Progress) + Send + 'static,
    {
        let cmd = self.build();
        log::info!(
            "Executing FFmpeg with {} input(s) -> {}",
            self.inputs.len(),
            self.output.display()
        );
        run_process(cmd, progress_callback)
    }
}

/// Run a child process, draining stdout and stderr on separate threads.
///
/// Lines carrying a `time=` marker from either stream are forwarded to
/// `progress_callback` from a single dispatcher thread; ordering between the
/// two streams is not preserved. A non-zero exit becomes
/// [`SlideshowError::EncoderFailed`] with everything read from stderr.
pub fn run_process<F>(mut cmd: Command, progress_callback: F) -> Result<()>
where
    F: Fn(Progress) + Send + 'static,
{
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    log::debug!("Raw command: {:?}", cmd);

    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .spawn()
        .map_err(|source| SlideshowError::Spawn { program, source })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("Failed to capture stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("Failed to capture stderr"))?;

    let (tx, rx) = mpsc::channel();
    let stdout_reader = spawn_reader(stdout, tx.clone());
    let stderr_reader = spawn_reader(stderr, tx);

    let dispatcher = thread::spawn(move || {
        while let Ok(progress) = rx.recv() {
            progress_callback(progress);
        }
    });

    let status = child.wait()?;

    let _ = stdout_reader.join();
    let stderr_output = stderr_reader
        .join()
        .unwrap_or_else(|_| String::from("Failed to get output"));
    let _ = dispatcher.join();

    if !status.success() {
        log::error!("FFmpeg failed with output:\n{}", stderr_output);
        return Err(SlideshowError::EncoderFailed {
            code: status.code(),
            stderr: stderr_output,
        });
    }

    Ok(())
}

fn push_args(args: &mut Vec<OsString>, values: &[&str]) {
    args.extend(values.iter().map(OsString::from));
}

fn spawn_reader<R>(stream: R, tx: Sender<Progress>) -> JoinHandle<String>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut captured = String::new();
        for line in BufReader::new(stream).lines().map_while(|line| line.ok()) {
            if let Some(seconds) = parse_progress_time(&line) {
                let _ = tx.send(Progress {
                    seconds,
                    line: line.clone(),
                });
            }
            captured.push_str(&line);
            captured.push('\n');
        }
        captured
    })
}

/// Read the `time=HH:MM:SS.frac` marker from an FFmpeg progress or stats line
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let caps = PROGRESS_REGEX.captures(line)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_parse_progress_time() {
        assert_eq!(parse_progress_time("out_time=00:00:02.500000"), Some(2.5));
        assert_eq!(
            parse_progress_time("frame=  50 fps=25 q=28.0 size=256kB time=01:02:03.04 bitrate=1"),
            Some(3723.04)
        );
        assert_eq!(parse_progress_time("out_time=N/A"), None);
        assert_eq!(parse_progress_time("out_time_us=2500000"), None);
        assert_eq!(parse_progress_time("progress=continue"), None);
    }

    #[test]
    fn test_looped_image_args() {
        let args = FFmpegCommand::new("/tmp/out.mp4")
            .looped_image("/img/a.jpg", 6.0)
            .looped_image("/img/b.jpg", 6.0)
            .filter_complex("[0:v]null[v0];[1:v]null[v1];[v0][v1]xfade[out]")
            .overwrite()
            .args();

        let joined = args.join(" ");
        assert!(joined.starts_with("-hide_banner -y -nostats -progress pipe:1"));
        assert!(joined.contains("-loop 1 -framerate 25 -t 6.000 -i /img/a.jpg"));
        assert!(joined.contains("-loop 1 -framerate 25 -t 6.000 -i /img/b.jpg"));
        assert!(joined.contains("-map [out]"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mp4"));

        let graph_pos = args.iter().position(|a| a == "-filter_complex").unwrap();
        assert_eq!(
            args[graph_pos + 1],
            "[0:v]null[v0];[1:v]null[v1];[v0][v1]xfade[out]"
        );
    }

    #[test]
    fn test_encoding_profile() {
        let joined = FFmpegCommand::new("o.mp4")
            .concat_list("list.txt")
            .video_filter("scale=1920:1080")
            .video_filter("setsar=1")
            .args()
            .join(" ");
        assert!(joined.contains("-f concat -safe 0 -i list.txt"));
        assert!(joined.contains("-vf scale=1920:1080,setsar=1"));
        assert!(joined.contains("-c:v libx264 -preset medium -crf 20 -r 25 -pix_fmt yuv420p"));
        assert!(joined.contains("-colorspace bt709 -color_primaries bt709 -color_trc bt709"));
        assert!(!joined.contains("-map"));
        assert!(!joined.contains(" -y "));
    }

    #[test]
    fn test_filter_complex_takes_precedence_over_vf() {
        let args = FFmpegCommand::new("o.mp4")
            .looped_image("a.jpg", 5.0)
            .video_filter("null")
            .filter_complex("[0:v]null[out]")
            .args();
        assert!(!args.iter().any(|a| a == "-vf"));
    }

    #[cfg(unix)]
    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_is_success_and_progress_is_forwarded() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let result = run_process(
            sh("echo out_time=00:00:01.000000; echo progress=continue; \
                echo out_time=00:00:02.500000; echo 'time=00:00:03.00' >&2"),
            move |p| sink.lock().unwrap().push(p.seconds),
        );
        assert!(result.is_ok());

        let mut seconds = seen.lock().unwrap().clone();
        seconds.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seconds, vec![1.0, 2.5, 3.0]);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_carries_code_and_stderr() {
        let err = run_process(
            sh("echo 'first problem' >&2; echo 'second problem' >&2; exit 3"),
            |_| {},
        )
        .unwrap_err();
        match err {
            SlideshowError::EncoderFailed { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "first problem\nsecond problem\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = FFmpegCommand::new("o.mp4")
            .program("slidereel-no-such-encoder")
            .execute(|_| {})
            .unwrap_err();
        assert!(matches!(err, SlideshowError::Spawn { .. }));
    }
}

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context as _;
use image::RgbaImage;

use crate::composite::extract::CompositedFrame;
use crate::encode::opts::EncoderOpts;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ConvertError, ConvertResult};
use crate::foundation::math::flatten_over_bg_rgba8;

/// Geometry and destination of one encoded segment.
#[derive(Clone, Debug)]
pub struct SegmentConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Output MP4 path.
    pub out_path: PathBuf,
}

impl SegmentConfig {
    /// Reject zero-sized frames.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConvertError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(ConvertError::validation("encode fps must be non-zero"));
        }
        Ok(())
    }
}

/// Spawns the system `ffmpeg` and streams straight-alpha RGBA8 frames to its stdin.
///
/// Dropping an unfinished encoder kills the child process.
pub struct SegmentEncoder {
    cfg: SegmentConfig,
    opts: EncoderOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    frames: usize,
}

impl SegmentEncoder {
    /// Validate settings and start `ffmpeg`.
    pub fn begin(cfg: SegmentConfig, opts: EncoderOpts) -> ConvertResult<Self> {
        cfg.validate()?;
        opts.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !opts.overwrite && cfg.out_path.exists() {
            return Err(ConvertError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(ConvertError::encoding(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(encode_args(&cfg, &opts))
            .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            ConvertError::encoding(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ConvertError::encoding("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ConvertError::encoding("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        let frame_len = Canvas {
            width: cfg.width,
            height: cfg.height,
        }
        .rgba_len();
        Ok(Self {
            scratch: vec![0u8; frame_len],
            cfg,
            opts,
            child: Some(child),
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
            frames: 0,
        })
    }

    /// Flatten `frame` over the background colour and write it to ffmpeg.
    pub fn push_frame(&mut self, frame: &RgbaImage) -> ConvertResult<()> {
        if frame.dimensions() != (self.cfg.width, self.cfg.height) {
            return Err(ConvertError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        flatten_over_bg_rgba8(&mut self.scratch, frame.as_raw(), self.opts.bg_rgba);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ConvertError::encoding("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ConvertError::encoding(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.frames += 1;
        Ok(())
    }

    /// Close stdin, wait for ffmpeg and surface its diagnostics on failure.
    pub fn finish(mut self) -> ConvertResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ConvertError::encoding("ffmpeg encoder not started"))?;

        let status = child.wait().map_err(|e| {
            ConvertError::encoding(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ConvertError::encoding("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ConvertError::encoding(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ConvertError::encoding(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::debug!(
            frames = self.frames,
            out = %self.cfg.out_path.display(),
            "segment encoded"
        );
        Ok(())
    }
}

impl Drop for SegmentEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// ffmpeg arguments for a segment encode, excluding the output path.
pub(crate) fn encode_args(cfg: &SegmentConfig, opts: &EncoderOpts) -> Vec<String> {
    let mut args: Vec<String> = vec![
        if opts.overwrite { "-y" } else { "-n" }.to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgba".to_string(),
        "-s".to_string(),
        format!("{}x{}", cfg.width, cfg.height),
        // For rawvideo input, `-r` before `-i` sets the input frame rate.
        "-r".to_string(),
        cfg.fps.to_ffmpeg_arg(),
        "-i".to_string(),
        "pipe:0".to_string(),
        "-an".to_string(),
    ];
    let odd = !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2);
    if odd && opts.needs_even_dimensions() {
        args.push("-vf".to_string());
        args.push("pad=ceil(iw/2)*2:ceil(ih/2)*2".to_string());
    }
    args.extend(opts.output_args(&opts.preset));
    args.push("-movflags".to_string());
    args.push("+faststart".to_string());
    args
}

/// Encode persisted frames, in order, into one MP4 at `out_path`.
#[tracing::instrument(skip_all, fields(out = %out_path.display(), frames = frames.len()))]
pub fn encode_segment(
    frames: &[CompositedFrame],
    fps: Fps,
    out_path: &Path,
    opts: &EncoderOpts,
) -> ConvertResult<()> {
    let Some((first, rest)) = frames.split_first() else {
        return Err(ConvertError::validation("cannot encode an empty segment"));
    };

    let first_image = load_frame(&first.path)?;
    let cfg = SegmentConfig {
        width: first_image.width(),
        height: first_image.height(),
        fps,
        out_path: out_path.to_path_buf(),
    };
    let mut encoder = SegmentEncoder::begin(cfg, opts.clone())?;
    encoder.push_frame(&first_image)?;
    for frame in rest {
        encoder.push_frame(&load_frame(&frame.path)?)?;
    }
    encoder.finish()
}

fn load_frame(path: &Path) -> ConvertResult<RgbaImage> {
    let image = image::open(path).with_context(|| format!("load frame '{}'", path.display()))?;
    Ok(image.to_rgba8())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ConvertResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_on_path("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    tool_on_path("ffprobe")
}

fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

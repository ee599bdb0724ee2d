use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::{anyhow, bail, Context, Result};

use crate::schema::OutputFormat;

/// Video/audio codec selection per container. The timeline carries no audio
/// stream, but the pair is still passed through so the container/codec
/// mapping matches the original tool observably.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecPair {
    pub video: &'static str,
    pub audio: &'static str,
}

pub fn codec_pair(format: OutputFormat) -> CodecPair {
    match format {
        OutputFormat::Mp4 => CodecPair {
            video: "libx264",
            audio: "aac",
        },
        OutputFormat::Webm => CodecPair {
            video: "libvpx",
            audio: "libvorbis",
        },
        OutputFormat::Avi => CodecPair {
            video: "mpeg4",
            audio: "mp3",
        },
    }
}

/// Full ffmpeg argument list: raw RGBA frames on stdin, one muxed file out,
/// overwriting any existing file at the output path.
pub fn ffmpeg_args(
    width: u32,
    height: u32,
    fps: u32,
    format: OutputFormat,
    output_path: &Path,
) -> Vec<String> {
    let codecs = codec_pair(format);
    let mut args = vec![
        "-hide_banner".to_owned(),
        "-loglevel".to_owned(),
        "error".to_owned(),
        "-y".to_owned(),
        "-f".to_owned(),
        "rawvideo".to_owned(),
        "-pix_fmt".to_owned(),
        "rgba".to_owned(),
        "-s:v".to_owned(),
        format!("{width}x{height}"),
        "-r".to_owned(),
        fps.to_string(),
        "-i".to_owned(),
        "-".to_owned(),
        "-c:v".to_owned(),
        codecs.video.to_owned(),
        "-c:a".to_owned(),
        codecs.audio.to_owned(),
        "-pix_fmt".to_owned(),
        "yuv420p".to_owned(),
    ];
    if format == OutputFormat::Mp4 {
        args.push("-movflags".to_owned());
        args.push("+faststart".to_owned());
    }
    args.push(output_path.to_string_lossy().into_owned());
    args
}

/// An ffmpeg child process fed raw RGBA frames over stdin.
pub struct FfmpegWriter {
    child: Child,
    stdin: ChildStdin,
    frame_size: usize,
}

impl FfmpegWriter {
    pub fn spawn(
        width: u32,
        height: u32,
        fps: u32,
        format: OutputFormat,
        output_path: &Path,
    ) -> Result<Self> {
        let frame_size = usize::try_from(width)
            .ok()
            .and_then(|w| {
                usize::try_from(height)
                    .ok()
                    .map(|h| w.saturating_mul(h).saturating_mul(4))
            })
            .context("frame size overflow")?;

        let args = ffmpeg_args(width, height, fps, format, output_path);
        let mut child = Command::new("ffmpeg")
            .args(args.iter().map(String::as_str))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|error| {
                if error.kind() == ErrorKind::NotFound {
                    anyhow!(
                        "ffmpeg was not found on PATH. Install ffmpeg and verify `ffmpeg -version` works."
                    )
                } else {
                    anyhow!("failed to spawn ffmpeg process: {error}")
                }
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("failed to capture ffmpeg stdin"))?;

        Ok(Self {
            child,
            stdin,
            frame_size,
        })
    }

    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() != self.frame_size {
            bail!(
                "frame size mismatch: expected {} bytes, got {}",
                self.frame_size,
                frame.len()
            );
        }
        self.stdin
            .write_all(frame)
            .context("failed to write frame to ffmpeg stdin")
    }

    pub fn finish(mut self) -> Result<()> {
        self.stdin.flush().context("failed to flush ffmpeg stdin")?;
        drop(self.stdin);

        let status = self
            .child
            .wait()
            .context("failed waiting for ffmpeg process")?;
        if !status.success() {
            bail!("ffmpeg failed with status {status}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn codec_pairs_follow_the_format_mapping() {
        assert_eq!(
            codec_pair(OutputFormat::Mp4),
            CodecPair {
                video: "libx264",
                audio: "aac"
            }
        );
        assert_eq!(
            codec_pair(OutputFormat::Webm),
            CodecPair {
                video: "libvpx",
                audio: "libvorbis"
            }
        );
        assert_eq!(
            codec_pair(OutputFormat::Avi),
            CodecPair {
                video: "mpeg4",
                audio: "mp3"
            }
        );
    }

    #[test]
    fn unknown_format_gets_the_mp4_pair() {
        assert_eq!(
            codec_pair(OutputFormat::parse("flv")),
            codec_pair(OutputFormat::Mp4)
        );
    }

    #[test]
    fn args_carry_size_rate_codecs_and_overwrite() {
        let output = PathBuf::from("out.webm");
        let args = ffmpeg_args(854, 480, 24, OutputFormat::Webm, &output);
        let has = |needle: &str| args.iter().any(|arg| arg == needle);
        assert!(has("-y"));
        assert!(has("854x480"));
        assert!(has("24"));
        assert!(has("libvpx"));
        assert!(has("libvorbis"));
        assert!(!has("-movflags"));
        assert_eq!(args.last().map(String::as_str), Some("out.webm"));
    }

    #[test]
    fn mp4_args_enable_faststart() {
        let output = PathBuf::from("out.mp4");
        let args = ffmpeg_args(1920, 1080, 24, OutputFormat::Mp4, &output);
        assert!(args.iter().any(|arg| arg == "+faststart"));
        assert!(args.iter().any(|arg| arg == "libx264"));
    }
}

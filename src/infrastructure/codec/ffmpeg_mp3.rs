//! Streaming MP3 codec backed by an FFmpeg child process
//!
//! PCM frames are written to FFmpeg's stdin as s16le. Encoded MP3 bytes are
//! drained from stdout by a reader thread and stderr is collected by a second
//! one, so no pipe can fill up while stdin is being written.

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

use crate::application::ports::{CodecError, CodecFactory, FrameCodec};

/// Default FFmpeg binary name
const FFMPEG_BIN: &str = "ffmpeg";

/// Read size for the stdout drain thread
const READ_BUF_SIZE: usize = 4096;

/// MP3 encoder running `ffmpeg -c:a libmp3lame` over pipes
pub struct FfmpegMp3Codec {
    child: Child,
    stdin: Option<ChildStdin>,
    output: Receiver<Vec<u8>>,
    reader: Option<JoinHandle<()>>,
    stderr: Option<JoinHandle<String>>,
}

impl FfmpegMp3Codec {
    /// Spawn an FFmpeg encoder for mono input
    pub fn spawn(sample_rate: u32, bit_rate: u32) -> Result<Self, CodecError> {
        Self::spawn_with(FFMPEG_BIN, sample_rate, bit_rate)
    }

    /// Spawn using a specific FFmpeg binary
    pub fn spawn_with(bin: &str, sample_rate: u32, bit_rate: u32) -> Result<Self, CodecError> {
        let mut child = Command::new(bin)
            .args(Self::build_args(sample_rate, bit_rate))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CodecError::NotFound(bin.to_string())
                } else {
                    CodecError::StartFailed(e.to_string())
                }
            })?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CodecError::StartFailed("stdout not captured".into()))?;

        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        let (tx, output) = mpsc::channel();
        let reader = std::thread::spawn(move || {
            let mut stdout = stdout;
            let mut buf = [0u8; READ_BUF_SIZE];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "ffmpeg stdout read failed");
                        break;
                    }
                }
            }
        });

        tracing::debug!(sample_rate, bit_rate, "ffmpeg mp3 encoder started");

        Ok(Self {
            child,
            stdin,
            output,
            reader: Some(reader),
            stderr,
        })
    }

    /// Build FFmpeg args for raw mono PCM in, MP3 out
    fn build_args(sample_rate: u32, bit_rate: u32) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            // Input: raw signed 16-bit little-endian mono
            "-f".to_string(),
            "s16le".to_string(),
            "-ar".to_string(),
            sample_rate.to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-i".to_string(),
            "pipe:0".to_string(),
            // Output: MP3 at a constant bit rate
            "-c:a".to_string(),
            "libmp3lame".to_string(),
            "-b:a".to_string(),
            format!("{}k", bit_rate),
            "-f".to_string(),
            "mp3".to_string(),
            "pipe:1".to_string(),
        ]
    }

    /// Whatever output the reader thread has collected so far
    fn drain_ready(&self) -> Vec<u8> {
        self.output.try_iter().flatten().collect()
    }

    /// Everything FFmpeg wrote to stderr; only complete once the child exited
    fn stderr_text(&mut self) -> String {
        self.stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }
}

impl FrameCodec for FfmpegMp3Codec {
    fn encode_frame(&mut self, frame: &[i16]) -> Result<Vec<u8>, CodecError> {
        let stdin = self.stdin.as_mut().ok_or(CodecError::Closed)?;

        let bytes: Vec<u8> = frame.iter().flat_map(|s| s.to_le_bytes()).collect();
        stdin
            .write_all(&bytes)
            .map_err(|e| CodecError::EncodeFailed(e.to_string()))?;

        Ok(self.drain_ready())
    }

    fn flush(&mut self) -> Result<Vec<u8>, CodecError> {
        // Closing stdin lets FFmpeg write the trailing frames and exit
        let stdin = self.stdin.take().ok_or(CodecError::Closed)?;
        drop(stdin);

        if let Some(reader) = self.reader.take() {
            reader
                .join()
                .map_err(|_| CodecError::FlushFailed("stdout reader panicked".into()))?;
        }
        let tail = self.drain_ready();

        let status = self
            .child
            .wait()
            .map_err(|e| CodecError::FlushFailed(e.to_string()))?;

        if !status.success() {
            let stderr = self.stderr_text();
            return Err(CodecError::FlushFailed(format!(
                "ffmpeg exited with status {}: {}",
                status, stderr
            )));
        }

        tracing::debug!(bytes = tail.len(), "ffmpeg mp3 encoder flushed");
        Ok(tail)
    }
}

impl Drop for FfmpegMp3Codec {
    fn drop(&mut self) {
        if self.stdin.is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Creates one [`FfmpegMp3Codec`] per recording
#[derive(Debug, Clone)]
pub struct FfmpegCodecFactory {
    bin: String,
}

impl FfmpegCodecFactory {
    pub fn new() -> Self {
        Self {
            bin: FFMPEG_BIN.to_string(),
        }
    }

    /// Use a specific FFmpeg binary
    pub fn with_binary(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Default for FfmpegCodecFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecFactory for FfmpegCodecFactory {
    fn create(&self, sample_rate: u32, bit_rate: u32) -> Result<Box<dyn FrameCodec>, CodecError> {
        let codec = FfmpegMp3Codec::spawn_with(&self.bin, sample_rate, bit_rate)?;
        Ok(Box::new(codec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_describe_mono_s16le_input() {
        let args = FfmpegMp3Codec::build_args(44100, 128);
        assert!(args.windows(2).any(|w| w == ["-f", "s16le"]));
        assert!(args.windows(2).any(|w| w == ["-ar", "44100"]));
        assert!(args.windows(2).any(|w| w == ["-ac", "1"]));
        assert!(args.windows(2).any(|w| w == ["-i", "pipe:0"]));
    }

    #[test]
    fn args_select_lame_at_bit_rate() {
        let args = FfmpegMp3Codec::build_args(16000, 64);
        assert!(args.windows(2).any(|w| w == ["-c:a", "libmp3lame"]));
        assert!(args.windows(2).any(|w| w == ["-b:a", "64k"]));
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }

    /// FFmpeg with libmp3lame on PATH, or `None` to skip
    fn lame_ffmpeg() -> Option<FfmpegCodecFactory> {
        let out = Command::new(FFMPEG_BIN)
            .args(["-hide_banner", "-encoders"])
            .output()
            .ok()?;
        String::from_utf8_lossy(&out.stdout)
            .contains("libmp3lame")
            .then(FfmpegCodecFactory::new)
    }

    fn is_mp3_stream(bytes: &[u8]) -> bool {
        bytes.starts_with(b"ID3") || (bytes.len() > 1 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
    }

    #[test]
    fn encodes_frames_into_mp3_stream() {
        let Some(factory) = lame_ffmpeg() else {
            eprintln!("ffmpeg with libmp3lame not found, skipping");
            return;
        };
        let mut codec = factory.create(44100, 128).unwrap();

        let tone: Vec<i16> = (0..2304)
            .map(|i| ((i as f32 * 0.06).sin() * 12000.0) as i16)
            .collect();
        let mut bytes = Vec::new();
        for frame in tone.chunks(1152) {
            bytes.extend(codec.encode_frame(frame).unwrap());
        }
        bytes.extend(codec.flush().unwrap());

        assert!(!bytes.is_empty());
        assert!(is_mp3_stream(&bytes), "unexpected header {:02x?}", &bytes[..bytes.len().min(4)]);

        assert!(matches!(codec.flush(), Err(CodecError::Closed)));
        assert!(matches!(codec.encode_frame(&tone[..4]), Err(CodecError::Closed)));
    }

    #[test]
    fn missing_binary_is_not_found() {
        let factory = FfmpegCodecFactory::with_binary("definitely-not-ffmpeg-binary");
        let result = factory.create(44100, 128);
        assert!(matches!(result, Err(CodecError::NotFound(ref bin)) if bin == "definitely-not-ffmpeg-binary"));
    }
}

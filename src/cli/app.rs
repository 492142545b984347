//! App runners for recording and conversion

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use thiserror::Error;
use tokio::time::{interval, Duration as TokioDuration};

use crate::application::ports::{AudioSource, CaptureError, ConfigStore};
use crate::application::{EncoderBackends, EncoderError, RecordingOutput, RecordingSession};
use crate::domain::audio::AudioData;
use crate::domain::config::{AppConfig, EncoderConfig, EncoderKind};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;
use crate::infrastructure::{default_backends, CpalCapture, WavFileSource};

use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Progress refresh interval while capturing
const PROGRESS_TICK_MS: u64 = 100;

/// Errors from a record or convert run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Encoder(#[from] EncoderError),

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

impl RunError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Encoder(EncoderError::Config(_)) => EXIT_USAGE_ERROR,
            _ => EXIT_ERROR,
        }
    }
}

/// Resolved options for one capture run
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub encoder: EncoderConfig,
    pub limit: Option<Duration>,
    pub warmup: Duration,
}

impl CaptureOptions {
    /// Options for microphone recording from a merged config
    pub fn for_recording(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            encoder: config.encoder_config()?,
            limit: config.duration_limit()?,
            warmup: config.warmup_or_default(),
        })
    }

    /// Options for file conversion: no limit, no warm-up
    pub fn for_conversion(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            encoder: config.encoder_config()?,
            limit: None,
            warmup: Duration::ZERO,
        })
    }
}

/// MP3 follows the capture rate; WAV keeps its configured target rate
pub fn resolve_encoder(config: EncoderConfig, capture_rate: u32) -> Result<EncoderConfig, ConfigError> {
    match config.kind() {
        EncoderKind::Mp3 if config.sample_rate() != capture_rate => {
            tracing::debug!(
                configured = config.sample_rate(),
                capture_rate,
                "mp3 output follows the capture rate"
            );
            config.with_sample_rate(capture_rate)
        }
        _ => Ok(config),
    }
}

/// Default output path: `<dir>/recording-<unix millis>.<ext>`
pub fn default_output_path(dir: &Path, kind: EncoderKind) -> PathBuf {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    dir.join(format!(
        "recording-{}.{}",
        timestamp,
        kind.mime_type().extension()
    ))
}

/// Output path for `convert`: the input name with the new extension,
/// suffixed when that would overwrite the input
pub fn conversion_output_path(input: &Path, kind: EncoderKind) -> PathBuf {
    let ext = kind.mime_type().extension();
    let candidate = input.with_extension(ext);
    if candidate != input {
        return candidate;
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}-converted.{}", stem, ext))
}

/// Drive `source` through a recording session until the stream ends,
/// the limit elapses, or shutdown is requested
pub async fn capture_and_encode(
    source: &dyn AudioSource,
    backends: EncoderBackends,
    options: &CaptureOptions,
    shutdown: &ShutdownSignal,
    presenter: &Presenter,
) -> Result<RecordingOutput, RunError> {
    let mut stream = source.start().await?;
    let capture_rate = stream.sample_rate;

    let mut session = RecordingSession::new(backends).with_warmup(options.warmup);
    let started = resolve_encoder(options.encoder, capture_rate)
        .map_err(RunError::from)
        .and_then(|encoder| session.start(encoder, capture_rate).map_err(RunError::from));
    if let Err(e) = started {
        stop_source(source).await;
        return Err(e);
    }

    let limit = async {
        match options.limit {
            Some(limit) => tokio::time::sleep(limit.as_std()).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(limit);

    let start = Instant::now();
    let total_ms = options.limit.map(|d| d.as_millis());
    let mut ticker = interval(TokioDuration::from_millis(PROGRESS_TICK_MS));

    let result: Result<(), RunError> = loop {
        tokio::select! {
            block = stream.blocks.recv() => match block {
                Some(block) => {
                    if let Err(e) = session.encode_blocking(block).await {
                        break Err(e.into());
                    }
                }
                None => {
                    tracing::debug!("capture stream ended");
                    break Ok(());
                }
            },
            _ = &mut limit => {
                tracing::debug!("recording limit reached");
                break Ok(());
            }
            _ = shutdown.wait() => {
                tracing::debug!("shutdown requested");
                break Ok(());
            }
            _ = ticker.tick() => {
                presenter.update_recording_progress(start.elapsed().as_millis() as u64, total_ms);
            }
        }
    };

    stop_source(source).await;
    result?;

    session.stop()?;
    Ok(session.finish().await?)
}

async fn stop_source(source: &dyn AudioSource) {
    if !source.is_capturing() {
        return;
    }
    if let Err(e) = source.stop().await {
        tracing::warn!(error = %e, "failed to stop capture");
    }
}

/// Write the finished recording to `path`
pub async fn write_output(output: RecordingOutput, path: &Path) -> Result<AudioData, RunError> {
    let audio = output.into_audio_data();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RunError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    }

    tokio::fs::write(path, audio.data())
        .await
        .map_err(|e| RunError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::info!(path = %path.display(), bytes = audio.size_bytes(), "recording written");
    Ok(audio)
}

/// Record from the microphone
pub async fn run_record(config: AppConfig, output: Option<PathBuf>) -> ExitCode {
    let mut presenter = Presenter::new();

    let options = match CaptureOptions::for_recording(&config) {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let source = match config.device.as_deref() {
        Some(name) => CpalCapture::with_device(name),
        None => CpalCapture::new(),
    };
    let path = output
        .unwrap_or_else(|| default_output_path(&config.output_dir_or_default(), options.encoder.kind()));

    let shutdown = ShutdownSignal::new();
    shutdown.setup();

    presenter.start_spinner("Recording...");
    let result = capture_and_encode(&source, default_backends(), &options, &shutdown, &presenter).await;
    finish_run(&mut presenter, result, &path).await
}

/// Encode an existing WAV file
pub async fn run_convert(config: AppConfig, input: PathBuf, output: Option<PathBuf>) -> ExitCode {
    let mut presenter = Presenter::new();

    let options = match CaptureOptions::for_conversion(&config) {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let source = WavFileSource::new(&input);
    let path = output.unwrap_or_else(|| conversion_output_path(&input, options.encoder.kind()));

    let shutdown = ShutdownSignal::new();
    shutdown.setup();

    presenter.start_spinner(&format!("Converting {}...", input.display()));
    let result = capture_and_encode(&source, default_backends(), &options, &shutdown, &presenter).await;
    finish_run(&mut presenter, result, &path).await
}

async fn finish_run(
    presenter: &mut Presenter,
    result: Result<RecordingOutput, RunError>,
    path: &Path,
) -> ExitCode {
    let written = match result {
        Ok(output) => write_output(output, path).await,
        Err(e) => Err(e),
    };

    match written {
        Ok(audio) => {
            presenter.spinner_success(&format!("Saved {}", audio.human_readable_size()));
            presenter.output(&path.to_string_lossy());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail("Recording failed");
            presenter.error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

/// Load and merge configuration: defaults < file < CLI
pub async fn load_merged_config<S: ConfigStore>(store: &S, cli_config: AppConfig) -> AppConfig {
    let file_config = store.load_or_empty().await;

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::application::encoder::testing::{recording_codec, CountingResampler};
    use crate::application::ports::{CaptureStream, CodecError, FrameCodec};
    use crate::domain::audio::AudioMimeType;
    use crate::infrastructure::{HoundWavSerializer, XdgConfigStore};

    /// Source replaying fixed blocks, optionally holding the stream open
    struct ScriptedSource {
        sample_rate: u32,
        blocks: Vec<Vec<f32>>,
        hold_open: bool,
        capturing: AtomicBool,
        sender: Mutex<Option<mpsc::UnboundedSender<Vec<f32>>>>,
    }

    impl ScriptedSource {
        fn new(sample_rate: u32, blocks: Vec<Vec<f32>>, hold_open: bool) -> Self {
            Self {
                sample_rate,
                blocks,
                hold_open,
                capturing: AtomicBool::new(false),
                sender: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl AudioSource for ScriptedSource {
        async fn start(&self) -> Result<CaptureStream, CaptureError> {
            let (tx, rx) = mpsc::unbounded_channel();
            for block in &self.blocks {
                tx.send(block.clone()).unwrap();
            }
            if self.hold_open {
                *self.sender.lock().unwrap() = Some(tx);
            }
            self.capturing.store(true, Ordering::SeqCst);
            Ok(CaptureStream {
                sample_rate: self.sample_rate,
                blocks: rx,
            })
        }

        async fn stop(&self) -> Result<(), CaptureError> {
            self.sender.lock().unwrap().take();
            self.capturing.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_capturing(&self) -> bool {
            self.capturing.load(Ordering::SeqCst)
        }
    }

    fn backends() -> EncoderBackends {
        let factory = |_: u32, _: u32| -> Result<Box<dyn FrameCodec>, CodecError> {
            let (codec, _) = recording_codec(false, vec![0xFF]);
            Ok(Box::new(codec))
        };
        EncoderBackends::new(
            Arc::new(factory),
            Arc::new(CountingResampler::default()),
            Arc::new(HoundWavSerializer::new()),
        )
    }

    fn options(encoder: EncoderConfig) -> CaptureOptions {
        CaptureOptions {
            encoder,
            limit: None,
            warmup: Duration::ZERO,
        }
    }

    #[test]
    fn mp3_follows_capture_rate() {
        let resolved = resolve_encoder(EncoderConfig::default(), 48000).unwrap();
        assert_eq!(resolved.sample_rate(), 48000);
        assert_eq!(resolved.kind(), EncoderKind::Mp3);
    }

    #[test]
    fn wav_keeps_target_rate() {
        let resolved = resolve_encoder(EncoderConfig::wav(16000).unwrap(), 48000).unwrap();
        assert_eq!(resolved.sample_rate(), 16000);
    }

    #[test]
    fn default_output_uses_extension() {
        let path = default_output_path(Path::new("/tmp/out"), EncoderKind::Wav);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("recording-"));
        assert!(name.ends_with(".wav"));
        assert!(path.starts_with("/tmp/out"));
    }

    #[test]
    fn conversion_output_swaps_extension() {
        assert_eq!(
            conversion_output_path(Path::new("/a/talk.wav"), EncoderKind::Mp3),
            PathBuf::from("/a/talk.mp3")
        );
        assert_eq!(
            conversion_output_path(Path::new("/a/talk.wav"), EncoderKind::Wav),
            PathBuf::from("/a/talk-converted.wav")
        );
    }

    #[test]
    fn config_errors_are_usage_errors() {
        let err = RunError::from(ConfigError::InvalidSampleRate(0));
        assert_eq!(err.exit_code(), EXIT_USAGE_ERROR);

        let err = RunError::from(EncoderError::EmptyResult);
        assert_eq!(err.exit_code(), EXIT_ERROR);

        let err = RunError::from(CaptureError::NoAudioDevice);
        assert_eq!(err.exit_code(), EXIT_ERROR);
    }

    #[test]
    fn recording_options_apply_warmup_default() {
        let options = CaptureOptions::for_recording(&AppConfig::defaults()).unwrap();
        assert_eq!(options.warmup.as_millis(), 300);
        assert!(options.limit.is_none());

        let options = CaptureOptions::for_conversion(&AppConfig::defaults()).unwrap();
        assert!(options.warmup.is_zero());
    }

    #[test]
    fn bad_duration_is_config_error() {
        let config = AppConfig {
            duration: Some("forever".to_string()),
            ..AppConfig::defaults()
        };
        assert!(CaptureOptions::for_recording(&config).is_err());
    }

    #[tokio::test]
    async fn stream_end_finishes_wav() {
        let source = ScriptedSource::new(16000, vec![vec![0.1; 4096], vec![0.2; 904]], false);
        let output = capture_and_encode(
            &source,
            backends(),
            &options(EncoderConfig::wav(16000).unwrap()),
            &ShutdownSignal::new(),
            &Presenter::new(),
        )
        .await
        .unwrap();

        assert_eq!(output.mime_type, AudioMimeType::Wav);
        let reader = hound::WavReader::new(Cursor::new(output.chunks[0].as_bytes())).unwrap();
        assert_eq!(reader.len(), 5000);
        assert!(!source.is_capturing());
    }

    #[tokio::test]
    async fn shutdown_stops_open_stream() {
        let source = ScriptedSource::new(44100, vec![vec![0.5; 1152]], true);
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let output = capture_and_encode(
            &source,
            backends(),
            &options(EncoderConfig::default()),
            &shutdown,
            &Presenter::new(),
        )
        .await
        .unwrap();

        assert_eq!(output.mime_type, AudioMimeType::Mp3);
        assert!(output.total_bytes() > 0);
        assert!(!source.is_capturing());
    }

    #[tokio::test]
    async fn limit_stops_open_stream() {
        let source = ScriptedSource::new(8000, vec![vec![0.0; 800]], true);
        let options = CaptureOptions {
            limit: Some(Duration::from_millis(50)),
            ..options(EncoderConfig::wav(8000).unwrap())
        };

        let output = capture_and_encode(
            &source,
            backends(),
            &options,
            &ShutdownSignal::new(),
            &Presenter::new(),
        )
        .await
        .unwrap();
        assert_eq!(output.chunks.len(), 1);
    }

    #[tokio::test]
    async fn write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.mp3");
        let output = RecordingOutput {
            chunks: vec![vec![1, 2].into(), vec![3].into()],
            mime_type: AudioMimeType::Mp3,
        };

        let audio = write_output(output, &path).await.unwrap();
        assert_eq!(audio.size_bytes(), 3);
        assert_eq!(audio.human_readable_size(), "3 B");
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn merged_config_prefers_cli() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        std::fs::write(store.path(), "format = \"wav\"\nsample_rate = 22050\n").unwrap();

        let cli = AppConfig {
            sample_rate: Some(16000),
            ..AppConfig::empty()
        };
        let merged = load_merged_config(&store, cli).await;

        assert_eq!(merged.format, Some("wav".to_string()));
        assert_eq!(merged.sample_rate, Some(16000));
        assert_eq!(merged.bit_rate, Some(128));
    }
}

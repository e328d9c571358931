use crate::services::media_gateway::{AudioExtractor, AudioSource, ExtractError};
use actix_web::web::Bytes;
use async_trait::async_trait;
use futures_lite::StreamExt;
use std::process::Stdio;
use tokio::process::{Child, ChildStdout, Command};
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::debug;

/// Extracts the best audio-only representation with a `yt-dlp` subprocess.
pub(crate) struct YtDlpExtractor {
    program: String,
}

impl YtDlpExtractor {
    pub(crate) fn create(program: String) -> Self {
        Self { program }
    }
}

#[async_trait]
impl AudioExtractor for YtDlpExtractor {
    async fn extract(&self, source_url: &str) -> Result<Box<dyn AudioSource>, ExtractError> {
        let mut child = Command::new(&self.program)
            .args([
                "--format",
                "bestaudio",
                "--output",
                "-",
                "--quiet",
                "--no-warnings",
                "--no-playlist",
                "--",
                source_url,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(ExtractError::Spawn)?;

        debug!(pid = child.id(), source_url, "Extractor process started");

        let stdout = child.stdout.take().ok_or_else(|| {
            ExtractError::Spawn(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Extractor stdout is not available",
            ))
        })?;

        Ok(Box::new(YtDlpSource {
            child,
            frames: FramedRead::new(stdout, BytesCodec::new()),
        }))
    }
}

/// Owns the subprocess; dropping it kills the process.
struct YtDlpSource {
    child: Child,
    frames: FramedRead<ChildStdout, BytesCodec>,
}

#[async_trait]
impl AudioSource for YtDlpSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ExtractError> {
        match self.frames.next().await {
            Some(Ok(chunk)) => Ok(Some(chunk.freeze())),
            Some(Err(error)) => Err(ExtractError::Io(error)),
            None => {
                let status = self.child.wait().await?;

                if status.success() {
                    Ok(None)
                } else {
                    Err(ExtractError::ExitStatus(status.to_string()))
                }
            }
        }
    }
}

use crate::error::PipelineError;
use crate::stock::schema::Ticker;
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace};

/// Subdirectory of the output root that holds the dividend files.
pub const DIVIDEND_DIR: &str = "dividend_history";

/// Where each ticker's files live under the output root `R`:
/// - `R/<TICKER>.json`
/// - `R/dividend_history/<TICKER>_dividend.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dividend_dir(&self) -> PathBuf {
        self.root.join(DIVIDEND_DIR)
    }

    pub fn history_path(&self, ticker: &Ticker) -> PathBuf {
        self.root.join(format!("{ticker}.json"))
    }

    pub fn dividend_path(&self, ticker: &Ticker) -> PathBuf {
        self.dividend_dir().join(format!("{ticker}_dividend.json"))
    }

    /// Recursively delete the output root, if it exists.
    pub async fn clear(&self) -> Result<(), PipelineError> {
        if !tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            trace!("nothing to clear at {:?}", self.root);
            return Ok(());
        }

        debug!("clearing output directory {:?}", self.root);
        tokio::fs::remove_dir_all(&self.root).await.map_err(|source| {
            error!("failed to clear {:?}, error({source})", self.root);
            PipelineError::CannotCreateDirectory {
                path: self.root.clone(),
                source,
            }
        })
    }

    /// Create the output root and its dividend subdirectory, as necessary.
    pub async fn setup(&self) -> Result<(), PipelineError> {
        for dir in [self.root.clone(), self.dividend_dir()] {
            trace!("ensuring directory {dir:?}");
            tokio::fs::create_dir_all(&dir).await.map_err(|source| {
                error!("failed to create directory {dir:?}, error({source})");
                PipelineError::CannotCreateDirectory {
                    path: dir.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

/// Read the ticker list: one symbol per line, trimmed, blank lines dropped.
pub async fn read_tickers(path: &Path) -> Result<Vec<Ticker>, PipelineError> {
    trace!("reading ticker file: {path:?}");
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::ReadTickers {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(text.lines().filter_map(Ticker::parse).collect())
}

/// Serialize `data` as JSON and write it to `path`, replacing any existing file.
pub async fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> std::io::Result<()> {
    let bytes = serde_json::to_vec(data)?;
    trace!("writing {} bytes to {path:?}", bytes.len());
    tokio::fs::write(path, bytes).await
}

/// Reads a `.json` file from `path`.
pub async fn read_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    trace!("reading file path: {path:?}");
    let file = tokio::fs::read(path).await?;
    trace!("file read; deserializing bytes ...");
    let data: T = serde_json::from_slice(&file)?;
    Ok(data)
}

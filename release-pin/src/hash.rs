//! Asset hashing
//!
//! Downloads a release asset to a temporary file and computes its SHA256
//! digest in Subresource Integrity form (`sha256-<base64>`), the format the
//! Nix fetchers expect.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::StreamExt;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{Error, Result};

/// Encode a raw SHA256 digest as an SRI string.
pub fn sri_sha256(digest: &[u8]) -> String {
    format!("sha256-{}", STANDARD.encode(digest))
}

/// Compute the raw SHA256 digest of a file.
pub fn sha256_file<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_vec())
}

/// Downloads assets and hashes them
#[derive(Clone)]
pub struct AssetHasher {
    client: reqwest::Client,
    temp_dir: Option<PathBuf>,
}

impl AssetHasher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            temp_dir: None,
        }
    }

    /// Place downloads in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Download `url` and return its SRI digest.
    ///
    /// The temporary download is removed on every path, including errors.
    pub async fn hash(&self, url: &str) -> Result<String> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("release-pin-").rand_bytes(8);
        let mut tmp = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        let size = self.download(url, tmp.as_file_mut()).await?;
        debug!("Downloaded {} bytes from {}", size, url);

        let digest = sha256_file(tmp.path())?;
        Ok(sri_sha256(&digest))
    }

    async fn download(&self, url: &str, out: &mut File) -> Result<u64> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "Error downloading {}: {}",
                url,
                response.status()
            )));
        }

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            out.write_all(&chunk)?;
            written += chunk.len() as u64;
        }
        out.flush()?;

        Ok(written)
    }
}

use std::path::Path;

use carrier_verify::{Checksum, Hasher};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::Result;

const READ_BUFFER: usize = 64 * 1024;

/// Hash the file at `path` and compare it with `checksum`.
///
/// A mismatch surfaces as [`Error::Checksum`](crate::Error::Checksum), kept
/// apart from transfer errors.
pub async fn verify_file(path: &Path, checksum: &Checksum) -> Result<()> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = checksum.hasher();
    let mut buffer = vec![0u8; READ_BUFFER];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    checksum.verify_digest(hasher.finalize())?;
    debug!(path = %path.display(), algorithm = %checksum.algorithm(), "checksum verified");
    Ok(())
}

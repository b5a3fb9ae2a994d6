//! On-disk persistence of the pruning tables.
//!
//! Layout, all integers little endian:
//!
//! | bytes | contents                                  |
//! |-------|-------------------------------------------|
//! | 8     | magic `TWOPHASE`                          |
//! | 4     | format version                            |
//! | 4×8   | length of each of the four pruning tables |
//! | 4     | checksum of the table data                |
//! | ...   | the table data, concatenated              |
//!
//! A cache that fails any check is ignored and regenerated.

use crate::{
    config::TableCacheMode,
    pruning::{TableError, Tables},
    start, success,
};
use itertools::Itertools;
use log::{debug, info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

const MAGIC: &[u8; 8] = b"TWOPHASE";
pub const CACHE_VERSION: u32 = 1;
const NUM_TABLES: usize = 4;
const HEADER_LEN: usize = MAGIC.len() + 4 + NUM_TABLES * 8 + 4;

fn checksum(data: &[u8]) -> u32 {
    data.iter()
        .fold(0_u32, |seed, &word| seed.wrapping_mul(37).wrapping_add(u32::from(word)))
}

/// `<platform cache dir>/twophase-tables/tables-v<VERSION>.bin`
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    let mut path = dirs::cache_dir()?;
    path.push("twophase-tables");
    path.push(format!("tables-v{CACHE_VERSION}.bin"));
    Some(path)
}

#[must_use]
pub fn resolve(mode: &TableCacheMode) -> Option<PathBuf> {
    match mode {
        TableCacheMode::Auto => default_path(),
        TableCacheMode::Disabled => None,
        TableCacheMode::Path(path) => Some(path.clone()),
    }
}

fn bad(reason: impl Into<String>) -> TableError {
    TableError::BadCache(reason.into())
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, TableError> {
    bytes
        .get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| bad("truncated header"))
}

fn read_u64(bytes: &[u8], at: usize) -> Result<u64, TableError> {
    bytes
        .get(at..at + 8)
        .and_then(|b| b.try_into().ok())
        .map(u64::from_le_bytes)
        .ok_or_else(|| bad("truncated header"))
}

/// Serialise the pruning tables.
#[must_use]
pub fn to_bytes(tables: &Tables) -> Vec<u8> {
    let data = tables.pruning_tables().map(|table| table.data());
    let mut bytes = Vec::with_capacity(HEADER_LEN + data.iter().map(|d| d.len()).sum::<usize>());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&CACHE_VERSION.to_le_bytes());
    for table in data {
        bytes.extend_from_slice(&(table.len() as u64).to_le_bytes());
    }
    bytes.extend_from_slice(&[0; 4]);
    for table in data {
        bytes.extend_from_slice(table);
    }
    let sum = checksum(&bytes[HEADER_LEN..]);
    bytes[HEADER_LEN - 4..HEADER_LEN].copy_from_slice(&sum.to_le_bytes());
    bytes
}

/// Deserialise and validate the pruning tables, rebuilding the move tables
/// alongside them.
///
/// # Errors
///
/// Fails with [`TableError::BadCache`] on any mismatch.
pub fn from_bytes(bytes: &[u8]) -> Result<Tables, TableError> {
    if bytes.get(..MAGIC.len()) != Some(MAGIC.as_slice()) {
        return Err(bad("missing magic tag"));
    }
    let version = read_u32(bytes, MAGIC.len())?;
    if version != CACHE_VERSION {
        return Err(bad(format!(
            "format version {version}, expected {CACHE_VERSION}"
        )));
    }
    let lengths = (0..NUM_TABLES)
        .map(|i| read_u64(bytes, MAGIC.len() + 4 + i * 8))
        .map_ok(|len| usize::try_from(len).unwrap_or(usize::MAX))
        .collect::<Result<Vec<_>, _>>()?;
    let expected_sum = read_u32(bytes, HEADER_LEN - 4)?;

    let body = &bytes[HEADER_LEN..];
    let total = lengths
        .iter()
        .try_fold(0_usize, |acc, &len| acc.checked_add(len))
        .ok_or_else(|| bad("table lengths overflow"))?;
    if body.len() != total {
        return Err(bad(format!(
            "{} bytes of table data, header says {total}",
            body.len()
        )));
    }
    if checksum(body) != expected_sum {
        return Err(bad("checksum mismatch"));
    }

    let mut rest = body;
    let mut data: [Vec<u8>; NUM_TABLES] = Default::default();
    for (table, &len) in data.iter_mut().zip(&lengths) {
        let (head, tail) = rest.split_at(len);
        *table = head.to_vec();
        rest = tail;
    }
    Tables::from_pruning_data(data)
}

/// # Errors
///
/// Fails if the file cannot be read or is not a valid cache.
pub fn load(path: &Path) -> Result<Tables, TableError> {
    from_bytes(&fs::read(path)?)
}

/// Write the cache through a temporary file so readers never see a partial
/// cache.
///
/// # Errors
///
/// Fails if the directory or file cannot be written.
pub fn store(path: &Path, tables: &Tables) -> Result<(), TableError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("bin.tmp");
    fs::write(&tmp, to_bytes(tables))?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Load the tables from the cache `mode` points at, or generate them. A
/// cache that cannot be used is reported and then replaced.
///
/// # Errors
///
/// Fails only if generation itself fails.
pub fn load_or_generate(mode: &TableCacheMode) -> Result<Tables, TableError> {
    let Some(path) = resolve(mode) else {
        return Tables::generate();
    };

    if path.exists() {
        info!(start!("Loading pruning tables from {}"), path.display());
        let start = Instant::now();
        match load(&path) {
            Ok(tables) => {
                info!(
                    success!("Pruning tables loaded in {:.3}s"),
                    start.elapsed().as_secs_f64()
                );
                return Ok(tables);
            }
            Err(e) => warn!("Ignoring table cache {}: {e}", path.display()),
        }
    } else {
        debug!("No table cache at {}", path.display());
    }

    let tables = Tables::generate()?;
    match store(&path, &tables) {
        Ok(()) => info!("Wrote table cache to {}", path.display()),
        Err(e) => warn!("Failed to write table cache {}: {e}", path.display()),
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static TABLES: LazyLock<Tables> = LazyLock::new(|| Tables::generate().unwrap());
    static BYTES: LazyLock<Vec<u8>> = LazyLock::new(|| to_bytes(&TABLES));

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("twophase-test-{}-{}", std::process::id(), fastrand::u64(..)))
            .join(name)
    }

    #[test]
    fn test_round_trip() {
        let tables = from_bytes(&BYTES).unwrap();
        for (a, b) in tables
            .pruning_tables()
            .iter()
            .zip_eq(TABLES.pruning_tables())
        {
            assert_eq!(a.data(), b.data());
        }
    }

    #[test]
    fn test_rejects_corruption() {
        let mut bytes = BYTES.clone();
        bytes[0] = b'X';
        assert!(matches!(from_bytes(&bytes), Err(TableError::BadCache(_))));

        let mut bytes = BYTES.clone();
        bytes[MAGIC.len()] = 99;
        assert!(matches!(from_bytes(&bytes), Err(TableError::BadCache(_))));

        let mut bytes = BYTES.clone();
        let last = bytes.len() - 1;
        bytes[last] ^= 1;
        assert!(matches!(from_bytes(&bytes), Err(TableError::BadCache(_))));

        let bytes = &BYTES[..BYTES.len() - 10];
        assert!(matches!(from_bytes(bytes), Err(TableError::BadCache(_))));

        assert!(matches!(from_bytes(&[]), Err(TableError::BadCache(_))));
    }

    #[test]
    fn test_load_or_generate_replaces_bad_cache() {
        let path = temp_path("tables.bin");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"garbage").unwrap();

        let mode = TableCacheMode::Path(path.clone());
        load_or_generate(&mode).unwrap();
        // The bad file was replaced by a good one
        load(&path).unwrap();
        load_or_generate(&mode).unwrap();

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}

//! LR-008: BLAKE3 fingerprints and directory sizing.
//!
//! `status` shows a config fingerprint and the results size; tests use
//! `hash_directory` to assert that a tree is byte-for-byte unchanged.

use super::error::{DispatchError, DispatchResult};
use std::io::Read;
use std::path::Path;

const STREAM_BUF_SIZE: usize = 65536;

/// Hash a file's contents. Returns `"blake3:{hex}"`.
pub fn hash_file(path: &Path) -> DispatchResult<String> {
    let mut file = std::fs::File::open(path).map_err(|e| DispatchError::io(path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; STREAM_BUF_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|e| DispatchError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("blake3:{}", hasher.finalize().to_hex()))
}

/// Short form for display: `blake3:` plus the first 12 hex chars.
pub fn short(hash: &str) -> &str {
    let end = "blake3:".len() + 12;
    hash.get(..end).unwrap_or(hash)
}

/// Sorted walk of a tree. Symlinks are skipped.
fn walk(
    base: &Path,
    current: &Path,
    visit: &mut dyn FnMut(&str, &Path, &std::fs::Metadata) -> DispatchResult<()>,
) -> DispatchResult<()> {
    let read_dir = std::fs::read_dir(current).map_err(|e| DispatchError::io(current, e))?;
    let mut children: Vec<std::fs::DirEntry> = read_dir.filter_map(|e| e.ok()).collect();
    children.sort_by_key(|e| e.file_name());

    for entry in children {
        let path = entry.path();
        let meta = std::fs::symlink_metadata(&path).map_err(|e| DispatchError::io(&path, e))?;
        if meta.file_type().is_symlink() {
            continue;
        }
        let rel = path
            .strip_prefix(base)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();
        visit(&rel, &path, &meta)?;
        if meta.is_dir() {
            walk(base, &path, visit)?;
        }
    }
    Ok(())
}

/// Hash a directory tree: relative paths, file contents and empty
/// directories all contribute.
pub fn hash_directory(path: &Path) -> DispatchResult<String> {
    let mut hasher = blake3::Hasher::new();
    walk(path, path, &mut |rel, p, meta| {
        hasher.update(rel.as_bytes());
        hasher.update(b"\0");
        if meta.is_dir() {
            hasher.update(b"dir");
        } else {
            hasher.update(hash_file(p)?.as_bytes());
        }
        hasher.update(b"\n");
        Ok(())
    })?;
    Ok(format!("blake3:{}", hasher.finalize().to_hex()))
}

/// Total size in bytes of regular files under `path`.
pub fn dir_size(path: &Path) -> DispatchResult<u64> {
    let mut total = 0u64;
    walk(path, path, &mut |_, _, meta| {
        if meta.is_file() {
            total += meta.len();
        }
        Ok(())
    })?;
    Ok(total)
}

/// Human-readable byte count, `du -h` style.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}{}", bytes, UNITS[0])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}

//! Logical path arithmetic.
//!
//! All entry, artifact, and manifest paths are "logical": relative,
//! forward-slash joined, and independent of the host separator, so the
//! values written into the manifest are portable across platforms. Backslash
//! input is folded to forward slashes on the way in, and nothing here
//! touches the filesystem except [`to_native`], which converts a logical
//! path into a real `PathBuf` under a root directory.

use std::path::{Path, PathBuf};

/// Normalize a path into logical form: forward slashes, `.`/`..` segments
/// resolved, no trailing slash, and a `./` prefix for relative paths.
pub fn normalize(path: &str) -> String {
  let forward = path.replace('\\', "/");
  let absolute = forward.starts_with('/');

  let mut segments: Vec<&str> = Vec::new();
  for segment in forward.split('/') {
    match segment {
      "" | "." => {}
      ".." => {
        if matches!(segments.last(), Some(&"..")) || segments.is_empty() {
          segments.push("..");
        } else {
          segments.pop();
        }
      }
      other => segments.push(other),
    }
  }

  if absolute {
    format!("/{}", segments.join("/"))
  } else if segments.is_empty() {
    ".".to_string()
  } else if segments[0] == ".." {
    segments.join("/")
  } else {
    format!("./{}", segments.join("/"))
  }
}

/// Rewrite `path`'s `from_root` prefix to `to_root`.
///
/// Returns `None` when `path` does not live under `from_root`.
pub fn rebase(path: &str, from_root: &str, to_root: &str) -> Option<String> {
  let path = normalize(path);
  let from_root = normalize(from_root);
  let to_root = normalize(to_root);

  if path == from_root {
    return Some(to_root);
  }
  let rest = path.strip_prefix(&format!("{from_root}/"))?;
  Some(format!("{to_root}/{rest}"))
}

/// Drop the final extension of the last segment, if any.
pub fn strip_extension(path: &str) -> String {
  let path = normalize(path);
  let (dir, name) = match path.rfind('/') {
    Some(idx) => (&path[..idx], &path[idx + 1..]),
    None => ("", path.as_str()),
  };
  match name.rfind('.') {
    // A leading dot is a hidden file, not an extension.
    Some(idx) if idx > 0 => {
      if dir.is_empty() {
        name[..idx].to_string()
      } else {
        format!("{dir}/{}", &name[..idx])
      }
    }
    _ => path,
  }
}

/// Logical parent directory (`./dist/foo/bar` -> `./dist/foo`).
pub fn parent(path: &str) -> String {
  let path = normalize(path);
  match path.rfind('/') {
    Some(0) => "/".to_string(),
    Some(idx) => path[..idx].to_string(),
    None => ".".to_string(),
  }
}

/// Final segment without its extension.
pub fn file_stem(path: &str) -> String {
  let stripped = strip_extension(path);
  match stripped.rfind('/') {
    Some(idx) => stripped[idx + 1..].to_string(),
    None => stripped,
  }
}

/// Relative path from one logical directory to another, always expressed
/// with forward slashes (`./dist/foo` -> `./src/foo` is `../../src/foo`).
pub fn relative(from_dir: &str, to_dir: &str) -> String {
  let from: Vec<String> = split_segments(from_dir);
  let to: Vec<String> = split_segments(to_dir);

  let common = from.iter().zip(to.iter()).take_while(|(a, b)| a == b).count();
  let ups = from.len() - common;

  let mut segments: Vec<String> = vec!["..".to_string(); ups];
  segments.extend(to[common..].iter().cloned());

  if segments.is_empty() {
    ".".to_string()
  } else if segments[0] == ".." {
    segments.join("/")
  } else {
    format!("./{}", segments.join("/"))
  }
}

/// Convert a logical path into a native path under `root`.
pub fn to_native(root: &Path, logical: &str) -> PathBuf {
  let mut native = root.to_path_buf();
  for segment in split_segments(logical) {
    native.push(segment);
  }
  native
}

fn split_segments(path: &str) -> Vec<String> {
  normalize(path)
    .split('/')
    .filter(|s| !s.is_empty() && *s != ".")
    .map(str::to_string)
    .collect()
}

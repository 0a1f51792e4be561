use crate::error::StorageError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    AWS,
    GCS,
    Memory,
}

pub fn parse_provider_from_uri(bucket_uri: &str) -> Result<Provider, StorageError> {
    if bucket_uri.starts_with("s3://") {
        Ok(Provider::AWS)
    } else if bucket_uri.starts_with("gs://") {
        Ok(Provider::GCS)
    } else if bucket_uri.starts_with("mem://") {
        Ok(Provider::Memory)
    } else {
        Err(StorageError::InvalidLocation(bucket_uri.to_string()))
    }
}

/// `gs://bucket/prefix` -> `/bucket/prefix`. A URI without a bucket is rejected.
pub fn parse_location_from_uri(bucket_uri: &str) -> Result<String, StorageError> {
    let rest = bucket_uri
        .split_once("://")
        .map(|(_, rest)| rest.trim_matches('/'))
        .unwrap_or("");

    if rest.is_empty() {
        return Err(StorageError::InvalidLocation(bucket_uri.to_string()));
    }

    Ok(format!("/{}", rest))
}

pub fn join_key(location: &str, name: &str) -> String {
    format!("{}/{}", location, name)
}

/// Collapses redundant separators and resolves `.` and `..` segments.
/// `..` never climbs above the root of an absolute key.
pub fn normalize_key(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for comp in path.split('/') {
        match comp {
            "" | "." => continue,
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push(comp);
                }
            }
            _ => parts.push(comp),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// `/bucket/path/to/object` -> (`bucket`, `path/to/object`)
pub fn split_key(key: &str) -> Result<(&str, &str), StorageError> {
    let trimmed = key.trim_start_matches('/');
    let (bucket, object) = trimmed.split_once('/').unwrap_or((trimmed, ""));

    if bucket.is_empty() {
        return Err(StorageError::InvalidLocation(key.to_string()));
    }

    Ok((bucket, object))
}

#[derive(Debug, PartialEq, Eq)]
pub enum DirEntry<'a> {
    File(&'a str),
    Directory(&'a str),
}

/// Places `key` one level below `dir`: a direct file, the first segment of a
/// deeper key, or `None` when the key lies outside `dir` or is `dir` itself.
pub fn classify_entry<'a>(dir: &str, key: &'a str) -> Option<DirEntry<'a>> {
    let dir = dir.trim_end_matches('/');
    let rest = key.strip_prefix(dir)?;

    let rest = if dir.is_empty() {
        rest
    } else {
        rest.strip_prefix('/')?
    };
    let rest = rest.trim_start_matches('/');

    if rest.is_empty() {
        return None;
    }

    match rest.split_once('/') {
        Some((head, _)) => Some(DirEntry::Directory(head)),
        None => Some(DirEntry::File(rest)),
    }
}

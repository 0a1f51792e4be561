//! File-storage facade over a remote object bucket.
//!
//! Logical names are resolved against `location` to build object keys;
//! remote errors are translated into `StorageError`.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use time::OffsetDateTime;
use tracing::{span, Level};

use crate::{
    adapters::ObjectClient,
    error::{ClientError, Result, StorageError},
    model::{
        content::{ContentFile, ContentSource},
        object::{ObjectAcl, ObjectStat, WriteOptions},
    },
    settings::StorageSettings,
    util::object::{classify_entry, join_key, normalize_key, DirEntry},
};

/// Emits a tracing event only when diagnostic logging is enabled.
macro_rules! diag {
    ($storage:expr, $level:ident, $($arg:tt)+) => {
        if $storage.settings.logging_enabled {
            tracing::$level!($($arg)+);
        }
    };
}

pub struct CloudStorage {
    client: Arc<dyn ObjectClient>,
    settings: StorageSettings,
    location: String,
    base_url: String,
}

impl CloudStorage {
    /// `location` and `base_url` fall back to the settings when `None`.
    pub fn new(
        client: Arc<dyn ObjectClient>,
        settings: StorageSettings,
        location: Option<&str>,
        base_url: Option<&str>,
    ) -> Self {
        let location = normalize_key(location.unwrap_or(&settings.bucket));
        let base_url = base_url.unwrap_or(&settings.base_url).to_string();

        Self {
            client,
            settings,
            location,
            base_url,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Object key for a logical name. Every operation resolves names here.
    pub fn path(&self, name: &str) -> String {
        normalize_key(&join_key(&self.location, name))
    }

    /// Reads the whole object into memory.
    pub fn open(&self, name: &str) -> Result<ContentFile> {
        let span = span!(Level::INFO, "open", context = "open");
        let _e = span.enter();

        let key = self.path(name);
        diag!(self, info, key = %key, "called");

        let bytes = match self.client.read_object(&key) {
            Err(ClientError::NotFound(_)) => {
                diag!(self, error, key = %key, error_group = "not_found", "file not found");
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(err) => {
                diag!(self, error, error_message = %err, error_group = "read_object");
                return Err(err.into());
            }
            Ok(bytes) => bytes,
        };

        let file = ContentFile::new(bytes);
        diag!(self, info, bytes = file.size(), "returned");

        Ok(file)
    }

    /// Writes `content` as a public-read object and returns `name`.
    pub fn save(&self, name: &str, content: &mut dyn ContentSource) -> Result<String> {
        let span = span!(Level::INFO, "save", context = "save");
        let _e = span.enter();

        let key = self.path(name);
        diag!(self, info, key = %key, "called");

        let options = WriteOptions {
            content_type: mime_guess::from_path(name).first_raw().map(str::to_string),
            acl: ObjectAcl::PublicRead,
            cache_control: Some(self.settings.default_cache_control.clone()),
        };

        let body = match drain(content) {
            Err(err) => {
                diag!(self, error, error_message = %err, error_group = "read_content");
                return Err(err.into());
            }
            Ok(body) => body,
        };

        if let Err(err) = self.client.write_object(&key, body, &options) {
            diag!(self, error, error_message = %err, error_group = "write_object");
            return Err(err.into());
        }

        Ok(name.to_string())
    }

    /// Missing objects are not an error.
    pub fn delete(&self, name: &str) -> Result<()> {
        let key = self.path(name);
        diag!(self, info, key = %key, "delete");

        match self.client.delete_object(&key) {
            Ok(()) | Err(ClientError::NotFound(_)) => Ok(()),
            Err(err) => {
                diag!(self, error, error_message = %err, error_group = "delete_object");
                Err(err.into())
            }
        }
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        match self.stat(name) {
            Ok(_) => {
                diag!(self, info, name = name, "exists");
                Ok(true)
            }
            Err(ClientError::NotFound(_)) => {
                diag!(self, info, name = name, "does not exist");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Immediate subdirectories and files below `prefix`, in listing order.
    pub fn listdir(&self, prefix: &str) -> Result<(Vec<String>, Vec<String>)> {
        let span = span!(Level::INFO, "listdir", context = "listdir");
        let _e = span.enter();
        diag!(self, info, prefix = prefix, "called");

        let entries = self.client.list_objects(&self.location, prefix).map_err(|err| {
            diag!(self, error, error_message = %err, error_group = "list_objects");
            StorageError::from(err)
        })?;

        let dir = join_key(&self.location, prefix);
        let mut directories: Vec<String> = Vec::new();
        let mut files = Vec::new();

        for entry in &entries {
            match classify_entry(&dir, &entry.key) {
                Some(DirEntry::File(file)) => files.push(file.to_string()),
                Some(DirEntry::Directory(sub)) => {
                    if !directories.iter().any(|d| d == sub) {
                        directories.push(sub.to_string());
                    }
                }
                None => {}
            }
        }

        Ok((directories, files))
    }

    pub fn size(&self, name: &str) -> Result<u64> {
        self.stat(name)
            .map(|stat| stat.size)
            .map_err(|err| match err {
                ClientError::NotFound(_) => StorageError::NotFound(name.to_string()),
                err => err.into(),
            })
    }

    pub fn accessed_time(&self, _name: &str) -> Result<OffsetDateTime> {
        Err(StorageError::Unsupported("accessed_time"))
    }

    /// Creation time of the object. A missing object yields an OS-level
    /// ENOENT error rather than `StorageError::NotFound`.
    pub fn created_time(&self, name: &str) -> Result<OffsetDateTime> {
        diag!(self, info, name = name, "created_time");

        match self.stat(name) {
            Ok(stat) => Ok(stat.creation_time),
            Err(ClientError::NotFound(_)) => Err(StorageError::os_not_found()),
            Err(err) => Err(err.into()),
        }
    }

    /// Objects are only ever replaced whole, so this is the creation time.
    pub fn modified_time(&self, name: &str) -> Result<OffsetDateTime> {
        self.created_time(name)
    }

    pub fn url(&self, name: &str) -> String {
        let url = format!("{}/{}", self.base_url, name);
        diag!(self, info, url = %url, "url");

        url
    }

    /// Blob URL served by the local development server, set only in debug mode.
    pub fn emulator_url(&self, name: &str) -> Option<String> {
        if !self.settings.debug {
            return None;
        }

        let filename = format!("/gs{}/{}", self.location, name);
        let blob_key = format!("encoded_gs_file:{}", URL_SAFE.encode(filename));

        Some(format!(
            "http://{}/blobstore/blob/{}?display=inline",
            self.settings.sdk_host, blob_key
        ))
    }

    fn stat(&self, name: &str) -> std::result::Result<ObjectStat, ClientError> {
        let key = self.path(name);
        diag!(self, info, key = %key, "stat");

        self.client.stat_object(&key)
    }
}

fn drain(content: &mut dyn ContentSource) -> std::io::Result<Vec<u8>> {
    content.open()?;
    let body = content.read()?;
    content.close()?;

    Ok(body)
}

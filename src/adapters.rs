use crate::error::ClientError;
use crate::model::object::{ObjectEntry, ObjectStat, WriteOptions};

pub mod gcs;
pub mod memory;
pub mod s3;

/// Blocking access to a remote object store, addressed by absolute
/// `/<bucket>/<path>` keys.
pub trait ObjectClient: Send + Sync {
    fn read_object(&self, key: &str) -> Result<Vec<u8>, ClientError>;

    fn write_object(
        &self,
        key: &str,
        body: Vec<u8>,
        options: &WriteOptions,
    ) -> Result<(), ClientError>;

    fn delete_object(&self, key: &str) -> Result<(), ClientError>;

    fn stat_object(&self, key: &str) -> Result<ObjectStat, ClientError>;

    /// Every object whose key starts with `location/prefix`.
    fn list_objects(&self, location: &str, prefix: &str)
        -> Result<Vec<ObjectEntry>, ClientError>;
}

pub(crate) fn bucket_and_object(key: &str) -> Result<(&str, &str), ClientError> {
    crate::util::object::split_key(key).map_err(|err| ClientError::Remote(err.to_string()))
}

use std::{collections::BTreeMap, sync::Mutex};

use time::OffsetDateTime;

use crate::{
    adapters,
    error::ClientError,
    model::object::{ObjectEntry, ObjectStat, WriteOptions},
    util,
};

#[derive(Clone, Debug)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub options: WriteOptions,
    pub creation_time: OffsetDateTime,
}

/// Object store kept in process memory.
#[derive(Default)]
pub struct MemoryClient {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored object at `key`, write options included.
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.lock().ok()?.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        match self.lock() {
            Ok(objects) => objects.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>>, ClientError> {
        self.objects
            .lock()
            .map_err(|err| ClientError::Remote(format!("failed to acquire guard, {}", err)))
    }
}

impl adapters::ObjectClient for MemoryClient {
    fn read_object(&self, key: &str) -> Result<Vec<u8>, ClientError> {
        self.lock()?
            .get(key)
            .map(|obj| obj.body.clone())
            .ok_or_else(|| ClientError::NotFound(key.to_string()))
    }

    fn write_object(
        &self,
        key: &str,
        body: Vec<u8>,
        options: &WriteOptions,
    ) -> Result<(), ClientError> {
        adapters::bucket_and_object(key)?;

        self.lock()?.insert(
            key.to_string(),
            StoredObject {
                body,
                options: options.clone(),
                creation_time: OffsetDateTime::now_utc(),
            },
        );

        Ok(())
    }

    fn delete_object(&self, key: &str) -> Result<(), ClientError> {
        self.lock()?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound(key.to_string()))
    }

    fn stat_object(&self, key: &str) -> Result<ObjectStat, ClientError> {
        self.lock()?
            .get(key)
            .map(|obj| ObjectStat {
                size: obj.body.len() as u64,
                creation_time: obj.creation_time,
            })
            .ok_or_else(|| ClientError::NotFound(key.to_string()))
    }

    fn list_objects(
        &self,
        location: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectEntry>, ClientError> {
        let full_prefix = util::object::join_key(location, prefix);

        Ok(self
            .lock()?
            .range(full_prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&full_prefix))
            .map(|(key, _)| ObjectEntry { key: key.clone() })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ObjectClient;

    #[test]
    fn test_write_and_read() {
        let client = MemoryClient::new();
        client
            .write_object("/bucket/a.txt", b"hello".to_vec(), &WriteOptions::default())
            .unwrap();

        assert_eq!(client.read_object("/bucket/a.txt").unwrap(), b"hello");
        assert_eq!(client.stat_object("/bucket/a.txt").unwrap().size, 5);
    }

    #[test]
    fn test_missing_object() {
        let client = MemoryClient::new();

        assert_eq!(
            client.read_object("/bucket/nope"),
            Err(ClientError::NotFound("/bucket/nope".to_string()))
        );
        assert!(matches!(client.stat_object("/bucket/nope"), Err(ClientError::NotFound(_))));
        assert!(matches!(client.delete_object("/bucket/nope"), Err(ClientError::NotFound(_))));
    }

    #[test]
    fn test_write_rejects_keyless_location() {
        let client = MemoryClient::new();
        let res = client.write_object("/", Vec::new(), &WriteOptions::default());

        assert!(matches!(res, Err(ClientError::Remote(_))));
    }

    #[test]
    fn test_list_objects() {
        let client = MemoryClient::new();
        let cases = vec!["/bucket/a/x", "/bucket/a/y", "/bucket/b/z", "/other/a/x"];
        for key in &cases {
            client
                .write_object(key, Vec::new(), &WriteOptions::default())
                .unwrap();
        }

        let keys: Vec<String> = client
            .list_objects("/bucket", "a")
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();

        assert_eq!(keys, vec!["/bucket/a/x", "/bucket/a/y"]);
        assert_eq!(client.list_objects("/bucket", "").unwrap().len(), 3);
    }
}

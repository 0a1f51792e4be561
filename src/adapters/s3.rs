use aws_sdk_s3::{primitives::ByteStream, types::ObjectCannedAcl};
use time::OffsetDateTime;
use tokio::runtime::Runtime;

use crate::{
    adapters,
    error::ClientError,
    model::object::{ObjectEntry, ObjectStat, WriteOptions},
    util,
};

/// S3-compatible store behind the blocking `ObjectClient` interface.
pub struct S3Client {
    client: aws_sdk_s3::Client,
    rt: Runtime,
}

impl S3Client {
    pub fn new(client: aws_sdk_s3::Client, rt: Runtime) -> Self {
        Self { client, rt }
    }

    /// Builds a client from the standard AWS environment.
    pub fn connect() -> Result<Self, ClientError> {
        let rt = Runtime::new().map_err(|err| ClientError::remote("start runtime", "s3", err))?;
        let config = rt.block_on(aws_config::load_from_env());

        Ok(Self::new(aws_sdk_s3::Client::new(&config), rt))
    }
}

fn to_offset_date_time(dt: Option<&aws_sdk_s3::primitives::DateTime>) -> OffsetDateTime {
    dt.and_then(|dt| {
        let nanos = dt.secs() as i128 * 1_000_000_000 + dt.subsec_nanos() as i128;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
    })
    .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

impl adapters::ObjectClient for S3Client {
    fn read_object(&self, key: &str) -> Result<Vec<u8>, ClientError> {
        let (bucket, object) = adapters::bucket_and_object(key)?;
        let req = self.client.get_object().bucket(bucket).key(object);

        let o = match self.rt.block_on(req.send()) {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_no_such_key() {
                        return Err(ClientError::NotFound(key.to_string()));
                    }
                }

                return Err(ClientError::remote("get_object", key, err));
            }
            Ok(o) => o,
        };

        let bytes = self
            .rt
            .block_on(o.body.collect())
            .map_err(|err| ClientError::remote("collect body", key, err))?;

        Ok(bytes.into_bytes().to_vec())
    }

    fn write_object(
        &self,
        key: &str,
        body: Vec<u8>,
        options: &WriteOptions,
    ) -> Result<(), ClientError> {
        let (bucket, object) = adapters::bucket_and_object(key)?;
        let mut req = self
            .client
            .put_object()
            .bucket(bucket)
            .key(object)
            .body(ByteStream::from(body))
            .set_content_type(options.content_type.clone())
            .set_cache_control(options.cache_control.clone());

        if options.acl.is_public_read() {
            req = req.acl(ObjectCannedAcl::PublicRead);
        }

        self.rt
            .block_on(req.send())
            .map_err(|err| ClientError::remote("put_object", key, err))?;

        Ok(())
    }

    fn delete_object(&self, key: &str) -> Result<(), ClientError> {
        // S3 deletes succeed on missing keys; stat first to report them.
        self.stat_object(key)?;

        let (bucket, object) = adapters::bucket_and_object(key)?;
        let req = self.client.delete_object().bucket(bucket).key(object);

        self.rt
            .block_on(req.send())
            .map_err(|err| ClientError::remote("delete_object", key, err))?;

        Ok(())
    }

    fn stat_object(&self, key: &str) -> Result<ObjectStat, ClientError> {
        let (bucket, object) = adapters::bucket_and_object(key)?;
        let req = self.client.head_object().bucket(bucket).key(object);

        let ho = match self.rt.block_on(req.send()) {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_not_found() {
                        return Err(ClientError::NotFound(key.to_string()));
                    }
                }

                return Err(ClientError::remote("head_object", key, err));
            }
            Ok(ho) => ho,
        };

        Ok(ObjectStat {
            size: ho.content_length().unwrap_or(0).max(0) as u64,
            creation_time: to_offset_date_time(ho.last_modified()),
        })
    }

    fn list_objects(
        &self,
        location: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectEntry>, ClientError> {
        let full_prefix = util::object::join_key(location, prefix);
        let (bucket, object_prefix) = adapters::bucket_and_object(&full_prefix)?;

        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(object_prefix);

            if let Some(tok) = continuation_token {
                req = req.continuation_token(tok);
            }

            let lo = self
                .rt
                .block_on(req.send())
                .map_err(|err| ClientError::remote("list_objects", &full_prefix, err))?;

            for o in lo.contents() {
                objects.push(ObjectEntry {
                    key: format!("/{}/{}", bucket, o.key().unwrap_or("")),
                });
            }

            continuation_token = lo.next_continuation_token().map(|tok| tok.to_string());
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }
}

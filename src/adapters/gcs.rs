use google_cloud_storage::{
    client::{Client, ClientConfig},
    http::{
        object_access_controls::PredefinedObjectAcl,
        objects::{
            delete::DeleteObjectRequest,
            download::Range,
            get::GetObjectRequest,
            list::ListObjectsRequest,
            upload::{UploadObjectRequest, UploadType},
            Object,
        },
    },
};
use time::OffsetDateTime;
use tokio::runtime::Runtime;

use crate::{
    adapters,
    error::ClientError,
    model::object::{ObjectEntry, ObjectStat, WriteOptions},
    util,
};

/// Google Cloud Storage behind the blocking `ObjectClient` interface.
pub struct GcsClient {
    client: Client,
    rt: Runtime,
}

impl GcsClient {
    pub fn new(client: Client, rt: Runtime) -> Self {
        Self { client, rt }
    }

    /// Builds a client from the ambient Google credentials.
    pub fn connect() -> Result<Self, ClientError> {
        let rt = Runtime::new().map_err(|err| ClientError::remote("start runtime", "gcs", err))?;

        let config = rt
            .block_on(ClientConfig::default().with_auth())
            .map_err(|err| ClientError::remote("load credentials", "gcs", err))?;

        Ok(Self::new(Client::new(config), rt))
    }
}

fn map_gcs_error(op: &str, key: &str, err: google_cloud_storage::http::Error) -> ClientError {
    if let google_cloud_storage::http::Error::Response(resp) = &err {
        if resp.code == 404 {
            return ClientError::NotFound(key.to_string());
        }
    }

    ClientError::remote(op, key, err)
}

impl adapters::ObjectClient for GcsClient {
    fn read_object(&self, key: &str) -> Result<Vec<u8>, ClientError> {
        let (bucket, object) = adapters::bucket_and_object(key)?;
        let req = GetObjectRequest {
            bucket: bucket.to_string(),
            object: object.to_string(),
            ..Default::default()
        };

        self.rt
            .block_on(self.client.download_object(&req, &Range::default()))
            .map_err(|err| map_gcs_error("download_object", key, err))
    }

    fn write_object(
        &self,
        key: &str,
        body: Vec<u8>,
        options: &WriteOptions,
    ) -> Result<(), ClientError> {
        let (bucket, object) = adapters::bucket_and_object(key)?;
        let req = UploadObjectRequest {
            bucket: bucket.to_string(),
            predefined_acl: options
                .acl
                .is_public_read()
                .then_some(PredefinedObjectAcl::PublicRead),
            ..Default::default()
        };

        let resource = Object {
            name: object.to_string(),
            content_type: options.content_type.clone(),
            cache_control: options.cache_control.clone(),
            ..Default::default()
        };

        self.rt
            .block_on(self.client.upload_object(
                &req,
                body,
                &UploadType::Multipart(Box::new(resource)),
            ))
            .map_err(|err| map_gcs_error("upload_object", key, err))?;

        Ok(())
    }

    fn delete_object(&self, key: &str) -> Result<(), ClientError> {
        let (bucket, object) = adapters::bucket_and_object(key)?;
        let req = DeleteObjectRequest {
            bucket: bucket.to_string(),
            object: object.to_string(),
            ..Default::default()
        };

        self.rt
            .block_on(self.client.delete_object(&req))
            .map_err(|err| map_gcs_error("delete_object", key, err))
    }

    fn stat_object(&self, key: &str) -> Result<ObjectStat, ClientError> {
        let (bucket, object) = adapters::bucket_and_object(key)?;
        let req = GetObjectRequest {
            bucket: bucket.to_string(),
            object: object.to_string(),
            ..Default::default()
        };

        let obj = self
            .rt
            .block_on(self.client.get_object(&req))
            .map_err(|err| map_gcs_error("get_object", key, err))?;

        Ok(ObjectStat {
            size: obj.size.max(0) as u64,
            creation_time: obj
                .time_created
                .or(obj.updated)
                .unwrap_or(OffsetDateTime::UNIX_EPOCH),
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
            let req = ListObjectsRequest {
                bucket: bucket.to_string(),
                prefix: Some(object_prefix.to_string()),
                page_token: continuation_token.clone(),
                ..Default::default()
            };

            let lo = self
                .rt
                .block_on(self.client.list_objects(&req))
                .map_err(|err| map_gcs_error("list_objects", &full_prefix, err))?;

            if let Some(objs) = lo.items {
                for obj in objs {
                    objects.push(ObjectEntry {
                        key: format!("/{}/{}", bucket, obj.name),
                    });
                }
            }

            continuation_token = lo.next_page_token;
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }
}

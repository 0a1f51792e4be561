use time::OffsetDateTime;

/// Metadata snapshot of a remote object, fetched on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectStat {
    pub size: u64,
    pub creation_time: OffsetDateTime,
}

/// One entry of a bucket listing. `key` is the full `/<bucket>/<path>` key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObjectAcl {
    #[default]
    Private,
    PublicRead,
}

impl ObjectAcl {
    pub fn is_public_read(&self) -> bool {
        matches!(self, ObjectAcl::PublicRead)
    }
}

/// Metadata attached to an object when it is written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub content_type: Option<String>,
    pub acl: ObjectAcl,
    pub cache_control: Option<String>,
}

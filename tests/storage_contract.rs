use std::{io, sync::Arc};

use blobstorage::{
    adapters::{memory::MemoryClient, ObjectClient},
    error::IoCause,
    model::object::{ObjectEntry, ObjectStat, WriteOptions},
    ClientError, CloudStorage, ContentFile, ContentSource, StorageError, StorageSettings,
};

fn memory_storage() -> CloudStorage {
    CloudStorage::new(
        Arc::new(MemoryClient::new()),
        StorageSettings::default(),
        Some("/bucket"),
        Some("https://cdn.example.com"),
    )
}

/// Client whose every call fails with a remote error.
struct FailingClient;

impl ObjectClient for FailingClient {
    fn read_object(&self, key: &str) -> Result<Vec<u8>, ClientError> {
        Err(ClientError::remote("download_object", key, "permission denied"))
    }

    fn write_object(&self, key: &str, _: Vec<u8>, _: &WriteOptions) -> Result<(), ClientError> {
        Err(ClientError::remote("upload_object", key, "permission denied"))
    }

    fn delete_object(&self, key: &str) -> Result<(), ClientError> {
        Err(ClientError::remote("delete_object", key, "timeout"))
    }

    fn stat_object(&self, key: &str) -> Result<ObjectStat, ClientError> {
        Err(ClientError::remote("get_object", key, "timeout"))
    }

    fn list_objects(&self, location: &str, _: &str) -> Result<Vec<ObjectEntry>, ClientError> {
        Err(ClientError::remote("list_objects", location, "timeout"))
    }
}

fn failing_storage() -> CloudStorage {
    CloudStorage::new(
        Arc::new(FailingClient),
        StorageSettings::default(),
        Some("/bucket"),
        None,
    )
}

/// Source that fails on read, to exercise the content error path.
struct BrokenSource;

impl ContentSource for BrokenSource {
    fn open(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read(&mut self) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated upload"))
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_save_then_open_returns_same_bytes() {
    let storage = memory_storage();

    let cases = vec![
        ("a.txt", b"hello".to_vec()),
        ("nested/dir/b.bin", vec![0u8, 159, 146, 150, 255]),
        ("empty.txt", Vec::new()),
    ];

    for (name, body) in cases {
        let saved = storage.save(name, &mut ContentFile::new(body.clone())).unwrap();
        assert_eq!(saved, name, "failed on returned name for case: {}", name);

        let file = storage.open(name).unwrap();
        assert_eq!(file.as_bytes(), body.as_slice(), "failed for case: {}", name);
        assert_eq!(storage.size(name).unwrap(), body.len() as u64, "failed on size for case: {}", name);
    }
}

#[test]
fn test_unnormalized_names_resolve_to_saved_object() {
    let cases = vec![
        ("/bucket", "./a.txt"),
        ("/bucket", "docs//b.txt"),
        ("/bucket", "docs/drafts/../c.txt"),
        ("/bucket/media/", "a.txt"),
        ("/bucket/media/", "./docs//d.txt"),
    ];

    for (location, name) in cases {
        let storage = CloudStorage::new(
            Arc::new(MemoryClient::new()),
            StorageSettings::default(),
            Some(location),
            None,
        );

        let saved = storage.save(name, &mut ContentFile::from("hello")).unwrap();

        assert_eq!(storage.open(&saved).unwrap().as_bytes(), b"hello", "failed on open for case: {}", name);
        assert!(storage.exists(&saved).unwrap(), "failed on exists for case: {}", name);
        assert_eq!(storage.size(&saved).unwrap(), 5, "failed on size for case: {}", name);
        assert!(storage.created_time(&saved).is_ok(), "failed on created_time for case: {}", name);

        storage.delete(&saved).unwrap();
        assert!(!storage.exists(&saved).unwrap(), "failed on delete for case: {}", name);
    }
}

#[test]
fn test_delete_missing_is_ok() {
    let storage = memory_storage();

    assert!(storage.delete("never-saved.txt").is_ok());
    assert!(storage.delete("never-saved.txt").is_ok());
}

#[test]
fn test_exists_follows_save_and_delete() {
    let storage = memory_storage();

    assert!(!storage.exists("a.txt").unwrap());

    storage.save("a.txt", &mut ContentFile::from("x")).unwrap();
    assert!(storage.exists("a.txt").unwrap());

    storage.delete("a.txt").unwrap();
    assert!(!storage.exists("a.txt").unwrap());
}

#[test]
fn test_created_equals_modified() {
    let storage = memory_storage();
    storage.save("a.txt", &mut ContentFile::from("x")).unwrap();

    assert_eq!(
        storage.created_time("a.txt").unwrap(),
        storage.modified_time("a.txt").unwrap()
    );
}

#[test]
fn test_accessed_time_always_unsupported() {
    let storage = memory_storage();
    storage.save("a.txt", &mut ContentFile::from("x")).unwrap();

    for name in ["a.txt", "missing.txt"] {
        assert!(
            matches!(storage.accessed_time(name), Err(StorageError::Unsupported(_))),
            "failed for case: {}",
            name
        );
    }
}

#[test]
fn test_listdir_emulates_directories() {
    let storage = memory_storage();
    for name in ["a/b/x", "a/b/y", "a/c/z"] {
        storage.save(name, &mut ContentFile::from("x")).unwrap();
    }

    let (directories, files) = storage.listdir("a").unwrap();
    assert_eq!(directories, vec!["b", "c"]);
    assert!(files.is_empty());

    let (directories, files) = storage.listdir("a/b").unwrap();
    assert!(directories.is_empty());
    assert_eq!(files, vec!["x", "y"]);

    let (directories, files) = storage.listdir("").unwrap();
    assert_eq!(directories, vec!["a"]);
    assert!(files.is_empty());
}

#[test]
fn test_listdir_ignores_sibling_prefixes() {
    let storage = memory_storage();
    for name in ["a/x", "ab/y", "a/sub/z", "top.txt"] {
        storage.save(name, &mut ContentFile::from("x")).unwrap();
    }

    let (directories, files) = storage.listdir("a").unwrap();
    assert_eq!(directories, vec!["sub"]);
    assert_eq!(files, vec!["x"]);

    let (directories, files) = storage.listdir("").unwrap();
    assert_eq!(directories, vec!["a", "ab"]);
    assert_eq!(files, vec!["top.txt"]);
}

#[test]
fn test_locations_do_not_collide() {
    let client = Arc::new(MemoryClient::new());
    let first = CloudStorage::new(client.clone(), StorageSettings::default(), Some("/bucket/one"), None);
    let second = CloudStorage::new(client.clone(), StorageSettings::default(), Some("/bucket/two"), None);

    first.save("a.txt", &mut ContentFile::from("first")).unwrap();
    second.save("a.txt", &mut ContentFile::from("second")).unwrap();

    assert_eq!(first.open("a.txt").unwrap().as_bytes(), b"first");
    assert_eq!(second.open("a.txt").unwrap().as_bytes(), b"second");
    assert_eq!(client.keys(), vec!["/bucket/one/a.txt", "/bucket/two/a.txt"]);
}

#[test]
fn test_open_missing_is_not_found_with_name() {
    let storage = memory_storage();

    match storage.open("docs/missing.txt") {
        Err(StorageError::NotFound(name)) => assert_eq!(name, "docs/missing.txt"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_size_missing_is_not_found() {
    let storage = memory_storage();

    assert!(matches!(storage.size("missing.txt"), Err(StorageError::NotFound(_))));
}

// Timestamp lookups report a missing object as an OS-level ENOENT, not as
// `StorageError::NotFound`. Both answer `is_not_found()`.
#[test]
fn test_timestamp_missing_is_os_not_found() {
    let storage = memory_storage();

    for result in [storage.created_time("missing.txt"), storage.modified_time("missing.txt")] {
        match result {
            Err(StorageError::Os(io_err)) => assert_eq!(io_err.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    assert!(storage.created_time("missing.txt").unwrap_err().is_not_found());

    assert!(!matches!(storage.created_time("missing.txt"), Err(StorageError::NotFound(_))));
}

#[test]
fn test_url_is_base_url_and_name() {
    let client = Arc::new(MemoryClient::new());

    for debug in [false, true] {
        let settings = StorageSettings {
            debug,
            ..Default::default()
        };
        let storage = CloudStorage::new(client.clone(), settings, Some("/bucket"), Some("https://cdn.example.com"));

        for name in ["a.png", "docs/b c.pdf", ""] {
            assert_eq!(
                storage.url(name),
                format!("https://cdn.example.com/{}", name),
                "failed for case: {}",
                name
            );
        }
    }
}

#[test]
fn test_remote_failures_are_io_failures() {
    let storage = failing_storage();

    let results: Vec<(&str, Result<(), StorageError>)> = vec![
        ("open", storage.open("a.txt").map(|_| ())),
        ("save", storage.save("a.txt", &mut ContentFile::from("x")).map(|_| ())),
        ("delete", storage.delete("a.txt")),
        ("exists", storage.exists("a.txt").map(|_| ())),
        ("listdir", storage.listdir("").map(|_| ())),
        ("size", storage.size("a.txt").map(|_| ())),
        ("created_time", storage.created_time("a.txt").map(|_| ())),
    ];

    for (op, result) in results {
        assert!(
            matches!(result, Err(StorageError::Io(IoCause::Client(ClientError::Remote(_))))),
            "failed for case: {}",
            op
        );
    }
}

#[test]
fn test_save_content_failure_is_io_failure() {
    let storage = memory_storage();
    let mut source = BrokenSource;

    let result = storage.save("a.txt", &mut source);

    assert!(matches!(result, Err(StorageError::Io(IoCause::Content(_)))));
    assert!(!storage.exists("a.txt").unwrap());
}

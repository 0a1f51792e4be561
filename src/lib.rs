//! Object-bucket storage backend exposing the open/save/delete/exists/
//! listdir/stat/url contract of a web application's file storage.

pub mod adapters;
pub mod error;
pub mod model;
pub mod settings;
pub mod storage;
pub mod util;

pub use error::{ClientError, StorageError};
pub use model::content::{ContentFile, ContentSource};
pub use settings::StorageSettings;
pub use storage::CloudStorage;

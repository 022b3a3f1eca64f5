//! Image library records. Persistence is left to `ImageLibrary` implementors.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::generation::ImagePart;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid image id: {id:?}")]
    InvalidId { id: String },
    #[error("image id already exists: {id}")]
    DuplicateId { id: String },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A stored image plus the free-form comment shown next to it in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    #[serde(serialize_with = "serialize_bytes", deserialize_with = "deserialize_bytes")]
    pub bytes: Vec<u8>,
    #[serde(default)]
    pub comment: String,
}

impl ImageRecord {
    /// New record with an id of the form `<unix-millis>-<file_name>`.
    pub fn new_from_file(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let file_name = file_name.into();
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or(0);
        Self {
            id: format!("{millis}-{file_name}"),
            file_name,
            mime_type: mime_type.into(),
            bytes,
            comment: String::new(),
        }
    }

    pub fn to_image_part(&self) -> ImagePart {
        ImagePart::from_bytes(self.mime_type.clone(), &self.bytes)
    }
}

fn serialize_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn deserialize_bytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded)
        .map_err(serde::de::Error::custom)
}

pub trait ImageLibrary {
    /// Stores a new record; fails if the id is taken.
    fn add(&mut self, record: ImageRecord) -> StorageResult<()>;
    /// All records, ordered by id.
    fn list(&self) -> StorageResult<Vec<ImageRecord>>;
    /// Removes a record. Missing ids are not an error.
    fn delete(&mut self, id: &str) -> StorageResult<()>;
    /// Inserts or replaces a record.
    fn update(&mut self, record: ImageRecord) -> StorageResult<()>;
}

fn validate_id(id: &str) -> StorageResult<()> {
    if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(StorageError::InvalidId { id: id.to_string() });
    }
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryImageLibrary {
    records: BTreeMap<String, ImageRecord>,
}

impl InMemoryImageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ImageLibrary for InMemoryImageLibrary {
    fn add(&mut self, record: ImageRecord) -> StorageResult<()> {
        validate_id(&record.id)?;
        if self.records.contains_key(&record.id) {
            return Err(StorageError::DuplicateId { id: record.id });
        }
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<ImageRecord>> {
        Ok(self.records.values().cloned().collect())
    }

    fn delete(&mut self, id: &str) -> StorageResult<()> {
        self.records.remove(id);
        Ok(())
    }

    fn update(&mut self, record: ImageRecord) -> StorageResult<()> {
        validate_id(&record.id)?;
        self.records.insert(record.id.clone(), record);
        Ok(())
    }
}

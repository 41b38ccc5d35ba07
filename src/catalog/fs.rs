use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::{fs, io::AsyncWriteExt};

use super::{AttributeStore, CatalogError};
use crate::layer::LayerId;

const ATTRIBUTE_EXT: &str = "bin";

/// File-backed attribute store.
///
/// Each attribute lives at `<root>/<name>/<zoom>/<attribute>.bin`, framed
/// with a 4-byte big-endian CRC32 of the payload. Writes land in a sibling
/// temp file and are renamed into place, so a crash mid-put leaves the old
/// blob intact.
#[derive(Debug)]
pub struct FsAttributeStore {
    root: PathBuf,
}

impl FsAttributeStore {
    /// Store rooted at `root`. The directory is created lazily on first put.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn layer_dir(&self, id: &LayerId) -> PathBuf {
        self.root.join(&id.name).join(id.zoom.to_string())
    }

    fn attribute_path(&self, id: &LayerId, attribute: &str) -> PathBuf {
        self.layer_dir(id)
            .join(format!("{attribute}.{ATTRIBUTE_EXT}"))
    }

    fn frame(value: &[u8]) -> Vec<u8> {
        let checksum = crc32fast::hash(value);
        let mut framed = Vec::with_capacity(4 + value.len());
        framed.extend_from_slice(&checksum.to_be_bytes());
        framed.extend_from_slice(value);
        framed
    }

    fn unframe(id: &LayerId, attribute: &str, framed: &[u8]) -> Result<Bytes, CatalogError> {
        let corrupt = |reason: String| CatalogError::AttributeCorrupt {
            id: id.clone(),
            attribute: attribute.to_string(),
            reason,
        };
        if framed.len() < 4 {
            return Err(corrupt(format!(
                "{} bytes is too short for the checksum frame",
                framed.len()
            )));
        }
        let (header, payload) = framed.split_at(4);
        let stored = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let computed = crc32fast::hash(payload);
        if stored != computed {
            return Err(corrupt(format!(
                "checksum mismatch: stored {stored:#010x}, computed {computed:#010x}"
            )));
        }
        Ok(Bytes::copy_from_slice(payload))
    }
}

#[async_trait]
impl AttributeStore for FsAttributeStore {
    async fn get(&self, id: &LayerId, attribute: &str) -> Result<Option<Bytes>, CatalogError> {
        let path = self.attribute_path(id, attribute);
        let framed = match fs::read(&path).await {
            Ok(framed) => framed,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Self::unframe(id, attribute, &framed).map(Some)
    }

    async fn put(&self, id: &LayerId, attribute: &str, value: Bytes) -> Result<(), CatalogError> {
        let dir = self.layer_dir(id);
        fs::create_dir_all(&dir).await?;

        let path = self.attribute_path(id, attribute);
        let tmp = dir.join(format!("{attribute}.{ATTRIBUTE_EXT}.tmp"));
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&Self::frame(&value)).await?;
        file.sync_all().await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn layer_ids(&self) -> Result<Vec<LayerId>, CatalogError> {
        let mut ids = Vec::new();
        let mut names = match fs::read_dir(&self.root).await {
            Ok(names) => names,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(err) => return Err(err.into()),
        };
        while let Some(name_entry) = names.next_entry().await? {
            if !name_entry.file_type().await?.is_dir() {
                continue;
            }
            let name = match name_entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            let mut zooms = fs::read_dir(name_entry.path()).await?;
            while let Some(zoom_entry) = zooms.next_entry().await? {
                if !zoom_entry.file_type().await?.is_dir() {
                    continue;
                }
                let Some(zoom) = zoom_entry
                    .file_name()
                    .to_str()
                    .and_then(|raw| raw.parse::<u32>().ok())
                else {
                    continue;
                };
                if has_attribute(&zoom_entry.path()).await? {
                    ids.push(LayerId::new(name.clone(), zoom));
                }
            }
        }
        ids.sort_by(|a, b| a.name.cmp(&b.name).then(a.zoom.cmp(&b.zoom)));
        Ok(ids)
    }
}

async fn has_attribute(dir: &Path) -> Result<bool, CatalogError> {
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry
            .path()
            .extension()
            .is_some_and(|ext| ext == ATTRIBUTE_EXT)
        {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
#[path = "object_url_test.rs"]
mod tests;

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

#[derive(Debug)]
struct Blob {
    bytes: Arc<Vec<u8>>,
    mime: String,
}

/// In-memory blobs addressed by `blob:toolgate/<id>` URLs.
#[derive(Clone, Debug, Default)]
pub struct ObjectUrlStore {
    blobs: Arc<DashMap<String, Blob>>,
}

impl ObjectUrlStore {
    pub fn new() -> ObjectUrlStore {
        return ObjectUrlStore::default();
    }

    pub fn create(&self, bytes: Vec<u8>, mime: &str) -> ObjectUrl {
        let url = format!("blob:toolgate/{}", Uuid::new_v4());
        self.blobs.insert(
            url.to_string(),
            Blob {
                bytes: Arc::new(bytes),
                mime: mime.to_string(),
            },
        );
        tracing::debug!(url = %url, mime = mime, "object url created");

        return ObjectUrl {
            inner: Arc::new(ObjectUrlInner {
                url,
                store: self.clone(),
            }),
        };
    }

    pub fn resolve(&self, url: &str) -> Option<(Arc<Vec<u8>>, String)> {
        return self
            .blobs
            .get(url)
            .map(|blob| return (blob.bytes.clone(), blob.mime.to_string()));
    }

    pub fn revoke(&self, url: &str) {
        if self.blobs.remove(url).is_some() {
            tracing::debug!(url = url, "object url revoked");
        }
    }

    pub fn len(&self) -> usize {
        return self.blobs.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.blobs.is_empty();
    }
}

#[derive(Debug)]
struct ObjectUrlInner {
    url: String,
    store: ObjectUrlStore,
}

impl Drop for ObjectUrlInner {
    fn drop(&mut self) {
        self.store.revoke(&self.url);
    }
}

/// Handle to a live object URL. The blob is revoked once the last clone is
/// dropped.
#[derive(Clone, Debug)]
pub struct ObjectUrl {
    inner: Arc<ObjectUrlInner>,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        return &self.inner.url;
    }

    pub fn bytes(&self) -> Option<Arc<Vec<u8>>> {
        return self
            .inner
            .store
            .resolve(&self.inner.url)
            .map(|(bytes, _)| return bytes);
    }

    pub fn mime(&self) -> Option<String> {
        return self
            .inner
            .store
            .resolve(&self.inner.url)
            .map(|(_, mime)| return mime);
    }
}

impl PartialEq for ObjectUrl {
    fn eq(&self, other: &ObjectUrl) -> bool {
        return self.inner.url == other.inner.url;
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.as_str());
    }
}

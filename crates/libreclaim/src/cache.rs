use std::{
  collections::{HashMap, VecDeque},
  sync::Arc,
};

use ahash::RandomState;
use tokio::sync::RwLock;

use crate::{descriptor::ImageDescriptor, model::ImageRef};

/// Bounded descriptor cache keyed by [`ImageRef::cache_key`].
///
/// When full, the oldest inserted entry is evicted. Remote images that change
/// behind a stable URL must be invalidated explicitly.
#[derive(Debug)]
pub struct DescriptorCache {
  capacity: usize,
  entries: RwLock<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
  descriptors: HashMap<String, Arc<ImageDescriptor>, RandomState>,
  order: VecDeque<String>,
}

impl DescriptorCache {
  pub fn new(capacity: usize) -> DescriptorCache {
    DescriptorCache {
      capacity,
      entries: RwLock::default(),
    }
  }

  pub async fn get(&self, image: &ImageRef) -> Option<Arc<ImageDescriptor>> {
    self.entries.read().await.descriptors.get(&image.cache_key()).cloned()
  }

  pub async fn insert(&self, image: &ImageRef, descriptor: Arc<ImageDescriptor>) {
    if self.capacity == 0 {
      return;
    }

    let key = image.cache_key();
    let mut entries = self.entries.write().await;

    if entries.descriptors.insert(key.clone(), descriptor).is_some() {
      return;
    }

    entries.order.push_back(key);

    while entries.order.len() > self.capacity {
      if let Some(evicted) = entries.order.pop_front() {
        entries.descriptors.remove(&evicted);
      }
    }
  }

  pub async fn invalidate(&self, image: &ImageRef) -> bool {
    let key = image.cache_key();
    let mut entries = self.entries.write().await;

    entries.order.retain(|k| k != &key);
    entries.descriptors.remove(&key).is_some()
  }

  pub async fn clear(&self) {
    let mut entries = self.entries.write().await;

    entries.descriptors.clear();
    entries.order.clear();
  }

  pub async fn len(&self) -> usize {
    self.entries.read().await.descriptors.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.len().await == 0
  }
}

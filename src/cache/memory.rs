//! In-process cache storage backed by moka.
//!
//! Each generation is an unbounded `moka::future::Cache`. Generations are
//! never size-bounded or evicted: the proxy relies on activation to retire
//! whole generations instead.

use async_trait::async_trait;
use moka::future::Cache;
use tokio::sync::RwLock;

use super::{CacheHit, CacheStorage};
use crate::Result;
use crate::types::{ProxyResponse, RequestKey, ResponseSource};

type Generation = Cache<RequestKey, ProxyResponse>;

fn new_generation(name: &str) -> Generation {
    Cache::builder().name(name).build()
}

/// In-memory [`CacheStorage`].
///
/// Generation handles are cheap to clone; the lock only guards the list of
/// names, never an individual lookup.
#[derive(Default)]
pub struct MemoryCacheStorage {
    generations: RwLock<Vec<(String, Generation)>>,
}

impl MemoryCacheStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    async fn find(&self, name: &str) -> Option<Generation> {
        self.generations
            .read()
            .await
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, g)| g.clone())
    }

    async fn open(&self, name: &str) -> Generation {
        let mut generations = self.generations.write().await;
        if let Some((_, g)) = generations.iter().find(|(n, _)| n == name) {
            return g.clone();
        }
        let generation = new_generation(name);
        generations.push((name.to_string(), generation.clone()));
        generation
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .generations
            .read()
            .await
            .iter()
            .map(|(n, _)| n.clone())
            .collect())
    }

    async fn has(&self, generation: &str) -> Result<bool> {
        Ok(self.find(generation).await.is_some())
    }

    async fn delete(&self, generation: &str) -> Result<bool> {
        let mut generations = self.generations.write().await;
        match generations.iter().position(|(n, _)| n == generation) {
            Some(idx) => {
                let (_, removed) = generations.remove(idx);
                removed.invalidate_all();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn entries(&self, generation: &str) -> Result<Vec<RequestKey>> {
        Ok(match self.find(generation).await {
            Some(g) => g.iter().map(|(k, _)| (*k).clone()).collect(),
            None => Vec::new(),
        })
    }

    async fn match_in(&self, generation: &str, key: &RequestKey) -> Result<Option<ProxyResponse>> {
        let Some(g) = self.find(generation).await else {
            return Ok(None);
        };
        Ok(g.get(key).await.map(|r| {
            r.with_source(ResponseSource::Cache {
                generation: generation.to_string(),
            })
        }))
    }

    async fn match_any(&self, key: &RequestKey) -> Result<Option<CacheHit>> {
        let snapshot: Vec<(String, Generation)> = self.generations.read().await.clone();
        for (name, g) in snapshot {
            if let Some(response) = g.get(key).await {
                let response = response.with_source(ResponseSource::Cache {
                    generation: name.clone(),
                });
                return Ok(Some(CacheHit {
                    generation: name,
                    response,
                }));
            }
        }
        Ok(None)
    }

    async fn put(&self, generation: &str, key: RequestKey, response: ProxyResponse) -> Result<()> {
        self.open(generation).await.insert(key, response).await;
        Ok(())
    }

    async fn put_all(
        &self,
        generation: &str,
        entries: Vec<(RequestKey, ProxyResponse)>,
    ) -> Result<()> {
        // Build the replacement off to the side, then swap it in under the
        // write lock so readers never observe a partial batch.
        let staged = new_generation(generation);
        if let Some(existing) = self.find(generation).await {
            for (k, v) in existing.iter() {
                staged.insert((*k).clone(), v).await;
            }
        }
        for (key, response) in entries {
            staged.insert(key, response).await;
        }

        let mut generations = self.generations.write().await;
        match generations.iter_mut().find(|(n, _)| n == generation) {
            Some((_, slot)) => *slot = staged,
            None => generations.push((generation.to_string(), staged)),
        }
        Ok(())
    }
}

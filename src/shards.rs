// 🌐 Sharded Query - federated lookup across ledger partitions
// The "decentralized" model: each shard is authoritative for its own
// disjoint key subset, and the union of all shards is the logical
// dataset. A lookup consults the local shard first, then remote shards
// in ascending shard-id order, stopping at the first hit. A miss is a
// true negative only with respect to the shards actually consulted.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// SHARD
// ============================================================================

/// A named partition holding a disjoint subset of key → record pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shard {
    pub id: u32,
    pub name: String,
    records: BTreeMap<i64, String>,
}

impl Shard {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Shard {
            id,
            name: name.into(),
            records: BTreeMap::new(),
        }
    }

    /// Build a shard holding bare keys (record payload mirrors the key).
    pub fn from_keys(id: u32, name: impl Into<String>, keys: &[i64]) -> Self {
        let mut shard = Shard::new(id, name);
        for &key in keys {
            shard.insert(key, key.to_string());
        }
        shard
    }

    /// Insert into this shard only. Cross-shard disjointness is enforced
    /// by `ShardSet`, which owns the full partition view.
    pub fn insert(&mut self, key: i64, record: impl Into<String>) {
        self.records.insert(key, record.into());
    }

    pub fn contains(&self, key: i64) -> bool {
        self.records.contains_key(&key)
    }

    pub fn get(&self, key: i64) -> Option<&str> {
        self.records.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// FEDERATED LOOKUP
// ============================================================================

/// Which shard answered a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardHit {
    pub shard_id: u32,
    pub shard_name: String,
}

/// Locate `key`: local shard first, then remotes in ascending shard-id
/// order, short-circuiting on the first hit.
pub fn locate(key: i64, local: &Shard, remotes: &[Shard]) -> Option<ShardHit> {
    if local.contains(key) {
        return Some(ShardHit {
            shard_id: local.id,
            shard_name: local.name.clone(),
        });
    }

    // Fixed consultation order keeps misses deterministic
    let mut consult: Vec<&Shard> = remotes.iter().collect();
    consult.sort_by_key(|shard| shard.id);

    for shard in consult {
        if shard.contains(key) {
            return Some(ShardHit {
                shard_id: shard.id,
                shard_name: shard.name.clone(),
            });
        }
    }
    None
}

/// True iff `key` exists in the union of the consulted shards.
pub fn find_across_shards(key: i64, local: &Shard, remotes: &[Shard]) -> bool {
    locate(key, local, remotes).is_some()
}

// ============================================================================
// SHARD SET
// ============================================================================

/// Owning view over a full partition. Guards the no-replication
/// invariant: no key appears in two shards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardSet {
    shards: Vec<Shard>,
}

impl ShardSet {
    pub fn new() -> Self {
        ShardSet { shards: Vec::new() }
    }

    /// Add an empty shard with a dense id.
    pub fn add_shard(&mut self, name: impl Into<String>) -> u32 {
        let id = self.shards.len() as u32;
        self.shards.push(Shard::new(id, name));
        id
    }

    /// Insert a record into `shard_id`, refusing a key any shard already
    /// owns (including the target itself).
    pub fn insert(&mut self, shard_id: u32, key: i64, record: impl Into<String>) -> Result<()> {
        if let Some(owner) = self.owner_of(key) {
            return Err(LedgerError::DuplicateKey {
                key,
                shard_id: owner,
            });
        }

        let len = self.shards.len();
        let shard = self
            .shards
            .get_mut(shard_id as usize)
            .ok_or(LedgerError::OutOfRange {
                index: shard_id,
                len,
            })?;
        shard.insert(key, record);
        Ok(())
    }

    /// The shard id currently owning `key`, if any.
    pub fn owner_of(&self, key: i64) -> Option<u32> {
        self.shards
            .iter()
            .find(|shard| shard.contains(key))
            .map(|shard| shard.id)
    }

    /// Federated lookup with `local_id` as the shard consulted first.
    pub fn find(&self, key: i64, local_id: u32) -> Result<bool> {
        let local = self
            .shards
            .get(local_id as usize)
            .ok_or(LedgerError::OutOfRange {
                index: local_id,
                len: self.shards.len(),
            })?;

        let remotes: Vec<Shard> = self
            .shards
            .iter()
            .filter(|shard| shard.id != local_id)
            .cloned()
            .collect();

        Ok(find_across_shards(key, local, &remotes))
    }

    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }
}

// ============================================================================
// TESTS
// ============================================================================

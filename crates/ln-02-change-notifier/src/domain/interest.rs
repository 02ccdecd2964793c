//! Membership filter keys
//!
//! Every watchable thing has exactly one byte encoding, so a typed id and
//! the raw object id it converts to arm the same filter bits.

use shared_types::{AccountId, Address, AssetId, ObjectId, PublicKey};

const OBJECT_TAG: u8 = b'O';
const KEY_TAG: u8 = b'K';
const ADDRESS_TAG: u8 = b'A';

/// Something a session can arm its membership filter with.
pub trait WatchKey {
    /// Byte form inserted into and probed against the filter
    fn watch_key(&self) -> Vec<u8>;
}

impl WatchKey for ObjectId {
    fn watch_key(&self) -> Vec<u8> {
        tagged(OBJECT_TAG, &self.to_bytes())
    }
}

impl WatchKey for AccountId {
    fn watch_key(&self) -> Vec<u8> {
        self.object_id().watch_key()
    }
}

impl WatchKey for AssetId {
    fn watch_key(&self) -> Vec<u8> {
        self.object_id().watch_key()
    }
}

impl WatchKey for PublicKey {
    fn watch_key(&self) -> Vec<u8> {
        tagged(KEY_TAG, &self.0)
    }
}

impl WatchKey for Address {
    fn watch_key(&self) -> Vec<u8> {
        tagged(ADDRESS_TAG, &self.0)
    }
}

fn tagged(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(tag);
    out.extend_from_slice(body);
    out
}

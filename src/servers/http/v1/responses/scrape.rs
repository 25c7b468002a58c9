//! `Scrape` response for the HTTP tracker.
//!
//! The `files` dictionary is keyed by the raw 20-byte info-hash. A `BTreeMap`
//! keeps the keys byte-ordered, which is the canonical bencode order.
//!
//! Refer to [BEP 48: Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html).
use std::collections::BTreeMap;

use serde::Serialize;
use serde_bytes::ByteBuf;

use crate::core::ScrapeData;

#[derive(Serialize, Debug, PartialEq, Eq, Default)]
pub struct Scrape {
    pub files: BTreeMap<ByteBuf, File>,
}

#[derive(Serialize, Debug, PartialEq, Eq, Default)]
pub struct File {
    pub complete: u32,
    pub downloaded: u32,
    pub incomplete: u32,
}

impl From<ScrapeData> for Scrape {
    fn from(scrape_data: ScrapeData) -> Self {
        let mut files: BTreeMap<ByteBuf, File> = BTreeMap::new();

        for (info_hash, swarm_metadata) in &scrape_data.files {
            files.insert(
                ByteBuf::from(info_hash.0.to_vec()),
                File {
                    complete: swarm_metadata.complete,
                    downloaded: swarm_metadata.downloaded,
                    incomplete: swarm_metadata.incomplete,
                },
            );
        }

        Self { files }
    }
}

impl Scrape {
    /// # Panics
    ///
    /// Will panic if the response cannot be bencoded.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        serde_bencode::to_bytes(&self).expect("it should be a bencodable response")
    }
}

//! The sharing graph and its wire format.
//!
//! ```text
//! { partnerHash: { sectionHash: { block | "hashKey": { private, cryptoInfo } } } }
//! ```
//!
//! Maps are `BTreeMap`s, so serialization is canonical: the same graph always
//! produces the same bytes and therefore the same blob hash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use keyweave_core::{BlockKey, CryptoInfo, PartnerHash, SectionHash};
use keyweave_crypto::payload::hex_bytes;

/// One wrapped key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    /// Key ciphertext under the edge key, hex on the wire.
    #[serde(with = "hex_bytes")]
    pub private: Vec<u8>,
    /// Cryptor and edge context that unwrap `private`.
    pub crypto_info: CryptoInfo,
}

/// Keys of one partner and section, by block.
pub type SectionKeys = BTreeMap<BlockKey, KeyRecord>;

/// Sections of one partner.
pub type PartnerSections = BTreeMap<SectionHash, SectionKeys>;

/// Encrypted key graph of one contract or multi-sharing slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharingGraph(BTreeMap<PartnerHash, PartnerSections>);

impl SharingGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the graph has no partners.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of partners.
    pub fn partner_count(&self) -> usize {
        self.0.len()
    }

    /// Iterate partners in hash order.
    pub fn partners(&self) -> impl Iterator<Item = (&PartnerHash, &PartnerSections)> {
        self.0.iter()
    }

    /// Sections of a partner.
    pub fn partner(&self, partner: &PartnerHash) -> Option<&PartnerSections> {
        self.0.get(partner)
    }

    /// Keys of a partner and section, without fallback.
    pub fn section(&self, partner: &PartnerHash, section: &SectionHash) -> Option<&SectionKeys> {
        self.0.get(partner)?.get(section)
    }

    /// Exact lookup.
    pub fn get(
        &self,
        partner: &PartnerHash,
        section: &SectionHash,
        block: &BlockKey,
    ) -> Option<&KeyRecord> {
        self.section(partner, section)?.get(block)
    }

    /// Keys of a partner and section, falling back to `catch_all` when the
    /// partner has no entry for `section`.
    pub fn section_or_catch_all(
        &self,
        partner: &PartnerHash,
        section: &SectionHash,
        catch_all: &SectionHash,
    ) -> Option<&SectionKeys> {
        let sections = self.0.get(partner)?;
        sections.get(section).or_else(|| sections.get(catch_all))
    }

    /// Resolve the record valid at `block`.
    ///
    /// `HashKey` matches exactly. A numeric block resolves to the entry with
    /// the greatest block not after it; later keys are never returned.
    pub fn resolve(
        &self,
        partner: &PartnerHash,
        section: &SectionHash,
        catch_all: &SectionHash,
        block: &BlockKey,
    ) -> Option<(BlockKey, &KeyRecord)> {
        let keys = self.section_or_catch_all(partner, section, catch_all)?;
        match block {
            BlockKey::HashKey => keys.get(block).map(|record| (*block, record)),
            BlockKey::Block(_) => keys
                .range(..=*block)
                .next_back()
                .map(|(found, record)| (*found, record)),
        }
    }

    /// Numeric-block entries of a partner and section, oldest first.
    pub fn history(
        &self,
        partner: &PartnerHash,
        section: &SectionHash,
        catch_all: &SectionHash,
    ) -> Vec<(u64, KeyRecord)> {
        self.section_or_catch_all(partner, section, catch_all)
            .map(|keys| {
                keys.iter()
                    .filter_map(|(block, record)| block.block().map(|b| (b, record.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Insert or replace a record.
    pub fn insert(
        &mut self,
        partner: PartnerHash,
        section: SectionHash,
        block: BlockKey,
        record: KeyRecord,
    ) {
        self.0
            .entry(partner)
            .or_default()
            .entry(section)
            .or_default()
            .insert(block, record);
    }

    /// Remove a whole partner. Returns whether anything was removed.
    pub fn remove_partner(&mut self, partner: &PartnerHash) -> bool {
        self.0.remove(partner).is_some()
    }

    /// Remove every block of a partner and section.
    pub fn remove_section(&mut self, partner: &PartnerHash, section: &SectionHash) -> bool {
        let Some(sections) = self.0.get_mut(partner) else {
            return false;
        };
        let removed = sections.remove(section).is_some();
        if sections.is_empty() {
            self.0.remove(partner);
        }
        removed
    }

    /// Remove one block entry.
    pub fn remove_block(
        &mut self,
        partner: &PartnerHash,
        section: &SectionHash,
        block: &BlockKey,
    ) -> bool {
        let Some(sections) = self.0.get_mut(partner) else {
            return false;
        };
        let Some(keys) = sections.get_mut(section) else {
            return false;
        };
        let removed = keys.remove(block).is_some();
        if keys.is_empty() {
            sections.remove(section);
        }
        if sections.is_empty() {
            self.0.remove(partner);
        }
        removed
    }

    /// Serialize to canonical JSON.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parse from JSON.
    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

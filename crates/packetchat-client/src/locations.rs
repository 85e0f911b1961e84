//! Last-known peer positions.
//!
//! Records are replaced wholesale by each update, never merged.  The cache
//! also remembers which peers have an outstanding location request so the
//! presentation can show a pending indicator until the answer arrives.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use packetchat_shared::protocol::LocationEvent;
use packetchat_shared::Callsign;
use packetchat_store::LocationRecord;

#[derive(Debug, Clone, Default)]
pub struct LocationCache {
    records: BTreeMap<Callsign, LocationRecord>,
    pending: HashSet<Callsign>,
}

impl LocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(records: BTreeMap<Callsign, LocationRecord>) -> Self {
        Self {
            records,
            pending: HashSet::new(),
        }
    }

    /// Store `record` as the peer's position, replacing any previous one and
    /// settling an outstanding request.
    pub fn set(&mut self, peer: Callsign, record: LocationRecord) {
        self.pending.remove(&peer);
        self.records.insert(peer, record);
    }

    pub fn get(&self, peer: &Callsign) -> Option<&LocationRecord> {
        self.records.get(peer)
    }

    pub fn remove(&mut self, peer: &Callsign) -> Option<LocationRecord> {
        self.pending.remove(peer);
        self.records.remove(peer)
    }

    /// Known positions, ordered by callsign.
    pub fn iter(&self) -> impl Iterator<Item = (&Callsign, &LocationRecord)> {
        self.records.iter()
    }

    pub fn mark_requested(&mut self, peer: Callsign) {
        self.pending.insert(peer);
    }

    pub fn is_pending(&self, peer: &Callsign) -> bool {
        self.pending.contains(peer)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_snapshot(&self) -> BTreeMap<Callsign, LocationRecord> {
        self.records.clone()
    }
}

/// Build the stored record for an update received at `received_at`.
pub fn record_from_event(event: &LocationEvent, received_at: DateTime<Utc>) -> LocationRecord {
    LocationRecord {
        lat: event.lat,
        lon: event.lon,
        altitude: event.altitude,
        speed: event.speed,
        course: event.course,
        distance: event.distance,
        lasttime: event.lasttime,
        last_updated: received_at,
    }
}

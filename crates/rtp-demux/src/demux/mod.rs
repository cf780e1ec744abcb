//! RTP packet demultiplexing
//!
//! [`RtpDemuxer`] routes each inbound packet to the sinks registered for it.
//! Sinks are registered either directly under an SSRC, or under an RSID when
//! the stream's SSRC is not yet known. The first packet observed with a given
//! RSID tag promotes that RSID's sink associations to direct SSRC
//! associations and notifies resolution observers; afterwards the RSID is
//! forgotten, so a later packet with the same tag but a different SSRC cannot
//! spawn new associations or hijack the stream.
//!
//! SSRCs that have been through resolution once are remembered in a bounded
//! cache so the common path is a single hash lookup per packet. When the
//! cache is full, packets with new SSRCs simply repeat the (cheap) resolution
//! check; routing stays correct, only the work repeats.
//!
//! The demultiplexer is synchronous and applies no internal locking; the
//! caller serializes access, typically by confining all calls to the receive
//! thread.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use crate::packet::ReceivedPacket;
use crate::stream_id::StreamId;
use crate::traits::{RsidResolutionObserver, RtpPacketSink};
use crate::RtpSsrc;

/// Default capacity of the processed-SSRC cache
///
/// Bounds memory under floods of distinct SSRCs.
pub const MAX_PROCESSED_SSRCS: usize = 1000;

/// Configuration for [`RtpDemuxer`]
#[derive(Debug, Clone)]
pub struct RtpDemuxerConfig {
    /// Capacity of the processed-SSRC cache
    ///
    /// Once the cache holds this many SSRCs, further distinct SSRCs re-run
    /// the resolution check on every packet instead of being cached. A
    /// capacity of zero disables the cache entirely.
    pub max_processed_ssrcs: usize,
}

impl Default for RtpDemuxerConfig {
    fn default() -> Self {
        Self {
            max_processed_ssrcs: MAX_PROCESSED_SSRCS,
        }
    }
}

/// Counters exposed by [`RtpDemuxer::stats`]
#[derive(Debug, Clone, Default)]
pub struct RtpDemuxerStats {
    /// Packets delivered to at least one sink
    pub packets_routed: u64,

    /// Packets that matched no sink
    pub packets_unrouted: u64,

    /// RSID resolution events (tagged packet on an unresolved SSRC)
    pub rsid_resolutions: u64,

    /// Current size of the processed-SSRC cache
    pub processed_ssrcs_cached: usize,

    /// Current number of SSRC-keyed sink associations
    pub ssrc_associations: usize,
}

/// Non-owning handle to a registered sink
type SinkHandle = Weak<dyn RtpPacketSink>;

/// Non-owning handle to a registered observer
type ObserverHandle = Weak<dyn RsidResolutionObserver>;

/// Routes inbound RTP packets to registered sinks by SSRC or RSID
///
/// Sinks and observers are registered through `Arc` handles but are not
/// owned: only `Weak` downgrades are stored, and the caller must remove every
/// registration before the collaborator is dropped and before the demuxer
/// itself is dropped. Violations trip debug-build assertions.
pub struct RtpDemuxer {
    /// SSRC-keyed sink associations, in association order per SSRC
    ssrc_sinks: HashMap<RtpSsrc, Vec<SinkHandle>>,

    /// RSID-keyed sink associations awaiting resolution
    rsid_sinks: HashMap<StreamId, Vec<SinkHandle>>,

    /// SSRCs that have already been through RSID resolution
    processed_ssrcs: HashSet<RtpSsrc>,

    /// Observers notified of each resolution, in registration order
    resolution_observers: Vec<ObserverHandle>,

    /// Capacity of `processed_ssrcs`
    max_processed_ssrcs: usize,

    /// Set once the cache-capacity warning has been emitted; never reset
    logged_max_processed_ssrcs_exceeded: bool,

    /// Packets delivered to at least one sink
    packets_routed: u64,

    /// Packets that matched no sink
    packets_unrouted: u64,

    /// RSID resolution events
    rsid_resolutions: u64,
}

impl RtpDemuxer {
    /// Create a demuxer with the default configuration
    pub fn new() -> Self {
        Self::with_config(RtpDemuxerConfig::default())
    }

    /// Create a demuxer with an explicit configuration
    pub fn with_config(config: RtpDemuxerConfig) -> Self {
        Self {
            ssrc_sinks: HashMap::new(),
            rsid_sinks: HashMap::new(),
            processed_ssrcs: HashSet::new(),
            resolution_observers: Vec::new(),
            max_processed_ssrcs: config.max_processed_ssrcs,
            logged_max_processed_ssrcs_exceeded: false,
            packets_routed: 0,
            packets_unrouted: 0,
            rsid_resolutions: 0,
        }
    }

    /// Register `sink` for packets carrying `ssrc`
    ///
    /// Idempotent: re-registering an existing (ssrc, sink) pair changes
    /// nothing. The SSRC may already have other sinks.
    pub fn add_ssrc_sink(&mut self, ssrc: RtpSsrc, sink: &Arc<dyn RtpPacketSink>) {
        self.record_ssrc_sink_association(ssrc, sink);
        debug!("Registered sink for SSRC {:08x}", ssrc);
    }

    /// Register `sink` for the stream currently known only as `rsid`
    ///
    /// The association is promoted to a direct SSRC association the first
    /// time a packet carrying this tag is seen. Registering the same
    /// (rsid, sink) pair twice is a caller error.
    pub fn add_rsid_sink(&mut self, rsid: StreamId, sink: &Arc<dyn RtpPacketSink>) {
        let entries = self.rsid_sinks.entry(rsid.clone()).or_default();
        debug_assert!(
            !entries.iter().any(|handle| same_sink(handle, sink)),
            "(rsid, sink) pair registered twice"
        );
        entries.push(Arc::downgrade(sink));

        // This RSID might map to an SSRC that was already seen and cached,
        // so previously processed SSRCs must be re-examined.
        self.processed_ssrcs.clear();

        debug!("Registered sink for RSID '{}'", rsid);
    }

    /// Remove every association involving `sink`, SSRC- and RSID-keyed
    ///
    /// Returns whether at least one association was removed. Safe to call
    /// for a sink with no registrations.
    pub fn remove_sink(&mut self, sink: &Arc<dyn RtpPacketSink>) -> bool {
        let removed = remove_from_multimap(&mut self.ssrc_sinks, sink)
            + remove_from_multimap(&mut self.rsid_sinks, sink);
        if removed > 0 {
            debug!("Removed sink ({} associations)", removed);
        }
        removed > 0
    }

    /// Route one inbound packet
    ///
    /// Runs RSID resolution for the packet's SSRC if it has not been
    /// resolved yet, then delivers the packet to every associated sink in
    /// association order. Returns whether at least one sink received it.
    pub fn on_packet(&mut self, packet: &ReceivedPacket) -> bool {
        self.resolve_associations(packet);

        let mut delivered = false;
        if let Some(handles) = self.ssrc_sinks.get(&packet.ssrc()) {
            for handle in handles {
                match handle.upgrade() {
                    Some(sink) => {
                        sink.deliver_packet(packet);
                        delivered = true;
                    }
                    None => debug_assert!(false, "sink dropped while registered"),
                }
            }
        }

        if delivered {
            self.packets_routed += 1;
        } else {
            self.packets_unrouted += 1;
        }
        delivered
    }

    /// Register an observer of RSID resolutions
    ///
    /// Observers are notified in registration order. Registering the same
    /// observer twice is a caller error. Resolutions that happened before
    /// registration are not replayed, but SSRCs not re-seen since are
    /// re-examined so the new observer still hears about them.
    pub fn register_resolution_observer(&mut self, observer: &Arc<dyn RsidResolutionObserver>) {
        debug_assert!(
            !self
                .resolution_observers
                .iter()
                .any(|handle| same_observer(handle, observer)),
            "observer registered twice"
        );
        self.resolution_observers.push(Arc::downgrade(observer));

        // A late-joining observer must still be told about resolutions of
        // SSRCs that have not been re-seen yet.
        self.processed_ssrcs.clear();
    }

    /// Deregister a previously registered observer
    ///
    /// Deregistering an observer that is not registered is a caller error.
    pub fn deregister_resolution_observer(&mut self, observer: &Arc<dyn RsidResolutionObserver>) {
        let position = self
            .resolution_observers
            .iter()
            .position(|handle| same_observer(handle, observer));
        debug_assert!(position.is_some(), "observer not registered");
        if let Some(position) = position {
            self.resolution_observers.remove(position);
        }
    }

    /// All SSRCs that currently have at least one sink association
    pub fn registered_ssrcs(&self) -> Vec<RtpSsrc> {
        self.ssrc_sinks.keys().copied().collect()
    }

    /// Snapshot of the demuxer's counters
    pub fn stats(&self) -> RtpDemuxerStats {
        RtpDemuxerStats {
            packets_routed: self.packets_routed,
            packets_unrouted: self.packets_unrouted,
            rsid_resolutions: self.rsid_resolutions,
            processed_ssrcs_cached: self.processed_ssrcs.len(),
            ssrc_associations: self.ssrc_sinks.values().map(Vec::len).sum(),
        }
    }

    /// De-duplicating insert into the SSRC multimap
    fn record_ssrc_sink_association(&mut self, ssrc: RtpSsrc, sink: &Arc<dyn RtpPacketSink>) {
        let entries = self.ssrc_sinks.entry(ssrc).or_default();
        // The association might already exist, e.g. set up both directly and
        // through RSID resolution.
        if !entries.iter().any(|handle| same_sink(handle, sink)) {
            entries.push(Arc::downgrade(sink));
        }
    }

    /// Run the resolution protocol for one packet's SSRC
    fn resolve_associations(&mut self, packet: &ReceivedPacket) {
        // Sinks are looked up by SSRC alone whenever possible; the RSID
        // string comparisons only happen for SSRCs not processed before.
        if self.processed_ssrcs.contains(&packet.ssrc()) {
            return;
        }

        self.resolve_rsid_to_ssrc_associations(packet);

        if self.processed_ssrcs.len() < self.max_processed_ssrcs {
            self.processed_ssrcs.insert(packet.ssrc());
        } else if !self.logged_max_processed_ssrcs_exceeded {
            warn!(
                "More than {} distinct SSRCs seen; processed-SSRC cache is full",
                self.max_processed_ssrcs
            );
            self.logged_max_processed_ssrcs_exceeded = true;
        }
    }

    /// Promote RSID-keyed associations for a tagged packet, one-shot
    fn resolve_rsid_to_ssrc_associations(&mut self, packet: &ReceivedPacket) {
        let rsid = match packet.stream_id() {
            Some(rsid) => rsid,
            None => return,
        };

        // Every sink waiting on this RSID becomes associated with the
        // packet's SSRC, if it is not already.
        let handles = self.rsid_sinks.get(rsid).cloned().unwrap_or_default();
        for handle in &handles {
            match handle.upgrade() {
                Some(sink) => self.record_ssrc_sink_association(packet.ssrc(), &sink),
                None => debug_assert!(false, "sink dropped while registered"),
            }
        }

        self.notify_observers_of_rsid_resolution(rsid, packet.ssrc());

        // Forget the RSID. A later packet with the same tag but a different
        // SSRC must not spawn new associations or re-bind the stream.
        self.rsid_sinks.remove(rsid);
        self.rsid_resolutions += 1;

        debug!("Resolved RSID '{}' to SSRC {:08x}", rsid, packet.ssrc());
    }

    /// Notify observers, in registration order
    fn notify_observers_of_rsid_resolution(&self, rsid: &StreamId, ssrc: RtpSsrc) {
        for handle in &self.resolution_observers {
            match handle.upgrade() {
                Some(observer) => observer.on_rsid_resolved(rsid, ssrc),
                None => debug_assert!(false, "observer dropped while registered"),
            }
        }
    }
}

impl Default for RtpDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RtpDemuxer {
    fn drop(&mut self) {
        // Every registration must have been removed by the caller.
        debug_assert!(self.ssrc_sinks.is_empty(), "SSRC sinks still registered");
        debug_assert!(self.rsid_sinks.is_empty(), "RSID sinks still registered");
    }
}

/// Allocation-identity comparison for sink handles
fn same_sink(handle: &SinkHandle, sink: &Arc<dyn RtpPacketSink>) -> bool {
    Weak::as_ptr(handle) as *const () == Arc::as_ptr(sink) as *const ()
}

/// Allocation-identity comparison for observer handles
fn same_observer(handle: &ObserverHandle, observer: &Arc<dyn RsidResolutionObserver>) -> bool {
    Weak::as_ptr(handle) as *const () == Arc::as_ptr(observer) as *const ()
}

/// Remove every entry whose handle points at `sink`; returns how many
fn remove_from_multimap<K>(
    map: &mut HashMap<K, Vec<SinkHandle>>,
    sink: &Arc<dyn RtpPacketSink>,
) -> usize
where
    K: Eq + std::hash::Hash,
{
    let mut removed = 0;
    map.retain(|_, handles| {
        let before = handles.len();
        handles.retain(|handle| !same_sink(handle, sink));
        removed += before - handles.len();
        !handles.is_empty()
    });
    removed
}

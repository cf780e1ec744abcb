//! Collaborator capabilities
//!
//! Sinks and observers are owned by the caller; the demultiplexer holds only
//! non-owning handles to them. Every registration must be removed before the
//! collaborator is dropped and before the demultiplexer itself is dropped.

use crate::packet::ReceivedPacket;
use crate::stream_id::StreamId;
use crate::RtpSsrc;

/// A consumer of demultiplexed RTP packets
pub trait RtpPacketSink: Send + Sync {
    /// Handle one packet routed to this sink
    ///
    /// Multiple sinks may receive the same packet; a sink must not assume
    /// exclusivity. The return value of packet handling is not inspected.
    fn deliver_packet(&self, packet: &ReceivedPacket);
}

/// An observer of RSID-to-SSRC resolutions
pub trait RsidResolutionObserver: Send + Sync {
    /// Called synchronously, exactly once per resolution event, before the
    /// RSID's associations are removed from the table
    fn on_rsid_resolved(&self, rsid: &StreamId, ssrc: RtpSsrc);
}

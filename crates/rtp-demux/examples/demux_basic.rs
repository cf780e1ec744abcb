//! Basic demultiplexer usage
//!
//! This example walks through the life of a simulcast receive path: an audio
//! stream registered directly by SSRC and two video layers registered by
//! RSID, resolved to their SSRCs by the first tagged packets that arrive.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use rtp_demux::{
    ReceivedPacket, RsidResolutionObserver, RtpDemuxer, RtpPacketSink, RtpSsrc, StreamId,
};

/// Sink that just logs what it receives
struct LoggingSink {
    name: &'static str,
}

impl RtpPacketSink for LoggingSink {
    fn deliver_packet(&self, packet: &ReceivedPacket) {
        info!(
            "[{}] packet from SSRC {:08x} ({} payload bytes)",
            self.name,
            packet.ssrc(),
            packet.payload().len()
        );
    }
}

/// Observer that logs resolutions
struct LoggingObserver;

impl RsidResolutionObserver for LoggingObserver {
    fn on_rsid_resolved(&self, rsid: &StreamId, ssrc: RtpSsrc) {
        info!("RSID '{}' resolved to SSRC {:08x}", rsid, ssrc);
    }
}

fn main() -> Result<(), rtp_demux::Error> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut demuxer = RtpDemuxer::new();

    let audio: Arc<dyn RtpPacketSink> = Arc::new(LoggingSink { name: "audio" });
    let video_low: Arc<dyn RtpPacketSink> = Arc::new(LoggingSink { name: "video/low" });
    let video_high: Arc<dyn RtpPacketSink> = Arc::new(LoggingSink { name: "video/high" });
    let observer: Arc<dyn RsidResolutionObserver> = Arc::new(LoggingObserver);

    demuxer.register_resolution_observer(&observer);

    // The audio SSRC is known from negotiation; the simulcast layers are
    // only known by their RSIDs until media arrives.
    demuxer.add_ssrc_sink(0x0000a001, &audio);
    demuxer.add_rsid_sink(StreamId::new("low")?, &video_low);
    demuxer.add_rsid_sink(StreamId::new("high")?, &video_high);

    // Audio routes directly.
    demuxer.on_packet(&ReceivedPacket::new(0x0000a001, Bytes::from_static(b"opus")));

    // The first tagged packet per layer resolves the RSID to its SSRC.
    demuxer.on_packet(&ReceivedPacket::with_stream_id(
        0x0000b001,
        StreamId::new("low")?,
        Bytes::from_static(b"vp8 low"),
    ));
    demuxer.on_packet(&ReceivedPacket::with_stream_id(
        0x0000b002,
        StreamId::new("high")?,
        Bytes::from_static(b"vp8 high"),
    ));

    // Later packets need no tag; routing is a plain SSRC lookup now.
    demuxer.on_packet(&ReceivedPacket::new(0x0000b001, Bytes::from_static(b"vp8 low")));
    demuxer.on_packet(&ReceivedPacket::new(0x0000b002, Bytes::from_static(b"vp8 high")));

    let stats = demuxer.stats();
    info!(
        "routed={} unrouted={} resolutions={} cached={}",
        stats.packets_routed,
        stats.packets_unrouted,
        stats.rsid_resolutions,
        stats.processed_ssrcs_cached
    );

    // Registrations must be removed before the demuxer is dropped.
    demuxer.remove_sink(&audio);
    demuxer.remove_sink(&video_low);
    demuxer.remove_sink(&video_high);
    demuxer.deregister_resolution_observer(&observer);

    Ok(())
}

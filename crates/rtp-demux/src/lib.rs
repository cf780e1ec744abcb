//! # rtp-demux
//!
//! Receive-path RTP packet demultiplexing. Each inbound packet is routed to
//! the set of registered sinks, keyed directly by SSRC or, while a stream's
//! SSRC is still unknown, by the RTP stream id (RSID) carried as packet
//! metadata (e.g. during simulcast negotiation). The first packet observed
//! with a given RSID promotes that RSID's sink registrations to direct SSRC
//! associations and notifies resolution observers; the RSID is then consumed
//! so it can never re-bind to a different SSRC.
//!
//! Already-resolved SSRCs are remembered in a bounded cache, so the common
//! per-packet path is a single hash lookup, and an attacker flooding the
//! receiver with distinct SSRCs or RSIDs can degrade only performance, never
//! correctness or memory bounds.
//!
//! Wire parsing of RTP headers and extensions, packet consumption, and
//! network I/O live upstream; this crate owns only the routing tables and
//! the resolution protocol.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use rtp_demux::{ReceivedPacket, RtpDemuxer, RtpPacketSink, StreamId};
//!
//! struct Decoder;
//!
//! impl RtpPacketSink for Decoder {
//!     fn deliver_packet(&self, _packet: &ReceivedPacket) {
//!         // feed the decoder
//!     }
//! }
//!
//! let mut demuxer = RtpDemuxer::new();
//! let sink: Arc<dyn RtpPacketSink> = Arc::new(Decoder);
//!
//! // Route by RSID until the stream's SSRC is learned from the wire.
//! demuxer.add_rsid_sink(StreamId::new("cam0")?, &sink);
//!
//! let packet = ReceivedPacket::with_stream_id(
//!     0x4711,
//!     StreamId::new("cam0")?,
//!     Bytes::from_static(b"\x00"),
//! );
//! assert!(demuxer.on_packet(&packet));
//!
//! // From here on the stream routes by SSRC alone.
//! assert!(demuxer.on_packet(&ReceivedPacket::new(0x4711, Bytes::from_static(b"\x01"))));
//!
//! demuxer.remove_sink(&sink);
//! # Ok::<(), rtp_demux::Error>(())
//! ```

pub mod demux;
pub mod error;
pub mod packet;
pub mod stream_id;
pub mod traits;

// Re-export commonly used types and traits
pub use demux::{RtpDemuxer, RtpDemuxerConfig, RtpDemuxerStats, MAX_PROCESSED_SSRCS};
pub use error::{Error, Result};
pub use packet::ReceivedPacket;
pub use stream_id::{StreamId, MAX_STREAM_ID_LEN};
pub use traits::{RsidResolutionObserver, RtpPacketSink};

/// RTP synchronization source identifier
pub type RtpSsrc = u32;

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

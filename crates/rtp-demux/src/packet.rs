//! Inbound packet view
//!
//! The demultiplexer sits downstream of wire parsing: by the time a packet
//! reaches it, the RTP header and extensions have already been decoded.
//! [`ReceivedPacket`] is that boundary: the SSRC, the RSID header-extension
//! value when one was present and well formed, and the payload.

use bytes::Bytes;

use crate::stream_id::StreamId;
use crate::RtpSsrc;

/// An inbound RTP packet as seen by the demultiplexer
#[derive(Debug, Clone)]
pub struct ReceivedPacket {
    /// Synchronization source from the RTP header
    ssrc: RtpSsrc,

    /// RSID header-extension value, when present and well formed
    stream_id: Option<StreamId>,

    /// Packet payload
    payload: Bytes,
}

impl ReceivedPacket {
    /// Create a packet carrying no stream-id tag
    pub fn new(ssrc: RtpSsrc, payload: Bytes) -> Self {
        Self {
            ssrc,
            stream_id: None,
            payload,
        }
    }

    /// Create a packet carrying a stream-id tag
    pub fn with_stream_id(ssrc: RtpSsrc, stream_id: StreamId, payload: Bytes) -> Self {
        Self {
            ssrc,
            stream_id: Some(stream_id),
            payload,
        }
    }

    /// The packet's synchronization source
    pub fn ssrc(&self) -> RtpSsrc {
        self.ssrc
    }

    /// The packet's stream-id tag, if it carried one
    pub fn stream_id(&self) -> Option<&StreamId> {
        self.stream_id.as_ref()
    }

    /// The packet payload
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_without_tag() {
        let packet = ReceivedPacket::new(0x12345678, Bytes::from_static(b"audio"));
        assert_eq!(packet.ssrc(), 0x12345678);
        assert!(packet.stream_id().is_none());
        assert_eq!(packet.payload().as_ref(), b"audio");
    }

    #[test]
    fn test_packet_with_tag() {
        let rsid = StreamId::new("hi0").unwrap();
        let packet = ReceivedPacket::with_stream_id(42, rsid.clone(), Bytes::from_static(b"video"));
        assert_eq!(packet.ssrc(), 42);
        assert_eq!(packet.stream_id(), Some(&rsid));
    }
}

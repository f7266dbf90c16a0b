use bytes::{Buf, Bytes, BytesMut};
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use super::layout;
use super::reader::{FrameReader, validate_length};

/// Running counters for a decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramingStats {
    /// Complete frames yielded.
    pub frames: u64,
    /// Length prefixes discarded as corrupt.
    pub resyncs: u64,
}

/// Accumulates stream bytes and extracts length-prefixed frames.
///
/// Bytes leave the buffer strictly in arrival order, either as part of a
/// yielded frame or as a discarded invalid prefix. Trailing partial data is
/// kept for the next `ingest` call.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
    stats: FramingStats,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_capacity(layout::DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            stats: FramingStats::default(),
        }
    }

    /// Append `data` and return the frames that are now complete.
    ///
    /// The returned iterator is lazy: frames it does not get to yield stay
    /// buffered and are returned by the next call.
    ///
    /// # Examples
    /// ```
    /// use ballsync_core::protocols::framing::{FrameDecoder, encode_frame};
    ///
    /// let mut decoder = FrameDecoder::new();
    /// let wire = encode_frame(b"id:0").unwrap();
    /// assert_eq!(decoder.ingest(&wire[..3]).count(), 0);
    /// let frames: Vec<_> = decoder.ingest(&wire[3..]).collect();
    /// assert_eq!(frames, vec![&b"id:0"[..]]);
    /// ```
    pub fn ingest(&mut self, data: &[u8]) -> Frames<'_> {
        self.buffer.extend_from_slice(data);
        Frames { decoder: self }
    }

    /// Extract the next complete frame already held in the buffer.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        loop {
            let reader = FrameReader::new(&self.buffer);
            let declared = reader.read_length_prefix().ok()?;
            let length = match validate_length(declared) {
                Ok(length) => length,
                Err(err) => {
                    warn!("framing: {err}; dropping length prefix to resynchronize");
                    self.buffer.advance(layout::LENGTH_PREFIX_LEN);
                    self.stats.resyncs += 1;
                    continue;
                }
            };
            if reader.require_len(layout::LENGTH_PREFIX_LEN + length).is_err() {
                trace!(
                    "framing: waiting for {} payload bytes, {} buffered",
                    length,
                    self.buffer.len() - layout::LENGTH_PREFIX_LEN
                );
                return None;
            }

            self.buffer.advance(layout::LENGTH_PREFIX_LEN);
            let payload = self.buffer.split_to(length).freeze();
            self.stats.frames += 1;
            return Some(payload);
        }
    }

    /// Number of bytes waiting for a complete frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop any partial data, e.g. when the stream is replaced.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn stats(&self) -> FramingStats {
        self.stats
    }
}

/// Lazy sequence of frames returned by [`FrameDecoder::ingest`].
pub struct Frames<'a> {
    decoder: &'a mut FrameDecoder,
}

impl Iterator for Frames<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::FrameDecoder;
    use crate::protocols::framing::layout;
    use crate::protocols::framing::writer::encode_frame;
    use bytes::Bytes;

    fn drain(decoder: &mut FrameDecoder, data: &[u8]) -> Vec<Bytes> {
        decoder.ingest(data).collect()
    }

    #[test]
    fn single_chunk_yields_payload() {
        let mut decoder = FrameDecoder::new();
        let frames = drain(&mut decoder, &encode_frame(b"hello").unwrap());
        assert_eq!(frames, vec![Bytes::from_static(b"hello")]);
        assert!(decoder.is_empty());
        assert_eq!(decoder.stats().frames, 1);
    }

    #[test]
    fn every_split_point_yields_one_frame() {
        let wire = encode_frame(b"id:0,x:1,y:2,color:red").unwrap();
        for split in 0..=wire.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames = drain(&mut decoder, &wire[..split]);
            frames.extend(drain(&mut decoder, &wire[split..]));
            assert_eq!(frames.len(), 1, "split at {split}");
            assert_eq!(&frames[0][..], b"id:0,x:1,y:2,color:red");
        }
    }

    #[test]
    fn byte_at_a_time_yields_only_on_last_byte() {
        let wire = encode_frame(b"AAAAA").unwrap();
        let mut decoder = FrameDecoder::new();
        for (index, byte) in wire.iter().enumerate() {
            let frames = drain(&mut decoder, &[*byte]);
            if index + 1 < wire.len() {
                assert!(frames.is_empty(), "early frame at byte {index}");
            } else {
                assert_eq!(frames, vec![Bytes::from_static(b"AAAAA")]);
            }
        }
    }

    #[test]
    fn zero_length_prefix_is_discarded() {
        let mut wire = 0u32.to_be_bytes().to_vec();
        wire.extend_from_slice(&5u32.to_be_bytes());
        wire.extend_from_slice(b"AAAAA");

        let mut decoder = FrameDecoder::new();
        let frames = drain(&mut decoder, &wire);
        assert_eq!(frames, vec![Bytes::from_static(b"AAAAA")]);
        assert_eq!(decoder.stats().resyncs, 1);
    }

    #[test]
    fn oversized_prefix_does_not_block_following_frames() {
        let mut wire = ((layout::MAX_FRAME_LEN + 1) as u32).to_be_bytes().to_vec();
        wire.extend(encode_frame(b"first").unwrap());
        wire.extend(encode_frame(b"second").unwrap());

        let mut decoder = FrameDecoder::new();
        let frames = drain(&mut decoder, &wire);
        assert_eq!(
            frames,
            vec![Bytes::from_static(b"first"), Bytes::from_static(b"second")]
        );
        assert_eq!(decoder.stats().resyncs, 1);
        assert_eq!(decoder.stats().frames, 2);
    }

    #[test]
    fn max_length_frame_is_accepted() {
        let payload = vec![b'z'; layout::MAX_FRAME_LEN];
        let mut decoder = FrameDecoder::new();
        let frames = drain(&mut decoder, &encode_frame(&payload).unwrap());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), layout::MAX_FRAME_LEN);
    }

    #[test]
    fn partial_tail_is_retained() {
        let mut wire = encode_frame(b"one").unwrap();
        let second = encode_frame(b"two").unwrap();
        wire.extend_from_slice(&second[..5]);

        let mut decoder = FrameDecoder::new();
        let frames = drain(&mut decoder, &wire);
        assert_eq!(frames, vec![Bytes::from_static(b"one")]);
        assert_eq!(decoder.buffered(), 5);

        let frames = drain(&mut decoder, &second[5..]);
        assert_eq!(frames, vec![Bytes::from_static(b"two")]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn unconsumed_frames_survive_until_next_ingest() {
        let mut wire = encode_frame(b"a").unwrap();
        wire.extend(encode_frame(b"b").unwrap());

        let mut decoder = FrameDecoder::new();
        let first = decoder.ingest(&wire).next();
        assert_eq!(first, Some(Bytes::from_static(b"a")));

        let rest = drain(&mut decoder, &[]);
        assert_eq!(rest, vec![Bytes::from_static(b"b")]);
    }

    #[test]
    fn short_prefix_waits_without_consuming() {
        let mut decoder = FrameDecoder::new();
        assert!(drain(&mut decoder, &[0, 0, 0]).is_empty());
        assert_eq!(decoder.buffered(), 3);
        assert_eq!(decoder.stats().resyncs, 0);
    }

    #[test]
    fn clear_drops_partial_data() {
        let mut decoder = FrameDecoder::new();
        let wire = encode_frame(b"pending").unwrap();
        assert!(drain(&mut decoder, &wire[..6]).is_empty());
        decoder.clear();
        assert!(decoder.is_empty());
    }
}

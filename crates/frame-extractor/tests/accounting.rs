//! Every byte handed to the extractor is either still buffered, discarded as
//! noise, or part of exactly one produced record.

use frame_extractor::{Extraction, ExtractorConfig, FrameExtractor, Record};
use proptest::prelude::*;
use ring_buffer::RingBuffer;

fn stream_byte() -> impl Strategy<Value = u8> {
    prop_oneof![
        4 => b'a'..=b'z',
        1 => Just(b'{'),
        1 => Just(b'}'),
        1 => Just(b'"'),
    ]
}

proptest! {
    #[test]
    fn bytes_are_accounted_for(
        chunks in prop::collection::vec(prop::collection::vec(stream_byte(), 0..40), 1..12),
        min_fill in 1usize..100,
    ) {
        let mut bytes = RingBuffer::<u8>::new(512);
        let mut records = RingBuffer::<Record>::new(64);
        let mut extractor = FrameExtractor::new(ExtractorConfig { min_fill, window: 100 }).unwrap();

        let mut fed = 0usize;
        let mut discarded = 0usize;
        let mut produced = 0usize;

        for chunk in chunks {
            fed += bytes.enqueue(&chunk);
            loop {
                match extractor.extract(&mut bytes, &mut records) {
                    Extraction::Produced { len } => {
                        prop_assert!(len > 0);
                        produced += len;
                    }
                    Extraction::Resynced { discarded: n } => {
                        prop_assert!(n > 0);
                        discarded += n;
                    }
                    Extraction::Starved | Extraction::Incomplete => break,
                }
            }
        }

        prop_assert_eq!(bytes.total_evicted(), 0);
        prop_assert_eq!(fed, discarded + produced + bytes.len());

        while let Some(record) = records.pop() {
            let frame = record.frame();
            prop_assert_eq!(frame.first(), Some(&b'{'));
            prop_assert_eq!(frame.last(), Some(&b'}'));
        }
    }
}

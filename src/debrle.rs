use crate::codeword::Codeword;
use crate::word::{Word, WordSink};
use crate::{LITERAL_BITS, MAX_RUN_LEN};
use std::io;
use std::marker::PhantomData;

/// Streaming BRLE decoder.
///
/// Codeword bytes pushed through [`update`] are expanded into words,
/// which are pushed into the sink as soon as the accumulator fills to a
/// whole word. The stream carries no length, so bits left over after
/// the last whole word are never flushed; a truncated stream simply
/// stops short. Callers that need an exact output length must track it
/// externally, see [`pending_bits`].
///
/// [`update`]: DeBrle::update
/// [`pending_bits`]: DeBrle::pending_bits
pub struct DeBrle<T, S> {
    status: DeBrleStatus,
    acc: u128,
    filled: u32,
    sink: S,
    _word: PhantomData<T>,
}

#[derive(Debug, Copy, Clone)]
enum DeBrleStatus {
    Read,
    Run {
        is_one: bool,
        remaining: u8,
        // a run below the maximum length also stands for one bit of
        // the opposite polarity
        terminate: bool,
    },
}

impl<T: Word, S: WordSink<T>> DeBrle<T, S> {
    pub fn new(sink: S) -> Self {
        DeBrle {
            status: DeBrleStatus::Read,
            acc: 0,
            filled: 0,
            sink,
            _word: PhantomData,
        }
    }

    /// Feeds one codeword byte into the decoder.
    #[inline(always)]
    pub fn update(&mut self, byte: u8) -> io::Result<()> {
        debug_assert!(matches!(self.status, DeBrleStatus::Read));
        let codeword = Codeword::decode(byte);
        trace!("update {:?}, filled {}", codeword, self.filled);
        match codeword {
            Codeword::Literal(bits) => {
                return self.write_bits(u128::from(bits), LITERAL_BITS);
            }
            Codeword::ZeroRun(count) => {
                self.status = DeBrleStatus::Run {
                    is_one: false,
                    remaining: count,
                    terminate: count < MAX_RUN_LEN,
                };
            }
            Codeword::OneRun(count) => {
                self.status = DeBrleStatus::Run {
                    is_one: true,
                    remaining: count,
                    terminate: count < MAX_RUN_LEN,
                };
            }
        }
        // a run may straddle several words; each step writes up to the
        // next word boundary and resumes with the remaining bit budget
        while let DeBrleStatus::Run {
            is_one,
            remaining,
            terminate,
        } = self.status
        {
            if remaining == 0 {
                if terminate {
                    let bit = if is_one { 0 } else { 1 };
                    self.write_bits(bit, 1)?;
                }
                self.status = DeBrleStatus::Read;
            } else {
                let take = u32::from(remaining).min(T::BITS - self.filled);
                let bits = if is_one { (1u128 << take) - 1 } else { 0 };
                self.write_bits(bits, take)?;
                self.status = DeBrleStatus::Run {
                    is_one,
                    remaining: remaining - take as u8,
                    terminate,
                };
            }
        }
        Ok(())
    }

    /// Closes the decoder.
    ///
    /// Emits nothing: a partial word left by a stream that is not a
    /// whole multiple of the word width stays unwritten.
    pub fn finalize(self) -> io::Result<()> {
        trace!("finalize, {} pending bits", self.filled);
        debug_assert!(matches!(self.status, DeBrleStatus::Read));
        Ok(())
    }

    /// Number of decoded bits accumulated but not yet forming a word.
    pub fn pending_bits(&self) -> u32 {
        self.filled
    }

    #[inline(always)]
    fn write_bits(&mut self, bits: u128, len: u32) -> io::Result<()> {
        self.acc |= bits << self.filled;
        self.filled += len;
        if self.filled >= T::BITS {
            let word = T::from_bits(self.acc);
            // rebase the accumulator, keeping bits past the boundary
            self.acc >>= T::BITS;
            self.filled -= T::BITS;
            trace!("emit word {:#x}, carry {} bits", word.to_bits(), self.filled);
            self.sink.write_word(word)?;
        }
        debug_assert!(self.filled < T::BITS);
        Ok(())
    }
}

impl<T: Word, S: WordSink<T>> io::Write for DeBrle<T, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for byte in buf.iter() {
            self.update(*byte)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DeBrle;
    use crate::word::Word;
    use crate::TEST_VECTOR;
    use std::fmt::Debug;
    use std::io::Write;
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Setup function that is only run once, even if called multiple times.
    fn setup() {
        INIT.call_once(|| {
            let _ = pretty_env_logger::try_init();
        });
    }

    fn roundtrip<T: Word + PartialEq + Debug>(words: &[T]) {
        let mut encoded = vec![];
        crate::encode(words.iter().copied(), &mut encoded).unwrap();
        let mut decoded: Vec<T> = vec![];
        crate::decode(encoded.iter().copied(), &mut decoded).unwrap();
        assert_eq!(words, decoded.as_slice());
    }

    #[test]
    fn decode_test_vector() {
        setup();
        for (expected, encoded) in TEST_VECTOR.into_iter() {
            let expected = hex::decode(expected).unwrap();
            let encoded = hex::decode(encoded).unwrap();
            let mut out: Vec<u8> = vec![];
            let mut debrle: DeBrle<u8, _> = DeBrle::new(&mut out);
            debrle.write_all(&encoded).unwrap();
            debrle.finalize().unwrap();
            assert_eq!(expected, out, "encoded {encoded:02x?}");
        }
    }

    #[test]
    fn scenario_three_codewords_make_eight_bytes() {
        setup();
        let mut out: Vec<u8> = vec![];
        crate::decode([0xCC, 0x9C, 0x2A], &mut out).unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(out, hex::decode("FFFF0F00000000AA").unwrap());
    }

    #[test]
    fn scenario_three_codewords_make_four_u16_words() {
        setup();
        let mut out: Vec<u16> = vec![];
        crate::decode([0xCC, 0x9C, 0x2A], &mut out).unwrap();
        assert_eq!(out, [0xFFFF, 0x000F, 0x0000, 0xAA00]);
    }

    #[test]
    fn scenario_all_zero_block() {
        setup();
        let plain = vec![0u8; 16];
        let mut encoded = vec![];
        crate::encode(plain.iter().copied(), &mut encoded).unwrap();
        assert!(encoded.len() < 16);
        let mut decoded: Vec<u8> = vec![];
        crate::decode(encoded.iter().copied(), &mut decoded).unwrap();
        assert_eq!(decoded, plain);
    }

    #[test]
    fn truncated_stream_decodes_best_effort() {
        setup();
        // a lone one-run of 20 covers two whole bytes; the remaining
        // five bits stay pending
        let mut out: Vec<u8> = vec![];
        let mut debrle: DeBrle<u8, _> = DeBrle::new(&mut out);
        debrle.update(0xCC).unwrap();
        assert_eq!(*debrle.sink, [0xFF, 0xFF]);
        assert_eq!(debrle.pending_bits(), 5);
        debrle.finalize().unwrap();
        assert_eq!(out, [0xFF, 0xFF]);
    }

    #[test]
    fn finalize_without_input_emits_nothing() {
        setup();
        let mut out: Vec<u8> = vec![];
        let debrle: DeBrle<u8, _> = DeBrle::new(&mut out);
        debrle.finalize().unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn roundtrip_u8() {
        setup();
        roundtrip::<u8>(&[0x00; 16]);
        roundtrip::<u8>(&[0xFF; 16]);
        roundtrip::<u8>(&[0xAA; 16]);
        roundtrip::<u8>(&[0x00, 0xFF]);
        roundtrip::<u8>(&[0x00, 0xAA]);
        roundtrip::<u8>(&[0xFF, 0x00]);
        roundtrip::<u8>(&[0xFF, 0x55]);
        roundtrip::<u8>(&[0x55, 0x00]);
        roundtrip::<u8>(&[0xAA, 0xFF]);
        roundtrip::<u8>(&[
            0xAA, 0xAA, 0xAA, 0xAA, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0xFF,
            0xAA, 0x00,
        ]);
        roundtrip::<u8>(&[0x00, 0x00, 0x80, 0x40]);
    }

    #[test]
    fn roundtrip_u16() {
        setup();
        roundtrip::<u16>(&[0x0000; 8]);
        roundtrip::<u16>(&[0xFFFF; 8]);
        roundtrip::<u16>(&[0xAAAA; 8]);
        roundtrip::<u16>(&[0x00FF]);
        roundtrip::<u16>(&[0xFF00]);
        roundtrip::<u16>(&[0xFF55]);
        roundtrip::<u16>(&[0xAAAA, 0xAAAA, 0x0000, 0x0000, 0xFFFF, 0xFFFF, 0x00FF, 0xAA00]);
    }

    #[test]
    fn roundtrip_u32() {
        setup();
        roundtrip::<u32>(&[0x00000000; 4]);
        roundtrip::<u32>(&[0xFFFFFFFF; 4]);
        roundtrip::<u32>(&[0xAAAAAAAA; 4]);
        roundtrip::<u32>(&[0x00FF00FF]);
        roundtrip::<u32>(&[0xFF00FF00]);
        roundtrip::<u32>(&[0xAAAAAAAA, 0x00000000, 0xFFFFFFFF, 0x00FFAA00]);
        roundtrip::<u32>(&[0xFF000000, 0xFFFFFFFF, 0xFFFFFFFF, 0x00000000]);
        roundtrip::<u32>(&[0x00FFFFFF, 0x00000000, 0x00000000, 0xFFFFFFFF]);
    }

    #[test]
    fn roundtrip_u64() {
        setup();
        roundtrip::<u64>(&[0x0000000000000000; 3]);
        roundtrip::<u64>(&[0xFFFFFFFFFFFFFFFF; 3]);
        roundtrip::<u64>(&[0xAAAAAAAAAAAAAAAA; 3]);
        roundtrip::<u64>(&[0x00FF00FF00FF00FF]);
        roundtrip::<u64>(&[0xFF00FF00FF00FF00]);
        roundtrip::<u64>(&[0xAAAAAAAA00000000, 0xFFFFFFFF00FFAA00, 0xDEADBEEFFFFFFF00]);
        // hits the max-run-from-Init path: 7 residual zeros plus an
        // all-zero word
        roundtrip::<u64>(&[
            0x5555555555555555,
            0x5555555555555555,
            0x5555555555555555,
            0x5555555555555555,
            0x5555555555555555,
            0x5555555555555555,
            0x0055555555555555,
            0x0000000000000000,
        ]);
    }

    #[test]
    fn roundtrip_bitmap_header() {
        setup();
        let header: [u8; 80] = [
            0x42, 0x4d, 0xb6, 0xbb, 0x2d, 0x00, 0x00, 0x00, 0x00, 0x00, 0x36, 0x00, 0x00, 0x00,
            0x28, 0x00, 0x00, 0x00, 0xa5, 0x04, 0x00, 0x00, 0x48, 0x03, 0x00, 0x00, 0x01, 0x00,
            0x18, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0xbb, 0x2d, 0x00, 0x13, 0x0b, 0x00, 0x00,
            0x13, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff,
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        ];
        roundtrip::<u8>(&header);
    }
}

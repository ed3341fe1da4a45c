use crate::{MAX_RUN_LEN, MIN_RUN_LEN};

const MODE_ZEROS: u8 = 0x80;
const MODE_ONES: u8 = 0xC0;
const MODE_MASK: u8 = 0xC0;
const LITERAL_MASK: u8 = 0x7F;
const COUNT_MASK: u8 = 0x3F;

/// One byte of the compressed stream.
///
/// Either 7 raw bits of the bitstream, or a run of 8 to 71 identical
/// bits. Run lengths are stored biased by 8, so a codeword can never
/// express an out-of-range count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codeword {
    /// 7 bits of the stream, LSB first, in the low bits of the payload.
    Literal(u8),
    /// A run of zero bits, length in `8..=71`.
    ZeroRun(u8),
    /// A run of one bits, length in `8..=71`.
    OneRun(u8),
}

impl Codeword {
    /// Builds a literal from the low 7 bits of `bits`.
    #[inline(always)]
    pub fn literal(bits: u8) -> Self {
        Codeword::Literal(bits & LITERAL_MASK)
    }

    /// Builds a zero-run codeword. `count` must be in `8..=71`.
    #[inline(always)]
    pub fn zero_run(count: u8) -> Self {
        debug_assert!((MIN_RUN_LEN..=MAX_RUN_LEN).contains(&count));
        Codeword::ZeroRun(count)
    }

    /// Builds a one-run codeword. `count` must be in `8..=71`.
    #[inline(always)]
    pub fn one_run(count: u8) -> Self {
        debug_assert!((MIN_RUN_LEN..=MAX_RUN_LEN).contains(&count));
        Codeword::OneRun(count)
    }

    /// Packs the codeword into its wire byte.
    #[inline(always)]
    pub fn encode(self) -> u8 {
        match self {
            Codeword::Literal(bits) => bits & LITERAL_MASK,
            Codeword::ZeroRun(count) => MODE_ZEROS | (count - MIN_RUN_LEN),
            Codeword::OneRun(count) => MODE_ONES | (count - MIN_RUN_LEN),
        }
    }

    /// Unpacks a wire byte.
    ///
    /// Bit 7 alone selects a literal; the two run modes differ in
    /// bit 6. Every byte decodes to something, so decoding cannot fail.
    #[inline(always)]
    pub fn decode(byte: u8) -> Self {
        if byte & MODE_ZEROS == 0 {
            Codeword::Literal(byte & LITERAL_MASK)
        } else if byte & MODE_MASK == MODE_ZEROS {
            Codeword::ZeroRun((byte & COUNT_MASK) + MIN_RUN_LEN)
        } else {
            Codeword::OneRun((byte & COUNT_MASK) + MIN_RUN_LEN)
        }
    }
}

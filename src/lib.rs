//! # BRLE Encoding Scheme
//!
//! A run-length codec for binary data. The bits of the input words are
//! concatenated LSB first into one logical bitstream, and the stream is
//! cut into one-byte codewords with no framing overhead.
//!
//! ```text
//!          bit7    bit0
//!           │       │
//!           ▼       ▼
//!           0XXX XXXX
//!           ▲
//!   LITERAL─┘
//! ```
//!
//! A literal carries the next 7 bits of the stream verbatim. Any byte
//! with bit 7 clear is a literal, whatever bit 6 holds.
//!
//! ```text
//!          bit7    bit0
//!           │       │
//!           ▼       ▼
//!           10NN NNNN     run of zeros
//!           11NN NNNN     run of ones
//! ```
//!
//! Treat the low 6 bits as an unsigned integer N; the run length is
//! N + 8. Runs of 7 bits or less cost as much as a literal, so only
//! runs longer than 7 bits are worth a run codeword.
//!
//! A run codeword with length below 71 also stands for one bit of the
//! opposite polarity right after the run, the bit that ended it. The
//! maximum length 71 is a continuation: no terminator is implied, the
//! next codeword carries on from the following bit.
//!
//! The encoding does not include a size. The decoder never emits a
//! partial trailing word; callers that need an exact output length
//! must track or bound it externally.

#[macro_use]
extern crate log;

use std::io;

mod brle;
mod codeword;
mod debrle;
mod word;

pub use brle::Brle;
pub use codeword::Codeword;
pub use debrle::DeBrle;
pub use word::{Word, WordSink};

/// payload width of a literal codeword
const LITERAL_BITS: u32 = 7;
/// shortest run that gets its own codeword
const MIN_RUN_LEN: u8 = 8;
/// longest run a single codeword can carry
const MAX_RUN_LEN: u8 = 71;

/// Encodes a finite sequence of words and finalizes the stream.
///
/// Drives the streaming [`Brle`] end to end with a single terminal
/// flush. The resulting codewords are pushed into `writer`.
pub fn encode<T, I, W>(words: I, writer: W) -> io::Result<()>
where
    T: Word,
    I: IntoIterator<Item = T>,
    W: io::Write,
{
    let mut brle = Brle::new(writer);
    for word in words {
        brle.update(word)?;
    }
    brle.finalize()
}

/// Decodes a finite sequence of codeword bytes into words.
///
/// Drives the streaming [`DeBrle`] end to end. Decoded words are pushed
/// into `sink` as they complete; bits left over after the last whole
/// word are dropped.
pub fn decode<T, I, S>(codewords: I, sink: S) -> io::Result<()>
where
    T: Word,
    I: IntoIterator<Item = u8>,
    S: WordSink<T>,
{
    let mut debrle = DeBrle::new(sink);
    for byte in codewords {
        debrle.update(byte)?;
    }
    debrle.finalize()
}

/// Pairs of (plain hex, encoded hex) over 8-bit words, shared by the
/// encoder and decoder test modules.
#[cfg(test)]
pub(crate) const TEST_VECTOR: [(&str, &str); 16] = [
    ("FFFF0F00000000AA", "cc9c2a"),
    ("00000000000000000000000000000000", "bfb1"),
    ("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF", "fff1"),
    ("00FF", "807f"),
    ("FF00", "c000"),
    ("00AA", "812a"),
    ("FF55", "c115"),
    ("0F0F", "0f1e00"),
    ("00000000", "98"),
    ("000000000000000000", "bf00"),
    ("FFFFFF", "d0"),
    ("AA0000000000FF", "2a019a7f"),
    ("7F00", "7f81"),
    ("FF01", "c100"),
    ("FFFFFFFFFFFFFFFFFFFF", "ffc1"),
    (
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        "2a552a552a552a552a552a552a552a552a5502",
    ),
];

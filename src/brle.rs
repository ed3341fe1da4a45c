use crate::codeword::Codeword;
use crate::word::Word;
use crate::{LITERAL_BITS, MAX_RUN_LEN};
use std::io;
use std::marker::PhantomData;

/// Lengths of the trailing zero and one runs of a bit window, each
/// clamped to the number of valid bits.
#[inline(always)]
fn trailing_runs(window: u128, bit_len: u32) -> (u32, u32) {
    let zeros = window.trailing_zeros().min(bit_len);
    let ones = window.trailing_ones().min(bit_len);
    (zeros, ones)
}

/// Streaming BRLE encoder.
///
/// Words pushed through [`update`] are folded into an internal bit
/// window; codeword bytes come out through the writer as soon as they
/// are decided. The stream must be closed with exactly one call to
/// [`finalize`], or buffered bits and an open run are lost.
///
/// [`update`]: Brle::update
/// [`finalize`]: Brle::finalize
pub struct Brle<T, W> {
    status: BrleStatus,
    window: u128,
    bit_len: u32,
    writer: W,
    _word: PhantomData<T>,
}

#[derive(Debug, Copy, Clone)]
enum BrleStatus {
    Init,
    Run { is_one: bool, rlen: u8 },
}

impl<T: Word, W: io::Write> Brle<T, W> {
    pub fn new(writer: W) -> Self {
        Brle {
            status: BrleStatus::Init,
            window: 0,
            bit_len: 0,
            writer,
            _word: PhantomData,
        }
    }

    /// Feeds one word into the encoder.
    #[inline(always)]
    pub fn update(&mut self, word: T) -> io::Result<()> {
        trace!("update word {:#x}", word.to_bits());
        // at rest the window holds at most 7 bits, so 7 + 64 still fits
        debug_assert!(self.bit_len <= LITERAL_BITS);
        self.window |= word.to_bits() << self.bit_len;
        self.bit_len += T::BITS;
        self.drain(false)
    }

    /// Closes the stream, emitting any open run or residual literal.
    ///
    /// A residual of up to 7 bits comes out as one literal with
    /// the unused high bits zero padded. Emits nothing when the encoder
    /// is already fully drained.
    pub fn finalize(mut self) -> io::Result<()> {
        trace!("finalize, status {:?}, bit_len {}", self.status, self.bit_len);
        self.drain(true)?;
        debug_assert_eq!(self.bit_len, 0);
        debug_assert!(matches!(self.status, BrleStatus::Init));
        self.writer.flush()
    }

    fn drain(&mut self, last: bool) -> io::Result<()> {
        loop {
            let (zeros, ones) = trailing_runs(self.window, self.bit_len);
            trace!(
                "status {:?}, bit_len {}, zeros {}, ones {}",
                self.status,
                self.bit_len,
                zeros,
                ones
            );
            let consumed = match self.status {
                BrleStatus::Init => {
                    if zeros > LITERAL_BITS {
                        self.start_run(false, zeros)?;
                        zeros
                    } else if ones > LITERAL_BITS {
                        self.start_run(true, ones)?;
                        ones
                    } else if self.bit_len > LITERAL_BITS || (last && self.bit_len > 0) {
                        // bits above bit_len are zero, so a short tail
                        // comes out zero padded
                        self.emit(Codeword::literal(self.window as u8))?;
                        self.bit_len.min(LITERAL_BITS)
                    } else {
                        break;
                    }
                }
                BrleStatus::Run { is_one, rlen } => {
                    let repeats = if is_one { ones } else { zeros };
                    if repeats > 0 {
                        let take = repeats.min(u32::from(MAX_RUN_LEN - rlen));
                        let rlen = rlen + take as u8;
                        if rlen == MAX_RUN_LEN {
                            // continuation codeword, no implied terminator
                            self.emit_run(is_one, MAX_RUN_LEN)?;
                            self.status = BrleStatus::Init;
                        } else {
                            self.status = BrleStatus::Run { is_one, rlen };
                        }
                        take
                    } else if self.bit_len > 0 {
                        // the opposite bit that closed the run rides
                        // along in the codeword as the implied terminator
                        self.emit_run(is_one, rlen)?;
                        self.status = BrleStatus::Init;
                        1
                    } else if last {
                        self.emit_run(is_one, rlen)?;
                        self.status = BrleStatus::Init;
                        0
                    } else {
                        break;
                    }
                }
            };
            self.window >>= consumed;
            self.bit_len -= consumed;
        }
        Ok(())
    }

    #[inline(always)]
    fn start_run(&mut self, is_one: bool, rlen: u32) -> io::Result<()> {
        debug_assert!(rlen <= u32::from(MAX_RUN_LEN));
        if rlen == u32::from(MAX_RUN_LEN) {
            // 7 residual bits plus a 64-bit word can hit the cap
            // straight from Init
            self.emit_run(is_one, MAX_RUN_LEN)
        } else {
            self.status = BrleStatus::Run {
                is_one,
                rlen: rlen as u8,
            };
            Ok(())
        }
    }

    #[inline(always)]
    fn emit_run(&mut self, is_one: bool, rlen: u8) -> io::Result<()> {
        let codeword = if is_one {
            Codeword::one_run(rlen)
        } else {
            Codeword::zero_run(rlen)
        };
        self.emit(codeword)
    }

    #[inline(always)]
    fn emit(&mut self, codeword: Codeword) -> io::Result<()> {
        trace!("emit {:?}", codeword);
        self.writer.write_all(&[codeword.encode()])
    }
}

impl<W: io::Write> io::Write for Brle<u8, W> {
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

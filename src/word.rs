use std::io;

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width unsigned integer usable as the codec's word type.
///
/// The bits of successive words form the logical bitstream LSB first,
/// independent of host byte order. Implemented for `u8`, `u16`, `u32`
/// and `u64`; the trait is sealed since the codec's internal windows
/// are sized for at most 64-bit words.
pub trait Word: Copy + sealed::Sealed {
    const BITS: u32;

    /// Widens the word into a bit window.
    fn to_bits(self) -> u128;

    /// Truncates a bit window back to the word width.
    fn from_bits(bits: u128) -> Self;
}

macro_rules! impl_word {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Word for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[inline(always)]
                fn to_bits(self) -> u128 {
                    self as u128
                }

                #[inline(always)]
                fn from_bits(bits: u128) -> Self {
                    bits as $ty
                }
            }
        )*
    };
}

impl_word!(u8, u16, u32, u64);

/// Push sink for decoded words.
pub trait WordSink<T> {
    fn write_word(&mut self, word: T) -> io::Result<()>;
}

impl<T> WordSink<T> for Vec<T> {
    fn write_word(&mut self, word: T) -> io::Result<()> {
        self.push(word);
        Ok(())
    }
}

impl<T, S: WordSink<T> + ?Sized> WordSink<T> for &mut S {
    fn write_word(&mut self, word: T) -> io::Result<()> {
        (**self).write_word(word)
    }
}

#[cfg(test)]
mod tests {
    use super::Word;

    #[test]
    fn from_bits_truncates() {
        assert_eq!(u8::from_bits(0x1FF), 0xFF);
        assert_eq!(u16::from_bits(0x5_AA55), 0xAA55);
        assert_eq!(u64::from_bits(u128::MAX), u64::MAX);
    }

    #[test]
    fn to_bits_widens() {
        assert_eq!(0xAAu8.to_bits(), 0xAA);
        assert_eq!(u64::MAX.to_bits(), u64::MAX as u128);
    }
}

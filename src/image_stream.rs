//! Unpacking of packed image samples, one row at a time.

/// Reads rows of packed samples and unpacks them to one byte per sample.
///
/// Rows start on byte boundaries.  Samples of 16 bits are reduced to their
/// high byte.  A stream that runs out of data yields zero samples, the way a
/// truncated image stream reads as black (or as "paint" for stencil masks).
pub struct ImageStream<'a> {
    data: &'a [u8],
    pos: usize,
    bits: u8,
    row_bytes: usize,
    line: Vec<u8>,
}

impl<'a> ImageStream<'a> {
    /// `bits` must be one of 1, 2, 4, 8 or 16; other values read as 8.
    pub fn new(data: &'a [u8], width: usize, components: usize, bits: u8) -> ImageStream<'a> {
        let bits = match bits {
            1 | 2 | 4 | 8 | 16 => bits,
            _ => 8,
        };

        let samples = width * components;
        let row_bytes = (samples * usize::from(bits) + 7) / 8;

        ImageStream {
            data,
            pos: 0,
            bits,
            row_bytes,
            line: vec![0; samples],
        }
    }

    /// Largest value an unpacked sample can have for the given bit depth.
    pub fn sample_max(bits: u8) -> u8 {
        match bits {
            1 => 1,
            2 => 3,
            4 => 15,
            _ => 255,
        }
    }

    /// Number of bytes one packed row takes in the input.
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Unpacks the next row and returns its samples.
    pub fn next_line(&mut self) -> &[u8] {
        let data = self.data;
        let start = self.pos.min(data.len());
        let end = (self.pos + self.row_bytes).min(data.len());
        let row = &data[start..end];
        self.pos += self.row_bytes;

        match self.bits {
            8 => {
                for (i, s) in self.line.iter_mut().enumerate() {
                    *s = row.get(i).copied().unwrap_or(0);
                }
            }

            16 => {
                for (i, s) in self.line.iter_mut().enumerate() {
                    *s = row.get(i * 2).copied().unwrap_or(0);
                }
            }

            bits => {
                let per_byte = 8 / usize::from(bits);
                let mask = (1u8 << bits) - 1;

                for (i, s) in self.line.iter_mut().enumerate() {
                    let byte = row.get(i / per_byte).copied().unwrap_or(0);
                    let shift = 8 - usize::from(bits) * (i % per_byte + 1);
                    *s = (byte >> shift) & mask;
                }
            }
        }

        &self.line
    }
}

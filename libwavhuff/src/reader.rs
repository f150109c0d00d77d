use crate::core::{
    PcmError, PcmParams, PcmResult, FORMAT_EXTENSIBLE, FORMAT_PCM, RIFF_MAGIC, WAVE_MAGIC,
};

/// Binary reader for RIFF/WAVE PCM containers
#[derive(Debug, Default)]
pub struct Reader;

/// Fields of the "fmt " chunk we care about
struct FormatChunk {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl Reader {
    /// Create a new reader
    pub fn new() -> Self {
        Reader
    }

    /// Parse a WAV file into its params and the raw interleaved frame bytes
    pub fn read(&self, data: &[u8]) -> PcmResult<(PcmParams, Vec<u8>)> {
        let mut cursor = Cursor::new(data);

        if cursor.read_array::<4>()? != RIFF_MAGIC {
            return Err(invalid("missing RIFF header"));
        }
        let _riff_size = cursor.read_u32_le()?;
        if cursor.read_array::<4>()? != WAVE_MAGIC {
            return Err(invalid("RIFF form type is not WAVE"));
        }

        let mut format: Option<FormatChunk> = None;

        while cursor.remaining() >= 8 {
            let id: [u8; 4] = cursor.read_array()?;
            let size = cursor.read_u32_le()? as usize;

            match &id {
                b"fmt " => {
                    let body = cursor.read_bytes(size)?;
                    format = Some(self.read_format(body)?);
                }
                b"data" => {
                    let fmt = format
                        .as_ref()
                        .ok_or_else(|| invalid("data chunk before fmt chunk"))?;
                    // tolerate a truncated data chunk, like most players do
                    let body = cursor.read_bytes(size.min(cursor.remaining()))?;
                    return self.finish(fmt, body);
                }
                _ => cursor.skip(size)?,
            }

            // chunks are word aligned
            if size % 2 == 1 {
                cursor.skip(1)?;
            }
        }

        Err(invalid("no data chunk"))
    }

    fn read_format(&self, body: &[u8]) -> PcmResult<FormatChunk> {
        let mut cursor = Cursor::new(body);

        let mut audio_format = cursor.read_u16_le()?;
        let channels = cursor.read_u16_le()?;
        let sample_rate = cursor.read_u32_le()?;
        let _byte_rate = cursor.read_u32_le()?;
        let _block_align = cursor.read_u16_le()?;
        let bits_per_sample = cursor.read_u16_le()?;

        if audio_format == FORMAT_EXTENSIBLE {
            let _cb_size = cursor.read_u16_le()?;
            let _valid_bits = cursor.read_u16_le()?;
            let _channel_mask = cursor.read_u32_le()?;
            // first two bytes of the sub-format GUID hold the format code
            audio_format = cursor.read_u16_le()?;
        }

        if audio_format != FORMAT_PCM {
            return Err(invalid(format!(
                "unsupported audio format tag 0x{:04x} (only PCM)",
                audio_format
            )));
        }
        if channels == 0 {
            return Err(invalid("zero channels"));
        }
        if bits_per_sample == 0 {
            return Err(invalid("zero bits per sample"));
        }

        Ok(FormatChunk {
            channels,
            sample_rate,
            bits_per_sample,
        })
    }

    fn finish(&self, fmt: &FormatChunk, body: &[u8]) -> PcmResult<(PcmParams, Vec<u8>)> {
        let sample_width = fmt.bits_per_sample.div_ceil(8);
        let params = PcmParams {
            channels: fmt.channels,
            sample_rate: fmt.sample_rate,
            sample_width,
            frame_count: 0,
        };

        // keep whole frames only
        let block = params.block_align();
        let usable = body.len() - body.len() % block;
        if usable == 0 {
            return Err(PcmError::EmptyAudio);
        }

        Ok((params.with_data_len(usable), body[..usable].to_vec()))
    }
}

fn invalid(reason: impl Into<String>) -> PcmError {
    PcmError::InvalidFormat(reason.into())
}

// cursor helper

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, count: usize) -> PcmResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(invalid("unexpected end of file"));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> PcmResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn skip(&mut self, count: usize) -> PcmResult<()> {
        self.pos = (self.pos + count).min(self.data.len());
        Ok(())
    }

    fn read_u16_le(&mut self) -> PcmResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    fn read_u32_le(&mut self) -> PcmResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }
}

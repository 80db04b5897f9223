//! Frame replay wire format: a gzip-compressed stream of tagged, fixed-layout
//! frame records.
//!
//! Each record is: a 4-byte magic, a version byte, 32-bit width, 32-bit
//! height, 64-bit timestamp (milliseconds), a 32-bit cell count, then that
//! many `FrameCell` records of `{x:i32, y:i32, rune:u32, fg:i32, bg:i32,
//! attrs:u16}`. The format is deterministic and stable within a release:
//! encoding the same [`Frame`] twice produces byte-identical output.

use core_geom::Point;
use core_grid::{Attrs, Cell, Color, Frame, FrameCell, Style};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};
use tracing::{debug, warn};

const MAGIC: [u8; 4] = *b"TKFR";
const VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("io error reading frame stream: {0}")]
    Io(#[from] io::Error),
    #[error("bad magic bytes in frame record")]
    BadMagic,
    #[error("unsupported frame record version {0}")]
    UnsupportedVersion(u8),
    #[error("frame record truncated mid-record")]
    Truncated,
}

/// Result of attempting to decode one frame: either a frame, or a clean
/// end-of-stream — kept distinct from [`DecodeError`] so callers can tell
/// "nothing more to read" from "the stream is corrupt".
pub enum DecodeOutcome {
    Frame(Frame),
    Eof,
}

pub struct FrameEncoder<W: Write> {
    inner: GzEncoder<W>,
}

impl<W: Write> FrameEncoder<W> {
    pub fn new(writer: W) -> Self {
        FrameEncoder { inner: GzEncoder::new(writer, Compression::default()) }
    }

    pub fn encode(&mut self, frame: &Frame) -> io::Result<()> {
        self.inner.write_all(&MAGIC)?;
        self.inner.write_all(&[VERSION])?;
        self.inner.write_all(&frame.width.to_le_bytes())?;
        self.inner.write_all(&frame.height.to_le_bytes())?;
        self.inner.write_all(&frame.time_ms.to_le_bytes())?;
        self.inner.write_all(&(frame.cells.len() as u32).to_le_bytes())?;
        for fc in &frame.cells {
            self.inner.write_all(&fc.pos.x.to_le_bytes())?;
            self.inner.write_all(&fc.pos.y.to_le_bytes())?;
            self.inner.write_all(&(fc.cell.rune as u32).to_le_bytes())?;
            self.inner.write_all(&fc.cell.style.fg.0.to_le_bytes())?;
            self.inner.write_all(&fc.cell.style.bg.0.to_le_bytes())?;
            self.inner.write_all(&fc.cell.style.attrs.bits().to_le_bytes())?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Finishes the gzip stream and returns the underlying writer.
    pub fn finish(self) -> io::Result<W> {
        self.inner.finish()
    }
}

pub struct FrameDecoder<R: Read> {
    inner: GzDecoder<R>,
}

impl<R: Read> FrameDecoder<R> {
    pub fn new(reader: R) -> Self {
        FrameDecoder { inner: GzDecoder::new(reader) }
    }

    /// Reads the next frame, or [`DecodeOutcome::Eof`] if the stream ended
    /// cleanly between records.
    pub fn decode(&mut self) -> Result<DecodeOutcome, DecodeError> {
        let mut magic = [0u8; 4];
        match read_exact_or_clean_eof(&mut self.inner, &mut magic)? {
            false => {
                debug!(target: "codec.decode", "clean eof between records");
                return Ok(DecodeOutcome::Eof);
            }
            true => {}
        }
        if magic != MAGIC {
            warn!(target: "codec.decode", ?magic, "bad magic bytes");
            return Err(DecodeError::BadMagic);
        }

        let mut version = [0u8; 1];
        self.inner.read_exact(&mut version).map_err(map_truncated)?;
        if version[0] != VERSION {
            warn!(target: "codec.decode", got = version[0], expected = VERSION, "unsupported record version");
            return Err(DecodeError::UnsupportedVersion(version[0]));
        }

        let width = read_i32(&mut self.inner)?;
        let height = read_i32(&mut self.inner)?;
        let time_ms = read_u64(&mut self.inner)?;
        let count = read_u32(&mut self.inner)?;

        let mut cells = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let x = read_i32(&mut self.inner)?;
            let y = read_i32(&mut self.inner)?;
            let rune_code = read_u32(&mut self.inner)?;
            let rune = char::from_u32(rune_code).unwrap_or('\u{FFFD}');
            let fg = read_i32(&mut self.inner)?;
            let bg = read_i32(&mut self.inner)?;
            let attrs_bits = read_u16(&mut self.inner)?;
            cells.push(FrameCell {
                cell: Cell::new(rune, Style { fg: Color(fg), bg: Color(bg), attrs: Attrs::from_bits_truncate(attrs_bits) }),
                pos: Point::new(x, y),
            });
        }

        debug!(target: "codec.decode", width, height, time_ms, cell_count = count, "frame decoded");
        Ok(DecodeOutcome::Frame(Frame { cells, width, height, time_ms }))
    }
}

fn map_truncated(e: io::Error) -> DecodeError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::Truncated
    } else {
        DecodeError::Io(e)
    }
}

/// Reads exactly `buf.len()` bytes, or reports a clean EOF if zero bytes
/// were available at the very start of the read (i.e. between records
/// rather than inside one).
fn read_exact_or_clean_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<bool, DecodeError> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return if filled == 0 { Ok(false) } else { Err(DecodeError::Truncated) };
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::Io(e)),
        }
    }
    Ok(true)
}

fn read_i32<R: Read>(r: &mut R) -> Result<i32, DecodeError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(map_truncated)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32, DecodeError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(map_truncated)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64, DecodeError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(map_truncated)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_u16<R: Read>(r: &mut R) -> Result<u16, DecodeError> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf).map_err(map_truncated)?;
    Ok(u16::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        Frame {
            cells: vec![
                FrameCell { cell: Cell::new('a', Style::default()), pos: Point::new(0, 0) },
                FrameCell { cell: Cell::new('b', Style::default()), pos: Point::new(1, 0) },
            ],
            width: 10,
            height: 5,
            time_ms: 12345,
        }
    }

    #[test]
    fn roundtrip_single_frame() {
        let mut buf = Vec::new();
        let mut enc = FrameEncoder::new(&mut buf);
        enc.encode(&sample_frame()).unwrap();
        let buf = enc.finish().unwrap();

        let mut dec = FrameDecoder::new(buf.as_slice());
        match dec.decode().unwrap() {
            DecodeOutcome::Frame(f) => assert_eq!(f, sample_frame()),
            DecodeOutcome::Eof => panic!("expected a frame"),
        }
        assert!(matches!(dec.decode().unwrap(), DecodeOutcome::Eof));
    }

    #[test]
    fn roundtrip_multiple_frames_preserves_order() {
        let mut buf = Vec::new();
        {
            let mut enc = FrameEncoder::new(&mut buf);
            for i in 0..3u64 {
                let mut f = sample_frame();
                f.time_ms = i;
                enc.encode(&f).unwrap();
            }
            buf = enc.finish().unwrap();
        }
        let mut dec = FrameDecoder::new(buf.as_slice());
        for i in 0..3u64 {
            match dec.decode().unwrap() {
                DecodeOutcome::Frame(f) => assert_eq!(f.time_ms, i),
                DecodeOutcome::Eof => panic!("premature eof"),
            }
        }
        assert!(matches!(dec.decode().unwrap(), DecodeOutcome::Eof));
    }

    #[test]
    fn truncated_stream_is_distinct_from_eof() {
        let mut buf = Vec::new();
        let mut enc = FrameEncoder::new(&mut buf);
        enc.encode(&sample_frame()).unwrap();
        let buf = enc.finish().unwrap();
        let truncated = &buf[..buf.len() - 3];

        let mut dec = FrameDecoder::new(truncated);
        let err = dec.decode().unwrap_err();
        assert!(matches!(err, DecodeError::Truncated | DecodeError::Io(_)));
    }

    #[test]
    fn empty_stream_is_clean_eof() {
        let buf: Vec<u8> = {
            let enc = FrameEncoder::new(Vec::new());
            enc.finish().unwrap()
        };
        let mut dec = FrameDecoder::new(buf.as_slice());
        assert!(matches!(dec.decode().unwrap(), DecodeOutcome::Eof));
    }

    #[test]
    fn roundtrips_through_a_real_file_on_disk() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        {
            let file = std::fs::File::create(tmp.path()).unwrap();
            let mut enc = FrameEncoder::new(file);
            enc.encode(&sample_frame()).unwrap();
            enc.finish().unwrap().sync_all().unwrap();
        }

        let file = std::fs::File::open(tmp.path()).unwrap();
        let mut dec = FrameDecoder::new(file);
        match dec.decode().unwrap() {
            DecodeOutcome::Frame(f) => assert_eq!(f, sample_frame()),
            DecodeOutcome::Eof => panic!("expected a frame"),
        }
        assert!(matches!(dec.decode().unwrap(), DecodeOutcome::Eof));
    }
}

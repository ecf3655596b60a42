//! Legacy pcap input and output.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{PcapHeader as LegacyPcapHeader, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError};

const BUFFER_SIZE: usize = 65536;

/// One captured frame. `ts_fraction` is micro- or nanoseconds depending on
/// the capture's magic number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub ts_sec: u32,
    pub ts_fraction: u32,
    pub original_len: u32,
    pub data: Vec<u8>,
}

pub struct CaptureReader {
    inner: LegacyPcapReader<BufReader<File>>,
    header: LegacyPcapHeader,
}

impl CaptureReader {
    /// Opens a legacy pcap file with Ethernet link type.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open capture: {}", path.display()))?;
        let mut inner = LegacyPcapReader::new(BUFFER_SIZE, BufReader::new(file))
            .map_err(|e| anyhow!("Failed to parse pcap header of {}: {e}", path.display()))?;

        let header = loop {
            match inner.next() {
                Ok((offset, block)) => match block {
                    PcapBlockOwned::LegacyHeader(header) => {
                        inner.consume(offset);
                        break header;
                    }
                    _ => bail!("{} does not start with a pcap header", path.display()),
                },
                Err(PcapError::Incomplete(_)) => {
                    inner
                        .refill()
                        .map_err(|e| anyhow!("Failed to read capture: {e}"))?;
                }
                Err(e) => bail!("Failed to parse pcap header of {}: {e}", path.display()),
            }
        };

        if header.network != Linktype::ETHERNET {
            bail!(
                "Unsupported link type {} in {}, expected Ethernet",
                header.network.0,
                path.display()
            );
        }

        Ok(Self { inner, header })
    }

    pub fn header(&self) -> &LegacyPcapHeader {
        &self.header
    }

    pub fn next_frame(&mut self) -> Result<Option<CapturedFrame>> {
        loop {
            match self.inner.next() {
                Ok((offset, block)) => match block {
                    PcapBlockOwned::Legacy(packet) => {
                        let frame = CapturedFrame {
                            ts_sec: packet.ts_sec,
                            ts_fraction: packet.ts_usec,
                            original_len: packet.origlen,
                            data: packet.data.to_vec(),
                        };
                        self.inner.consume(offset);
                        return Ok(Some(frame));
                    }
                    _ => {
                        self.inner.consume(offset);
                        continue;
                    }
                },
                Err(PcapError::Eof) => return Ok(None),
                Err(PcapError::Incomplete(_)) => {
                    self.inner
                        .refill()
                        .map_err(|e| anyhow!("Failed to read capture: {e}"))?;
                }
                Err(e) => bail!("Failed to parse capture: {e}"),
            }
        }
    }
}

/// Writes frames as a little-endian legacy pcap carrying over the input's
/// timestamp precision, snap length and link type.
pub struct CaptureWriter<W: Write> {
    out: W,
}

impl CaptureWriter<BufWriter<File>> {
    pub fn create(path: &Path, header: &LegacyPcapHeader) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create capture: {}", path.display()))?;
        Self::new(BufWriter::new(file), header)
            .with_context(|| format!("Failed to write pcap header to {}", path.display()))
    }
}

impl<W: Write> CaptureWriter<W> {
    pub fn new(mut out: W, header: &LegacyPcapHeader) -> std::io::Result<Self> {
        out.write_all(&header.magic_number.to_le_bytes())?;
        out.write_all(&header.version_major.to_le_bytes())?;
        out.write_all(&header.version_minor.to_le_bytes())?;
        out.write_all(&header.thiszone.to_le_bytes())?;
        out.write_all(&header.sigfigs.to_le_bytes())?;
        out.write_all(&header.snaplen.to_le_bytes())?;
        out.write_all(&header.network.0.to_le_bytes())?;
        Ok(Self { out })
    }

    pub fn write_frame(&mut self, frame: &CapturedFrame) -> std::io::Result<()> {
        self.out.write_all(&frame.ts_sec.to_le_bytes())?;
        self.out.write_all(&frame.ts_fraction.to_le_bytes())?;
        self.out.write_all(&(frame.data.len() as u32).to_le_bytes())?;
        self.out.write_all(&frame.original_len.to_le_bytes())?;
        self.out.write_all(&frame.data)
    }

    pub fn finish(mut self) -> std::io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

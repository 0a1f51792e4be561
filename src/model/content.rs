use std::io::{self, Read};

/// A byte source `CloudStorage::save` drains into the bucket.
pub trait ContentSource {
    fn open(&mut self) -> io::Result<()>;

    /// Reads everything left in the source.
    fn read(&mut self) -> io::Result<Vec<u8>>;

    fn close(&mut self) -> io::Result<()>;
}

/// Whole-object contents held in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentFile {
    data: Vec<u8>,
    pos: usize,
}

impl ContentFile {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for ContentFile {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&str> for ContentFile {
    fn from(data: &str) -> Self {
        Self::new(data.as_bytes())
    }
}

impl Read for ContentFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;

        Ok(n)
    }
}

impl ContentSource for ContentFile {
    fn open(&mut self) -> io::Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn read(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.data.len() - self.pos);
        Read::read_to_end(self, &mut buf)?;

        Ok(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

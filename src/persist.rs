use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

const FORMAT_VERSION: u8 = 1;

/// Writes the binary container: magic, version, u64 LE payload length,
/// deflate-compressed JSON payload.
pub(crate) fn write_binary<T: Serialize>(
    magic: &[u8; 4],
    value: &T,
    writer: &mut impl Write,
) -> Result<()> {
    let mut payload = Vec::new();
    let mut encoder = DeflateEncoder::new(&mut payload, Compression::default());
    serde_json::to_writer(&mut encoder, value)?;
    encoder.finish()?;

    writer.write_all(magic)?;
    writer.write_all(&[FORMAT_VERSION])?;
    writer.write_all(&(payload.len() as u64).to_le_bytes())?;
    writer.write_all(&payload)?;
    Ok(())
}

pub(crate) fn read_binary<T: DeserializeOwned>(
    magic: &[u8; 4],
    reader: &mut impl Read,
) -> Result<T> {
    let mut found_magic = [0u8; 4];
    reader.read_exact(&mut found_magic)?;
    if &found_magic != magic {
        return Err(Error::invalid_input(format!(
            "wrong magic: expected {magic:?}, found {found_magic:?}"
        )));
    }
    let mut version = [0u8; 1];
    reader.read_exact(&mut version)?;
    if version[0] != FORMAT_VERSION {
        return Err(Error::invalid_input(format!(
            "unsupported format version {}",
            version[0]
        )));
    }
    let mut len = [0u8; 8];
    reader.read_exact(&mut len)?;
    let len = u64::from_le_bytes(len) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(serde_json::from_reader(DeflateDecoder::new(
        payload.as_slice(),
    ))?)
}

pub(crate) fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
}

pub(crate) fn save_binary<T: Serialize>(
    path: impl AsRef<Path>,
    magic: &[u8; 4],
    value: &T,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_binary(magic, value, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn load_binary<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    magic: &[u8; 4],
) -> Result<T> {
    read_binary(magic, &mut BufReader::new(File::open(path)?))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Saves JSON when the extension is `.json`, the binary container otherwise.
pub(crate) fn save_by_extension<T: Serialize>(
    path: impl AsRef<Path>,
    magic: &[u8; 4],
    value: &T,
) -> Result<()> {
    if is_json(path.as_ref()) {
        save_json(path, value)
    } else {
        save_binary(path, magic, value)
    }
}

/// Loads either format; the magic decides, not the extension.
pub(crate) fn load<T: DeserializeOwned>(path: impl AsRef<Path>, magic: &[u8; 4]) -> Result<T> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    let mut sniffed = [0u8; 4];
    let read = reader.read(&mut sniffed)?;
    if read == 4 && &sniffed == magic {
        let mut reader = BufReader::new(File::open(path)?);
        read_binary(magic, &mut reader)
    } else {
        load_json(path)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn binary_round_trip() {
        let value = vec![1usize, 2, 3];
        let mut buffer = Vec::new();
        write_binary(b"TEST", &value, &mut buffer).unwrap();
        let back: Vec<usize> = read_binary(b"TEST", &mut buffer.as_slice()).unwrap();
        assert_eq!(value, back);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut buffer = Vec::new();
        write_binary(b"AAAA", &1usize, &mut buffer).unwrap();
        assert!(read_binary::<usize>(b"BBBB", &mut buffer.as_slice()).is_err());
    }
}

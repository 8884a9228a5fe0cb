//! The binary snapshot codec.
//!
//! Layout: `[HEADER]\0` magic, then the strings, sets and hashes sections,
//! then the `[FOOTER]\x03` trailer. All lengths are little-endian `u32`, and
//! every byte-string is followed by a NUL that is written and discarded on
//! read. Queues are deliberately absent from the format.
//!
//! Encoding walks each store entry-by-entry, cloning every entry into a
//! memory buffer under its shard read lock, so a single entry is never
//! half-written; two entries need not reflect the same instant. Decoding is
//! strict: a bad magic or trailer and any truncated section abort the load,
//! while a missing file simply yields an empty store.

use crate::error::{Result, TkvsError};
use crate::store::Stores;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

const MAGIC: &[u8; 9] = b"[HEADER]\0";
const TRAILER: &[u8; 9] = b"[FOOTER]\x03";

/// encodes the persistent stores (strings, sets, hashes) into the file at `path`
///
/// The file is rewritten from scratch on every dump.
pub fn dump(stores: &Stores, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(MAGIC)?;
    writer.write_all(&encode_strings(stores))?;
    writer.write_all(&encode_sets(stores))?;
    writer.write_all(&encode_hashes(stores))?;
    writer.write_all(TRAILER)?;
    writer.flush()?;
    debug!("dumped snapshot to {:?}", path);
    Ok(())
}

/// decodes the file at `path` into `stores`, rebuilding the key space through
/// the stores' own create paths
///
/// A missing file is not an error; the stores are simply left empty.
pub fn load(stores: &Stores, path: &Path) -> Result<()> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("no snapshot at {:?}, starting empty", path);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 9];
    read_exact(&mut reader, &mut magic, "header")?;
    if &magic != MAGIC {
        return Err(TkvsError::Corrupted("bad header magic".to_string()));
    }

    decode_strings(stores, &mut reader)?;
    decode_sets(stores, &mut reader)?;
    decode_hashes(stores, &mut reader)?;

    let mut trailer = [0u8; 9];
    read_exact(&mut reader, &mut trailer, "trailer")?;
    if &trailer != TRAILER {
        return Err(TkvsError::Corrupted("bad trailer".to_string()));
    }

    info!(
        "restored {} keys from snapshot {:?}",
        stores.keyspace.len(),
        path
    );
    Ok(())
}

fn encode_strings(stores: &Stores) -> Vec<u8> {
    let mut entries = 0u32;
    let mut body = Vec::new();
    stores.strings.for_each_entry(|name, value| {
        entries += 1;
        put_str(&mut body, name);
        put_str(&mut body, value);
    });
    frame_section(entries, body)
}

fn encode_sets(stores: &Stores) -> Vec<u8> {
    let mut entries = 0u32;
    let mut body = Vec::new();
    stores.sets.for_each_entry(|name, elements| {
        entries += 1;
        put_str(&mut body, name);
        put_u32(&mut body, elements.len() as u32);
        for element in elements {
            put_str(&mut body, element);
        }
    });
    frame_section(entries, body)
}

fn encode_hashes(stores: &Stores) -> Vec<u8> {
    let mut entries = 0u32;
    let mut body = Vec::new();
    stores.hashes.for_each_entry(|name, fields| {
        entries += 1;
        put_str(&mut body, name);
        put_u32(&mut body, fields.len() as u32);
        for (field, value) in fields {
            put_str(&mut body, field);
            put_str(&mut body, value);
        }
    });
    frame_section(entries, body)
}

fn decode_strings<R: Read>(stores: &Stores, reader: &mut R) -> Result<()> {
    let count = get_u32(reader, "strings count")?;
    for _ in 0..count {
        let name = get_str(reader, "string key")?;
        let value = get_str(reader, "string value")?;
        stores
            .strings
            .create(&stores.keyspace, &name, &value)
            .map_err(|_| duplicate(&name))?;
    }
    Ok(())
}

fn decode_sets<R: Read>(stores: &Stores, reader: &mut R) -> Result<()> {
    let count = get_u32(reader, "sets count")?;
    for _ in 0..count {
        let name = get_str(reader, "set key")?;
        stores
            .sets
            .create(&stores.keyspace, &name)
            .map_err(|_| duplicate(&name))?;
        let elements = get_u32(reader, "set element count")?;
        for _ in 0..elements {
            let element = get_str(reader, "set element")?;
            stores.sets.add(&name, &element)?;
        }
    }
    Ok(())
}

fn decode_hashes<R: Read>(stores: &Stores, reader: &mut R) -> Result<()> {
    let count = get_u32(reader, "hashes count")?;
    for _ in 0..count {
        let name = get_str(reader, "hash key")?;
        stores
            .hashes
            .create(&stores.keyspace, &name)
            .map_err(|_| duplicate(&name))?;
        let fields = get_u32(reader, "hash field count")?;
        for _ in 0..fields {
            let field = get_str(reader, "hash field")?;
            let value = get_str(reader, "hash value")?;
            stores.hashes.set(&name, &field, &value)?;
        }
    }
    Ok(())
}

fn frame_section(entries: u32, body: Vec<u8>) -> Vec<u8> {
    let mut section = Vec::with_capacity(4 + body.len());
    put_u32(&mut section, entries);
    section.extend_from_slice(&body);
    section
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// length prefix, bytes, trailing NUL
fn put_str(out: &mut Vec<u8>, value: &str) {
    put_u32(out, value.len() as u32);
    out.extend_from_slice(value.as_bytes());
    out.push(0);
}

fn get_u32<R: Read>(reader: &mut R, what: &str) -> Result<u32> {
    let mut bytes = [0u8; 4];
    read_exact(reader, &mut bytes, what)?;
    Ok(u32::from_le_bytes(bytes))
}

fn get_str<R: Read>(reader: &mut R, what: &str) -> Result<String> {
    let len = get_u32(reader, what)? as usize;
    let mut bytes = vec![0u8; len];
    read_exact(reader, &mut bytes, what)?;
    let mut nul = [0u8; 1];
    read_exact(reader, &mut nul, what)?;
    if nul[0] != 0 {
        return Err(TkvsError::Corrupted(format!("missing NUL after {}", what)));
    }
    String::from_utf8(bytes).map_err(|_| TkvsError::Corrupted(format!("{} is not UTF-8", what)))
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader
        .read_exact(buf)
        .map_err(|_| TkvsError::Corrupted(format!("truncated while reading {}", what)))
}

fn duplicate(name: &str) -> TkvsError {
    TkvsError::Corrupted(format!("duplicate key {} in snapshot", name))
}

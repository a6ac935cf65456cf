//! Host-facing file I/O helpers (§1.3/§6): persistent-RAM and save-state
//! blobs are plain byte buffers, loaded and flushed through these.

use dmg_common::error::Error;
use std::{
    cell::RefCell,
    fs::File,
    io::{Read, Write},
    rc::Rc,
};

/// Shared mutable type able to be passed between types
/// allowing for circular referencing and interior mutability.
/// The core is single-threaded (the host drives one [`crate::gb::GameBoy`]
/// on its own thread), so this is the only shared-ownership type needed.
pub type SharedMut<T> = Rc<RefCell<T>>;

/// Reads the contents of the file at the given path into
/// a vector of bytes.
pub fn read_file(path: &str) -> Result<Vec<u8>, Error> {
    let mut file = File::open(path)
        .map_err(|_| Error::CustomError(format!("Failed to open file: {}", path)))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|_| Error::CustomError(format!("Failed to read from file: {}", path)))?;
    Ok(data)
}

/// Writes the given data to the file at the given path.
pub fn write_file(path: &str, data: &[u8], flush: Option<bool>) -> Result<(), Error> {
    let mut file = File::create(path)
        .map_err(|_| Error::CustomError(format!("Failed to create file: {}", path)))?;
    file.write_all(data)
        .map_err(|_| Error::CustomError(format!("Failed to write to file: {}", path)))?;
    if flush.unwrap_or(true) {
        file.flush()
            .map_err(|_| Error::CustomError(format!("Failed to flush file: {}", path)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_file, write_file};
    use std::env::temp_dir;

    #[test]
    fn test_write_then_read_roundtrip() {
        let path = temp_dir().join("dmg_core_util_test.bin");
        let path = path.to_str().unwrap();
        write_file(path, &[1, 2, 3, 4], Some(true)).unwrap();
        let data = read_file(path).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4]);
        std::fs::remove_file(path).unwrap();
    }
}

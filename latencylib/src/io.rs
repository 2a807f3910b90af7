use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use crate::error::DataFormatError;

const BUFFER_SIZE: usize = 16 * 4096;

/// Opens a file for reading, memory mapping it when it is a non-empty regular file on unix
///
/// Pipes, devices and `/proc` files report a length of zero, so they are always read through a
/// buffer
///
/// # Arguments
///
/// * `path`: The file to open
///
/// returns: Result<Box<dyn Read>, DataFormatError>
pub fn get_reader(path: &Path) -> Result<Box<dyn Read>, DataFormatError> {
    let file = File::open(path).map_err(|source| DataFormatError::Open { path: path.to_path_buf(), source })?;
    // Memory map the file on unix systems, the loader only ever reads forwards
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        let metadata = file.metadata().map_err(|source| DataFormatError::Open { path: path.to_path_buf(), source })?;
        if metadata.is_file() {
            if metadata.len() == 0 {
                // Zero length mappings are rejected by some systems
                return Ok(Box::new(std::io::empty()));
            }
            unsafe {
                let m = Mmap::map(&file).map_err(DataFormatError::Map)?;
                m.advise(Advice::Sequential).map_err(DataFormatError::Map)?;
                return Ok(Box::new(Cursor::new(m)));
            }
        }
    }
    Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, file)))
}

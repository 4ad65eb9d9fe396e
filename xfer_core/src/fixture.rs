use std::io::{self, BufWriter, Write};

use tempfile::NamedTempFile;

const ALPHABET_LINE: &str = "abcdefghijklmnopqrstuvwxyz\n";
const DIGIT_LINE: &str = "0123456789011234567890\n";
const REPEAT: usize = 1000;

/// Size in bytes of the file produced by `create_sample_file`.
pub const SAMPLE_FILE_LEN: u64 = ((ALPHABET_LINE.len() + DIGIT_LINE.len()) * REPEAT) as u64;

/// Write a small text file to transfer in demos and tests.
///
/// The file lives in the system temp dir and is removed when the returned
/// handle is dropped.
pub fn create_sample_file() -> io::Result<NamedTempFile> {
    let file = tempfile::Builder::new()
        .prefix("xfer-sample-")
        .suffix(".txt")
        .tempfile()?;

    {
        let mut writer = BufWriter::new(file.as_file());
        for _ in 0..REPEAT {
            writer.write_all(ALPHABET_LINE.as_bytes())?;
            writer.write_all(DIGIT_LINE.as_bytes())?;
        }
        writer.flush()?;
    }

    Ok(file)
}

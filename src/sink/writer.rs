use crate::config::FileWriter;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Default `FileWriter`: appends to the file, creating it when missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppendFileWriter;

impl FileWriter for AppendFileWriter {
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(content.as_bytes())?;
        file.flush()
    }
}

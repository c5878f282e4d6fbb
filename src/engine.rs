use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use binary_rw::{FileStream, OpenType};
use log::debug;
use tempfile::NamedTempFile;

use crate::bit_stream;
use crate::container::Container;
use crate::error::HuffError;
use crate::huffman::{count_frequencies, CodeTable, HuffmanTree};

/// Byte counts and timing for one compress or decompress run.
pub struct Stats {
    pub input_size: u64,
    pub output_size: u64,
    pub elapsed: Duration,
}

impl Stats {
    /// Space saved as a percentage of the input size; negative when the
    /// output grew.
    pub fn ratio(&self) -> f64 {
        (1.0 - self.output_size as f64 / self.input_size as f64) * 100.0
    }
}

pub fn compress<P, Q>(input: P, output: Q) -> Result<Stats, HuffError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let started = Instant::now();
    let data = fs::read(input.as_ref())?;

    // Pass 1: frequencies. Pass 2 (inside pack): bit packing.
    let frequencies = count_frequencies(&data);
    let tree = HuffmanTree::from_frequencies(&frequencies)?;
    let table = CodeTable::from_tree(&tree);
    debug!("{} distinct byte values", table.len());

    let (payload, bit_count) = bit_stream::pack(&data, &table)?;
    debug!("packed {} bytes into {} meaningful bits", data.len(), bit_count);

    let container = Container {
        records: table.records(),
        bit_count,
        payload,
    };

    let output = output.as_ref();
    write_atomic(output, |tmp| {
        let mut stream = FileStream::new(tmp, OpenType::OpenAndCreate)?;
        container.write_to(&mut stream)
    })?;

    Ok(Stats {
        input_size: data.len() as u64,
        output_size: fs::metadata(output)?.len(),
        elapsed: started.elapsed(),
    })
}

pub fn decompress<P, Q>(input: P, output: Q) -> Result<Stats, HuffError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let started = Instant::now();
    let input = input.as_ref();

    let Container {
        records,
        bit_count,
        payload,
    } = {
        let mut stream = FileStream::new(input, OpenType::Open)?;
        Container::read_from(&mut stream)?
    };

    let table = CodeTable::from_records(records)?;
    debug!("rebuilt {} codes, {} payload bits", table.len(), bit_count);

    let data = bit_stream::unpack(&payload, bit_count, &table)?;

    write_atomic(output.as_ref(), |tmp| {
        let mut file = fs::File::create(tmp)?;
        file.write_all(&data)?;
        Ok(())
    })?;

    Ok(Stats {
        input_size: fs::metadata(input)?.len(),
        output_size: data.len() as u64,
        elapsed: started.elapsed(),
    })
}

// Produces the output under a temporary name and renames it into place, so a
// failed run never leaves a partial file at the destination.
fn write_atomic<F>(path: &Path, fill: F) -> Result<(), HuffError>
where
    F: FnOnce(&Path) -> Result<(), HuffError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir)?;
    fill(tmp.path())?;
    tmp.persist(path).map_err(|e| HuffError::Io(e.error))?;

    Ok(())
}

//! JSON-lines persistence of store contents.
//!
//! One instance per line:
//!
//! ```text
//! {"features":[{"name":"a","value":1.0}],"outcomes":["x"],"weight":0.0}
//! ```
//!
//! Instances are validated on the way in exactly as in
//! [`FeatureStore::add_instance`].

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Result, TcError};
use crate::instance::Instance;
use crate::store::FeatureStore;

/// Append the instances of a JSON-lines file to `store`.
pub fn read_instances<P: AsRef<Path>>(path: P, store: &mut dyn FeatureStore) -> Result<usize> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut added = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let instance: Instance = serde_json::from_str(&line).map_err(|e| {
            TcError::format(format!(
                "{}:{}: {e}",
                path.as_ref().display(),
                line_no + 1
            ))
        })?;
        store.add_instance(instance)?;
        added += 1;
    }
    log::debug!("read {added} instances from {}", path.as_ref().display());
    Ok(added)
}

/// Write every instance of `store` as one JSON line.
pub fn write_instances<P: AsRef<Path>>(path: P, store: &dyn FeatureStore) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    for instance in store.instances() {
        serde_json::to_writer(&mut writer, instance)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

use anyhow::Result;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Check that `path` exists and has a `.tsv` or `.csv` extension.
pub fn validate_tsv_or_csv_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let pb = PathBuf::from(path.as_ref());

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", pb.display()),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", pb.display());
    }

    Ok(())
}

/// Buffered writer to `path`, or to stdout when no path is given.
pub fn output_writer(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

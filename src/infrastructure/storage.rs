use std::ffi::OsStr;
use std::path::{Path, PathBuf};

const OUTPUT_SUFFIX: &str = "-inferido";
const PROGRESS_SUFFIX: &str = "-progreso";

/// `<stem>-inferido.<ext>` next to the input file.
pub fn output_path(input: &Path) -> PathBuf {
    let stem = file_stem(input);
    let file_name = match input.extension().and_then(OsStr::to_str) {
        Some(ext) => format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext),
        None => format!("{}{}", stem, OUTPUT_SUFFIX),
    };
    input.with_file_name(file_name)
}

/// `<stem>-progreso.txt` next to the input file, or
/// `<stem>-progreso-<run_id>.txt` when a run id is given.
pub fn progress_path(input: &Path, run_id: Option<&str>) -> PathBuf {
    let stem = file_stem(input);
    let file_name = match run_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("{}{}-{}.txt", stem, PROGRESS_SUFFIX, id),
        None => format!("{}{}.txt", stem, PROGRESS_SUFFIX),
    };
    input.with_file_name(file_name)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

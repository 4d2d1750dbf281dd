//! Process driver shared by the engine binaries.
//!
//! Each binary reads exactly one JSON document from stdin and writes exactly
//! one JSON document to stdout. Exit code 0 means a result document was
//! emitted (including `status = "infeasible"`); exit code 1 means the input
//! was malformed or the solve hit an internal anomaly, with a one-line
//! diagnostic on stderr. stdout never carries anything but the document.

use std::io::{Read, Write};

/// Run an engine against stdin/stdout and return the process exit code.
///
/// `engine` maps raw input bytes to the serialized result document, or to a
/// diagnostic message for the failure path.
pub fn run_engine<F>(engine: F) -> i32
where
    F: FnOnce(&[u8]) -> Result<String, String>,
{
    let mut input = Vec::new();
    if let Err(err) = std::io::stdin().read_to_end(&mut input) {
        eprintln!("error: failed to read stdin: {err}");
        return 1;
    }

    match engine(&input) {
        Ok(document) => {
            let mut stdout = std::io::stdout();
            if stdout
                .write_all(document.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .and_then(|_| stdout.flush())
                .is_err()
            {
                return 1;
            }
            log::debug!("emitted {} bytes", document.len() + 1);
            0
        }
        Err(diagnostic) => {
            eprintln!("error: {diagnostic}");
            1
        }
    }
}

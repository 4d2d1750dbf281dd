//! The `factory` binary: one JSON problem on stdin, one JSON result on
//! stdout. Exit 0 when a result document was emitted (feasible or not),
//! exit 1 with a stderr diagnostic for malformed input or solver anomalies.

use flowplan_core::cli::run_engine;

fn main() {
    let code = run_engine(|bytes| {
        let text =
            std::str::from_utf8(bytes).map_err(|err| format!("input is not UTF-8: {err}"))?;
        flowplan_factory::solve_json(text).map_err(|err| err.to_string())
    });
    std::process::exit(code);
}

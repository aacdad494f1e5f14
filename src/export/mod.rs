// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for read-only projections of the aggregated ResultInfo (JSON tree, CSV table)
// role: export/namespace
// outputs: Public submodules implementing each projection
// invariants: Exporters never mutate ResultInfo; build columns follow the given build list order
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod csv;
pub mod json_tree;

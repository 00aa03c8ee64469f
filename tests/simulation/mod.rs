//! Integration tests for simulator collaborators and grid evaluation


// PHREEQC file handling and the process-backed runner
#[cfg(feature = "phreeqc")]
mod phreeqc_tests;

use std::fs;
use std::path::{Path, PathBuf};

use ml4scm_rs::simulation::phreeqc::DEFAULT_SELECTED_OUTPUT;
use ml4scm_rs::simulation::selected_output::{filter_react_states, split_fields};
use ml4scm_rs::simulation::{Phreeqc, SelectedOutput};
use ml4scm_rs::Ml4ScmError;

const SELECTED_OUTPUT: &str = "\
         sim	       state	          pH	           U	          Ca
           1	      i_soln	        7.00	  0.0000e+00	  1.0000e-03
           1	       react	        3.56	  9.6316e-08	  2.9772e-09
           2	       react	        3.60	  9.1000e-08	  3.0000e-09
           2	      i_soln	        7.00	  0.0000e+00	  1.0000e-03
           3	       react	        3.71	  8.5000e-08	  3.1000e-09
";

fn analytes(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_filter_react_states() {
    let line = "           1\t       react\t        3.56\t  9.6316e-08\t  2.9772e-09\t  6.1726e-10 ";
    let rows = filter_react_states([line, line], 1).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], split_fields(line));
    assert_eq!(rows[0][..3], ["1", "react", "3.56"]);
}

#[test]
fn test_read_selected_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.sel");
    fs::write(&path, SELECTED_OUTPUT).unwrap();

    let output = SelectedOutput::read(&path, &analytes(&["U", "Ca"])).unwrap();
    assert_eq!(output.simulations, vec![1, 2, 3]);
    assert_eq!(output.values.dim(), (2, 3));
    assert_eq!(
        output.concentrations().to_vec(),
        vec![9.6316e-08, 9.1e-08, 8.5e-08, 2.9772e-09, 3.0e-09, 3.1e-09]
    );

    let default = Phreeqc::read_output(&path, None).unwrap();
    assert_eq!(default.analytes, analytes(&["U"]));
    assert_eq!(default.concentrations().len(), 3);
}

#[test]
fn test_missing_analyte_column() {
    let err = SelectedOutput::parse(SELECTED_OUTPUT, &analytes(&["Fe"])).unwrap_err();
    assert!(matches!(err, Ml4ScmError::MalformedOutput(_)));
}

#[test]
fn test_write_db_from_template() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("db");
    fs::write(
        dir.path().join("db.tpl"),
        "# template header\nSURFACE_MASTER_SPECIES\nHfo_s log_k K_STRONG\nHfo_w log_k K_WEAK\n",
    )
    .unwrap();

    let written = Phreeqc::write_db_from_template(
        &template,
        &analytes(&["K_STRONG", "K_WEAK"]),
        &[7.25, -0.5],
        None,
    )
    .unwrap();

    assert_eq!(written, dir.path().join("db.txt"));
    assert_eq!(
        fs::read_to_string(&written).unwrap(),
        "SURFACE_MASTER_SPECIES\nHfo_s log_k 7.25\nHfo_w log_k -0.5\n"
    );

    let other = dir.path().join("rendered");
    let written = Phreeqc::write_db_from_template(
        &template,
        &analytes(&["K_STRONG", "K_WEAK"]),
        &[1.0, 2.0],
        Some(other.as_path()),
    )
    .unwrap();
    assert_eq!(written, dir.path().join("rendered.txt"));
}

#[test]
fn test_find_selected_output_filename() {
    let dir = tempfile::tempdir().unwrap();

    let named = dir.path().join("named.pqi");
    fs::write(
        &named,
        "SOLUTION 1\n  pH 7\nSELECTED_OUTPUT\n    -file   uranium.sel\n    -totals U\nEND\n",
    )
    .unwrap();
    assert_eq!(
        Phreeqc::find_selected_output_filename(&named).unwrap(),
        PathBuf::from("uranium.sel")
    );

    let unnamed = dir.path().join("unnamed.pqi");
    fs::write(&unnamed, "SOLUTION 1\nSELECTED_OUTPUT\n    -totals U\nEND\n").unwrap();
    assert_eq!(
        Phreeqc::find_selected_output_filename(&unnamed).unwrap(),
        PathBuf::from(DEFAULT_SELECTED_OUTPUT)
    );
}

#[test]
fn test_run_phreeqc_requires_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let phreeqc = Phreeqc::new(Some(dir.path().join("phreeqc"))).unwrap();
    let err = phreeqc
        .run_phreeqc(
            &dir.path().join("missing.pqi"),
            &dir.path().join("out"),
            &dir.path().join("db.txt"),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, Ml4ScmError::InvalidInput(_)));
}

#[cfg(unix)]
mod runner {
    use super::*;
    use ml4scm_rs::parameters::{Bound, Problem};
    use ml4scm_rs::simulation::{SimulationRunner, Simulator};
    use ndarray::arr2;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;

    // Writing a script while another test thread forks can make exec fail
    // with ETXTBSY.
    static PROCESS_LOCK: Mutex<()> = Mutex::new(());

    /// Stand-in for the PHREEQC binary: writes a selected-output table whose
    /// react rows hold the rendered database contents.
    fn fake_phreeqc(dir: &Path, selected: &Path, exit_code: i32) -> PathBuf {
        let script = dir.join("phreeqc");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\nk=$(cat \"$3\")\nprintf 'sim state U\\n1 i_soln 0\\n1 react %s\\n2 react %s\\n' \"$k\" \"$k\" > '{}'\necho run >&2\nexit {}\n",
                selected.display(),
                exit_code
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    fn problem(dir: &Path, selected: &Path) -> Problem {
        fs::write(dir.join("db.tpl"), "# header\nK_U").unwrap();
        let input = dir.join("input.pqi");
        fs::write(
            &input,
            format!("SELECTED_OUTPUT\n  -file {}\nEND\n", selected.display()),
        )
        .unwrap();

        Problem::new(
            vec!["K_U".to_string()],
            vec![Bound::new(0.0, 1.0).unwrap()],
            1,
            input,
            dir.join("output.out"),
            dir.join("db"),
        )
        .unwrap()
    }

    #[test]
    fn test_simulation_runner_renders_and_reads_each_member() {
        let _guard = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let selected = dir.path().join("out.sel");
        let phreeqc = Phreeqc::new(Some(fake_phreeqc(dir.path(), &selected, 0))).unwrap();
        let runner = SimulationRunner::new(phreeqc);

        let values = arr2(&[[0.25], [0.75]]);
        let results = runner
            .run_problem(&problem(dir.path(), &selected), values.view(), &analytes(&["U"]))
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].simulation_id, 0);
        assert_eq!(results[0].concentrations.to_vec(), vec![0.25, 0.25]);
        assert_eq!(results[1].concentrations.to_vec(), vec![0.75, 0.75]);
    }

    #[test]
    fn test_failed_process_is_reported() {
        let _guard = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let selected = dir.path().join("out.sel");
        let phreeqc = Phreeqc::new(Some(fake_phreeqc(dir.path(), &selected, 3))).unwrap();
        let runner = SimulationRunner::new(phreeqc);

        let values = arr2(&[[0.5]]);
        let err = runner
            .run_problem(&problem(dir.path(), &selected), values.view(), &analytes(&["U"]))
            .unwrap_err();
        match err {
            Ml4ScmError::SimulatorFailed { stderr, .. } => assert_eq!(stderr.trim(), "run"),
            other => panic!("unexpected error: {}", other),
        }
    }
}

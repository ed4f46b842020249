/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use mcc::file_reader::{FileReader, MockFileReader, NativeFileReader};

#[test]
fn minimal_main_compiles_and_returns_zero() {
    let asm = mcc::run_asm("t.mc", "int main(){return 0;}").unwrap();
    assert!(asm.contains("main:"));
    assert!(asm.contains("$0"));
}

#[test]
fn wrong_main_signature_is_rejected() {
    let err = mcc::run_check("t.mc", "float main(){return 0;}").unwrap_err();
    assert!(err.to_string().contains("Main has wrong signature"));
}

#[test]
fn duplicate_function_definitions_are_rejected() {
    let src = "int main(){return 0;} int foo(){return 0;} int foo(){return 1;}";
    let err = mcc::run_check("t.mc", src).unwrap_err();
    assert!(err.to_string().contains("foo"));
}

#[test]
fn inner_shadow_gets_its_own_slot_and_name() {
    let src = "int main(){ int x; x = 1; { int x; x = 2; } return x; }";
    let ir = mcc::run_ir("t.mc", src).unwrap();
    assert!(ir.contains("_r0"));
    assert!(mcc::run_check("t.mc", src).is_ok());
}

#[test]
fn recursive_factorial_pushes_before_call() {
    let src = "int fact(int n){ if (n<2) return 1; return n*fact(n-1); } int main(){ return fact(5); }";
    let ir = mcc::run_ir("t.mc", src).unwrap();
    let lines: Vec<&str> = ir.lines().collect();
    let call_idx = lines.iter().position(|l| l.contains("CALL")).expect("a call row exists");
    assert!(lines[call_idx - 1].contains("PUSH"));
    assert_eq!(lines.iter().filter(|l| l.contains("LABEL") && !l.contains("FUNC_LABEL")).count(), 1);
}

#[test]
fn while_loop_builds_a_cfg_with_a_back_edge() {
    let src = "int f(){ int i; i=0; while(i<10){ i=i+1; } return i; }";
    let cfg = mcc::run_cfg("t.mc", src).unwrap();
    assert!(cfg.starts_with("digraph cfg {"));

    let node_count = cfg.lines().filter(|l| l.contains("[label=")).count();
    assert!(node_count >= 4, "expected at least 4 basic blocks, got {node_count}");

    let block_id = |s: &str| -> usize { s.trim().trim_end_matches(';').trim_start_matches('b').parse().unwrap() };
    let has_back_edge = cfg.lines().filter(|l| l.trim_start().starts_with("b") && l.contains("->")).any(|l| {
        let mut parts = l.split("->");
        let from = block_id(parts.next().unwrap());
        let to = block_id(parts.next().unwrap());
        to < from
    });
    assert!(has_back_edge, "expected a back edge into the loop header block:\n{cfg}");
}

#[test]
fn shadow_rename_and_implicit_return_are_idempotent_on_rebuild() {
    let src = "void f(){ int x; { int x; } } int main(){ return 0; }";
    let first = mcc::run_ir("t.mc", src).unwrap();
    let second = mcc::run_ir("t.mc", src).unwrap();
    assert_eq!(first, second);
}

#[test]
fn native_file_reader_reads_a_real_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.mc");
    std::fs::write(&path, "int main(){return 0;}").unwrap();

    let reader = NativeFileReader;
    let contents = reader.read_to_string(&path).unwrap();
    assert!(contents.contains("main"));
}

#[test]
fn mock_file_reader_round_trips_through_the_pipeline() {
    let mut reader = MockFileReader::default();
    reader.add_file("prog.mc", "int main(){return 0;}");

    let (name, source) = mcc::read_input(Some(std::path::Path::new("prog.mc")), &reader).unwrap();
    assert_eq!(name, "prog.mc");
    assert!(mcc::run_asm(&name, &source).is_ok());
}

#[test]
fn mock_file_reader_reports_missing_files() {
    let reader = MockFileReader::default();
    let result = mcc::read_input(Some(std::path::Path::new("missing.mc")), &reader);
    assert!(result.is_err());
}

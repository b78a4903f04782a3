use chainkit_core::{FiniteDistribution, NonTerminal, State, Terminal};
use chainkit_dp::{ModelError, ModelSpec};

const VALID_MODEL_YAML: &str = r#"
version: 1
states:
  - id: s0
    terminal: false
    actions:
      - id: a0
        outcomes:
          - next: s1
            prob: 0.7
            reward: 1.0
          - next: s0
            prob: 0.3
            reward: 0.0
      - id: a1
        outcomes:
          - next: s2
            prob: 1.0
            reward: -0.2
  - id: s1
    terminal: true
  - id: s2
    terminal: true
"#;

#[test]
fn yaml_parse_and_build_success() {
    let spec: ModelSpec = serde_yaml::from_str(VALID_MODEL_YAML).expect("valid yaml");
    let mdp = spec.build().expect("build should succeed");

    let states: Vec<&String> = mdp.non_terminal_states().map(|s| &s.0).collect();
    assert_eq!(states, vec!["s0"]);

    let actions: Vec<&String> = mdp
        .actions(&NonTerminal("s0".to_string()))
        .expect("s0 is a source")
        .collect();
    assert_eq!(actions, vec!["a0", "a1"]);

    let action_map = mdp
        .action_map(&NonTerminal("s0".to_string()))
        .expect("s0 is a source");
    let a0 = action_map.get("a0").expect("a0 is declared");

    let sum: f64 = a0.table().iter().map(|(_, p)| p).sum();
    assert!((sum - 1.0).abs() <= 1e-9);

    let to_s1 = (State::Terminal(Terminal("s1".to_string())), 1.0);
    assert!((a0.probability(&to_s1) - 0.7).abs() <= 1e-9);
}

#[test]
fn validation_fails_for_probability_sum() {
    let yaml = r#"
states:
  - id: s0
    actions:
      - id: a0
        outcomes:
          - next: s0
            prob: 0.9
            reward: 1.0
"#;

    let spec: ModelSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.build().expect_err("build should fail");

    assert!(matches!(err, ModelError::ProbabilitySum { .. }));
}

#[test]
fn validation_fails_for_unknown_state_reference() {
    let yaml = r#"
states:
  - id: s0
    actions:
      - id: a0
        outcomes:
          - next: missing
            prob: 1.0
            reward: 1.0
"#;

    let spec: ModelSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.build().expect_err("build should fail");

    assert!(matches!(err, ModelError::UnknownNextState { .. }));
}

#[test]
fn validation_fails_for_terminal_state_with_actions() {
    let yaml = r#"
states:
  - id: s0
    terminal: true
    actions:
      - id: a0
        outcomes:
          - next: s0
            prob: 1.0
            reward: 0.0
"#;

    let spec: ModelSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.validate().expect_err("validation should fail");

    assert!(matches!(err, ModelError::TerminalStateHasActions { .. }));
}

#[test]
fn validation_fails_for_actionless_source_state() {
    let yaml = r#"
states:
  - id: s0
    terminal: false
"#;

    let spec: ModelSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.validate().expect_err("validation should fail");

    assert!(matches!(err, ModelError::MissingActions { .. }));
}

#[test]
fn validation_fails_for_negative_probability() {
    let yaml = r#"
states:
  - id: s0
    actions:
      - id: a0
        outcomes:
          - next: s0
            prob: -0.25
            reward: 0.0
          - next: s0
            prob: 1.25
            reward: 0.0
"#;

    let spec: ModelSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.validate().expect_err("validation should fail");

    assert!(matches!(err, ModelError::InvalidProbability { .. }));
}

#[test]
fn validation_fails_for_duplicate_state_id() {
    let yaml = r#"
states:
  - id: s0
    actions:
      - id: a0
        outcomes:
          - next: s0
            prob: 1.0
            reward: 0.0
  - id: s0
    terminal: true
"#;

    let spec: ModelSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.validate().expect_err("validation should fail");

    assert!(matches!(err, ModelError::DuplicateStateId { .. }));
}

use compiler::{entry_point, register_environments, Pass, NO_EFFECT_KEY};
use gym::{EnvError, EpisodeState, ResetOptions, UsageError};
use registry::{EnvSpec, MakeError, MakeOptions, Registry};

fn registry() -> Registry {
    let mut registry = Registry::new();
    register_environments(&mut registry).unwrap();
    registry
}

#[test]
fn builtin_ids_are_registered_in_order() {
    let registry = registry();
    let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
    assert_eq!(ids, ["llvm-v0", "llvm-autophase-ic-v0", "llvm-ic-v0"]);
    assert!(register_environments(&mut Registry::new()).is_ok());

    let mut twice = registry;
    assert!(register_environments(&mut twice).is_err());
    assert_eq!(twice.len(), 3);
}

#[test]
fn custom_id_with_autophase_observes_56_features() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    registry.register(
        EnvSpec::new("demo-v0", entry_point())
            .observation_space("Autophase")
            .reward_space("IrInstructionCount"),
    )?;
    let mut env = registry.make("demo-v0", MakeOptions::default())?;
    let obs = env.reset(&ResetOptions::default())?;
    assert_eq!(obs.shape(), &[56]);
    assert_eq!(env.observation_space().shape, vec![56]);
    assert_eq!(env.action_space().n(), Pass::ALL.len());
    Ok(())
}

#[test]
fn round_robin_reaches_done_with_zero_sentinel() -> anyhow::Result<()> {
    let registry = registry();
    let mut env = registry.make("llvm-autophase-ic-v0", MakeOptions::default())?;
    env.reset(&ResetOptions::default())?;

    let n = env.action_space().n();
    let mut last = None;
    for step in 0..10_000 {
        let result = env.step(step % n)?;
        assert_eq!(result.observation.shape(), &[56]);
        assert!(result.reward.is_finite());
        if result.done {
            last = Some(result);
            break;
        }
    }
    let last = last.expect("episode never ended");
    assert!(last.observation.is_zero());
    assert!(!last.truncated());
    assert_eq!(env.state(), EpisodeState::Done);

    let err = env.step(0).unwrap_err();
    assert!(matches!(err, EnvError::Usage(UsageError::EpisodeDone)), "got {err:?}");
    Ok(())
}

#[test]
fn no_effect_actions_are_flagged() -> anyhow::Result<()> {
    let registry = registry();
    let mut env = registry.make("llvm-v0", MakeOptions::default())?;
    env.reset(&ResetOptions::default())?;
    let dce = env.action_space().index_of("-dce").unwrap();
    let first = env.step(dce)?;
    if !first.done {
        let second = env.step(dce)?;
        assert_eq!(second.info[NO_EFFECT_KEY], serde_json::Value::Bool(true));
        assert!(second.reward.abs() < f64::EPSILON);
    }
    Ok(())
}

#[test]
fn unknown_id_is_reported() {
    let registry = registry();
    let err = registry.make("llvm-v99", MakeOptions::default()).unwrap_err();
    match err {
        MakeError::UnknownEnvironment { id, similar } => {
            assert_eq!(id, "llvm-v99");
            assert_eq!(similar, ["llvm-v0"]);
        }
        other => panic!("expected unknown environment, got {other}"),
    }
}

#[test]
fn invalid_overrides_fail_at_make() {
    let registry = registry();
    for options in [
        MakeOptions::default().observation_space("Pixels"),
        MakeOptions::default().reward_space("Runtime"),
        MakeOptions::default().benchmark("cbench-v1/doom"),
    ] {
        let err = registry.make("llvm-v0", options).unwrap_err();
        assert!(matches!(err, MakeError::Construction { .. }), "got {err}");
    }
}

#[test]
fn overrides_select_spaces_and_benchmark() -> anyhow::Result<()> {
    let registry = registry();
    let options = MakeOptions::from_json(
        r#"{"benchmark": "benchmark://rand-v0/7", "observation_space": "IrInstructionCount"}"#,
    )?;
    let mut env = registry.make("llvm-ic-v0", options)?;
    assert_eq!(env.benchmark(), "benchmark://rand-v0/7");
    assert_eq!(env.reward_space().name, "IrInstructionCountOz");
    let obs = env.reset(&ResetOptions::default())?;
    assert_eq!(obs.shape(), &[1]);

    let obs = env.reset(&ResetOptions::with_benchmark("cbench-v1/bzip2"))?;
    assert_eq!(obs.shape(), &[1]);
    assert_eq!(env.benchmark(), "benchmark://cbench-v1/bzip2");
    Ok(())
}

#[test]
fn reset_to_unknown_benchmark_fails() -> anyhow::Result<()> {
    let registry = registry();
    let mut env = registry.make("llvm-v0", MakeOptions::default())?;
    let err = env
        .reset(&ResetOptions::with_benchmark("cbench-v1/doom"))
        .unwrap_err();
    match err {
        EnvError::Provider(msg) => assert!(msg.contains("unknown benchmark"), "{msg}"),
        other => panic!("expected provider error, got {other:?}"),
    }
    Ok(())
}

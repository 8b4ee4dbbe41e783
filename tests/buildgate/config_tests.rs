// tests/buildgate/config_tests.rs

#[cfg(test)]
mod tests {

    use crate::fixtures::stub_compiler::StubCompiler;
    use crate::fixtures::test_clock::TestClock;
    use dwell_gate::{
        BuildGate, BuildGateError, DWELL_INTERVAL_PARAM, GateConfig, ONLY_RUN_KEY_PARAM,
        ONLY_RUN_VALUE_PARAM, RETHROW_EXCEPTIONS_PARAM,
    };
    use std::collections::HashMap;
    use std::time::Duration;

    fn init_params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn gate_built_from_init_params_honors_them() {
        let params = init_params(&[
            (DWELL_INTERVAL_PARAM, "2000"),
            (ONLY_RUN_KEY_PARAM, "unit_test_environment"),
            (ONLY_RUN_VALUE_PARAM, "development"),
            (RETHROW_EXCEPTIONS_PARAM, "true"),
        ]);
        let config = GateConfig::from_params(|name| params.get(name).cloned()).unwrap();

        let clock = TestClock::new(0);
        let compiler = StubCompiler::new();
        let gate = BuildGate::with_config(config, compiler.clone(), clock.clone()).unwrap();
        gate.properties().set("unit_test_environment", "development");

        gate.handle(|| ()).unwrap();
        clock.set_millis(1000);
        gate.handle(|| ()).unwrap();
        assert_eq!(compiler.calls(), 1);

        clock.set_millis(2000);
        gate.handle(|| ()).unwrap();
        assert_eq!(compiler.calls(), 2);
        assert!(gate.config().rethrows_failures());
    }

    #[test]
    fn builder_and_params_agree() {
        let params = init_params(&[(DWELL_INTERVAL_PARAM, "1500"), (RETHROW_EXCEPTIONS_PARAM, "false")]);
        let parsed = GateConfig::from_params(|name| params.get(name).cloned()).unwrap();
        let built = GateConfig::new().dwell_interval(Duration::from_millis(1500));
        assert_eq!(parsed, built);
    }

    #[test]
    fn gate_rejects_a_key_without_a_value() {
        let params = init_params(&[(ONLY_RUN_KEY_PARAM, "env")]);
        let result = GateConfig::from_params(|name| params.get(name).cloned());
        assert!(matches!(
            result,
            Err(BuildGateError::MissingOnlyRunWhenValue { key }) if key == "env"
        ));
    }

    #[test]
    fn invalid_config_never_produces_a_gate() {
        let config = GateConfig::new().wait_timeout(Duration::ZERO);
        let result = BuildGate::with_config(config, StubCompiler::new(), TestClock::new(0));
        assert!(matches!(result, Err(BuildGateError::InvalidWaitTimeout)));
    }

    #[cfg(unix)]
    #[test]
    fn command_compiler_drives_the_gate() {
        use dwell_gate::CommandCompiler;

        let compiler = CommandCompiler::new("sh").args(["-c", "echo 'Invalid CSS' >&2; exit 1"]);
        let config = GateConfig::new().rethrow_failures(true);
        let gate = BuildGate::with_config(config, compiler, TestClock::new(0)).unwrap();

        let error = gate.handle(|| ()).unwrap_err();
        assert!(matches!(error, BuildGateError::Build(_)));
        assert!(!gate.is_build_in_flight());
    }
}

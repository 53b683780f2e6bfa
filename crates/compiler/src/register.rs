use std::sync::Arc;

use gym::Environment;
use registry::{EntryPoint, EnvKwargs, EnvSpec, MakeOptions, Registry, RegistrationError};

use crate::benchmark::DEFAULT_BENCHMARK;
use crate::CompilerEnv;

/// Constructor for compiler sessions, for registering custom ids.
#[must_use]
pub fn entry_point() -> EntryPoint {
    Arc::new(|options: &MakeOptions| {
        CompilerEnv::from_options(options).map(|env| Box::new(env) as Box<dyn Environment>)
    })
}

/// Registers the built-in `llvm-*` environments.
///
/// # Errors
///
/// Fails if any of the ids is already taken.
pub fn register_environments(registry: &mut Registry) -> Result<(), RegistrationError> {
    let kwargs = EnvKwargs { benchmark: Some(DEFAULT_BENCHMARK.to_string()) };

    registry.register(EnvSpec::new("llvm-v0", entry_point()).kwargs(kwargs.clone()))?;
    registry.register(
        EnvSpec::new("llvm-autophase-ic-v0", entry_point())
            .observation_space("Autophase")
            .reward_space("IrInstructionCountOz")
            .kwargs(kwargs.clone()),
    )?;
    registry.register(
        EnvSpec::new("llvm-ic-v0", entry_point())
            .observation_space("InstCount")
            .reward_space("IrInstructionCountOz")
            .kwargs(kwargs),
    )?;
    Ok(())
}

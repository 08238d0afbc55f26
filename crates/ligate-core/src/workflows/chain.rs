use crate::engine::builder::{ChainAssembly, ChainBuilder};
use crate::engine::config::ChainConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::registry::FragmentRegistry;
use tracing::{info, instrument};

/// Assembles a capped linear chain.
///
/// This is the user-facing construction surface: given a validated recipe
/// and a fragment registry, it drives the chain builder through its phases
/// (front cap, repeat units, terminal cap) and returns the finished,
/// read-only assembly. A chain length of 1 performs no unit-to-unit fusion
/// but still receives both caps.
///
/// # Errors
///
/// Returns `InvalidParameter` for a chain length below 1, `UnknownFragment`
/// for recipe names missing from the registry, and propagates any engine
/// error from the underlying fusions unchanged.
#[instrument(skip_all, name = "chain_workflow")]
pub fn run(
    config: &ChainConfig,
    registry: &FragmentRegistry,
    reporter: &ProgressReporter,
) -> Result<ChainAssembly, EngineError> {
    reporter.report(Progress::PhaseStart { name: "Setup" });
    info!(
        chain_length = config.chain_length,
        unit = %config.unit,
        cap = %config.cap,
        "Starting chain assembly."
    );
    let mut builder = ChainBuilder::new(config, registry)?;
    builder.start()?;
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Chain growth",
    });
    for index in 0..config.chain_length {
        builder.add_unit()?;
        reporter.report(Progress::UnitFused {
            index,
            total: config.chain_length,
        });
    }
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Capping" });
    builder.cap_end()?;
    builder.finalize()?;
    reporter.report(Progress::PhaseFinish);

    let assembly = builder.into_result()?;
    info!(
        units = assembly.units.len(),
        particles = assembly.structure.particles_of(assembly.root).count(),
        bonds = assembly.structure.bonds().len(),
        "Chain assembly finished."
    );
    Ok(assembly)
}

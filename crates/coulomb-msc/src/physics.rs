//! Read-only physics tables shared by all workers.
//!
//! [`SharedTables::build`] runs once, single-threaded, before transport
//! starts. The result is wrapped in an `Arc` and handed to every
//! [`WentzelStepper`](crate::WentzelStepper). Entries that were not built
//! up front are filled on first use, at most once per entry.

use std::sync::Arc;

use coulomb_core::{CoupleTable, DiagnosticsSink, ParticleDef, Verbosity};
use coulomb_xs::{CrossSectionEvaluator, SecondMomentTable, TransportTable, WentzelKernel};
use indexmap::IndexMap;

use crate::config::{ConfigError, MscConfig};

/// Transport and second-moment tables of one particle species.
#[derive(Debug)]
pub struct SpeciesTables {
    particle: ParticleDef,
    transport: TransportTable,
    second_moment: SecondMomentTable,
}

impl SpeciesTables {
    /// The species.
    pub fn particle(&self) -> &ParticleDef {
        &self.particle
    }

    /// Inverse transport mean free path table.
    pub fn transport(&self) -> &TransportTable {
        &self.transport
    }

    /// Second transport moment table.
    pub fn second_moment(&self) -> &SecondMomentTable {
        &self.second_moment
    }
}

/// Couple table, evaluator and per-species tables.
#[derive(Debug)]
pub struct SharedTables {
    couples: Arc<CoupleTable>,
    evaluator: CrossSectionEvaluator,
    species: IndexMap<i32, SpeciesTables>,
}

impl SharedTables {
    /// Validate `config` and build the tables of every species in
    /// `particles` over every density index of `couples`.
    ///
    /// Duplicate species are built once.
    pub fn build(
        couples: Arc<CoupleTable>,
        particles: &[ParticleDef],
        config: &MscConfig,
    ) -> Result<Self, ConfigError> {
        Self::build_with_diagnostics(couples, particles, config, None)
    }

    /// [`build`](Self::build), reporting progress to `sink` at
    /// [`Verbosity::Summary`] and above.
    pub fn build_with_diagnostics(
        couples: Arc<CoupleTable>,
        particles: &[ParticleDef],
        config: &MscConfig,
        mut sink: Option<&mut dyn DiagnosticsSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if particles.is_empty() {
            return Err(ConfigError::NoParticles);
        }
        let grid = config.table.grid()?;
        let evaluator = CrossSectionEvaluator::new(
            WentzelKernel::new(config.polar_angle_limit, config.combined),
            config.low_energy_limit,
            config.high_energy_limit,
        );

        let density_count = couples.density_index_count();
        let mut species = IndexMap::new();
        for particle in particles {
            if species.contains_key(&particle.pdg) {
                continue;
            }
            let tables = SpeciesTables {
                particle: *particle,
                transport: TransportTable::new(
                    evaluator,
                    *particle,
                    grid,
                    density_count,
                    config.fixed_cut,
                ),
                second_moment: SecondMomentTable::new(
                    evaluator,
                    *particle,
                    grid,
                    density_count,
                    config.fixed_cut,
                    config.use_second_moment,
                ),
            };
            tables.transport.build_all(&couples);
            tables.second_moment.build_all(&couples);
            if config.verbosity >= Verbosity::Summary {
                if let Some(sink) = sink.as_deref_mut() {
                    sink.write_line(format_args!(
                        "tables built for {particle}: {density_count} density indices, {} bins, second moment {}",
                        grid.bins(),
                        if config.use_second_moment { "on" } else { "off" },
                    ));
                }
            }
            species.insert(particle.pdg, tables);
        }

        Ok(Self {
            couples,
            evaluator,
            species,
        })
    }

    /// The couple table the tables were built for.
    pub fn couples(&self) -> &Arc<CoupleTable> {
        &self.couples
    }

    /// The shared cross-section evaluator.
    pub fn evaluator(&self) -> &CrossSectionEvaluator {
        &self.evaluator
    }

    /// Tables of `particle`'s species, if built.
    pub fn species(&self, particle: &ParticleDef) -> Option<&SpeciesTables> {
        self.species.get(&particle.pdg)
    }

    /// All species in build order.
    pub fn particles(&self) -> impl Iterator<Item = &ParticleDef> {
        self.species.values().map(|s| &s.particle)
    }

    /// Drop every built entry; later lookups recompute.
    ///
    /// Needs exclusive access, so it can only happen between steps
    /// (e.g. via `Arc::get_mut` once workers have released the tables).
    pub fn force_rebuild(&mut self) {
        for tables in self.species.values_mut() {
            tables.transport.force_rebuild();
            tables.second_moment.force_rebuild();
        }
    }
}

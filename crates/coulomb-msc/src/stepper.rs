//! The per-worker scattering stepper.
//!
//! A [`WentzelStepper`] is driven by a tracking manager:
//!
//! 1. [`start_tracking`](WentzelStepper::start_tracking) once per track;
//! 2. per step, [`compute_true_path_length_limit`] proposes a step (and
//!    its geometric image, via [`compute_geom_path_length`]);
//! 3. after the navigator clips the geometric step,
//!    [`compute_true_step_length`] converts it back;
//! 4. [`sample_scattering`] draws the new direction and displacement.
//!
//! Everything mutable (material cache, step kinematics, working set) is
//! private to the stepper; the physics tables are shared read-only.
//!
//! [`compute_true_path_length_limit`]: WentzelStepper::compute_true_path_length_limit
//! [`compute_geom_path_length`]: WentzelStepper::compute_geom_path_length
//! [`compute_true_step_length`]: WentzelStepper::compute_true_step_length
//! [`sample_scattering`]: WentzelStepper::sample_scattering

use std::fmt;
use std::sync::Arc;

use coulomb_core::{
    DiagnosticsSink, EnergyLossTables, GeometryNavigator, MaterialCutsCouple, ParticleDef, Vec3,
    Verbosity,
};
use coulomb_xs::{CrossSectionEvaluator, SecondMomentTable, SetKey, SingleScatteringSet};
use rand::Rng;

use crate::config::{ConfigError, MscConfig, StepLimitType};
use crate::material_cache::MaterialCache;
use crate::metrics::StepMetrics;
use crate::path_length::PathLengthConverter;
use crate::physics::{SharedTables, SpeciesTables};
use crate::sampler::{
    sample_step, select_mode, ModeInputs, ModeThresholds, ScatteringMode, ScatteringOutcome,
    StepSample,
};
use crate::track::{PreStepPoint, StepLimit, StepStatus};

/// Steps are limited to this many radiation lengths (divided by the
/// geometry factor).
const RADIATION_LENGTHS_PER_STEP: f64 = 50.0;

/// Displacements longer than the safety are scaled to this fraction of it.
const DISPLACEMENT_SAFETY_FRACTION: f64 = 0.99;

/// Kinematics of the step in progress.
#[derive(Clone, Copy, Debug)]
struct StepState {
    pre_energy: f64,
    eff_energy: f64,
    true_length: f64,
    geom_length: f64,
    lambda: f64,
    range: f64,
    cos_tet_max_nuc: f64,
    safety: f64,
    inside: bool,
    mode: ScatteringMode,
}

impl StepState {
    const EMPTY: StepState = StepState {
        pre_energy: 0.0,
        eff_energy: 0.0,
        true_length: 0.0,
        geom_length: 0.0,
        lambda: f64::INFINITY,
        range: 0.0,
        cos_tet_max_nuc: 1.0,
        safety: 0.0,
        inside: false,
        mode: ScatteringMode::Single,
    };
}

/// Wentzel-VI multiple/single Coulomb scattering stepper for one worker.
pub struct WentzelStepper {
    config: MscConfig,
    thresholds: ModeThresholds,
    inv_ss_factor: f64,
    tables: Arc<SharedTables>,
    energy_loss: Arc<dyn EnergyLossTables>,
    navigator: Option<Box<dyn GeometryNavigator>>,
    diagnostics: Option<Box<dyn DiagnosticsSink>>,
    particle: Option<ParticleDef>,
    cache: MaterialCache,
    working_set: SingleScatteringSet,
    step: StepState,
    metrics: StepMetrics,
}

impl fmt::Debug for WentzelStepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WentzelStepper")
            .field("config", &self.config)
            .field("particle", &self.particle)
            .field("couple", &self.cache.fingerprint())
            .field("has_navigator", &self.navigator.is_some())
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

fn report(
    sink: &mut Option<Box<dyn DiagnosticsSink>>,
    verbosity: Verbosity,
    level: Verbosity,
    args: fmt::Arguments<'_>,
) {
    if verbosity >= level {
        if let Some(sink) = sink.as_mut() {
            sink.write_line(args);
        }
    }
}

impl WentzelStepper {
    /// Create a stepper reading `tables` and the range tables of
    /// `energy_loss`.
    pub fn new(
        config: MscConfig,
        tables: Arc<SharedTables>,
        energy_loss: Arc<dyn EnergyLossTables>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            thresholds: ModeThresholds::from(&config),
            inv_ss_factor: 1.0 / (config.single_scattering_factor - 0.05),
            config,
            tables,
            energy_loss,
            navigator: None,
            diagnostics: None,
            particle: None,
            cache: MaterialCache::new(),
            working_set: SingleScatteringSet::new(),
            step: StepState::EMPTY,
            metrics: StepMetrics::default(),
        })
    }

    /// A fresh stepper for another worker thread.
    ///
    /// Shares this stepper's tables, energy-loss collaborator and current
    /// configuration. Navigator, diagnostics, caches and metrics are not
    /// carried over.
    pub fn for_worker(&self) -> Self {
        Self {
            config: self.config.clone(),
            thresholds: self.thresholds,
            inv_ss_factor: self.inv_ss_factor,
            tables: Arc::clone(&self.tables),
            energy_loss: Arc::clone(&self.energy_loss),
            navigator: None,
            diagnostics: None,
            particle: None,
            cache: MaterialCache::new(),
            working_set: SingleScatteringSet::new(),
            step: StepState::EMPTY,
            metrics: StepMetrics::default(),
        }
    }

    /// Attach the navigator used for safety and boundary queries.
    pub fn with_navigator(mut self, navigator: Box<dyn GeometryNavigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Attach a diagnostics sink, used according to the configured
    /// verbosity.
    pub fn with_diagnostics(mut self, sink: Box<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Current configuration.
    pub fn config(&self) -> &MscConfig {
        &self.config
    }

    /// The shared tables.
    pub fn tables(&self) -> &Arc<SharedTables> {
        &self.tables
    }

    /// The cross-section evaluator.
    pub fn evaluator(&self) -> &CrossSectionEvaluator {
        self.tables.evaluator()
    }

    /// Second-moment table of `particle`'s species, if built.
    pub fn second_moment_table(&self, particle: &ParticleDef) -> Option<&SecondMomentTable> {
        self.tables.species(particle).map(SpeciesTables::second_moment)
    }

    /// Counters accumulated so far.
    pub fn metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Species being tracked, if any.
    pub fn particle(&self) -> Option<&ParticleDef> {
        self.particle.as_ref()
    }

    /// Mode chosen for the current step.
    pub fn mode(&self) -> ScatteringMode {
        self.step.mode
    }

    // ── Settings ───────────────────────────────────────────────────

    /// Electron cut replacing every couple's cut in per-step quantities.
    ///
    /// Tables keep the cut they were built with, so within one step λ and
    /// the path-length conversion follow the tables' cut while the working
    /// set and the condensed transport below the single-scattering
    /// threshold follow this one.
    pub fn set_fixed_cut(&mut self, cut: Option<f64>) {
        if let Some(value) = cut {
            assert!(
                value.is_finite() && value >= 0.0,
                "fixed cut must be finite and >= 0, got {value}"
            );
        }
        self.config.fixed_cut = cut;
        self.working_set.invalidate();
    }

    /// The fixed electron cut, if set.
    pub fn fixed_cut(&self) -> Option<f64> {
        self.config.fixed_cut
    }

    /// Enable or disable the second-moment correction.
    pub fn set_use_second_moment(&mut self, enabled: bool) {
        self.config.use_second_moment = enabled;
    }

    /// Whether the second-moment correction is enabled.
    pub fn use_second_moment(&self) -> bool {
        self.config.use_second_moment
    }

    /// Set the single-scattering factor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SingleScatteringFactor`] unless the value
    /// is finite and exceeds 0.05; the previous value is kept.
    pub fn set_single_scattering_factor(&mut self, factor: f64) -> Result<(), ConfigError> {
        if !factor.is_finite() || factor <= 0.05 {
            return Err(ConfigError::SingleScatteringFactor { value: factor });
        }
        self.config.single_scattering_factor = factor;
        self.inv_ss_factor = 1.0 / (factor - 0.05);
        Ok(())
    }

    // ── Particle and material ──────────────────────────────────────

    /// Begin a new track of `particle`.
    ///
    /// # Panics
    ///
    /// Panics if no tables were built for the species.
    pub fn start_tracking(&mut self, particle: &ParticleDef) {
        self.setup_particle(particle);
        self.step = StepState::EMPTY;
        report(
            &mut self.diagnostics,
            self.config.verbosity,
            Verbosity::Summary,
            format_args!("start tracking {particle}"),
        );
    }

    fn setup_particle(&mut self, particle: &ParticleDef) {
        if self.particle.is_some_and(|p| p.same_species(particle)) {
            return;
        }
        assert!(
            self.tables.species(particle).is_some(),
            "no tables built for particle {particle}"
        );
        self.particle = Some(*particle);
        self.working_set.invalidate();
        self.metrics.particle_setups += 1;
    }

    fn current_particle(&self) -> ParticleDef {
        match self.particle {
            Some(p) => p,
            None => panic!("no particle set: call start_tracking first"),
        }
    }

    fn species_tables(&self) -> &SpeciesTables {
        let particle = self.current_particle();
        match self.tables.species(&particle) {
            Some(t) => t,
            None => panic!("no tables built for particle {particle}"),
        }
    }

    fn define_material(&mut self, couple: &Arc<MaterialCutsCouple>) {
        assert!(
            couple.fingerprint().table == self.tables.couples().instance_id(),
            "couple {} does not belong to the couple table the physics tables were built for",
            couple.fingerprint()
        );
        if self.cache.define_material(couple) {
            self.working_set.invalidate();
            self.metrics.material_refreshes += 1;
        }
    }

    fn electron_cut(&self, couple: &MaterialCutsCouple) -> f64 {
        self.config
            .fixed_cut
            .unwrap_or(couple.cuts().electron_energy)
    }

    fn mean_free_path(&self, couple: &MaterialCutsCouple, energy: f64) -> f64 {
        self.species_tables()
            .transport()
            .mean_free_path(couple, energy)
    }

    fn cos_tet_max_nuc(&self, couple: &MaterialCutsCouple, energy: f64) -> f64 {
        self.tables
            .evaluator()
            .kinematics(&self.current_particle(), energy, couple.material())
            .cos_tet_max_nuc()
    }

    /// Fill the working set for `energy` and threshold `cos_theta_min`
    /// unless it already is; returns (hard cross section, transport
    /// coefficient below the threshold).
    fn fill_working_set(&mut self, energy: f64, cos_theta_min: f64) -> (f64, f64) {
        let couple = Arc::clone(self.cache.couple());
        let key = SetKey {
            couple: couple.fingerprint(),
            energy,
            cos_theta_min,
        };
        if !self.working_set.is_current(&key) {
            let evaluator = *self.tables.evaluator();
            let particle = self.current_particle();
            let cut = self.electron_cut(&couple);
            let kin = evaluator.kinematics(&particle, energy, couple.material());
            evaluator.transport_cross_section_per_volume(
                &kin,
                couple.material(),
                cut,
                cos_theta_min,
                &mut self.working_set,
            );
            self.working_set.finish(key);
            self.metrics.working_set_fills += 1;
        }
        (self.working_set.total(), self.working_set.transport())
    }

    // ── Cross sections ─────────────────────────────────────────────

    /// Transport cross section per atom [mm²]; see
    /// [`CrossSectionEvaluator::cross_section_per_atom`].
    pub fn cross_section_per_atom(
        &self,
        particle: &ParticleDef,
        kinetic_energy: f64,
        z: u32,
        molar_mass: f64,
        cut_low: f64,
        cut_high: f64,
    ) -> f64 {
        self.tables.evaluator().cross_section_per_atom(
            particle,
            kinetic_energy,
            z,
            molar_mass,
            cut_low,
            cut_high,
        )
    }

    /// Inverse transport mean free path [1/mm] of the tracked particle in
    /// `couple`, making `couple` current.
    ///
    /// # Panics
    ///
    /// Panics if no particle is being tracked.
    pub fn transport_cross_section_per_volume(
        &mut self,
        couple: &Arc<MaterialCutsCouple>,
        kinetic_energy: f64,
    ) -> f64 {
        self.define_material(couple);
        self.species_tables()
            .transport()
            .inverse_mfp(couple, kinetic_energy)
    }

    /// Transport mean free path [mm] of the tracked particle in `couple`;
    /// infinite where nothing scatters.
    ///
    /// # Panics
    ///
    /// Panics if no particle is being tracked.
    pub fn transport_mean_free_path(
        &mut self,
        couple: &Arc<MaterialCutsCouple>,
        kinetic_energy: f64,
    ) -> f64 {
        self.define_material(couple);
        self.mean_free_path(couple, kinetic_energy)
    }

    /// Second transport moment per volume [1/mm]; zero when the
    /// correction is disabled.
    ///
    /// Read from the species table when it was built with the
    /// correction, computed directly otherwise.
    pub fn second_moment(
        &mut self,
        particle: &ParticleDef,
        couple: &Arc<MaterialCutsCouple>,
        kinetic_energy: f64,
    ) -> f64 {
        if !self.config.use_second_moment {
            return 0.0;
        }
        self.define_material(couple);
        match self.tables.species(particle).map(SpeciesTables::second_moment) {
            Some(table) if table.is_enabled() => table.second_moment(couple, kinetic_energy),
            _ => self.tables.evaluator().second_moment_per_volume(
                particle,
                kinetic_energy,
                couple.material(),
                self.electron_cut(couple),
            ),
        }
    }

    // ── Step protocol ──────────────────────────────────────────────

    /// Propose the true length of the next step, at most
    /// `current_minimal_step`, and its geometric image.
    ///
    /// The proposal is never negative or NaN and never exceeds the
    /// particle's residual range.
    ///
    /// # Panics
    ///
    /// Panics if no particle is being tracked, if the energy is not
    /// finite and positive, or if `current_minimal_step` is negative or NaN.
    pub fn compute_true_path_length_limit(
        &mut self,
        pre: &PreStepPoint,
        current_minimal_step: f64,
    ) -> StepLimit {
        let particle = self.current_particle();
        let energy = pre.kinetic_energy;
        assert!(
            energy.is_finite() && energy > 0.0,
            "kinetic energy must be finite and > 0, got {energy}"
        );
        assert!(
            current_minimal_step >= 0.0,
            "requested step must be >= 0, got {current_minimal_step}"
        );

        self.define_material(&pre.couple);
        let couple = Arc::clone(&pre.couple);
        let range = self.energy_loss.range(&particle, energy, &couple);
        self.step = StepState {
            pre_energy: energy,
            eff_energy: energy,
            lambda: self.mean_free_path(&couple, energy),
            range,
            cos_tet_max_nuc: self.cos_tet_max_nuc(&couple, energy),
            safety: pre.safety.max(0.0),
            ..StepState::EMPTY
        };

        let min_step = self.config.min_step;
        let mut tlimit = current_minimal_step.min(range);

        // stop here for tiny steps
        if tlimit < min_step {
            return self.convert_true_to_geom(tlimit);
        }

        let mut presafety = self.step.safety;
        if pre.status != StepStatus::GeomBoundary && presafety < min_step {
            if let Some(navigator) = self.navigator.as_mut() {
                presafety = navigator.compute_safety(pre.position, range).max(0.0);
            }
        }
        self.step.safety = presafety;

        // cannot leave the safety sphere
        if range < presafety {
            self.step.inside = true;
            return self.convert_true_to_geom(tlimit);
        }

        let lambda = self.step.lambda;
        let cos_nuc = self.step.cos_tet_max_nuc;
        let mut rlimit = self.config.range_factor * range;
        if lambda.is_finite() {
            rlimit = rlimit.max((1.0 - cos_nuc) * lambda * self.inv_ss_factor);
        }
        if self.config.step_limit != StepLimitType::Minimal
            && self.tables.evaluator().kernel().cos_theta_max() > cos_nuc
        {
            rlimit = rlimit.min(self.config.safety_factor * presafety);
        }

        tlimit = tlimit.min(rlimit).max(min_step);

        // step limit in infinite media
        let geom_factor = self.config.geom_factor;
        tlimit = tlimit
            .min(RADIATION_LENGTHS_PER_STEP * couple.material().radiation_length() / geom_factor);

        if self.config.step_limit == StepLimitType::UseDistanceToBoundary
            && pre.status == StepStatus::GeomBoundary
        {
            if let Some(navigator) = self.navigator.as_mut() {
                let geomlimit = navigator.distance_to_boundary(pre.position, pre.direction, range);
                tlimit = tlimit.min(geomlimit / geom_factor);
            }
        }

        self.convert_true_to_geom(tlimit.min(range))
    }

    fn convert_true_to_geom(&mut self, true_length: f64) -> StepLimit {
        let geom_length = self.compute_geom_path_length(true_length);
        StepLimit {
            true_length,
            geom_length,
        }
    }

    /// Geometric length of a true step `true_length` [mm].
    ///
    /// Decides the step's scattering mode. Long steps re-evaluate λ at
    /// the mid-step energy.
    ///
    /// # Panics
    ///
    /// Panics if `true_length` is negative or NaN, or if no step was
    /// started with
    /// [`compute_true_path_length_limit`](Self::compute_true_path_length_limit).
    pub fn compute_geom_path_length(&mut self, true_length: f64) -> f64 {
        assert!(
            true_length >= 0.0,
            "true path length must be >= 0, got {true_length}"
        );
        assert!(
            self.step.pre_energy > 0.0,
            "no step in progress: call compute_true_path_length_limit first"
        );
        let particle = self.current_particle();
        let couple = Arc::clone(self.cache.couple());

        self.step.true_length = true_length;
        self.step.geom_length = true_length;
        self.step.eff_energy = self.step.pre_energy;

        let (sigma, _) = self.fill_working_set(self.step.pre_energy, 1.0);
        let inputs = ModeInputs {
            true_length,
            lambda: self.step.lambda,
            single_cross_section: sigma,
            safety: self.step.safety,
        };
        self.step.mode = select_mode(&inputs, &self.thresholds);

        match self.step.mode {
            ScatteringMode::Single => {
                self.step.lambda = f64::INFINITY;
            }
            ScatteringMode::Multiple => {
                if true_length >= self.config.numlimit * self.step.lambda {
                    let range = self.step.range;
                    let e1 = if range > true_length {
                        self.energy_loss
                            .energy(&particle, range - true_length, &couple)
                    } else {
                        0.0
                    };
                    let eff = 0.5 * (e1 + self.step.pre_energy);
                    self.step.eff_energy = eff;
                    self.step.cos_tet_max_nuc = self.cos_tet_max_nuc(&couple, eff);
                    self.step.lambda = self.mean_free_path(&couple, eff);
                }
                self.step.geom_length =
                    PathLengthConverter::new(self.step.lambda).geom_from_true(true_length);
            }
        }

        report(
            &mut self.diagnostics,
            self.config.verbosity,
            Verbosity::Steps,
            format_args!(
                "{particle} E={:.6e} MeV in {}: t={:.6e} z={:.6e} mm lambda={:.6e} mm mode={:?}{}",
                self.step.eff_energy,
                couple.material().name(),
                self.step.true_length,
                self.step.geom_length,
                self.step.lambda,
                self.step.mode,
                if self.step.inside { " inside" } else { "" },
            ),
        );
        self.step.geom_length
    }

    /// True length [mm] of the step after the navigator clipped its
    /// geometric length to `geom_length`.
    ///
    /// An unclipped step returns the proposed true length exactly.
    ///
    /// # Panics
    ///
    /// Panics if `geom_length` is negative or NaN.
    pub fn compute_true_step_length(&mut self, geom_length: f64) -> f64 {
        assert!(
            geom_length >= 0.0,
            "geometric path length must be >= 0, got {geom_length}"
        );
        if geom_length >= self.step.geom_length {
            return self.step.true_length;
        }
        self.step.geom_length = geom_length;
        let t = PathLengthConverter::new(self.step.lambda)
            .true_from_geom(geom_length)
            .min(self.step.range)
            .max(geom_length);
        self.step.true_length = t;
        t
    }

    /// Sample the direction and lateral displacement at the end of the
    /// current step.
    ///
    /// `safety` is the isotropic safety at the end point; a longer
    /// displacement is scaled down to 0.99 of it. All randomness comes
    /// from `rng`.
    ///
    /// # Panics
    ///
    /// Panics if `old_direction` is not a unit vector or `safety` is
    /// negative or NaN.
    pub fn sample_scattering<R: Rng + ?Sized>(
        &mut self,
        old_direction: Vec3,
        safety: f64,
        rng: &mut R,
    ) -> ScatteringOutcome {
        assert!(
            old_direction.is_unit(1e-6),
            "incoming direction must be a unit vector, got {old_direction:?}"
        );
        assert!(safety >= 0.0, "safety must be >= 0, got {safety}");

        let t = self.step.true_length;
        if t <= 0.0 {
            return ScatteringOutcome::unchanged(old_direction);
        }
        self.metrics.steps += 1;

        let energy = self.step.eff_energy;
        let mut mode = self.step.mode;
        let mut half_inv_lambda = if self.step.lambda.is_finite() {
            0.5 / self.step.lambda
        } else {
            0.0
        };

        match mode {
            ScatteringMode::Multiple => {
                let cos_theta_min =
                    1.0 - self.config.single_scattering_factor * t * half_inv_lambda;
                if cos_theta_min > self.step.cos_tet_max_nuc {
                    let (_, below) = self.fill_working_set(energy, cos_theta_min);
                    if below <= 0.0 {
                        mode = ScatteringMode::Single;
                    } else {
                        half_inv_lambda = 0.5 * below;
                    }
                } else {
                    // threshold beyond the nuclear cut-off: condensed only
                    self.working_set.begin(cos_theta_min);
                }
            }
            ScatteringMode::Single => {
                self.fill_working_set(energy, 1.0);
            }
        }

        let second_moment = if mode == ScatteringMode::Multiple && self.config.use_second_moment {
            let particle = self.current_particle();
            let couple = Arc::clone(self.cache.couple());
            self.second_moment(&particle, &couple, energy)
        } else {
            0.0
        };

        let sample = StepSample {
            mode,
            true_length: t,
            geom_length: self.step.geom_length,
            half_inv_lambda,
            second_moment,
            lateral_displacement: self.config.lateral_displacement,
        };
        let (local, tally) = sample_step(&sample, &self.working_set, rng);
        self.metrics.msc_substeps += tally.substeps;
        self.metrics.hard_scatterings += tally.hard_scatterings;
        if mode == ScatteringMode::Single {
            self.metrics.single_scattering_steps += 1;
        }

        // step consumed; sampling again before the next limit is a no-op
        self.step.true_length = 0.0;
        self.step.geom_length = 0.0;

        let direction = local.direction.rotate_uz(old_direction);
        let mut displacement = local.displacement.rotate_uz(old_direction);
        let r = displacement.mag();
        if r > safety {
            displacement = displacement * (DISPLACEMENT_SAFETY_FRACTION * safety / r);
        }

        report(
            &mut self.diagnostics,
            self.config.verbosity,
            Verbosity::Steps,
            format_args!(
                "sampled {:?}: cos={:.9} hard={} substeps={} |d|={:.3e} mm",
                mode,
                direction.dot(old_direction),
                tally.hard_scatterings,
                tally.substeps,
                displacement.mag(),
            ),
        );
        ScatteringOutcome {
            direction,
            displacement,
        }
    }
}

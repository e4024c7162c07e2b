//! Test utilities and mock collaborators for Eddy development.
//!
//! Provides recording implementations of the operator and solver traits
//! ([`RecordingOperator`], [`RecordingSolver`]) so that tests can check
//! what the diffusion core asks of its backend, plus mesh and field
//! fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Arc, Mutex};

use eddy_core::{LevelField, SolveError};
use eddy_linop::{
    DomainBc, LpInfo, MultigridSolver, SolveReport, SolverSettings, ViscousOperator,
};
use eddy_mesh::{EbFactory, MeshHierarchy};

/// One setup call received by a [`RecordingOperator`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Define {
        num_factories: usize,
        max_coarsening_level: usize,
    },
    SetMaxOrder(usize),
    SetDomainBc(DomainBc),
    SetScalars(f64, f64),
    SetACoeffs(usize),
    SetShearViscosity(usize),
    SetEbShearViscosity(usize),
    SetLevelBc(usize),
}

/// Shared, cloneable list of [`Call`]s.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Snapshot of every call so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// Operator that records its setup calls and does no arithmetic.
///
/// `apply` writes zero and `diagonal` writes one. Grab the
/// [`log`](RecordingOperator::log) handle before moving the operator into
/// the code under test.
#[derive(Debug, Default)]
pub struct RecordingOperator {
    log: CallLog,
    num_levels: usize,
}

impl RecordingOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl ViscousOperator for RecordingOperator {
    fn define(
        &mut self,
        hierarchy: Arc<dyn MeshHierarchy>,
        eb_factories: &[Arc<dyn EbFactory>],
        info: LpInfo,
    ) {
        self.num_levels = hierarchy.num_active_levels();
        self.log.push(Call::Define {
            num_factories: eb_factories.len(),
            max_coarsening_level: info.max_coarsening_level,
        });
    }

    fn set_max_order(&mut self, order: usize) {
        self.log.push(Call::SetMaxOrder(order));
    }

    fn set_domain_bc(&mut self, bc: &DomainBc) {
        self.log.push(Call::SetDomainBc(*bc));
    }

    fn set_scalars(&mut self, alpha: f64, beta: f64) {
        self.log.push(Call::SetScalars(alpha, beta));
    }

    fn set_a_coeffs(&mut self, level: usize, _a: &LevelField) {
        self.log.push(Call::SetACoeffs(level));
    }

    fn set_shear_viscosity(&mut self, level: usize, _b: &[LevelField; 3]) {
        self.log.push(Call::SetShearViscosity(level));
    }

    fn set_eb_shear_viscosity(&mut self, level: usize, _eta: &LevelField) {
        self.log.push(Call::SetEbShearViscosity(level));
    }

    fn set_level_bc(&mut self, level: usize, _bc_data: &LevelField) {
        self.log.push(Call::SetLevelBc(level));
    }

    fn num_levels(&self) -> usize {
        self.num_levels
    }

    fn fill_ghosts(&self, _level: usize, _phi: &mut LevelField, _homogeneous: bool) {}

    fn apply(
        &self,
        _level: usize,
        _phi: &mut LevelField,
        out: &mut LevelField,
        _homogeneous: bool,
    ) {
        out.fill(0.0);
    }

    fn diagonal(&self, _level: usize, out: &mut LevelField) {
        out.fill(1.0);
    }
}

/// What a [`RecordingSolver`] was asked to do in one solve.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveRecord {
    pub settings: SolverSettings,
    pub rtol: f64,
    pub atol: f64,
    pub levels: usize,
}

/// Shared, cloneable list of [`SolveRecord`]s.
#[derive(Clone, Debug, Default)]
pub struct SolveLog {
    records: Arc<Mutex<Vec<SolveRecord>>>,
}

impl SolveLog {
    pub fn records(&self) -> Vec<SolveRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<SolveRecord> {
        self.records.lock().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Solver that records its inputs and leaves the solution untouched.
///
/// Clones share one [`SolveLog`], so the record survives the per-solve
/// clone the diffusion core makes.
#[derive(Clone, Debug, Default)]
pub struct RecordingSolver {
    settings: SolverSettings,
    seen: SolveLog,
    fail_with: Option<SolveError>,
}

impl RecordingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A solver whose every solve returns `err`.
    pub fn failing(err: SolveError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    pub fn seen(&self) -> SolveLog {
        self.seen.clone()
    }
}

impl MultigridSolver for RecordingSolver {
    fn configure(&mut self, settings: &SolverSettings) {
        self.settings = *settings;
    }

    fn solve(
        &mut self,
        _op: &dyn ViscousOperator,
        sol: &mut [LevelField],
        _rhs: &[LevelField],
        rtol: f64,
        atol: f64,
    ) -> Result<SolveReport, SolveError> {
        self.seen.records.lock().unwrap().push(SolveRecord {
            settings: self.settings,
            rtol,
            atol,
            levels: sol.len(),
        });
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(SolveReport {
            iterations: 0,
            initial_residual: 0.0,
            final_residual: 0.0,
            levels: sol.len(),
        })
    }
}

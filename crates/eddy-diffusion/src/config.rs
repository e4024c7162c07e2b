//! Runtime parameters and the diffusion solver configuration.
//!
//! [`ParamTable`] holds namespaced `prefix.key = value` pairs in file
//! order. [`DiffusionConfig`] reads the `diffusion` namespace once, at
//! construction, and resolves every string option into a typed value.

use eddy_core::ConfigError;
use eddy_linop::{BottomSolver, SolverSettings};
use indexmap::IndexMap;
use std::str::FromStr;

// ── ParamTable ─────────────────────────────────────────────────────

/// Namespaced key/value parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamTable {
    entries: IndexMap<String, String>,
}

impl ParamTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an inputs file.
    ///
    /// Each non-blank line is `prefix.key = value`; text after `#` is a
    /// comment. A key given twice keeps its last value.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Malformed`] for a line without `=` or with an empty
    /// key.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut table = Self::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let malformed = || ConfigError::Malformed {
                line: i + 1,
                text: raw.trim().to_string(),
            };
            let (key, value) = line.split_once('=').ok_or_else(malformed)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(malformed());
            }
            table.set(key, value.trim());
        }
        Ok(table)
    }

    /// Insert or replace a fully-qualified key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Raw value of `prefix.key`.
    pub fn get(&self, prefix: &str, key: &str) -> Option<&str> {
        self.entries
            .get(&format!("{prefix}.{key}"))
            .map(String::as_str)
    }

    /// Typed value of `prefix.key`, `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if the value does not parse as `T`.
    pub fn query<T: FromStr>(&self, prefix: &str, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(raw) = self.get(prefix, key) else {
            return Ok(None);
        };
        raw.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
            key: format!("{prefix}.{key}"),
            value: raw.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ── DiffusionConfig ────────────────────────────────────────────────

/// Options of the diffusion solve, read from the `diffusion` namespace.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffusionConfig {
    /// Progress logging of the diffusion core when nonzero.
    pub verbose: i32,
    /// Outer-cycle verbosity of the solver.
    pub mg_verbose: i32,
    /// Bottom-solve verbosity of the solver.
    pub mg_cg_verbose: i32,
    /// Maximum outer cycles.
    pub mg_max_iter: usize,
    /// Maximum bottom-solve iterations.
    pub mg_cg_maxiter: usize,
    /// Maximum full-multigrid cycles.
    pub mg_max_fmg_iter: usize,
    /// How many times the operator may coarsen a level.
    pub mg_max_coarsening_level: usize,
    /// Relative tolerance.
    pub mg_rtol: f64,
    /// Absolute tolerance.
    pub mg_atol: f64,
    /// Bottom-solve strategy, resolved from `bottom_solver_type`.
    pub bottom_solver: BottomSolver,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            mg_verbose: 0,
            mg_cg_verbose: 0,
            mg_max_iter: 100,
            mg_cg_maxiter: 100,
            mg_max_fmg_iter: 0,
            mg_max_coarsening_level: 100,
            mg_rtol: 1e-11,
            mg_atol: 1e-14,
            bottom_solver: BottomSolver::Default,
        }
    }
}

impl DiffusionConfig {
    /// Namespace the options live under.
    pub const PREFIX: &'static str = "diffusion";

    /// Read every option present in `params`, keeping defaults for the
    /// rest, and validate the result.
    ///
    /// # Errors
    ///
    /// Any parse failure, or a failed [`validate`](Self::validate).
    pub fn from_params(params: &ParamTable) -> Result<Self, ConfigError> {
        let p = Self::PREFIX;
        let mut c = Self::default();
        if let Some(v) = params.query(p, "verbose")? {
            c.verbose = v;
        }
        if let Some(v) = params.query(p, "mg_verbose")? {
            c.mg_verbose = v;
        }
        if let Some(v) = params.query(p, "mg_cg_verbose")? {
            c.mg_cg_verbose = v;
        }
        if let Some(v) = params.query(p, "mg_max_iter")? {
            c.mg_max_iter = v;
        }
        if let Some(v) = params.query(p, "mg_cg_maxiter")? {
            c.mg_cg_maxiter = v;
        }
        if let Some(v) = params.query(p, "mg_max_fmg_iter")? {
            c.mg_max_fmg_iter = v;
        }
        if let Some(v) = params.query(p, "mg_max_coarsening_level")? {
            c.mg_max_coarsening_level = v;
        }
        if let Some(v) = params.query(p, "mg_rtol")? {
            c.mg_rtol = v;
        }
        if let Some(v) = params.query(p, "mg_atol")? {
            c.mg_atol = v;
        }
        if let Some(name) = params.get(p, "bottom_solver_type") {
            c.bottom_solver = BottomSolver::from_name(name);
        }
        c.validate()?;
        Ok(c)
    }

    /// Check ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::OutOfRange`] if a tolerance is negative or not
    /// finite, or an iteration cap of the outer cycle or bottom solve is
    /// zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, tol) in [("mg_rtol", self.mg_rtol), ("mg_atol", self.mg_atol)] {
            if !tol.is_finite() || tol < 0.0 {
                return Err(ConfigError::OutOfRange {
                    key: format!("{}.{key}", Self::PREFIX),
                    reason: format!("tolerance must be finite and non-negative, got {tol}"),
                });
            }
        }
        for (key, cap) in [
            ("mg_max_iter", self.mg_max_iter),
            ("mg_cg_maxiter", self.mg_cg_maxiter),
        ] {
            if cap == 0 {
                return Err(ConfigError::OutOfRange {
                    key: format!("{}.{key}", Self::PREFIX),
                    reason: "iteration cap must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Solver settings for one solve. The final boundary fill is always
    /// on.
    pub fn solver_settings(&self) -> SolverSettings {
        SolverSettings {
            verbose: self.mg_verbose,
            cg_verbose: self.mg_cg_verbose,
            max_iter: self.mg_max_iter,
            max_fmg_iter: self.mg_max_fmg_iter,
            cg_max_iter: self.mg_cg_maxiter,
            bottom_solver: self.bottom_solver,
            final_fill_bc: true,
        }
    }
}

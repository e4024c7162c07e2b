//! Residual-correction solver with a Jacobi-preconditioned BiCGStab
//! inner solve.
//!
//! Each outer cycle computes the full residual `r = rhs - L(sol)` with
//! inhomogeneous boundary data, solves `L_h(e) = r` with homogeneous
//! boundaries, and updates `sol += e`. Levels are solved in increasing
//! order; each level's coarse/fine ghost values come from its boundary
//! data.

use crate::operator::ViscousOperator;
use crate::solver::{BottomSolver, MultigridSolver, SolveReport, SolverSettings};
use eddy_core::{LevelField, SolveError};

/// Relaxation weight of the Jacobi smoother.
const JACOBI_WEIGHT: f64 = 2.0 / 3.0;

/// Reference [`MultigridSolver`].
///
/// [`BottomSolver::Smoother`] replaces BiCGStab with weighted Jacobi
/// sweeps. [`BottomSolver::Hypre`] is not available here and falls back
/// to BiCGStab. `max_fmg_iter` has no effect.
#[derive(Clone, Debug, Default)]
pub struct BiCgStabSolver {
    settings: SolverSettings,
}

impl BiCgStabSolver {
    /// A solver with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings in effect.
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn residual(
        op: &dyn ViscousOperator,
        level: usize,
        sol: &mut LevelField,
        rhs: &LevelField,
    ) -> LevelField {
        let ncomp = sol.ncomp();
        let mut ax = zeros_like(sol, 0);
        op.apply(level, sol, &mut ax, false);
        let mut r = zeros_like(sol, 0);
        r.copy_from(rhs, 0, 0, ncomp, 0);
        r.saxpy(-1.0, &ax, 0);
        r
    }

    fn inverse_diagonal(op: &dyn ViscousOperator, level: usize, like: &LevelField) -> LevelField {
        let mut d = LevelField::new(like.boxes().clone(), like.distribution_map().clone(), 1, 0);
        op.diagonal(level, &mut d);
        d.par_for_each_box_mut(|_, vbox, fab| {
            for p in vbox.iter() {
                let v = fab.get(&p, 0);
                fab.set(&p, 0, if v != 0.0 { 1.0 / v } else { 1.0 });
            }
        });
        d
    }

    fn solve_level(
        &self,
        op: &dyn ViscousOperator,
        level: usize,
        sol: &mut LevelField,
        rhs: &LevelField,
        target: f64,
    ) -> Result<(usize, f64), SolveError> {
        let inv_diag = Self::inverse_diagonal(op, level, sol);
        let mut r = Self::residual(op, level, sol, rhs);
        for cycle in 0..self.settings.max_iter {
            let rnorm = r.norm_inf_all();
            if !rnorm.is_finite() {
                return Err(SolveError::Breakdown {
                    level,
                    reason: format!("non-finite residual in cycle {cycle}"),
                });
            }
            if self.settings.verbose > 0 {
                log::debug!("level {level} cycle {cycle}: residual {rnorm:e}");
            }
            if rnorm <= target {
                return Ok((cycle, rnorm));
            }
            let mut e = zeros_like(sol, 1);
            match self.settings.bottom_solver {
                BottomSolver::Smoother => self.jacobi(op, level, &mut e, &r, &inv_diag, target),
                BottomSolver::Default | BottomSolver::Hypre => {
                    self.bicgstab(op, level, &mut e, &r, &inv_diag, target)?
                }
            };
            sol.saxpy(1.0, &e, 0);
            r = Self::residual(op, level, sol, rhs);
        }
        let rnorm = r.norm_inf_all();
        if rnorm <= target {
            Ok((self.settings.max_iter, rnorm))
        } else {
            Err(SolveError::NotConverged {
                iterations: self.settings.max_iter,
                residual: rnorm,
                target,
            })
        }
    }

    /// Weighted Jacobi sweeps on `L_h(x) = b`, `x` starting at zero.
    fn jacobi(
        &self,
        op: &dyn ViscousOperator,
        level: usize,
        x: &mut LevelField,
        b: &LevelField,
        inv_diag: &LevelField,
        target: f64,
    ) -> usize {
        let ncomp = x.ncomp();
        let mut ax = zeros_like(b, 0);
        let mut res = zeros_like(b, 0);
        for it in 0..self.settings.cg_max_iter {
            op.apply(level, x, &mut ax, true);
            res.copy_from(b, 0, 0, ncomp, 0);
            res.saxpy(-1.0, &ax, 0);
            let rnorm = res.norm_inf_all();
            if self.settings.cg_verbose > 0 {
                log::trace!("level {level} jacobi {it}: residual {rnorm:e}");
            }
            if rnorm <= target {
                return it;
            }
            precondition(&mut res, inv_diag);
            x.saxpy(JACOBI_WEIGHT, &res, 0);
        }
        self.settings.cg_max_iter
    }

    /// Right-preconditioned BiCGStab on `L_h(x) = b`, `x` starting at zero.
    ///
    /// Only called with `b` above the target, so an exactly zero `rho`,
    /// `r_hat . v` or `t . t` cannot mean convergence and is reported as
    /// [`SolveError::Breakdown`], as is any non-finite scalar.
    fn bicgstab(
        &self,
        op: &dyn ViscousOperator,
        level: usize,
        x: &mut LevelField,
        b: &LevelField,
        inv_diag: &LevelField,
        target: f64,
    ) -> Result<usize, SolveError> {
        let ncomp = x.ncomp();
        let mut r = b.clone();
        let r_hat = b.clone();
        let mut p = zeros_like(b, 0);
        let mut v = zeros_like(b, 0);
        let mut t = zeros_like(b, 0);
        let mut y = zeros_like(x, 1);
        let mut z = zeros_like(x, 1);
        let (mut rho, mut alpha, mut omega) = (1.0_f64, 1.0_f64, 1.0_f64);
        let breakdown = |what: &str, it: usize| SolveError::Breakdown {
            level,
            reason: format!("{what} is not finite at iteration {it}"),
        };
        let vanished = |what: &str, it: usize| SolveError::Breakdown {
            level,
            reason: format!("{what} vanished at iteration {it}"),
        };

        for it in 0..self.settings.cg_max_iter {
            let rho_new = r_hat.dot(&r);
            if !rho_new.is_finite() {
                return Err(breakdown("rho", it));
            }
            if rho_new == 0.0 {
                return Err(vanished("rho", it));
            }
            let beta = (rho_new / rho) * (alpha / omega);
            p.saxpy(-omega, &v, 0);
            p.scale(beta, 0);
            p.saxpy(1.0, &r, 0);

            y.copy_from(&p, 0, 0, ncomp, 0);
            precondition(&mut y, inv_diag);
            op.apply(level, &mut y, &mut v, true);
            let rv = r_hat.dot(&v);
            if !rv.is_finite() {
                return Err(breakdown("r_hat . v", it));
            }
            if rv == 0.0 {
                return Err(vanished("r_hat . v", it));
            }
            alpha = rho_new / rv;
            x.saxpy(alpha, &y, 0);
            r.saxpy(-alpha, &v, 0);

            let snorm = r.norm_inf_all();
            if self.settings.cg_verbose > 0 {
                log::trace!("level {level} bicgstab {it}: half-step residual {snorm:e}");
            }
            if snorm <= target {
                return Ok(it + 1);
            }

            z.copy_from(&r, 0, 0, ncomp, 0);
            precondition(&mut z, inv_diag);
            op.apply(level, &mut z, &mut t, true);
            let (ts, tt) = rayon::join(|| t.dot(&r), || t.dot(&t));
            if !ts.is_finite() || !tt.is_finite() {
                return Err(breakdown("t . s", it));
            }
            if tt == 0.0 {
                return Err(vanished("t . t", it));
            }
            omega = ts / tt;
            x.saxpy(omega, &z, 0);
            r.saxpy(-omega, &t, 0);

            let rnorm = r.norm_inf_all();
            if self.settings.cg_verbose > 0 {
                log::trace!("level {level} bicgstab {it}: residual {rnorm:e}");
            }
            if rnorm <= target || omega == 0.0 {
                return Ok(it + 1);
            }
            rho = rho_new;
        }
        Ok(self.settings.cg_max_iter)
    }
}

/// Zero field with the layout of `like` and `n_grow` ghost cells.
fn zeros_like(like: &LevelField, n_grow: usize) -> LevelField {
    LevelField::new(
        like.boxes().clone(),
        like.distribution_map().clone(),
        like.ncomp(),
        n_grow,
    )
}

/// Multiply every component of `f` by the one-component `inv_diag`.
fn precondition(f: &mut LevelField, inv_diag: &LevelField) {
    for n in 0..f.ncomp() {
        f.multiply_from(inv_diag, 0, n, 1, 0);
    }
}

impl MultigridSolver for BiCgStabSolver {
    fn configure(&mut self, settings: &SolverSettings) {
        if settings.bottom_solver == BottomSolver::Hypre {
            log::warn!("hypre bottom solver is not available; using BiCGStab");
        }
        self.settings = *settings;
    }

    fn solve(
        &mut self,
        op: &dyn ViscousOperator,
        sol: &mut [LevelField],
        rhs: &[LevelField],
        rtol: f64,
        atol: f64,
    ) -> Result<SolveReport, SolveError> {
        let nlev = op.num_levels();
        if sol.len() < nlev || rhs.len() < nlev {
            return Err(SolveError::LevelCountMismatch {
                expected: nlev,
                got: sol.len().min(rhs.len()),
            });
        }

        let mut r0 = 0.0_f64;
        for level in 0..nlev {
            r0 = r0.max(Self::residual(op, level, &mut sol[level], &rhs[level]).norm_inf_all());
        }
        let target = (rtol * r0).max(atol);
        if self.settings.verbose > 0 {
            log::debug!("solve: initial residual {r0:e}, target {target:e}, {nlev} level(s)");
        }

        let mut iterations = 0;
        let mut final_residual = 0.0_f64;
        for level in 0..nlev {
            let (iters, res) = self.solve_level(op, level, &mut sol[level], &rhs[level], target)?;
            iterations += iters;
            final_residual = final_residual.max(res);
        }

        if self.settings.final_fill_bc {
            for (level, phi) in sol.iter_mut().enumerate().take(nlev) {
                op.fill_ghosts(level, phi, false);
            }
        }
        if self.settings.verbose > 0 {
            log::debug!("solve: converged in {iterations} cycle(s), residual {final_residual:e}");
        }
        Ok(SolveReport {
            iterations,
            initial_residual: r0,
            final_residual,
            levels: nlev,
        })
    }
}

//! Dense statevector over N two-level atoms.
//!
//! Basis index bit `i` is the state of site `i`: 0 = ground |g⟩,
//! 1 = Rydberg |r⟩.  Only the two operations the Rydberg Hamiltonian needs
//! are provided: a single-site drive rotation and a diagonal phase.

use num_complex::Complex64;
use rand::Rng;

/// A pure state of `num_sites` atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of sites.
    num_sites: usize,
}

impl Statevector {
    /// All atoms in the ground state, |0…0⟩.
    pub fn ground(num_sites: usize) -> Self {
        let size = 1 << num_sites;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_sites,
        }
    }

    /// Number of sites.
    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    /// Raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// ‖ψ‖².
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Apply exp(−i θ/2 · (cos φ X − sin φ Y)) to `site`.
    ///
    /// With θ = Ω·dt this is the exact propagator of the drive term
    /// Ω/2 (cos φ X − sin φ Y) over `dt`.
    pub fn apply_drive(&mut self, site: usize, theta: f64, phase: f64) {
        let mask = 1 << site;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        // −i s e^{±iφ}
        let upper = Complex64::new(0.0, -s) * Complex64::from_polar(1.0, phase);
        let lower = Complex64::new(0.0, -s) * Complex64::from_polar(1.0, -phase);
        for i in 0..(1 << self.num_sites) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + upper * b;
                self.amplitudes[j] = lower * a + c * b;
            }
        }
    }

    /// Multiply each amplitude by exp(−i E_b dt).
    ///
    /// # Panics
    /// If `energies` is shorter than the state.
    pub fn apply_diagonal(&mut self, energies: &[f64], dt: f64) {
        for (amp, &e) in self.amplitudes.iter_mut().zip(energies) {
            *amp *= Complex64::from_polar(1.0, -e * dt);
        }
    }

    /// Rydberg population ⟨n_i⟩ of every site.
    pub fn site_populations(&self) -> Vec<f64> {
        let mut pops = vec![0.0; self.num_sites];
        for (b, amp) in self.amplitudes.iter().enumerate() {
            let p = amp.norm_sqr();
            if p == 0.0 {
                continue;
            }
            for (site, pop) in pops.iter_mut().enumerate() {
                if b & (1 << site) != 0 {
                    *pop += p;
                }
            }
        }
        pops
    }

    /// Draw one basis state from |ψ|².
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen::<f64>() * self.norm_sqr();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave r just above the final cumulative sum.
        self.amplitudes.len() - 1
    }
}

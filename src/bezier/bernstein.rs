use crate::foundation::error::{FlightError, FlightResult};

/// Number of entries in the factorial table (`0!..=32!`).
///
/// Past 32, f64 can no longer carry factorials precisely enough for the binomial division.
pub const FACTORIAL_TABLE_LEN: usize = 33;

/// Largest `n` for which [`BernsteinBasis::factorial`] succeeds.
pub const MAX_DEGREE: i32 = (FACTORIAL_TABLE_LEN - 1) as i32;

/// Factorial lookup table and the Bernstein polynomials built on it.
///
/// Immutable after construction.
#[derive(Clone, Debug)]
pub struct BernsteinBasis {
    factorials: [f64; FACTORIAL_TABLE_LEN],
}

impl Default for BernsteinBasis {
    fn default() -> Self {
        Self::new()
    }
}

impl BernsteinBasis {
    /// Build the table. Each entry is the exact integer `n!` rounded once to f64.
    pub fn new() -> Self {
        let mut factorials = [1.0f64; FACTORIAL_TABLE_LEN];
        let mut acc: u128 = 1;
        for (n, slot) in factorials.iter_mut().enumerate().skip(1) {
            acc *= n as u128;
            *slot = acc as f64;
        }
        Self { factorials }
    }

    /// Table size, i.e. the maximum number of control points a single curve may have.
    pub fn factorial_max(&self) -> usize {
        FACTORIAL_TABLE_LEN
    }

    /// `n!` for `0 <= n <= 32`.
    pub fn factorial(&self, n: i32) -> FlightResult<f64> {
        if n < 0 {
            return Err(FlightError::domain(format!("factorial of {n}: n is less than 0")));
        }
        if n > MAX_DEGREE {
            return Err(FlightError::domain(format!(
                "factorial of {n}: n is greater than {MAX_DEGREE}"
            )));
        }
        Ok(self.factorials[n as usize])
    }

    /// Binomial coefficient `n! / (i! (n-i)!)`. Range checks are left to [`Self::factorial`].
    pub fn binomial(&self, n: i32, i: i32) -> FlightResult<f64> {
        let a1 = self.factorial(n)?;
        let a2 = self.factorial(i)?;
        let a3 = self.factorial(n - i)?;
        Ok(a1 / (a2 * a3))
    }

    /// Bernstein basis polynomial `b(n, i)` evaluated at `t`.
    pub fn bernstein(&self, n: i32, i: i32, t: f64) -> FlightResult<f64> {
        // powf(0, 0) is defined as 1 in Rust, but both endpoints are pinned explicitly so the
        // curve interpolates its end control points exactly.
        let ti = if t == 0.0 && i == 0 { 1.0 } else { t.powi(i) };
        let tni = if n == i && t == 1.0 {
            1.0
        } else {
            (1.0 - t).powi(n - i)
        };
        Ok(self.binomial(n, i)? * ti * tni)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bezier/bernstein.rs"]
mod tests;

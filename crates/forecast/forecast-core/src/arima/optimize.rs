//! Derivative-free minimisation (Nelder-Mead simplex).

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadOptions {
    /// Edge length of the initial simplex
    pub initial_step: f64,
    /// Every coordinate is clamped to `[-bound, bound]`
    pub bound: f64,
    /// Iterations per dimension
    pub iterations_per_dim: usize,
    /// Stop once the spread of objective values over the simplex falls below this
    pub tolerance: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            initial_step: 0.25,
            bound: 8.0,
            iterations_per_dim: 200,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

/// Minimise `f` starting from `x0`. Non-finite objective values count as `+inf`.
pub fn nelder_mead<F>(f: F, x0: &[f64], options: &NelderMeadOptions) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let bound = options.bound;
    let clamp = |x: Vec<f64>| -> Vec<f64> { x.into_iter().map(|v| v.clamp(-bound, bound)).collect() };
    let eval = |x: &[f64]| -> f64 {
        let v = f(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let dim = x0.len();
    let start = clamp(x0.to_vec());
    if dim == 0 {
        let value = eval(&start);
        return Minimum {
            x: start,
            value,
            iterations: 0,
        };
    }

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    simplex.push((start.clone(), eval(&start)));
    for i in 0..dim {
        let mut vertex = start.clone();
        vertex[i] += if vertex[i] + options.initial_step <= bound {
            options.initial_step
        } else {
            -options.initial_step
        };
        let value = eval(&vertex);
        simplex.push((vertex, value));
    }

    let max_iter = options.iterations_per_dim * dim;
    let mut iterations = 0;
    while iterations < max_iter {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let best = simplex[0].1;
        let worst = simplex[dim].1;
        if best.is_finite() && (worst - best).abs() <= options.tolerance * (1.0 + best.abs()) {
            break;
        }
        iterations += 1;

        let mut centroid = vec![0.0; dim];
        for (vertex, _) in &simplex[..dim] {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v / dim as f64;
            }
        }
        let towards = |from: &[f64], scale: f64| -> Vec<f64> {
            clamp(
                centroid
                    .iter()
                    .zip(from)
                    .map(|(c, x)| c + scale * (x - c))
                    .collect(),
            )
        };

        let reflected = towards(&simplex[dim].0, -REFLECTION);
        let f_reflected = eval(&reflected);

        if f_reflected < simplex[0].1 {
            let expanded = towards(&simplex[dim].0, -REFLECTION * EXPANSION);
            let f_expanded = eval(&expanded);
            simplex[dim] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }
        if f_reflected < simplex[dim - 1].1 {
            simplex[dim] = (reflected, f_reflected);
            continue;
        }

        let contracted = if f_reflected < simplex[dim].1 {
            towards(&reflected, CONTRACTION)
        } else {
            towards(&simplex[dim].0, CONTRACTION)
        };
        let f_contracted = eval(&contracted);
        if f_contracted < simplex[dim].1.min(f_reflected) {
            simplex[dim] = (contracted, f_contracted);
            continue;
        }

        let anchor = simplex[0].0.clone();
        for (vertex, value) in simplex.iter_mut().skip(1) {
            *vertex = clamp(
                anchor
                    .iter()
                    .zip(vertex.iter())
                    .map(|(a, v)| a + SHRINK * (v - a))
                    .collect(),
            );
            *value = eval(vertex);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (x, value) = simplex.swap_remove(0);
    Minimum { x, value, iterations }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_bowl() {
        let f = |x: &[f64]| (x[0] - 1.0).powi(2) + 2.0 * (x[1] + 0.5).powi(2);
        let min = nelder_mead(f, &[0.0, 0.0], &NelderMeadOptions::default());
        assert!((min.x[0] - 1.0).abs() < 1e-3, "{:?}", min);
        assert!((min.x[1] + 0.5).abs() < 1e-3, "{:?}", min);
        assert!(min.value < 1e-6);
    }

    #[test]
    fn test_minimum_outside_bounds_is_clamped() {
        let f = |x: &[f64]| (x[0] - 20.0).powi(2);
        let min = nelder_mead(f, &[0.0], &NelderMeadOptions::default());
        assert!((min.x[0] - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_objective_avoided() {
        let f = |x: &[f64]| if x[0] < 0.0 { f64::NAN } else { (x[0] - 0.5).powi(2) };
        let min = nelder_mead(f, &[1.0], &NelderMeadOptions::default());
        assert!(min.value.is_finite());
        assert!((min.x[0] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_zero_dimensions() {
        let min = nelder_mead(|_| 3.0, &[], &NelderMeadOptions::default());
        assert_eq!(min.value, 3.0);
        assert_eq!(min.iterations, 0);
    }
}

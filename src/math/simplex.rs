//! Bounded Nelder–Mead minimizer.
//!
//! The Poisson likelihood here is smooth inside the feasible box but has a
//! hard wall at the threshold bound, so we use a derivative-free simplex
//! search with every trial point projected back into the box:
//!
//! ```text
//! minimize f(x)  subject to  lower[i] <= x[i] <= upper[i]
//! ```
//!
//! Standard coefficients (reflection 1, expansion 2, contraction 0.5,
//! shrink 0.5). The initial simplex steps each coordinate by 5% of its
//! bound range from the start point. Convergence is declared when the
//! spread of vertex values collapses below the tolerance.
//!
//! Determinism: vertex ordering uses `total_cmp`, so runs with identical
//! inputs produce identical iterates bit for bit.

/// Search controls.
#[derive(Debug, Clone, Copy)]
pub struct SimplexOptions {
    pub max_iterations: usize,
    /// Relative spread of vertex values below which the search stops.
    pub tolerance: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
        }
    }
}

/// Result of one minimization.
#[derive(Debug, Clone, Copy)]
pub struct SimplexOutcome<const N: usize> {
    pub x: [f64; N],
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Clone, Copy)]
struct Vertex<const N: usize> {
    x: [f64; N],
    value: f64,
}

fn clamp_into<const N: usize>(x: &mut [f64; N], lower: &[f64; N], upper: &[f64; N]) {
    for i in 0..N {
        x[i] = x[i].clamp(lower[i], upper[i]);
    }
}

/// Minimize `f` over the box `[lower, upper]` starting from `start`.
///
/// The start point is clamped into the box before the simplex is built.
/// Returns the best vertex found even when the iteration cap is hit;
/// `converged` tells the caller which case occurred.
pub fn minimize_bounded<const N: usize, F>(
    f: F,
    start: [f64; N],
    lower: [f64; N],
    upper: [f64; N],
    options: &SimplexOptions,
) -> SimplexOutcome<N>
where
    F: Fn(&[f64; N]) -> f64,
{
    let mut x0 = start;
    clamp_into(&mut x0, &lower, &upper);

    // Initial simplex: step each coordinate by 5% of its bound range,
    // flipping the step direction when it would leave the box.
    let mut vertices: Vec<Vertex<N>> = Vec::with_capacity(N + 1);
    vertices.push(Vertex { x: x0, value: f(&x0) });
    for i in 0..N {
        let step = 0.05 * (upper[i] - lower[i]);
        let mut v = x0;
        if v[i] + step <= upper[i] {
            v[i] += step;
        } else {
            v[i] -= step;
        }
        clamp_into(&mut v, &lower, &upper);
        vertices.push(Vertex { x: v, value: f(&v) });
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        iterations += 1;
        vertices.sort_by(|a, b| a.value.total_cmp(&b.value));

        let best = vertices[0].value;
        let worst = vertices[N].value;
        if (worst - best).abs() <= options.tolerance * (1.0 + best.abs()) {
            converged = true;
            break;
        }

        // Centroid of all vertices except the worst. A convex
        // combination of in-box points stays in-box.
        let mut centroid = [0.0; N];
        for v in &vertices[..N] {
            for i in 0..N {
                centroid[i] += v.x[i];
            }
        }
        for c in centroid.iter_mut() {
            *c /= N as f64;
        }

        let xh = vertices[N].x;
        let second_worst = vertices[N - 1].value;

        // Reflection.
        let mut xr = [0.0; N];
        for i in 0..N {
            xr[i] = centroid[i] + (centroid[i] - xh[i]);
        }
        clamp_into(&mut xr, &lower, &upper);
        let fr = f(&xr);

        if fr < best {
            // Expansion.
            let mut xe = [0.0; N];
            for i in 0..N {
                xe[i] = centroid[i] + 2.0 * (centroid[i] - xh[i]);
            }
            clamp_into(&mut xe, &lower, &upper);
            let fe = f(&xe);
            vertices[N] = if fe < fr {
                Vertex { x: xe, value: fe }
            } else {
                Vertex { x: xr, value: fr }
            };
            continue;
        }

        if fr < second_worst {
            vertices[N] = Vertex { x: xr, value: fr };
            continue;
        }

        // Contraction, toward the better of the reflected and worst points.
        let fh = vertices[N].value;
        let mut xc = [0.0; N];
        if fr < fh {
            for i in 0..N {
                xc[i] = centroid[i] + 0.5 * (xr[i] - centroid[i]);
            }
        } else {
            for i in 0..N {
                xc[i] = centroid[i] + 0.5 * (xh[i] - centroid[i]);
            }
        }
        clamp_into(&mut xc, &lower, &upper);
        let fc = f(&xc);
        if fc < fr.min(fh) {
            vertices[N] = Vertex { x: xc, value: fc };
            continue;
        }

        // Shrink everything toward the best vertex.
        let xb = vertices[0].x;
        for v in vertices.iter_mut().skip(1) {
            for i in 0..N {
                v.x[i] = xb[i] + 0.5 * (v.x[i] - xb[i]);
            }
            v.value = f(&v.x);
        }
    }

    vertices.sort_by(|a, b| a.value.total_cmp(&b.value));
    SimplexOutcome {
        x: vertices[0].x,
        value: vertices[0].value,
        iterations,
        converged,
    }
}

use glam::{DVec2, DVec3, DVec4};

/// A sampled parametric surface: `columns * rows` positions with their surface parameters,
/// row major with `u` varying fastest.
#[derive(Debug, Clone, Default)]
pub struct SurfaceGrid {
    pub columns: usize,
    pub rows: usize,
    pub positions: Vec<DVec3>,
    pub parameters: Vec<DVec2>,
}

/// Rational B-spline surface with homogeneous control points (`w` in the last lane).
#[derive(Debug, Clone)]
pub struct NurbsSurface {
    pub order_u: usize,
    pub order_v: usize,
    pub count_u: usize,
    pub count_v: usize,
    pub step_u: usize,
    pub step_v: usize,
    /// `count_u * count_v` points, `u` varying fastest.
    pub control_points: Vec<DVec4>,
    pub knots_u: Vec<f64>,
    pub knots_v: Vec<f64>,
}

pub const DEFAULT_SURFACE_STEP: usize = 4;
/// Largest number of samples per knot span a file may ask for.
pub const MAX_SURFACE_STEP: usize = 256;

impl NurbsSurface {
    pub fn validate(&self) -> Result<(), String> {
        if self.order_u < 2 || self.order_v < 2 {
            return Err(format!("orders {}x{} below 2", self.order_u, self.order_v));
        }
        if self.count_u < self.order_u || self.count_v < self.order_v {
            return Err(format!(
                "{}x{} control points cannot carry order {}x{}",
                self.count_u, self.count_v, self.order_u, self.order_v
            ));
        }
        let expected = grid_size(self.count_u, self.count_v)?;
        if self.control_points.len() != expected {
            return Err(format!(
                "expected {} control points, found {}",
                expected,
                self.control_points.len()
            ));
        }
        if self.count_u.checked_add(self.order_u) != Some(self.knots_u.len())
            || self.count_v.checked_add(self.order_v) != Some(self.knots_v.len())
        {
            return Err("knot vector length does not match count + order".to_owned());
        }
        if self.step_u > MAX_SURFACE_STEP || self.step_v > MAX_SURFACE_STEP {
            return Err(format!(
                "step {}x{} exceeds {}",
                self.step_u, self.step_v, MAX_SURFACE_STEP
            ));
        }
        Ok(())
    }

    /// Uniform clamped knot vectors, used when the file leaves them out.
    pub fn clamped_knots(count: usize, order: usize) -> Vec<f64> {
        let spans = (count + 1).saturating_sub(order).max(1) as f64;
        (0..count + order)
            .map(|i| {
                if i < order {
                    0.0
                } else if i >= count {
                    1.0
                } else {
                    (i + 1 - order) as f64 / spans
                }
            })
            .collect()
    }

    pub fn evaluate(&self, u: f64, v: f64) -> DVec3 {
        let basis_u = basis(&self.knots_u, self.order_u, self.count_u, u);
        let basis_v = basis(&self.knots_v, self.order_v, self.count_v, v);

        let mut sum = DVec4::ZERO;
        for (j, bv) in basis_v.iter().enumerate() {
            if *bv == 0.0 {
                continue;
            }
            for (i, bu) in basis_u.iter().enumerate() {
                let point = self.control_points[j * self.count_u + i];
                let weight = bu * bv * point.w;
                sum += DVec4::new(point.x * weight, point.y * weight, point.z * weight, weight);
            }
        }

        if sum.w.abs() < f64::EPSILON {
            DVec3::ZERO
        } else {
            sum.truncate() / sum.w
        }
    }

    pub fn tessellate(&self) -> Result<SurfaceGrid, String> {
        puffin::profile_function!();

        self.validate()?;

        let (u0, u1) = domain(&self.knots_u, self.order_u, self.count_u);
        let (v0, v1) = domain(&self.knots_v, self.order_v, self.count_v);
        let columns = samples(self.count_u, self.order_u, self.step_u)?;
        let rows = samples(self.count_v, self.order_v, self.step_v)?;
        grid_size(columns, rows)?;

        let mut grid = SurfaceGrid {
            columns,
            rows,
            ..Default::default()
        };
        for row in 0..rows {
            let t = row as f64 / (rows - 1) as f64;
            for column in 0..columns {
                let s = column as f64 / (columns - 1) as f64;
                grid.positions
                    .push(self.evaluate(u0 + (u1 - u0) * s, v0 + (v1 - v0) * t));
                grid.parameters.push(DVec2::new(s, t));
            }
        }
        Ok(grid)
    }
}

fn domain(knots: &[f64], order: usize, count: usize) -> (f64, f64) {
    (knots[order - 1], knots[count])
}

fn samples(count: usize, order: usize, step: usize) -> Result<usize, String> {
    let spans = count + 1 - order;
    spans
        .checked_mul(step.max(1))
        .and_then(|samples| samples.checked_add(1))
        .ok_or_else(|| format!("{} spans at step {} overflow", spans, step))
}

fn grid_size(columns: usize, rows: usize) -> Result<usize, String> {
    columns
        .checked_mul(rows)
        .ok_or_else(|| format!("{}x{} grid is too large", columns, rows))
}

/// Cox-de Boor recursion, returning all `count` basis functions of the given order at `t`.
fn basis(knots: &[f64], order: usize, count: usize, t: f64) -> Vec<f64> {
    let (_, end) = domain(knots, order, count);

    let mut n: Vec<f64> = (0..knots.len() - 1)
        .map(|i| {
            let inside = knots[i] <= t && t < knots[i + 1];
            // The closing end of the domain belongs to the last non-empty span.
            let closing = t >= end && knots[i] < knots[i + 1] && knots[i + 1] >= end && knots[i] < end;
            if inside || closing {
                1.0
            } else {
                0.0
            }
        })
        .collect();

    for k in 2..=order {
        for i in 0..knots.len() - k {
            let left_span = knots[i + k - 1] - knots[i];
            let right_span = knots[i + k] - knots[i + 1];
            let left = if left_span > 0.0 {
                (t - knots[i]) / left_span * n[i]
            } else {
                0.0
            };
            let right = if right_span > 0.0 {
                (knots[i + k] - t) / right_span * n[i + 1]
            } else {
                0.0
            };
            n[i] = left + right;
        }
    }

    n.truncate(count);
    n
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchType {
    Bezier,
    BezierQuadric,
    Cardinal,
    BSpline,
    #[default]
    Linear,
}

impl PatchType {
    pub fn from_fbx(value: &str) -> Self {
        match value {
            "Bezier" => Self::Bezier,
            "BezierQuadric" => Self::BezierQuadric,
            "Cardinal" => Self::Cardinal,
            "BSpline" => Self::BSpline,
            _ => Self::Linear,
        }
    }
}

/// A patch surface given by its control grid.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    pub patch_type: PatchType,
    pub count_u: usize,
    pub count_v: usize,
    pub control_points: Vec<DVec3>,
}

impl Patch {
    /// Tessellates over the control grid itself. Curved patch types are approximated by their hull.
    pub fn tessellate(&self) -> Result<SurfaceGrid, String> {
        if self.count_u < 2 || self.count_v < 2 {
            return Err(format!("{}x{} control grid is degenerate", self.count_u, self.count_v));
        }
        let expected = grid_size(self.count_u, self.count_v)?;
        if self.control_points.len() != expected {
            return Err(format!(
                "expected {} control points, found {}",
                expected,
                self.control_points.len()
            ));
        }
        if self.patch_type != PatchType::Linear {
            log::debug!("Approximating {:?} patch by its control grid", self.patch_type);
        }

        let parameters = (0..self.count_v)
            .flat_map(|row| {
                (0..self.count_u).map(move |column| {
                    DVec2::new(
                        column as f64 / (self.count_u - 1) as f64,
                        row as f64 / (self.count_v - 1) as f64,
                    )
                })
            })
            .collect();

        Ok(SurfaceGrid {
            columns: self.count_u,
            rows: self.count_v,
            positions: self.control_points.clone(),
            parameters,
        })
    }
}

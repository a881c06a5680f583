//! Rounding, axis conventions and Euler rotation math
//!
//! The host is Z-up; the engine reads coordinates in (x, z, y) order.
//! Every value written to the text formats goes through [`round6`] and is
//! rendered with [`Decimal`].

use glam::{Mat3, Vec3};
use std::f32::consts::PI;
use std::fmt;

/// Round to 6 decimal places
pub fn round6(value: f64) -> f64 {
    // Tiny negatives round to -0.0, which renders as "-0.0".
    (value * 1e6).round() / 1e6
}

/// Round each component of a host vector to 6 decimal places
pub fn round_vec3(v: Vec3) -> [f64; 3] {
    [
        round6(v.x as f64),
        round6(v.y as f64),
        round6(v.z as f64),
    ]
}

/// Reorder a host-space (x, y, z) triple to engine order (x, z, y)
pub fn swap_yz<T: Copy>(v: [T; 3]) -> [T; 3] {
    [v[0], v[2], v[1]]
}

/// Round and swap a host vector into engine convention
pub fn engine_vec3(v: Vec3) -> [f64; 3] {
    swap_yz(round_vec3(v))
}

/// Float rendering used by both text formats, matching Python's `repr`.
///
/// Values use the shortest digits that round-trip. Integral values keep one
/// decimal (`1.0`, `-2.0`). Magnitudes below `1e-4` or from `1e16` up switch
/// to scientific notation with a signed two digit exponent (`5e-05`, `1e+16`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decimal(pub f64);

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if !v.is_finite() {
            return write!(f, "{}", v);
        }
        if v != 0.0 {
            let scientific = format!("{:e}", v);
            if let Some((mantissa, exponent)) = scientific.split_once('e') {
                let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;
                if !(-4..16).contains(&exponent) {
                    let sign = if exponent < 0 { '-' } else { '+' };
                    return write!(f, "{}e{}{:02}", mantissa, sign, exponent.abs());
                }
            }
        }
        if v.fract() == 0.0 {
            write!(f, "{:.1}", v)
        } else {
            write!(f, "{}", v)
        }
    }
}

/// Euler rotation order, named by the order the axes are applied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EulerOrder {
    #[default]
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl EulerOrder {
    pub const ALL: [EulerOrder; 6] = [
        EulerOrder::Xyz,
        EulerOrder::Xzy,
        EulerOrder::Yxz,
        EulerOrder::Yzx,
        EulerOrder::Zxy,
        EulerOrder::Zyx,
    ];

    /// Parse a host rotation mode (`"XYZ"`, `"QUATERNION"`, ...)
    ///
    /// Anything that is not a permutation of the three axes falls back to
    /// `XYZ`.
    pub fn from_rotation_mode(mode: &str) -> Self {
        match mode {
            "XYZ" => EulerOrder::Xyz,
            "XZY" => EulerOrder::Xzy,
            "YXZ" => EulerOrder::Yxz,
            "YZX" => EulerOrder::Yzx,
            "ZXY" => EulerOrder::Zxy,
            "ZYX" => EulerOrder::Zyx,
            _ => EulerOrder::Xyz,
        }
    }

    /// The same axes in reverse order
    pub fn reversed(self) -> Self {
        match self {
            EulerOrder::Xyz => EulerOrder::Zyx,
            EulerOrder::Xzy => EulerOrder::Yzx,
            EulerOrder::Yxz => EulerOrder::Zxy,
            EulerOrder::Yzx => EulerOrder::Xzy,
            EulerOrder::Zxy => EulerOrder::Yxz,
            EulerOrder::Zyx => EulerOrder::Xyz,
        }
    }

    /// Axis indices (i, j, k) and whether the order is an odd permutation
    fn axes(self) -> ([usize; 3], bool) {
        match self {
            EulerOrder::Xyz => ([0, 1, 2], false),
            EulerOrder::Xzy => ([0, 2, 1], true),
            EulerOrder::Yxz => ([1, 0, 2], true),
            EulerOrder::Yzx => ([1, 2, 0], false),
            EulerOrder::Zxy => ([2, 0, 1], false),
            EulerOrder::Zyx => ([2, 1, 0], true),
        }
    }
}

// Column-major accessors: `at(m, c, r)` is column c, row r.
fn at(m: &Mat3, col: usize, row: usize) -> f32 {
    m.col(col)[row]
}

/// Compose a rotation matrix from Euler angles (radians, indexed by axis)
pub fn euler_to_mat3(euler: Vec3, order: EulerOrder) -> Mat3 {
    let ([i, j, k], parity) = order.axes();
    let (ti, tj, th) = if parity {
        (-euler[i], -euler[j], -euler[k])
    } else {
        (euler[i], euler[j], euler[k])
    };

    let (si, ci) = ti.sin_cos();
    let (sj, cj) = tj.sin_cos();
    let (sh, ch) = th.sin_cos();
    let cc = ci * ch;
    let cs = ci * sh;
    let sc = si * ch;
    let ss = si * sh;

    let mut cols = [[0.0f32; 3]; 3];
    cols[i][i] = cj * ch;
    cols[j][i] = sj * sc - cs;
    cols[k][i] = sj * cc + ss;
    cols[i][j] = cj * sh;
    cols[j][j] = sj * ss + cc;
    cols[k][j] = sj * cs - sc;
    cols[i][k] = -sj;
    cols[j][k] = cj * si;
    cols[k][k] = cj * ci;
    Mat3::from_cols_array_2d(&cols)
}

/// Both Euler solutions of a normalized rotation matrix
fn mat3_to_euler_pair(m: &Mat3, order: EulerOrder) -> (Vec3, Vec3) {
    let ([i, j, k], parity) = order.axes();
    let mut eul1 = Vec3::ZERO;
    let mut eul2 = Vec3::ZERO;

    let cy = at(m, i, i).hypot(at(m, i, j));
    if cy > 16.0 * f32::EPSILON {
        eul1[i] = at(m, j, k).atan2(at(m, k, k));
        eul1[j] = (-at(m, i, k)).atan2(cy);
        eul1[k] = at(m, i, j).atan2(at(m, i, i));

        eul2[i] = (-at(m, j, k)).atan2(-at(m, k, k));
        eul2[j] = (-at(m, i, k)).atan2(-cy);
        eul2[k] = (-at(m, i, j)).atan2(-at(m, i, i));
    } else {
        // Gimbal lock: the k angle is folded into i.
        eul1[i] = (-at(m, k, j)).atan2(at(m, j, j));
        eul1[j] = (-at(m, i, k)).atan2(cy);
        eul1[k] = 0.0;
        eul2 = eul1;
    }

    if parity {
        (-eul1, -eul2)
    } else {
        (eul1, eul2)
    }
}

fn normalize_mat3(m: &Mat3) -> Mat3 {
    Mat3::from_cols(
        m.x_axis.normalize_or_zero(),
        m.y_axis.normalize_or_zero(),
        m.z_axis.normalize_or_zero(),
    )
}

/// Decompose a rotation (scale is normalized away) without a reference
pub fn mat3_to_euler(m: &Mat3, order: EulerOrder) -> Vec3 {
    let (eul1, eul2) = mat3_to_euler_pair(&normalize_mat3(m), order);
    let d1 = eul1.abs().element_sum();
    let d2 = eul2.abs().element_sum();
    if d1 > d2 {
        eul2
    } else {
        eul1
    }
}

/// Shift each angle of `euler` by whole turns toward `previous`
pub fn compatible_euler(euler: Vec3, previous: Vec3) -> Vec3 {
    // Thresholds slightly above pi give smoother results on baked curves.
    const PI_THRESH: f32 = 5.1;
    const PI_X2: f32 = 2.0 * PI;

    let mut eul = euler;
    let mut deul = Vec3::ZERO;
    for i in 0..3 {
        deul[i] = eul[i] - previous[i];
        if deul[i] > PI_THRESH {
            eul[i] -= ((deul[i] / PI_X2) + 0.5).floor() * PI_X2;
            deul[i] = eul[i] - previous[i];
        } else if deul[i] < -PI_THRESH {
            eul[i] += ((-deul[i] / PI_X2) + 0.5).floor() * PI_X2;
            deul[i] = eul[i] - previous[i];
        }
    }

    // One axis off by more than half a turn while the others barely moved.
    for i in 0..3 {
        let (a, b) = ((i + 1) % 3, (i + 2) % 3);
        if deul[i].abs() > 3.2 && deul[a].abs() < 1.6 && deul[b].abs() < 1.6 {
            if deul[i] > 0.0 {
                eul[i] -= PI_X2;
            } else {
                eul[i] += PI_X2;
            }
        }
    }
    eul
}

/// Decompose a rotation, picking the Euler solution nearest `previous`
pub fn mat3_to_compatible_euler(m: &Mat3, order: EulerOrder, previous: Vec3) -> Vec3 {
    let (eul1, eul2) = mat3_to_euler_pair(&normalize_mat3(m), order);
    let eul1 = compatible_euler(eul1, previous);
    let eul2 = compatible_euler(eul2, previous);

    let d1 = (eul1 - previous).abs().element_sum();
    let d2 = (eul2 - previous).abs().element_sum();
    if d1 > d2 {
        eul2
    } else {
        eul1
    }
}

/// Convert a decomposed rotation to the emitted form: negated degrees,
/// rounded, with near-zero noise snapped to exactly zero
pub fn emitted_degrees(euler: Vec3) -> [f64; 3] {
    let mut out = [0.0f64; 3];
    for (axis, value) in out.iter_mut().enumerate() {
        let degrees = -round6(euler[axis] as f64).to_degrees();
        *value = if degrees.abs() < 0.01 { 0.0 } else { degrees };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_near(a: Vec3, b: Vec3, eps: f32) {
        assert!(
            (a - b).abs().max_element() < eps,
            "expected {:?} to be within {} of {:?}",
            a,
            eps,
            b
        );
    }

    #[test]
    fn test_decimal_rendering() {
        assert_eq!(Decimal(0.0).to_string(), "0.0");
        assert_eq!(Decimal(1.0).to_string(), "1.0");
        assert_eq!(Decimal(-45.0).to_string(), "-45.0");
        assert_eq!(Decimal(0.5).to_string(), "0.5");
        assert_eq!(Decimal(round6(0.1f32 as f64)).to_string(), "0.1");
        assert_eq!(Decimal(0.0001).to_string(), "0.0001");
        assert_eq!(Decimal(123456.5).to_string(), "123456.5");
    }

    #[test]
    fn test_decimal_small_and_huge_use_exponent() {
        assert_eq!(Decimal(0.00005).to_string(), "5e-05");
        assert_eq!(Decimal(-0.000015).to_string(), "-1.5e-05");
        assert_eq!(Decimal(0.000001).to_string(), "1e-06");
        assert_eq!(Decimal(round6(0.0000123456)).to_string(), "1.2e-05");
        assert_eq!(Decimal(1e16).to_string(), "1e+16");
        assert_eq!(Decimal(2.5e17).to_string(), "2.5e+17");
        assert_eq!(Decimal(9999999999999998.0).to_string(), "9999999999999998.0");
    }

    #[test]
    fn test_round6() {
        assert_eq!(round6(1.23456789), 1.234568);
        assert_eq!(round6(-0.0000004), 0.0);
        assert_eq!(Decimal(round6(-0.0000004)).to_string(), "-0.0");
        assert_eq!(round6(2.0), 2.0);
    }

    #[test]
    fn test_engine_vec3_swaps_y_and_z() {
        assert_eq!(engine_vec3(Vec3::new(1.0, 2.0, 3.0)), [1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_rotation_mode_fallback() {
        assert_eq!(EulerOrder::from_rotation_mode("ZXY"), EulerOrder::Zxy);
        assert_eq!(EulerOrder::from_rotation_mode("QUATERNION"), EulerOrder::Xyz);
        assert_eq!(EulerOrder::from_rotation_mode("AXIS_ANGLE"), EulerOrder::Xyz);
        assert_eq!(EulerOrder::from_rotation_mode("XXY"), EulerOrder::Xyz);
    }

    #[test]
    fn test_reversed_order() {
        for order in EulerOrder::ALL {
            assert_eq!(order.reversed().reversed(), order);
        }
        assert_eq!(EulerOrder::Xyz.reversed(), EulerOrder::Zyx);
        assert_eq!(EulerOrder::Yzx.reversed(), EulerOrder::Xzy);
    }

    #[test]
    fn test_xyz_matches_axis_rotations() {
        let euler = Vec3::new(0.3, -0.2, 0.7);
        let expected = Mat3::from_rotation_z(euler.z)
            * Mat3::from_rotation_y(euler.y)
            * Mat3::from_rotation_x(euler.x);
        let m = euler_to_mat3(euler, EulerOrder::Xyz);
        for c in 0..3 {
            assert_vec3_near(m.col(c), expected.col(c), 1e-5);
        }
    }

    #[test]
    fn test_euler_round_trip_all_orders() {
        let euler = Vec3::new(0.4, -0.9, 1.3);
        for order in EulerOrder::ALL {
            let m = euler_to_mat3(euler, order);
            let back = mat3_to_euler(&m, order);
            assert_vec3_near(back, euler, 1e-4);
        }
    }

    #[test]
    fn test_decomposition_ignores_scale() {
        let euler = Vec3::new(0.1, 0.2, 0.3);
        let m = euler_to_mat3(euler, EulerOrder::Zyx) * Mat3::from_diagonal(Vec3::splat(2.5));
        assert_vec3_near(mat3_to_euler(&m, EulerOrder::Zyx), euler, 1e-4);
    }

    #[test]
    fn test_compatible_euler_removes_full_turns() {
        let previous = Vec3::new(0.1, -0.2, 0.3);
        let wrapped = previous + Vec3::new(2.0 * PI, 0.0, -4.0 * PI);
        assert_vec3_near(compatible_euler(wrapped, previous), previous, 1e-4);
    }

    #[test]
    fn test_compatible_decomposition_avoids_wrap() {
        // Frame 1 sits just below +pi on x, frame 2 just past it. The raw
        // decomposition of frame 2 wraps to about -pi.
        let order = EulerOrder::Zyx;
        let frame1 = Vec3::new(3.1, 0.05, 0.0);
        let frame2 = Vec3::new(3.2, 0.05, 0.0);

        let emitted1 =
            mat3_to_compatible_euler(&euler_to_mat3(frame1, order), order, Vec3::ZERO);
        let raw2 = mat3_to_euler(&euler_to_mat3(frame2, order), order);
        let emitted2 = mat3_to_compatible_euler(&euler_to_mat3(frame2, order), order, emitted1);

        assert!((raw2.x - emitted1.x).abs() > PI);
        assert!((emitted2.x - emitted1.x).abs() < PI);
        assert!((emitted2.x - 3.2).abs() < 1e-3);
    }

    #[test]
    fn test_emitted_degrees_negates_and_snaps() {
        let out = emitted_degrees(Vec3::new(std::f32::consts::FRAC_PI_2, 0.0000001, -0.0001));
        assert!((out[0] + 90.0).abs() < 1e-3);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 0.0);
        assert!(out[2].is_sign_positive());
    }
}

//! Constant-velocity Kalman filter over XYAH box state.
//!
//! State is 8-dimensional: (cx, cy, aspect, height) plus their velocities.
//! The 4x4 innovation inverse goes through nalgebra to stay free of
//! BLAS/LAPACK.

use ndarray::{Array1, Array2};

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    std_weight_position: f64,
    std_weight_velocity: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn diagonal(std: &[f64]) -> Array2<f64> {
    let mut cov = Array2::zeros((std.len(), std.len()));
    for (i, s) in std.iter().enumerate() {
        cov[[i, i]] = s * s;
    }
    cov
}

impl KalmanFilter {
    pub fn new() -> Self {
        let ndim = 4;
        let mut motion_mat = Array2::eye(2 * ndim);
        for i in 0..ndim {
            motion_mat[[i, ndim + i]] = 1.0;
        }
        let mut update_mat = Array2::zeros((ndim, 2 * ndim));
        for i in 0..ndim {
            update_mat[[i, i]] = 1.0;
        }
        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
        }
    }

    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(8);
        for i in 0..4 {
            mean[i] = measurement[i];
        }

        let h = measurement[3];
        let wp = self.std_weight_position;
        let wv = self.std_weight_velocity;
        let cov = diagonal(&[
            2.0 * wp * h,
            2.0 * wp * h,
            1e-2,
            2.0 * wp * h,
            10.0 * wv * h,
            10.0 * wv * h,
            1e-5,
            10.0 * wv * h,
        ]);

        (mean, cov)
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3];
        let wp = self.std_weight_position;
        let wv = self.std_weight_velocity;
        let motion_cov = diagonal(&[
            wp * h,
            wp * h,
            1e-2,
            wp * h,
            wv * h,
            wv * h,
            1e-5,
            wv * h,
        ]);

        let new_mean = self.motion_mat.dot(mean);
        let new_cov = self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + motion_cov;
        (new_mean, new_cov)
    }

    fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3];
        let wp = self.std_weight_position;
        let innovation_cov = diagonal(&[wp * h, wp * h, 1e-1, wp * h]);

        let mean_proj = self.update_mat.dot(mean);
        let cov_proj = self.update_mat.dot(covariance).dot(&self.update_mat.t()) + innovation_cov;
        (mean_proj, cov_proj)
    }

    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> (Array1<f64>, Array2<f64>) {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let innovation = Array1::from_vec(measurement.to_vec()) - projected_mean;

        // K = P H^T S^-1, with H = [I 0] so P H^T is the first four columns
        // of P and S the 4x4 projected covariance.
        let s_inv = invert_4x4(&projected_cov);
        let kalman_gain = covariance.dot(&self.update_mat.t()).dot(&s_inv);

        let new_mean = mean + kalman_gain.dot(&innovation);
        let new_cov = covariance - kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());
        (new_mean, new_cov)
    }
}

fn invert_4x4(m: &Array2<f64>) -> Array2<f64> {
    let mut nm = nalgebra::Matrix4::zeros();
    for i in 0..4 {
        for j in 0..4 {
            nm[(i, j)] = m[[i, j]];
        }
    }
    let inv = nm.try_inverse().expect("4x4 innovation covariance inversion failed");
    let mut res = Array2::zeros((4, 4));
    for i in 0..4 {
        for j in 0..4 {
            res[[i, j]] = inv[(i, j)];
        }
    }
    res
}

#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

/// Monthly sales with one spike in the last row.
pub const SALES_CSV: &str = "month,sales,region\n\
1,100,north\n\
2,110,south\n\
3,121,north\n\
4,133,east\n\
5,146,south\n\
6,161,north\n\
7,177,east\n\
8,400,north\n";

/// Writes `contents` to `name` inside a fresh temp dir. Keep the dir alive for the test.
pub fn write_temp_file(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write temp file");
    (dir, path)
}

/// y = slope·x + intercept sampled at x = 0..n.
pub fn line(n: usize, slope: f64, intercept: f64) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let y = x.iter().map(|x| slope * x + intercept).collect();
    (x, y)
}

/// 1 − SSR/SST, computed without touching library code.
pub fn r_squared(y: &[f64], predicted: &[f64]) -> f64 {
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let sst: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let ssr: f64 = y
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    1.0 - ssr / sst
}

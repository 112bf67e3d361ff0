/// Per-column standardization to zero mean and unit (population) variance.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Constant columns get scale 1 so they map to 0 instead of NaN.
    pub fn fit(data: &[Vec<f64>]) -> Self {
        let Some(first) = data.first() else { return Self::default() };
        let dims = first.len();
        let n = data.len() as f64;
        let mut mean = vec![0.0; dims];
        let mut scale = vec![1.0; dims];
        for j in 0..dims {
            let m = data.iter().map(|r| r[j]).sum::<f64>() / n;
            let var = data.iter().map(|r| (r[j] - m).powi(2)).sum::<f64>() / n;
            mean[j] = m;
            if var > 0.0 {
                scale[j] = var.sqrt();
            }
        }
        Self { mean, scale }
    }

    pub fn transform(&self, data: &[Vec<f64>]) -> Vec<Vec<f64>> {
        data.iter()
            .map(|r| r.iter().zip(self.mean.iter().zip(&self.scale)).map(|(v, (m, s))| (v - m) / s).collect())
            .collect()
    }

    pub fn inverse_transform(&self, data: &[Vec<f64>]) -> Vec<Vec<f64>> {
        data.iter()
            .map(|r| r.iter().zip(self.mean.iter().zip(&self.scale)).map(|(v, (m, s))| v * s + m).collect())
            .collect()
    }

    pub fn fit_transform(data: &[Vec<f64>]) -> (Self, Vec<Vec<f64>>) {
        let s = Self::fit(data);
        let t = s.transform(data);
        (s, t)
    }
}

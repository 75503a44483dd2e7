use itertools::Itertools;

// Ports of the numpy helpers gensim's variational inference relies on.

pub(crate) fn dirichlet_expectation_1d(alphas: &[f64]) -> Vec<f64> {
    let psi_sum_alpha = statrs::function::gamma::digamma(alphas.iter().sum());
    alphas
        .iter()
        .map(|alpha| statrs::function::gamma::digamma(*alpha) - psi_sum_alpha)
        .collect()
}

pub(crate) fn dirichlet_expectation_2d(alphas: &[Vec<f64>]) -> Vec<Vec<f64>> {
    alphas
        .iter()
        .map(|values| dirichlet_expectation_1d(values))
        .collect()
}

/// `a (1×n) · b (n×m) → (1×m)`
pub(crate) fn dot(a: &[f64], b: &[Vec<f64>]) -> Vec<f64> {
    assert!(!b.is_empty());
    (0..b[0].len())
        .map(|pos| {
            a.iter()
                .zip_eq(b.iter().map(|row| row[pos]))
                .map(|(x, y)| x * y)
                .sum::<f64>()
        })
        .collect()
}

pub(crate) fn transpose(v: &[Vec<f64>]) -> Vec<Vec<f64>> {
    assert!(!v.is_empty());
    (0..v[0].len())
        .map(|i| v.iter().map(|inner| inner[i]).collect())
        .collect()
}

#[cfg(test)]
mod test {
    use super::{dot, transpose};

    #[test]
    fn dot_matches_hand_computation() {
        let a = vec![1.0, 2.0];
        let b = vec![vec![3.0, 4.0], vec![5.0, 6.0]];
        assert_eq!(vec![13.0, 16.0], dot(&a, &b));
    }

    #[test]
    fn transpose_flips_axes() {
        let m = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert_eq!(vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]], transpose(&m));
    }
}

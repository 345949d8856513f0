use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Size of the held-out partition: `ceil(test_size * total)`, clamped to `total`.
pub fn test_count(total: usize, test_size: f64) -> usize {
    ((total as f64) * test_size).ceil().min(total as f64).max(0.0) as usize
}

/// Seeded shuffle then split. The same `(items, test_size, seed)` always
/// yields the same partitions.
pub fn train_test_split<T>(items: Vec<T>, test_size: f64, seed: u64) -> Split<T> {
    let total = items.len();
    let n_test = test_count(total, test_size);

    let mut order: Vec<usize> = (0..total).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut take = |idx: &usize| slots[*idx].take();

    let test: Vec<T> = order[..n_test].iter().filter_map(&mut take).collect();
    let train: Vec<T> = order[n_test..].iter().filter_map(&mut take).collect();

    tracing::debug!(
        target: "training",
        train = train.len(),
        test = test.len(),
        seed,
        "dataset split"
    );

    Split { train, test }
}

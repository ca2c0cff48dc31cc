use rand::seq::SliceRandom;
use rand::Rng;

/// Picks `k` distinct elements of `pool` in uniformly random order.
///
/// Shuffles a copy of the whole pool with Fisher-Yates and keeps the first
/// `min(k, pool.len())` elements, so every ordered selection is equally likely.
pub fn draw_without_replacement<T, R>(pool: &[T], k: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let mut drawn = pool.to_vec();
    drawn.shuffle(rng);
    drawn.truncate(k.min(pool.len()));
    drawn
}

/// Returns `items` in a uniformly random presentation order.
///
/// Never sort with a random comparator instead; that does not produce every
/// permutation with equal probability.
pub fn shuffle_presentation_order<T, R>(items: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

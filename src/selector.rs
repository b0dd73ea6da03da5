//! Uniform random choice over the validated candidate pool.

use rand::Rng;

use crate::candidate::VideoCandidate;

/// Pick one candidate uniformly at random; `None` when the pool is empty.
pub fn select<'a, R: Rng + ?Sized>(
    candidates: &'a [VideoCandidate],
    rng: &mut R,
) -> Option<&'a VideoCandidate> {
    if candidates.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..candidates.len());
    Some(&candidates[index])
}

/// Like [`select`], but when the draw equals `last_url` and more than one
/// candidate is available, redraw once. A singleton pool always returns its
/// only element, so there is no loop to get stuck in.
pub fn select_avoiding<'a, R: Rng + ?Sized>(
    candidates: &'a [VideoCandidate],
    rng: &mut R,
    last_url: Option<&str>,
) -> Option<&'a VideoCandidate> {
    let first = select(candidates, rng)?;
    if candidates.len() > 1 && last_url == Some(first.url.as_str()) {
        return select(candidates, rng);
    }
    Some(first)
}

use rand::seq::SliceRandom;
use rand::Rng;

/// How many wrong answers are offered next to the correct one in choice mode.
pub const DISTRACTOR_COUNT: usize = 3;

/// Builds the choice-mode answer list: the correct answer plus up to `count`
/// distractors drawn from `pool`, in random order.
///
/// Distractors are distinct answers other than the correct one, drawn uniformly
/// without replacement. If fewer than `count` are available all of them are used,
/// so a small bank yields fewer options.
pub fn build_options<R, I>(correct_answer: &str, pool: I, count: usize, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = String>,
{
    let mut pool = pool
        .into_iter()
        .filter(|answer| answer != correct_answer)
        .collect::<Vec<_>>();
    // A brand listed twice in the bank must not show up as two buttons
    pool.sort();
    pool.dedup();

    let mut options = pool
        .choose_multiple(rng, count)
        .cloned()
        .collect::<Vec<_>>();
    options.push(correct_answer.to_string());

    // Fisher-Yates over the whole list, so the correct answer isn't always last
    options.shuffle(rng);
    options
}

//! Synthetic inputs for the corpus preparation.

use std::fmt::Write;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Words of a synthetic corpus, earlier words are drawn more often.
pub const WORDS: [&str; 12] = [
    "the", "cat", "sat", "on", "mat", "dog", "ran", "far", "away", "bird", "sang", "loud",
];

/// Formats word vectors in the GloVe text format.
pub fn glove<V>(vectors: &[(&str, V)]) -> String
where
    V: AsRef<[f32]>,
{
    let mut text = String::new();
    for (token, vector) in vectors {
        text.push_str(token);
        for value in vector.as_ref() {
            // writing to a string can't fail
            let _ = write!(text, " {}", value);
        }
        text.push('\n');
    }

    text
}

/// Formats rows of text, sex and age as csv with the header `text,sex,age`.
pub fn csv(rows: &[(&str, &str, u8)]) -> String {
    let mut csv = String::from("text,sex,age\n");
    for (text, sex, age) in rows {
        let _ = writeln!(csv, "\"{}\",{},{}", text.replace('"', "\"\""), sex, age);
    }

    csv
}

/// Generates seeded random rows of text, sex and age.
///
/// The texts have between `1` and `max_words` words from [`WORDS`].
pub fn random_rows(
    nr_rows: usize,
    max_words: usize,
    seed: u64,
) -> Vec<(String, &'static str, u8)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..nr_rows)
        .map(|_| {
            let nr_words = rng.gen_range(1..=max_words.max(1));
            let text = (0..nr_words)
                .map(|_| {
                    // skews the distribution towards the first words
                    let idx = rng.gen_range(0..WORDS.len());
                    WORDS[rng.gen_range(0..=idx)]
                })
                .collect::<Vec<_>>()
                .join(" ");
            let sex = if rng.gen_bool(0.5) { "male" } else { "female" };
            (text, sex, rng.gen_range(13..=80))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glove() {
        let text = glove(&[("a", &[1., -0.5]), ("b c", &[0., 2.])]);
        assert_eq!(text, "a 1 -0.5\nb c 0 2\n");
    }

    #[test]
    fn test_csv() {
        let csv = csv(&[("say \"hi\", then go", "male", 30)]);
        assert_eq!(csv, "text,sex,age\n\"say \"\"hi\"\", then go\",male,30\n");
    }

    #[test]
    fn test_random_rows() {
        let rows = random_rows(50, 10, 3);
        assert_eq!(rows.len(), 50);
        assert_eq!(rows, random_rows(50, 10, 3));
        for (text, sex, age) in &rows {
            let nr_words = text.split(' ').count();
            assert!((1..=10).contains(&nr_words));
            assert!(*sex == "male" || *sex == "female");
            assert!((13..=80).contains(age));
        }
    }
}

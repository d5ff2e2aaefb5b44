use crate::error::{Error, Result};
use crate::types::{DocId, Score};

/// Pick the id with the highest score.
///
/// Ties go to the first maximal index. NaN never beats a real score; when
/// every score is NaN the first id is returned.
pub fn select(ids: &[DocId], scores: &[Score]) -> Result<DocId> {
    if ids.len() != scores.len() {
        return Err(Error::LengthMismatch { ids: ids.len(), values: scores.len() });
    }
    if ids.is_empty() {
        return Err(Error::EmptyCandidateSet);
    }

    let mut best: Option<(usize, Score)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if score <= b => {}
            _ => best = Some((i, score)),
        }
    }
    Ok(ids[best.map_or(0, |(i, _)| i)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_max_wins() {
        assert_eq!(select(&[5, 7, 9], &[1.0, 2.0, 2.0]).unwrap(), 7);
        assert_eq!(select(&[5, 7, 9], &[3.0, 3.0, 3.0]).unwrap(), 5);
    }

    #[test]
    fn picks_arg_max() {
        assert_eq!(select(&[1, 2, 3], &[0.1, -0.5, 0.9]).unwrap(), 3);
        assert_eq!(select(&[42], &[-1.0]).unwrap(), 42);
    }

    #[test]
    fn empty_is_error() {
        assert!(matches!(select(&[], &[]), Err(Error::EmptyCandidateSet)));
    }

    #[test]
    fn mismatched_lengths_is_error() {
        assert!(matches!(select(&[1, 2], &[0.5]), Err(Error::LengthMismatch { ids: 2, values: 1 })));
    }

    #[test]
    fn nan_never_wins() {
        assert_eq!(select(&[1, 2, 3], &[f32::NAN, 0.2, 0.1]).unwrap(), 2);
        assert_eq!(select(&[1, 2], &[f32::NAN, f32::NAN]).unwrap(), 1);
    }
}

use thiserror::Error;

use crate::frame::Frame;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("unexpected coded_picture_number {found}, should be larger than or equal to {expected}")]
    OutOfOrder { found: u64, expected: u64 },
    #[error("frame {index} has no coded_picture_number")]
    MissingPictureNumber { index: usize },
}

fn picture_number(frame: &Frame, index: usize) -> Result<u64, SequenceError> {
    frame
        .coded_picture_number
        .ok_or(SequenceError::MissingPictureNumber { index })
}

/// Splits `frames` into runs without missing picture numbers.
///
/// Concatenating the runs gives back the input. An empty input yields one
/// empty run. Numbers that go backwards or repeat are an error.
pub fn split_frames_by_missing(frames: &[Frame]) -> Result<Vec<Vec<Frame>>, SequenceError> {
    let Some((first, rest)) = frames.split_first() else {
        return Ok(vec![Vec::new()]);
    };

    let mut previous = picture_number(first, 0)?;
    let mut runs = Vec::new();
    let mut current = vec![first.clone()];

    for (i, frame) in rest.iter().enumerate() {
        let number = picture_number(frame, i + 1)?;

        if number <= previous {
            return Err(SequenceError::OutOfOrder {
                found: number,
                expected: previous.saturating_add(1),
            });
        }
        if number - previous > 1 {
            runs.push(std::mem::take(&mut current));
        }

        current.push(frame.clone());
        previous = number;
    }

    runs.push(current);
    Ok(runs)
}

/// True if picture numbers have gaps. Says nothing about frame timing.
pub fn are_frames_missing(frames: &[Frame]) -> Result<bool, SequenceError> {
    Ok(split_frames_by_missing(frames)?.len() > 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameType;

    fn num_f(num: u64) -> Frame {
        Frame {
            frame_type: FrameType::P,
            key_frame: false,
            width: 1,
            height: 1,
            coded_picture_number: Some(num),
        }
    }

    fn frames(nums: &[u64]) -> Vec<Frame> {
        nums.iter().copied().map(num_f).collect()
    }

    fn numbers(runs: &[Vec<Frame>]) -> Vec<Vec<u64>> {
        runs.iter()
            .map(|run| run.iter().filter_map(|f| f.coded_picture_number).collect())
            .collect()
    }

    #[test]
    fn test_no_missing() {
        let input = frames(&[1, 2, 3]);
        let runs = split_frames_by_missing(&input).unwrap();
        assert_eq!(runs, vec![input]);
    }

    #[test]
    fn test_one_missing() {
        let runs = split_frames_by_missing(&frames(&[1, 2, 4, 5])).unwrap();
        assert_eq!(numbers(&runs), vec![vec![1, 2], vec![4, 5]]);
    }

    #[test]
    fn test_two_missing() {
        let runs = split_frames_by_missing(&frames(&[1, 4, 5, 9, 10, 11])).unwrap();
        assert_eq!(numbers(&runs), vec![vec![1], vec![4, 5], vec![9, 10, 11]]);
    }

    #[test]
    fn test_empty() {
        let runs = split_frames_by_missing(&[]).unwrap();
        assert_eq!(runs, vec![Vec::<Frame>::new()]);
    }

    #[test]
    fn test_number_out_of_order() {
        assert_eq!(
            split_frames_by_missing(&frames(&[2, 1])),
            Err(SequenceError::OutOfOrder {
                found: 1,
                expected: 3
            })
        );
    }

    #[test]
    fn test_same_number() {
        assert!(matches!(
            split_frames_by_missing(&frames(&[2, 2])),
            Err(SequenceError::OutOfOrder { found: 2, .. })
        ));
    }

    #[test]
    fn test_largest_picture_number() {
        let runs = split_frames_by_missing(&frames(&[u64::MAX])).unwrap();
        assert_eq!(numbers(&runs), vec![vec![u64::MAX]]);

        let runs = split_frames_by_missing(&frames(&[u64::MAX - 3, u64::MAX - 1, u64::MAX])).unwrap();
        assert_eq!(numbers(&runs), vec![vec![u64::MAX - 3], vec![u64::MAX - 1, u64::MAX]]);

        assert!(matches!(
            split_frames_by_missing(&frames(&[u64::MAX, u64::MAX])),
            Err(SequenceError::OutOfOrder { found: u64::MAX, .. })
        ));
    }

    #[test]
    fn test_missing_picture_number() {
        let mut input = frames(&[4, 5, 6]);
        input[2].coded_picture_number = None;
        assert_eq!(
            split_frames_by_missing(&input),
            Err(SequenceError::MissingPictureNumber { index: 2 })
        );
    }

    #[test]
    fn test_resplit_is_stable() {
        let runs = split_frames_by_missing(&frames(&[3, 4, 8, 9, 10, 20])).unwrap();
        let joined: Vec<Frame> = runs.concat();
        assert_eq!(split_frames_by_missing(&joined).unwrap(), runs);
    }

    #[test]
    fn test_are_frames_missing() {
        assert!(!are_frames_missing(&frames(&[2, 3, 4])).unwrap());
        assert!(are_frames_missing(&frames(&[2, 4, 5])).unwrap());
        assert!(!are_frames_missing(&[]).unwrap());
    }
}

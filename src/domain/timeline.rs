use thiserror::Error;

pub const SECONDS_PER_HOUR: u32 = 3600;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub start_seconds: u32,
    pub end_seconds: u32,
    pub midpoint_seconds: u32,
}

impl Segment {
    /// Half-open: `start_seconds <= time < end_seconds`.
    pub fn contains(&self, time: u32) -> bool {
        time >= self.start_seconds && time < self.end_seconds
    }
}

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum TimelineError {
    #[error("time {time}s is outside the timeline [0, {total_seconds})")]
    TimeOutOfRange { time: u32, total_seconds: u32 },

    #[error("segment index {index} is outside 0..{segment_count}")]
    SegmentOutOfRange { index: usize, segment_count: usize },

    #[error("a timeline needs at least one hour and one segment")]
    Empty,

    #[error("{total_hours}h does not fit in a timeline of u32 seconds")]
    SpanTooLong { total_hours: u32 },

    #[error("{segment_count} segments do not fit in {total_seconds}s")]
    TooManySegments {
        segment_count: usize,
        total_seconds: u32,
    },
}

/// Evenly partitioned span of recorded time, starting at zero.
///
/// Boundaries are computed with integer arithmetic (`i * total / count`) so the segments are
/// contiguous and cover `[0, total_seconds)` exactly, even when the span does not divide evenly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimelineModel {
    total_seconds: u32,
    segments: Vec<Segment>,
}

impl TimelineModel {
    pub fn new(total_hours: u32, segment_count: usize) -> Result<Self, TimelineError> {
        if total_hours == 0 || segment_count == 0 {
            return Err(TimelineError::Empty);
        }
        let total_seconds = total_hours
            .checked_mul(SECONDS_PER_HOUR)
            .ok_or(TimelineError::SpanTooLong { total_hours })?;
        if segment_count as u64 > u64::from(total_seconds) {
            return Err(TimelineError::TooManySegments {
                segment_count,
                total_seconds,
            });
        }

        let boundary = |index: usize| -> u32 {
            let scaled = (index as u64 * u64::from(total_seconds)) / segment_count as u64;
            u32::try_from(scaled).unwrap_or(total_seconds)
        };

        let segments = (0..segment_count)
            .map(|index| {
                let start_seconds = boundary(index);
                let end_seconds = boundary(index + 1);
                Segment {
                    index,
                    start_seconds,
                    end_seconds,
                    midpoint_seconds: start_seconds + (end_seconds - start_seconds) / 2,
                }
            })
            .collect();

        Ok(Self {
            total_seconds,
            segments,
        })
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn total_hours(&self) -> u32 {
        self.total_seconds / SECONDS_PER_HOUR
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segment_at(&self, time: u32) -> Result<&Segment, TimelineError> {
        if time >= self.total_seconds {
            return Err(TimelineError::TimeOutOfRange {
                time,
                total_seconds: self.total_seconds,
            });
        }

        // Segments are sorted and contiguous, so the first one ending after `time` holds it.
        let index = self
            .segments
            .partition_point(|segment| segment.end_seconds <= time);
        self.segments
            .get(index)
            .filter(|segment| segment.contains(time))
            .ok_or(TimelineError::TimeOutOfRange {
                time,
                total_seconds: self.total_seconds,
            })
    }

    pub fn segment_index_for_time(&self, time: u32) -> Result<usize, TimelineError> {
        self.segment_at(time).map(|segment| segment.index)
    }

    pub fn midpoint_of(&self, index: usize) -> Result<u32, TimelineError> {
        self.segments
            .get(index)
            .map(|segment| segment.midpoint_seconds)
            .ok_or(TimelineError::SegmentOutOfRange {
                index,
                segment_count: self.segments.len(),
            })
    }

    /// Clamps an arbitrary (possibly negative) time into `[0, total_seconds)`.
    pub fn clamp_seconds(&self, time: i64) -> u32 {
        let last = i64::from(self.total_seconds.saturating_sub(1));
        u32::try_from(time.clamp(0, last)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> TimelineModel {
        TimelineModel::new(24, 12).expect("timeline")
    }

    #[test]
    fn first_and_last_segments_of_a_day() {
        let timeline = day();
        assert_eq!(timeline.total_seconds(), 86_400);

        let first = timeline.segment(0).expect("segment 0");
        assert_eq!((first.start_seconds, first.end_seconds), (0, 7200));
        assert_eq!(first.midpoint_seconds, 3600);

        let last = timeline.segment(11).expect("segment 11");
        assert_eq!((last.start_seconds, last.end_seconds), (79_200, 86_400));
        assert_eq!(last.midpoint_seconds, 82_800);
    }

    #[test]
    fn segments_are_contiguous_and_cover_the_span() {
        let timeline = TimelineModel::new(5, 7).expect("timeline");
        let segments = timeline.segments();
        assert_eq!(segments.len(), 7);
        assert_eq!(segments[0].start_seconds, 0);
        assert_eq!(segments[6].end_seconds, timeline.total_seconds());
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end_seconds, pair[1].start_seconds);
        }
    }

    #[test]
    fn segment_at_uses_half_open_intervals() {
        let timeline = day();
        assert_eq!(timeline.segment_index_for_time(0), Ok(0));
        assert_eq!(timeline.segment_index_for_time(7199), Ok(0));
        assert_eq!(timeline.segment_index_for_time(7200), Ok(1));
        assert_eq!(timeline.segment_index_for_time(86_399), Ok(11));
        assert_eq!(
            timeline.segment_at(86_400),
            Err(TimelineError::TimeOutOfRange {
                time: 86_400,
                total_seconds: 86_400
            })
        );
    }

    #[test]
    fn midpoint_round_trips_to_its_segment() {
        for timeline in [day(), TimelineModel::new(3, 10).expect("timeline")] {
            for index in 0..timeline.segment_count() {
                let midpoint = timeline.midpoint_of(index).expect("midpoint");
                assert_eq!(timeline.segment_index_for_time(midpoint), Ok(index));
            }
        }
    }

    #[test]
    fn midpoint_of_unknown_segment_fails() {
        assert_eq!(
            day().midpoint_of(12),
            Err(TimelineError::SegmentOutOfRange {
                index: 12,
                segment_count: 12
            })
        );
    }

    #[test]
    fn clamp_keeps_times_inside_the_span() {
        let timeline = day();
        assert_eq!(timeline.clamp_seconds(-5), 0);
        assert_eq!(timeline.clamp_seconds(4000), 4000);
        assert_eq!(timeline.clamp_seconds(1_000_000), 86_399);
    }

    #[test]
    fn rejects_empty_or_overfull_timelines() {
        assert_eq!(TimelineModel::new(0, 12), Err(TimelineError::Empty));
        assert_eq!(TimelineModel::new(24, 0), Err(TimelineError::Empty));
        assert!(matches!(
            TimelineModel::new(1, 3601),
            Err(TimelineError::TooManySegments { .. })
        ));
    }

    #[test]
    fn rejects_spans_longer_than_u32_seconds() {
        assert_eq!(
            TimelineModel::new(2_000_000, 12),
            Err(TimelineError::SpanTooLong {
                total_hours: 2_000_000
            })
        );

        let longest = TimelineModel::new(u32::MAX / SECONDS_PER_HOUR, 12).expect("timeline");
        assert_eq!(longest.total_hours(), u32::MAX / SECONDS_PER_HOUR);
        assert_eq!(
            longest.segments().last().map(|segment| segment.end_seconds),
            Some(longest.total_seconds())
        );
    }

    #[test]
    fn segments_contain_only_their_own_times() {
        let timeline = day();
        let second = timeline.segment(1).expect("segment 1");
        assert!(second.contains(7200));
        assert!(second.contains(14_399));
        assert!(!second.contains(7199));
        assert!(!second.contains(14_400));
    }
}

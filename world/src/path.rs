//! Immutable polyline paths and the cursors that walk them.
//!
//! A path is a sequence of directed segments built once from waypoints. A
//! [`PathCursor`] carries all progress state, so many enemies can walk the
//! same path independently. Fewer than two waypoints produce the empty path,
//! which is a legitimate, immediately terminal route rather than an error.

use glam::Vec2;

/// Directed straight piece of a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSegment {
    direction: Vec2,
    length: f32,
}

impl PathSegment {
    fn between(start: Vec2, end: Vec2) -> Self {
        let vector = end - start;
        Self {
            direction: vector.normalize_or_zero(),
            length: vector.length(),
        }
    }

    /// Unit direction the segment points in.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Length of the segment in world units.
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }
}

/// Immutable polyline assembled from waypoints.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
    total_length: f32,
}

impl Path {
    /// Builds a path with one segment between each pair of consecutive
    /// waypoints.
    ///
    /// Fewer than two waypoints yield the empty path with zero total length.
    #[must_use]
    pub fn from_waypoints(waypoints: &[Vec2]) -> Self {
        if waypoints.len() < 2 {
            return Self::default();
        }

        let segments: Vec<PathSegment> = waypoints
            .windows(2)
            .map(|pair| PathSegment::between(pair[0], pair[1]))
            .collect();
        let total_length = segments.iter().map(PathSegment::length).sum();
        Self {
            segments,
            total_length,
        }
    }

    /// Sum of all segment lengths.
    #[must_use]
    pub const fn total_length(&self) -> f32 {
        self.total_length
    }

    /// Number of segments in the path.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Reports whether the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment at the provided index, if it exists.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&PathSegment> {
        self.segments.get(index)
    }
}

/// Mutable progress marker along an immutable path.
///
/// `distance_moved` is monotonically non-decreasing and never exceeds the
/// path's total length; excess advancement length past the final segment is
/// discarded, never wrapped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathCursor {
    position: Vec2,
    direction: Vec2,
    segment_index: usize,
    segment_moved: f32,
    distance_moved: f32,
}

impl PathCursor {
    /// Creates a cursor resting at the provided origin, before the first
    /// segment.
    #[must_use]
    pub const fn new(origin: Vec2) -> Self {
        Self {
            position: origin,
            direction: Vec2::X,
            segment_index: 0,
            segment_moved: 0.0,
            distance_moved: 0.0,
        }
    }

    /// Current position of the cursor.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Tangent of the segment the cursor most recently walked.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Index of the segment the cursor currently occupies.
    #[must_use]
    pub const fn segment_index(&self) -> usize {
        self.segment_index
    }

    /// Total distance walked since the cursor was created.
    #[must_use]
    pub const fn distance_moved(&self) -> f32 {
        self.distance_moved
    }

    /// Reports whether the cursor walked past the path's final segment.
    #[must_use]
    pub fn is_finished(&self, path: &Path) -> bool {
        self.segment_index >= path.segment_count()
    }

    /// Walks the cursor forward by the provided arc length.
    ///
    /// Consumes length against the current segment's remainder, stepping to
    /// the next segment when one is exhausted. Stops at the path end even if
    /// length remains; a zero or negative length is a no-op.
    pub fn advance(&mut self, path: &Path, length: f32) {
        let mut remaining = length;
        while remaining > 0.0 && !self.is_finished(path) {
            let Some(segment) = path.segment(self.segment_index) else {
                break;
            };

            let segment_remaining = segment.length() - self.segment_moved;
            let step = remaining.min(segment_remaining);

            self.position += segment.direction() * step;
            self.direction = segment.direction();
            self.segment_moved += step;
            self.distance_moved += step;
            remaining -= step;

            if self.segment_moved >= segment.length() {
                self.segment_index += 1;
                self.segment_moved = 0.0;
            }
        }
    }

    /// Pure look-ahead variant of [`PathCursor::advance`].
    #[must_use]
    pub fn advanced(&self, path: &Path, length: f32) -> PathCursor {
        let mut copy = *self;
        copy.advance(path, length);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_path() -> Path {
        Path::from_waypoints(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 5.0),
        ])
    }

    #[test]
    fn fewer_than_two_waypoints_yield_the_empty_path() {
        assert!(Path::from_waypoints(&[]).is_empty());
        assert!(Path::from_waypoints(&[Vec2::new(3.0, 4.0)]).is_empty());
        assert_eq!(Path::from_waypoints(&[Vec2::ONE]).total_length(), 0.0);
    }

    #[test]
    fn total_length_equals_segment_sum() {
        let path = corner_path();
        let sum: f32 = (0..path.segment_count())
            .map(|index| path.segment(index).expect("segment").length())
            .sum();
        assert!((path.total_length() - sum).abs() < 1e-5);
        assert!((path.total_length() - 15.0).abs() < 1e-5);
    }

    #[test]
    fn advance_walks_into_the_first_segment() {
        let path = Path::from_waypoints(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)]);
        let mut cursor = PathCursor::new(Vec2::ZERO);

        cursor.advance(&path, 5.0);

        assert_eq!(cursor.position(), Vec2::new(5.0, 0.0));
        assert_eq!(cursor.direction(), Vec2::new(1.0, 0.0));
        assert!(!cursor.is_finished(&path));
    }

    #[test]
    fn excess_length_is_discarded_at_the_path_end() {
        let path = Path::from_waypoints(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)]);
        let mut cursor = PathCursor::new(Vec2::ZERO);

        cursor.advance(&path, 5.0);
        cursor.advance(&path, 10.0);

        assert_eq!(cursor.position(), Vec2::new(10.0, 0.0));
        assert!(cursor.is_finished(&path));
        assert!((cursor.distance_moved() - path.total_length()).abs() < 1e-5);
    }

    #[test]
    fn advance_crosses_segment_boundaries() {
        let path = corner_path();
        let mut cursor = PathCursor::new(Vec2::ZERO);

        cursor.advance(&path, 12.0);

        assert_eq!(cursor.segment_index(), 1);
        assert_eq!(cursor.position(), Vec2::new(10.0, 2.0));
        assert_eq!(cursor.direction(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn zero_length_advance_is_a_no_op() {
        let path = corner_path();
        let mut cursor = PathCursor::new(Vec2::ZERO);
        cursor.advance(&path, 3.0);
        let before = cursor;

        cursor.advance(&path, 0.0);
        cursor.advance(&path, -1.0);

        assert_eq!(cursor, before);
    }

    #[test]
    fn distance_moved_is_monotonic_and_bounded() {
        let path = corner_path();
        let mut cursor = PathCursor::new(Vec2::ZERO);
        let mut last = cursor.distance_moved();

        for _ in 0..50 {
            cursor.advance(&path, 0.7);
            assert!(cursor.distance_moved() >= last);
            assert!(cursor.distance_moved() <= path.total_length() + 1e-5);
            last = cursor.distance_moved();
        }
        assert!(cursor.is_finished(&path));
    }

    #[test]
    fn cursor_on_the_empty_path_is_immediately_terminal() {
        let path = Path::from_waypoints(&[]);
        let mut cursor = PathCursor::new(Vec2::new(2.0, 2.0));
        assert!(cursor.is_finished(&path));

        cursor.advance(&path, 10.0);
        assert_eq!(cursor.position(), Vec2::new(2.0, 2.0));
        assert_eq!(cursor.distance_moved(), 0.0);
    }

    #[test]
    fn advanced_does_not_mutate_the_live_cursor() {
        let path = corner_path();
        let mut cursor = PathCursor::new(Vec2::ZERO);
        cursor.advance(&path, 4.0);
        let before = cursor;

        let ahead = cursor.advanced(&path, 6.0);

        assert_eq!(cursor, before);
        assert!((ahead.distance_moved() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn duplicate_waypoints_produce_zero_length_segments() {
        let path = Path::from_waypoints(&[Vec2::ZERO, Vec2::ZERO, Vec2::new(4.0, 0.0)]);
        let mut cursor = PathCursor::new(Vec2::ZERO);
        cursor.advance(&path, 4.0);
        assert!(cursor.is_finished(&path));
        assert_eq!(cursor.position(), Vec2::new(4.0, 0.0));
    }
}

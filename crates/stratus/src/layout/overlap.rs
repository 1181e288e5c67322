//! Pairwise relaxation that pushes overlapping group rectangles apart.
//!
//! Only group boxes are moved. Grouped services are stored relative to their
//! group and follow it without further work.

use log::debug;

use stratus_core::{
    geometry::{Bounds, Point},
    model::PositionedGroup,
};

/// Minimum gap left between two groups that had to be separated.
pub const GROUP_GAP: f32 = 40.0;

/// Upper bound on full pairwise passes.
pub const MAX_PASSES: usize = 10;

/// Separates overlapping rectangles in place and returns the number of passes run.
///
/// Every pass visits all unordered pairs. An overlapping pair is pushed apart
/// along the axis with the smaller overlap, each rectangle moving half of
/// `overlap + GROUP_GAP` away from the other. The loop stops after a pass that
/// moves nothing or after [`MAX_PASSES`] passes, so residual overlap is possible
/// for pathological inputs.
///
/// # Examples
///
/// ```
/// # use stratus::geometry::{Bounds, Point, Size};
/// # use stratus::layout::overlap::resolve_overlaps;
/// let mut rects = vec![
///     Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0)),
///     Bounds::new_from_top_left(Point::new(80.0, 10.0), Size::new(100.0, 100.0)),
/// ];
/// resolve_overlaps(&mut rects);
/// assert!(!rects[0].intersects(&rects[1]));
/// ```
pub fn resolve_overlaps(rects: &mut [Bounds]) -> usize {
    if rects.len() < 2 {
        return 0;
    }

    let mut passes = 0;
    let mut moved = true;
    while moved && passes < MAX_PASSES {
        moved = false;
        passes += 1;

        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                let (a, b) = (rects[i], rects[j]);
                let overlap_x = a.overlap_x(&b);
                let overlap_y = a.overlap_y(&b);
                if overlap_x <= 0.0 || overlap_y <= 0.0 {
                    continue;
                }
                moved = true;

                let offset = if overlap_x < overlap_y {
                    let push = (overlap_x + GROUP_GAP) / 2.0;
                    let sign = push_sign(a.center().x(), b.center().x());
                    Point::new(sign * push, 0.0)
                } else {
                    let push = (overlap_y + GROUP_GAP) / 2.0;
                    let sign = push_sign(a.center().y(), b.center().y());
                    Point::new(0.0, sign * push)
                };

                rects[i] = a.translate(offset);
                rects[j] = b.translate(offset.scale(-1.0));
            }
        }
    }

    if passes > 1 {
        debug!(passes; "Resolved group overlaps");
    }
    passes
}

/// Direction the first rectangle moves in; ties send it toward decreasing coordinates.
fn push_sign(first_center: f32, second_center: f32) -> f32 {
    if first_center <= second_center {
        -1.0
    } else {
        1.0
    }
}

/// Runs [`resolve_overlaps`] over group boxes and writes the moved positions back.
pub fn resolve_group_overlaps(groups: Vec<PositionedGroup>) -> Vec<PositionedGroup> {
    let mut rects: Vec<Bounds> = groups.iter().map(PositionedGroup::bounds).collect();
    resolve_overlaps(&mut rects);

    groups
        .into_iter()
        .zip(rects)
        .map(|(group, rect)| group.with_position(rect.min_point()))
        .collect()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use stratus_core::{geometry::Size, model::Group};

    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Bounds {
        Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_disjoint_rects_are_untouched() {
        let original = vec![rect(0.0, 0.0, 100.0, 100.0), rect(200.0, 0.0, 100.0, 100.0)];
        let mut rects = original.clone();

        assert_eq!(resolve_overlaps(&mut rects), 1);
        assert_eq!(rects, original);
    }

    #[test]
    fn test_touching_edges_do_not_count_as_overlap() {
        let original = vec![rect(0.0, 0.0, 100.0, 100.0), rect(100.0, 0.0, 100.0, 100.0)];
        let mut rects = original.clone();

        resolve_overlaps(&mut rects);
        assert_eq!(rects, original);
    }

    #[test]
    fn test_pushes_along_smaller_overlap_axis() {
        // Overlap is 20 on x and 90 on y, so the pair separates horizontally.
        let mut rects = vec![rect(0.0, 0.0, 100.0, 100.0), rect(80.0, 10.0, 100.0, 100.0)];
        resolve_overlaps(&mut rects);

        assert_approx_eq!(f32, rects[0].min_x(), -30.0);
        assert_approx_eq!(f32, rects[1].min_x(), 110.0);
        assert_approx_eq!(f32, rects[0].min_y(), 0.0);
        assert_approx_eq!(f32, rects[1].min_y(), 10.0);
        assert_approx_eq!(f32, rects[1].min_x() - rects[0].max_x(), GROUP_GAP);
    }

    #[test]
    fn test_equal_centers_push_first_toward_origin() {
        let mut rects = vec![rect(0.0, 0.0, 100.0, 50.0), rect(0.0, 0.0, 100.0, 50.0)];
        resolve_overlaps(&mut rects);

        // Overlap is smaller on y (50 < 100).
        assert!(rects[0].min_y() < rects[1].min_y());
        assert!(!rects[0].intersects(&rects[1]));
    }

    #[test]
    fn test_stops_at_pass_cap() {
        let mut rects: Vec<Bounds> = (0..30).map(|_| rect(0.0, 0.0, 100.0, 100.0)).collect();
        let passes = resolve_overlaps(&mut rects);

        assert!(passes <= MAX_PASSES);
        assert!(rects.iter().all(|r| r.min_point().is_finite()));
    }

    #[test]
    fn test_group_wrapper_keeps_sizes() {
        let groups = vec![
            PositionedGroup::new(Group::new("a", "A"), Point::new(0.0, 0.0), Size::new(300.0, 200.0)),
            PositionedGroup::new(Group::new("b", "B"), Point::new(50.0, 50.0), Size::new(300.0, 200.0)),
        ];
        let resolved = resolve_group_overlaps(groups);

        assert_eq!(resolved[0].size(), Size::new(300.0, 200.0));
        assert_eq!(resolved[1].id(), "b");
        assert!(!resolved[0].bounds().intersects(&resolved[1].bounds()));
    }
}

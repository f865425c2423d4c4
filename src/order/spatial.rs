//! Column-aware spatial ordering.
//!
//! Regions are clustered into columns by the overlap of their horizontal
//! spans. Columns are read left to right, regions within a column top to
//! bottom.

use std::cmp::Ordering;

use super::LayoutBox;

/// Disjoint-set over detection indices.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Union keeping the smaller index as root, so roots are stable.
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

/// Group detection indices into columns.
///
/// Two regions share a column when their horizontal overlap ratio strictly
/// exceeds `threshold`; membership is transitive.
pub fn cluster_columns(boxes: &[LayoutBox], threshold: f32) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::new(boxes.len());
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            if boxes[i].bbox.horizontal_overlap_ratio(&boxes[j].bbox) > threshold {
                sets.union(i, j);
            }
        }
    }

    let mut columns: Vec<Vec<usize>> = Vec::new();
    let mut column_of_root: Vec<Option<usize>> = vec![None; boxes.len()];
    for index in 0..boxes.len() {
        let root = sets.find(index);
        match column_of_root[root] {
            Some(c) => columns[c].push(index),
            None => {
                column_of_root[root] = Some(columns.len());
                columns.push(vec![index]);
            }
        }
    }
    columns
}

/// Spatial reading order as detection indices.
pub fn spatial_order(boxes: &[LayoutBox], threshold: f32) -> Vec<usize> {
    let mut columns = cluster_columns(boxes, threshold);

    // Members are pushed in index order, so `column[0]` is the smallest index.
    let left_edge = |column: &Vec<usize>| {
        column
            .iter()
            .map(|&i| boxes[i].bbox.x0)
            .fold(f32::INFINITY, f32::min)
    };
    columns.sort_by(|a, b| {
        left_edge(a)
            .total_cmp(&left_edge(b))
            .then_with(|| a[0].cmp(&b[0]))
    });

    let mut order = Vec::with_capacity(boxes.len());
    for mut column in columns {
        column.sort_by(|&a, &b| compare_in_column(boxes, a, b));
        order.extend(column);
    }
    order
}

/// Top edge, then smaller area, then detection index.
fn compare_in_column(boxes: &[LayoutBox], a: usize, b: usize) -> Ordering {
    let (ba, bb) = (&boxes[a].bbox, &boxes[b].bbox);
    ba.y0
        .total_cmp(&bb.y0)
        .then_with(|| ba.area().total_cmp(&bb.area()))
        .then_with(|| a.cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, RegionType};

    fn text(x0: f32, y0: f32, x1: f32, y1: f32) -> LayoutBox {
        LayoutBox {
            bbox: BoundingBox::new(x0, y0, x1, y1),
            region_type: RegionType::Text,
        }
    }

    #[test]
    fn test_two_columns() {
        // Detected in row-major order: left/right interleaved.
        let boxes = vec![
            text(0.0, 0.0, 100.0, 50.0),
            text(150.0, 0.0, 250.0, 50.0),
            text(0.0, 60.0, 100.0, 110.0),
            text(150.0, 60.0, 250.0, 110.0),
        ];
        assert_eq!(spatial_order(&boxes, 0.1), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_clustering_is_transitive() {
        // a overlaps b, b overlaps c, a and c do not overlap.
        let boxes = vec![
            text(0.0, 0.0, 100.0, 10.0),
            text(80.0, 20.0, 180.0, 30.0),
            text(160.0, 40.0, 260.0, 50.0),
        ];
        let columns = cluster_columns(&boxes, 0.1);
        assert_eq!(columns, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Overlap ratio is exactly 0.5.
        let boxes = vec![text(0.0, 0.0, 100.0, 10.0), text(50.0, 20.0, 150.0, 30.0)];
        assert_eq!(cluster_columns(&boxes, 0.5).len(), 2);
        assert_eq!(cluster_columns(&boxes, 0.49).len(), 1);
    }

    #[test]
    fn test_ties_broken_by_area_then_index() {
        let boxes = vec![
            text(0.0, 10.0, 100.0, 60.0),
            text(0.0, 10.0, 100.0, 20.0),
            text(0.0, 10.0, 100.0, 20.0),
        ];
        assert_eq!(spatial_order(&boxes, 0.1), vec![1, 2, 0]);
    }

    #[test]
    fn test_zero_width_boxes_share_column() {
        let boxes = vec![text(0.0, 50.0, 0.0, 60.0), text(0.0, 0.0, 0.0, 10.0)];
        assert_eq!(cluster_columns(&boxes, 0.1).len(), 1);
        assert_eq!(spatial_order(&boxes, 0.1), vec![1, 0]);
    }

    #[test]
    fn test_columns_read_left_to_right() {
        // Right column detected first.
        let boxes = vec![
            text(300.0, 0.0, 400.0, 10.0),
            text(0.0, 100.0, 100.0, 110.0),
            text(150.0, 50.0, 250.0, 60.0),
        ];
        assert_eq!(spatial_order(&boxes, 0.1), vec![1, 2, 0]);
    }

    #[test]
    fn test_empty_page() {
        assert!(spatial_order(&[], 0.1).is_empty());
    }
}

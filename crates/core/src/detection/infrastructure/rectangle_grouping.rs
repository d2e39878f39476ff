use crate::shared::face_box::FaceBox;

/// Relative edge tolerance used when clustering raw cascade hits.
pub const GROUP_EPS: f64 = 0.2;

/// Clusters overlapping candidate windows and keeps clusters with more
/// than `min_neighbors` members.
///
/// Each kept cluster is reported as the rounded mean of its members.
/// Clusters nested inside a much stronger cluster are dropped. With
/// `min_neighbors == 0` the candidates are returned unchanged.
pub fn group_rectangles(candidates: &[FaceBox], min_neighbors: u32, eps: f64) -> Vec<FaceBox> {
    if min_neighbors == 0 || candidates.is_empty() {
        return candidates.to_vec();
    }

    let (labels, n_classes) = partition(candidates, eps);

    let mut sums = vec![[0i64; 4]; n_classes];
    let mut counts = vec![0u32; n_classes];
    for (r, &label) in candidates.iter().zip(&labels) {
        let s = &mut sums[label];
        s[0] += r.x as i64;
        s[1] += r.y as i64;
        s[2] += r.width as i64;
        s[3] += r.height as i64;
        counts[label] += 1;
    }

    let averaged: Vec<FaceBox> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &n)| {
            let inv = 1.0 / n as f64;
            FaceBox::new(
                (s[0] as f64 * inv).round() as i32,
                (s[1] as f64 * inv).round() as i32,
                (s[2] as f64 * inv).round() as i32,
                (s[3] as f64 * inv).round() as i32,
            )
        })
        .collect();

    let mut grouped = Vec::new();
    for (i, r1) in averaged.iter().enumerate() {
        let n1 = counts[i];
        if n1 <= min_neighbors {
            continue;
        }
        let swallowed = averaged.iter().enumerate().any(|(j, r2)| {
            let n2 = counts[j];
            if j == i || n2 <= min_neighbors {
                return false;
            }
            let dx = (r2.width as f64 * eps).round() as i32;
            let dy = (r2.height as f64 * eps).round() as i32;
            r1.x >= r2.x - dx
                && r1.y >= r2.y - dy
                && r1.right() <= r2.right() + dx
                && r1.bottom() <= r2.bottom() + dy
                && (n2 > n1.max(3) || n1 < 3)
        });
        if !swallowed {
            grouped.push(*r1);
        }
    }
    grouped
}

fn similar(a: &FaceBox, b: &FaceBox, eps: f64) -> bool {
    let delta = eps * (a.width.min(b.width) + a.height.min(b.height)) as f64 * 0.5;
    ((a.x - b.x).abs() as f64) <= delta
        && ((a.y - b.y).abs() as f64) <= delta
        && ((a.right() - b.right()).abs() as f64) <= delta
        && ((a.bottom() - b.bottom()).abs() as f64) <= delta
}

/// Union-find over the similarity relation. Labels are numbered in order
/// of first appearance.
fn partition(rects: &[FaceBox], eps: f64) -> (Vec<usize>, usize) {
    let mut parent: Vec<usize> = (0..rects.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..rects.len() {
        for j in 0..i {
            if similar(&rects[i], &rects[j], eps) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[ri.max(rj)] = ri.min(rj);
                }
            }
        }
    }

    let mut label_of_root = vec![usize::MAX; rects.len()];
    let mut labels = Vec::with_capacity(rects.len());
    let mut n_classes = 0;
    for i in 0..rects.len() {
        let root = find(&mut parent, i);
        if label_of_root[root] == usize::MAX {
            label_of_root[root] = n_classes;
            n_classes += 1;
        }
        labels.push(label_of_root[root]);
    }
    (labels, n_classes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_neighbors_passes_candidates_through() {
        let raw = vec![FaceBox::new(0, 0, 10, 10), FaceBox::new(1, 1, 10, 10)];
        assert_eq!(group_rectangles(&raw, 0, GROUP_EPS), raw);
    }

    #[test]
    fn test_cluster_is_averaged() {
        let raw = vec![
            FaceBox::new(100, 100, 50, 50),
            FaceBox::new(102, 101, 50, 50),
            FaceBox::new(101, 99, 52, 52),
        ];
        let grouped = group_rectangles(&raw, 2, GROUP_EPS);
        assert_eq!(grouped, vec![FaceBox::new(101, 100, 51, 51)]);
    }

    #[test]
    fn test_weak_cluster_is_dropped() {
        let raw = vec![
            FaceBox::new(100, 100, 50, 50),
            FaceBox::new(101, 100, 50, 50),
            FaceBox::new(10, 10, 20, 20),
        ];
        let grouped = group_rectangles(&raw, 1, GROUP_EPS);
        assert_eq!(grouped, vec![FaceBox::new(101, 100, 50, 50)]);
    }

    #[test]
    fn test_distinct_clusters_kept_in_first_seen_order() {
        let raw = vec![
            FaceBox::new(200, 50, 40, 40),
            FaceBox::new(10, 10, 40, 40),
            FaceBox::new(201, 50, 40, 40),
            FaceBox::new(11, 10, 40, 40),
        ];
        let grouped = group_rectangles(&raw, 1, GROUP_EPS);
        assert_eq!(grouped.len(), 2);
        assert!(grouped[0].x > 150);
        assert!(grouped[1].x < 50);
    }

    #[test]
    fn test_small_cluster_inside_strong_cluster_is_suppressed() {
        let mut raw = vec![FaceBox::new(100, 100, 100, 100); 6];
        raw.extend([FaceBox::new(120, 120, 40, 40), FaceBox::new(121, 120, 40, 40)]);
        let grouped = group_rectangles(&raw, 1, GROUP_EPS);
        assert_eq!(grouped, vec![FaceBox::new(100, 100, 100, 100)]);
    }

    #[test]
    fn test_similarity_is_transitive_through_chain() {
        // a~b and b~c but a is not directly similar to c.
        let raw = vec![
            FaceBox::new(0, 0, 50, 50),
            FaceBox::new(8, 0, 50, 50),
            FaceBox::new(16, 0, 50, 50),
        ];
        let (labels, n) = partition(&raw, GROUP_EPS);
        assert_eq!(n, 1);
        assert_eq!(labels, vec![0, 0, 0]);
    }
}

use nalgebra as na;

pub fn centroid(points: &[na::Point2<f32>]) -> Option<na::Point2<f32>> {
    if points.is_empty() {
        return None;
    }

    let sum = points
        .iter()
        .fold(na::Vector2::zeros(), |acc: na::Vector2<f32>, p| acc + p.coords);

    Some((sum / points.len() as f32).into())
}

/// Mean distance over all unordered pairs, 0 for fewer than two points
pub fn mean_pairwise_distance(points: &[na::Point2<f32>]) -> f32 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            total += na::distance(a, b);
        }
    }

    total / (n * (n - 1) / 2) as f32
}

/// True when at least `size` of `points` are all within `radius` of each
/// other (strictly closer).
pub fn has_tight_group(points: &[na::Point2<f32>], size: usize, radius: f32) -> bool {
    if size <= 1 {
        return !points.is_empty() || size == 0;
    }

    if points.len() < size {
        return false;
    }

    let n = points.len();
    let close: Vec<Vec<bool>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| i != j && na::distance(&points[i], &points[j]) < radius)
                .collect()
        })
        .collect();

    let mut group = Vec::with_capacity(size);
    (0..n).any(|start| {
        group.clear();
        group.push(start);
        extend_group(&close, &mut group, start + 1, size)
    })
}

fn extend_group(close: &[Vec<bool>], group: &mut Vec<usize>, from: usize, size: usize) -> bool {
    if group.len() == size {
        return true;
    }

    for next in from..close.len() {
        if group.iter().all(|&m| close[m][next]) {
            group.push(next);
            if extend_group(close, group, next + 1, size) {
                return true;
            }
            group.pop();
        }
    }

    false
}

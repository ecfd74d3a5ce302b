use crate::scene::mesh::Mesh;
use crate::scene::source::MeshSource;
use nalgebra::Point3;

/// Axis-aligned bounds of the mesh's positions, or `None` for an empty mesh.
pub fn compute_bounds(mesh: &Mesh) -> Option<(Point3<f32>, Point3<f32>)> {
    let mut positions = mesh.attributes.positions.iter();
    let first = positions.next()?;

    let mut min_bound = *first;
    let mut max_bound = *first;

    for position in positions {
        min_bound.x = min_bound.x.min(position.x);
        min_bound.y = min_bound.y.min(position.y);
        min_bound.z = min_bound.z.min(position.z);

        max_bound.x = max_bound.x.max(position.x);
        max_bound.y = max_bound.y.max(position.y);
        max_bound.z = max_bound.z.max(position.z);
    }

    Some((min_bound, max_bound))
}

/// One line per blendshape: index, name and frame weights.
pub fn describe_blendshapes<S: MeshSource + ?Sized>(source: &S) -> Vec<String> {
    (0..source.blendshape_count())
        .map(|i| {
            let name = source.blendshape_name(i).unwrap_or("<unnamed>");
            let weights: Vec<String> = (0..source.frame_count(i).unwrap_or(0))
                .filter_map(|f| source.frame_weight(i, f))
                .map(|w| format!("{w}"))
                .collect();
            format!("[{i}] {name} (frames: {})", weights.join(", "))
        })
        .collect()
}

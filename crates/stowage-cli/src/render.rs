// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Isometric SVG rendering of one container.
//!
//! The viewer looks from `(+x, +y, +z)` towards the origin, so each box
//! shows its top face and its faces at maximal `x` and maximal `y`. Boxes
//! are painted back to front in ascending order of `x + y + z` of their
//! minimum corner, which is sufficient for non-overlapping boxes in a
//! packing where every box rests on the floor or on a single supporter.

use crate::IntegerType;
use stowage_model::{
    index::ContainerIndex, model::Model, orientation::Extents, solution::Placement,
    solution::Solution,
};
use svg::{
    Document,
    node::element::{Group, Path, Text, Title, path::Data},
};

const SCALE: f64 = 24.0;
const MARGIN: f64 = 40.0;
const COS_30: f64 = 0.866_025_403_784_438_6;
const SIN_30: f64 = 0.5;

fn project((x, y, z): (f64, f64, f64)) -> (f64, f64) {
    ((x - y) * COS_30 * SCALE, ((x + y) * SIN_30 - z) * SCALE)
}

fn polygon(corners: [(f64, f64, f64); 4]) -> Data {
    let mut data = Data::new().move_to(project(corners[0]));
    for corner in &corners[1..] {
        data = data.line_to(project(*corner));
    }
    data.close()
}

fn data_to_path(data: Data, params: &[(&str, &str)]) -> Path {
    let mut path = Path::new();
    for param in params {
        path = path.set(param.0, param.1)
    }
    path.set("d", data)
}

fn to_f64((x, y, z): (IntegerType, IntegerType, IntegerType)) -> (f64, f64, f64) {
    (x as f64, y as f64, z as f64)
}

/// Hue spread by the golden angle so neighbouring indices differ clearly.
fn hue(object: usize) -> usize {
    (object * 137) % 360
}

fn container_frame(extents: Extents<IntegerType>) -> Group {
    let (l, w, h) = to_f64(extents.as_tuple());
    let floor = polygon([(0.0, 0.0, 0.0), (l, 0.0, 0.0), (l, w, 0.0), (0.0, w, 0.0)]);
    let back_x = polygon([(0.0, 0.0, 0.0), (0.0, w, 0.0), (0.0, w, h), (0.0, 0.0, h)]);
    let back_y = polygon([(0.0, 0.0, 0.0), (l, 0.0, 0.0), (l, 0.0, h), (0.0, 0.0, h)]);

    let wall = [("fill", "#f4f4f4"), ("stroke", "#777777"), ("stroke-width", "1")];
    Group::new()
        .set("id", "container")
        .add(Title::new(format!("container: {}", extents)))
        .add(data_to_path(floor, &[("fill", "#e2e2e2"), ("stroke", "#777777")]))
        .add(data_to_path(back_x, &wall))
        .add(data_to_path(back_y, &wall))
}

/// The container edges that face the viewer, drawn above the boxes.
fn container_front_edges(extents: Extents<IntegerType>) -> Path {
    let (l, w, h) = to_f64(extents.as_tuple());
    let data = Data::new()
        .move_to(project((l, 0.0, 0.0)))
        .line_to(project((l, w, 0.0)))
        .line_to(project((0.0, w, 0.0)))
        .move_to(project((l, w, 0.0)))
        .line_to(project((l, w, h)))
        .move_to(project((l, 0.0, h)))
        .line_to(project((l, w, h)))
        .line_to(project((0.0, w, h)))
        .line_to(project((0.0, 0.0, h)))
        .line_to(project((l, 0.0, h)))
        .line_to(project((l, 0.0, 0.0)))
        .move_to(project((0.0, w, h)))
        .line_to(project((0.0, w, 0.0)));
    data_to_path(
        data,
        &[
            ("fill", "none"),
            ("stroke", "#555555"),
            ("stroke-width", "1"),
            ("stroke-dasharray", "4 3"),
        ],
    )
}

fn object_box(object: usize, placement: &Placement<IntegerType>) -> Group {
    let (x0, y0, z0) = to_f64(placement.origin());
    let (x1, y1, z1) = to_f64(placement.max_corner());
    let hue = hue(object);

    let top = polygon([(x0, y0, z1), (x1, y0, z1), (x1, y1, z1), (x0, y1, z1)]);
    let side_x = polygon([(x1, y0, z0), (x1, y1, z0), (x1, y1, z1), (x1, y0, z1)]);
    let side_y = polygon([(x0, y1, z0), (x1, y1, z0), (x1, y1, z1), (x0, y1, z1)]);

    let face = |lightness: u8| format!("hsl({}, 65%, {}%)", hue, lightness);
    let stroke = [("stroke", "#202020"), ("stroke-width", "0.8")];
    let styled = |data: Data, fill: String| data_to_path(data, &stroke).set("fill", fill);

    Group::new()
        .set("id", format!("object_{}", object))
        .add(Title::new(format!(
            "object {}: origin ({}, {}, {}), extents {}, orientation {}",
            object,
            placement.x(),
            placement.y(),
            placement.z(),
            placement.extents(),
            placement.orientation()
        )))
        .add(styled(side_y, face(40)))
        .add(styled(side_x, face(55)))
        .add(styled(top, face(72)))
}

/// Renders the objects of `container` in `solution` as an isometric drawing.
pub fn container_to_svg(
    model: &Model<IntegerType>,
    solution: &Solution<IntegerType>,
    container: ContainerIndex,
) -> Document {
    let extents = model.container_extents();
    let (l, w, h) = to_f64(extents.as_tuple());

    let mut objects: Vec<(usize, &Placement<IntegerType>)> = solution
        .objects_in(container)
        .map(|(index, placement)| (index.get(), placement))
        .collect();
    objects.sort_by_key(|(index, p)| (p.coordinate_sum(), p.z(), *index));

    let boxes = objects
        .iter()
        .fold(Group::new().set("id", "objects"), |group, (index, p)| {
            group.add(object_box(*index, p))
        });

    // Bounding box of the projected container corners.
    let x_min = project((0.0, w, 0.0)).0 - MARGIN;
    let x_max = project((l, 0.0, 0.0)).0 + MARGIN;
    let y_min = project((0.0, 0.0, h)).1 - MARGIN;
    let y_max = project((l, w, 0.0)).1 + MARGIN;

    let label = Text::new(format!(
        "container {} ({} objects)",
        container.get(),
        objects.len()
    ))
    .set("x", x_min + 8.0)
    .set("y", y_min + 20.0)
    .set("font-family", "monospace")
    .set("font-size", 14);

    Document::new()
        .set("viewBox", (x_min, y_min, x_max - x_min, y_max - y_min))
        .add(container_frame(extents))
        .add(boxes)
        .add(container_front_edges(extents))
        .add(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_model::{model::ModelBuilder, orientation::Orientation};

    fn scene() -> (Model<IntegerType>, Solution<IntegerType>) {
        let mut builder = ModelBuilder::new(Extents::new(4, 4, 2));
        let a = Extents::new(4, 4, 1);
        let b = Extents::new(2, 2, 1);
        let c = Extents::new(4, 4, 2);
        builder.add_object(a);
        builder.add_object(b);
        builder.add_object(c);
        let solution = Solution::new(vec![
            Placement::new(ContainerIndex::new(0), Orientation::Lwh, (0, 0, 0), a),
            Placement::new(ContainerIndex::new(0), Orientation::Lwh, (0, 0, 1), b),
            Placement::new(ContainerIndex::new(1), Orientation::Lwh, (0, 0, 0), c),
        ]);
        (builder.build(), solution)
    }

    #[test]
    fn test_renders_only_objects_of_the_container() {
        let (model, solution) = scene();
        let svg = container_to_svg(&model, &solution, ContainerIndex::new(0)).to_string();
        assert!(svg.contains("id=\"object_0\""));
        assert!(svg.contains("id=\"object_1\""));
        assert!(!svg.contains("id=\"object_2\""));
        assert!(svg.contains("container 0 (2 objects)"));
    }

    #[test]
    fn test_paints_lower_boxes_first() {
        let (model, solution) = scene();
        let svg = container_to_svg(&model, &solution, ContainerIndex::new(0)).to_string();
        let first = svg.find("id=\"object_0\"").unwrap();
        let second = svg.find("id=\"object_1\"").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_empty_container_still_draws_the_frame() {
        let (model, solution) = scene();
        let svg = container_to_svg(&model, &solution, ContainerIndex::new(5)).to_string();
        assert!(svg.contains("id=\"container\""));
        assert!(svg.contains("container 5 (0 objects)"));
        assert!(!svg.contains("id=\"object_"));
    }

    #[test]
    fn test_projection_of_the_axes() {
        assert_eq!(project((0.0, 0.0, 0.0)), (0.0, 0.0));
        let (x, y) = project((1.0, 1.0, 0.0));
        assert!(x.abs() < 1e-9);
        assert!((y - SCALE).abs() < 1e-9);
        assert_eq!(project((0.0, 0.0, 1.0)), (0.0, -SCALE));
    }
}

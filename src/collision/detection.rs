//! Narrow-phase collision detection.
//!
//! `collide` dispatches on the shape pair of the two bodies and returns up
//! to two contact points. Box-box pairs go through a Separating-Axis Test
//! with reference-face selection and incident-edge clipping, producing
//! feature-tagged contacts; every other pair reduces to a single contact.
//!
//! Box vertex and edge numbering:
//!
//! ```text
//!        ^ y
//!        |
//!        e1
//!   v2 ------ v1
//!    |        |
//! e2 |        | e4  --> x
//!    |        |
//!   v3 ------ v4
//!        e3
//! ```

use crate::math::mat22::Mat22;
use crate::math::vec2::Vec2;
use crate::objects::body::{Body, Shape};

use super::contact::Contact;
use super::features::{EdgeId, FeaturePair};

// Tolerances for the biased reference-face selection: a new axis must beat
// the current one by this margin, which keeps the reference face stable when
// penetrations are nearly equal.
const RELATIVE_TOL: f64 = 0.95;
const ABSOLUTE_TOL: f64 = 0.01;

const SAT_EPSILON: f64 = 1e-6;

/// Computes the contact points between two bodies. The returned normals are
/// unit vectors pointing from `body_a` toward `body_b`; internal shape-pair
/// reordering is normalized away before returning.
pub fn collide(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    match (body_a.shape, body_b.shape) {
        (Shape::Box(_), Shape::Box(_)) => collide_box_box(body_a, body_b),
        (Shape::Circle(_), Shape::Circle(_)) => collide_circle_circle(body_a, body_b),
        (Shape::Box(_), Shape::Circle(_)) => collide_box_circle(body_a, body_b),
        (Shape::Circle(_), Shape::Box(_)) => flip_normals(collide_box_circle(body_b, body_a)),
        (Shape::Triangle(_), Shape::Triangle(_)) => collide_triangle_triangle(body_a, body_b),
        (Shape::Box(_), Shape::Triangle(_)) => collide_box_triangle(body_a, body_b),
        (Shape::Triangle(_), Shape::Box(_)) => flip_normals(collide_box_triangle(body_b, body_a)),
        (Shape::Circle(_), Shape::Triangle(_)) => collide_circle_triangle(body_a, body_b),
        (Shape::Triangle(_), Shape::Circle(_)) => {
            flip_normals(collide_circle_triangle(body_b, body_a))
        }
    }
}

fn flip_normals(mut contacts: Vec<Contact>) -> Vec<Contact> {
    for contact in &mut contacts {
        contact.normal = -contact.normal;
    }
    contacts
}

// --- Box vs box -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    FaceAX,
    FaceAY,
    FaceBX,
    FaceBY,
}

#[derive(Debug, Clone, Copy, Default)]
struct ClipVertex {
    v: Vec2,
    fp: FeaturePair,
}

/// Clips a two-point segment against the half-plane `dot(normal, p) <= offset`.
/// Vertices created by the clip inherit the clipping edge in their feature.
fn clip_segment_to_line(
    v_in: &[ClipVertex; 2],
    normal: Vec2,
    offset: f64,
    clip_edge: EdgeId,
) -> ([ClipVertex; 2], usize) {
    let mut v_out = [ClipVertex::default(); 2];
    let mut num_out = 0;

    let distance0 = normal.dot(v_in[0].v) - offset;
    let distance1 = normal.dot(v_in[1].v) - offset;

    // Keep the points behind the plane
    if distance0 <= 0.0 {
        v_out[num_out] = v_in[0];
        num_out += 1;
    }
    if distance1 <= 0.0 {
        v_out[num_out] = v_in[1];
        num_out += 1;
    }

    // If the points straddle the plane, emit the intersection point
    if distance0 * distance1 < 0.0 {
        let interp = distance0 / (distance0 - distance1);
        v_out[num_out].v = v_in[0].v + (v_in[1].v - v_in[0].v) * interp;
        if distance0 > 0.0 {
            v_out[num_out].fp = v_in[0].fp;
            v_out[num_out].fp.in_edge1 = clip_edge;
            v_out[num_out].fp.in_edge2 = EdgeId::None;
        } else {
            v_out[num_out].fp = v_in[1].fp;
            v_out[num_out].fp.out_edge1 = clip_edge;
            v_out[num_out].fp.out_edge2 = EdgeId::None;
        }
        num_out += 1;
    }

    (v_out, num_out)
}

/// Finds the edge of the incident box most anti-parallel to the reference
/// face normal, tagged with the vertex edge numbers.
fn compute_incident_edge(h: Vec2, pos: Vec2, rot: Mat22, normal: Vec2) -> [ClipVertex; 2] {
    // The normal is from the reference box. Convert it to the incident
    // box's frame and flip sign.
    let rot_t = rot.transpose();
    let n = -(rot_t * normal);
    let n_abs = n.abs();

    let mut c = [ClipVertex::default(); 2];

    if n_abs.x > n_abs.y {
        if n.x >= 0.0 {
            c[0].v = Vec2::new(h.x, -h.y);
            c[0].fp.in_edge2 = EdgeId::Edge3;
            c[0].fp.out_edge2 = EdgeId::Edge4;

            c[1].v = Vec2::new(h.x, h.y);
            c[1].fp.in_edge2 = EdgeId::Edge4;
            c[1].fp.out_edge2 = EdgeId::Edge1;
        } else {
            c[0].v = Vec2::new(-h.x, h.y);
            c[0].fp.in_edge2 = EdgeId::Edge1;
            c[0].fp.out_edge2 = EdgeId::Edge2;

            c[1].v = Vec2::new(-h.x, -h.y);
            c[1].fp.in_edge2 = EdgeId::Edge2;
            c[1].fp.out_edge2 = EdgeId::Edge3;
        }
    } else if n.y >= 0.0 {
        c[0].v = Vec2::new(h.x, h.y);
        c[0].fp.in_edge2 = EdgeId::Edge4;
        c[0].fp.out_edge2 = EdgeId::Edge1;

        c[1].v = Vec2::new(-h.x, h.y);
        c[1].fp.in_edge2 = EdgeId::Edge1;
        c[1].fp.out_edge2 = EdgeId::Edge2;
    } else {
        c[0].v = Vec2::new(-h.x, -h.y);
        c[0].fp.in_edge2 = EdgeId::Edge2;
        c[0].fp.out_edge2 = EdgeId::Edge3;

        c[1].v = Vec2::new(h.x, -h.y);
        c[1].fp.in_edge2 = EdgeId::Edge3;
        c[1].fp.out_edge2 = EdgeId::Edge4;
    }

    c[0].v = pos + rot * c[0].v;
    c[1].v = pos + rot * c[1].v;
    c
}

fn collide_box_box(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let h_a = match body_a.shape {
        Shape::Box(w) => w * 0.5,
        _ => return Vec::new(),
    };
    let h_b = match body_b.shape {
        Shape::Box(w) => w * 0.5,
        _ => return Vec::new(),
    };

    let pos_a = body_a.position;
    let pos_b = body_b.position;

    let rot_a = Mat22::from_angle(body_a.rotation);
    let rot_b = Mat22::from_angle(body_b.rotation);

    let rot_a_t = rot_a.transpose();
    let rot_b_t = rot_b.transpose();

    let dp = pos_b - pos_a;
    let d_a = rot_a_t * dp;
    let d_b = rot_b_t * dp;

    let c = rot_a_t * rot_b;
    let abs_c = c.abs();
    let abs_c_t = abs_c.transpose();

    // Separating axes on box A's faces
    let face_a = d_a.abs() - h_a - abs_c * h_b;
    if face_a.x > 0.0 || face_a.y > 0.0 {
        return Vec::new();
    }

    // Separating axes on box B's faces
    let face_b = d_b.abs() - abs_c_t * h_a - h_b;
    if face_b.x > 0.0 || face_b.y > 0.0 {
        return Vec::new();
    }

    // Select the reference face, biased toward the current axis
    let mut axis = Axis::FaceAX;
    let mut separation = face_a.x;
    let mut normal = if d_a.x > 0.0 { rot_a.col1 } else { -rot_a.col1 };

    if face_a.y > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_a.y {
        axis = Axis::FaceAY;
        separation = face_a.y;
        normal = if d_a.y > 0.0 { rot_a.col2 } else { -rot_a.col2 };
    }

    if face_b.x > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_b.x {
        axis = Axis::FaceBX;
        separation = face_b.x;
        normal = if d_b.x > 0.0 { rot_b.col1 } else { -rot_b.col1 };
    }

    if face_b.y > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_b.y {
        axis = Axis::FaceBY;
        normal = if d_b.y > 0.0 { rot_b.col2 } else { -rot_b.col2 };
    }

    // Set up the clipping planes and the incident edge to be clipped
    let front_normal;
    let side_normal;
    let incident_edge;
    let front;
    let neg_side;
    let pos_side;
    let neg_edge;
    let pos_edge;

    match axis {
        Axis::FaceAX => {
            front_normal = normal;
            front = pos_a.dot(front_normal) + h_a.x;
            side_normal = rot_a.col2;
            let side = pos_a.dot(side_normal);
            neg_side = -side + h_a.y;
            pos_side = side + h_a.y;
            neg_edge = EdgeId::Edge3;
            pos_edge = EdgeId::Edge1;
            incident_edge = compute_incident_edge(h_b, pos_b, rot_b, front_normal);
        }
        Axis::FaceAY => {
            front_normal = normal;
            front = pos_a.dot(front_normal) + h_a.y;
            side_normal = rot_a.col1;
            let side = pos_a.dot(side_normal);
            neg_side = -side + h_a.x;
            pos_side = side + h_a.x;
            neg_edge = EdgeId::Edge2;
            pos_edge = EdgeId::Edge4;
            incident_edge = compute_incident_edge(h_b, pos_b, rot_b, front_normal);
        }
        Axis::FaceBX => {
            front_normal = -normal;
            front = pos_b.dot(front_normal) + h_b.x;
            side_normal = rot_b.col2;
            let side = pos_b.dot(side_normal);
            neg_side = -side + h_b.y;
            pos_side = side + h_b.y;
            neg_edge = EdgeId::Edge3;
            pos_edge = EdgeId::Edge1;
            incident_edge = compute_incident_edge(h_a, pos_a, rot_a, front_normal);
        }
        Axis::FaceBY => {
            front_normal = -normal;
            front = pos_b.dot(front_normal) + h_b.y;
            side_normal = rot_b.col1;
            let side = pos_b.dot(side_normal);
            neg_side = -side + h_b.x;
            pos_side = side + h_b.x;
            neg_edge = EdgeId::Edge2;
            pos_edge = EdgeId::Edge4;
            incident_edge = compute_incident_edge(h_a, pos_a, rot_a, front_normal);
        }
    }

    // Clip the incident edge against the two side planes of the reference face
    let (clip_points1, np) = clip_segment_to_line(&incident_edge, -side_normal, neg_side, neg_edge);
    if np < 2 {
        return Vec::new();
    }

    let (clip_points2, np) = clip_segment_to_line(&clip_points1, side_normal, pos_side, pos_edge);
    if np < 2 {
        return Vec::new();
    }

    // Due to roundoff, it is possible that clipping removes all points.
    let mut contacts = Vec::with_capacity(2);
    for clip_point in &clip_points2 {
        let separation = front_normal.dot(clip_point.v) - front;
        if separation <= 0.0 {
            let mut feature = clip_point.fp;
            if axis == Axis::FaceBX || axis == Axis::FaceBY {
                feature.flip();
            }
            contacts.push(Contact {
                // Slide the contact point onto the reference face
                position: clip_point.v - front_normal * separation,
                normal,
                separation,
                feature,
                ..Default::default()
            });
        }
    }
    contacts
}

// --- Circle vs circle -------------------------------------------------------

fn collide_circle_circle(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let radius_a = match body_a.shape {
        Shape::Circle(d) => 0.5 * d,
        _ => return Vec::new(),
    };
    let radius_b = match body_b.shape {
        Shape::Circle(d) => 0.5 * d,
        _ => return Vec::new(),
    };

    let d = body_b.position - body_a.position;
    let dist_squared = d.dot(d);
    let radius_sum = radius_a + radius_b;
    if dist_squared > radius_sum * radius_sum {
        return Vec::new();
    }

    let dist = dist_squared.sqrt();
    let normal = if dist > 0.0 {
        d * (1.0 / dist)
    } else {
        // Coincident centers; any axis works
        Vec2::new(1.0, 0.0)
    };

    vec![Contact {
        position: body_a.position + normal * radius_a,
        normal,
        separation: dist - radius_sum,
        ..Default::default()
    }]
}

// --- Box vs circle ----------------------------------------------------------

/// Normal points from the box toward the circle.
fn collide_box_circle(box_body: &Body, circle_body: &Body) -> Vec<Contact> {
    let h = match box_body.shape {
        Shape::Box(w) => w * 0.5,
        _ => return Vec::new(),
    };
    let radius = match circle_body.shape {
        Shape::Circle(d) => 0.5 * d,
        _ => return Vec::new(),
    };

    let rot = Mat22::from_angle(box_body.rotation);
    let rot_t = rot.transpose();

    // Closest point on the box to the circle center, in box-local frame
    let local_circle_pos = rot_t * (circle_body.position - box_body.position);
    let closest_point = Vec2::new(
        local_circle_pos.x.clamp(-h.x, h.x),
        local_circle_pos.y.clamp(-h.y, h.y),
    );

    let d = local_circle_pos - closest_point;
    let dist_squared = d.dot(d);
    if dist_squared > radius * radius {
        return Vec::new();
    }

    let dist = dist_squared.sqrt();
    let normal = if dist > 0.0 {
        (rot * d) * (1.0 / dist)
    } else {
        // Circle center inside the box
        Vec2::new(1.0, 0.0)
    };

    vec![Contact {
        position: circle_body.position - normal * radius,
        normal,
        separation: dist - radius,
        ..Default::default()
    }]
}

// --- Triangle routines ------------------------------------------------------

// Triangle vertices are generated from position and extents only; body
// rotation is not applied.
fn triangle_vertices(body: &Body, extents: Vec2) -> [Vec2; 3] {
    let h = extents * 0.5;
    [
        body.position + Vec2::new(-h.x, -h.y),
        body.position + Vec2::new(h.x, -h.y),
        body.position + Vec2::new(0.0, h.y),
    ]
}

/// Unit normal of an edge, with a fallback axis for degenerate edges.
fn edge_normal(edge: Vec2) -> Vec2 {
    let normal = edge.perpendicular().normalize();
    if normal == Vec2::ZERO {
        Vec2::new(1.0, 0.0)
    } else {
        normal
    }
}

fn project_onto_axis(vertices: &[Vec2], axis: Vec2) -> (f64, f64) {
    let mut min_proj = f64::INFINITY;
    let mut max_proj = f64::NEG_INFINITY;
    for vertex in vertices {
        let projection = vertex.dot(axis);
        min_proj = min_proj.min(projection);
        max_proj = max_proj.max(projection);
    }
    (min_proj, max_proj)
}

fn collide_triangle_triangle(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let extents_a = match body_a.shape {
        Shape::Triangle(w) => w,
        _ => return Vec::new(),
    };
    let extents_b = match body_b.shape {
        Shape::Triangle(w) => w,
        _ => return Vec::new(),
    };

    let verts_a = triangle_vertices(body_a, extents_a);
    let verts_b = triangle_vertices(body_b, extents_b);

    let axes = [
        edge_normal(verts_a[1] - verts_a[0]),
        edge_normal(verts_a[2] - verts_a[1]),
        edge_normal(verts_a[0] - verts_a[2]),
        edge_normal(verts_b[1] - verts_b[0]),
        edge_normal(verts_b[2] - verts_b[1]),
        edge_normal(verts_b[0] - verts_b[2]),
    ];

    let mut min_overlap = f64::INFINITY;
    let mut smallest_axis = Vec2::ZERO;

    for axis in axes {
        let (min_a, max_a) = project_onto_axis(&verts_a, axis);
        let (min_b, max_b) = project_onto_axis(&verts_b, axis);

        if max_a < min_b - SAT_EPSILON || max_b < min_a - SAT_EPSILON {
            return Vec::new();
        }

        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap < min_overlap {
            min_overlap = overlap;
            smallest_axis = axis;
        }
    }

    if smallest_axis.dot(body_b.position - body_a.position) < 0.0 {
        smallest_axis = -smallest_axis;
    }

    // Single approximate contact at the centroid of all six vertices
    let centroid =
        (verts_a[0] + verts_a[1] + verts_a[2] + verts_b[0] + verts_b[1] + verts_b[2]) * (1.0 / 6.0);

    vec![Contact {
        position: centroid,
        normal: smallest_axis,
        separation: -min_overlap,
        ..Default::default()
    }]
}

/// Normal points from the box toward the triangle.
fn collide_box_triangle(box_body: &Body, triangle_body: &Body) -> Vec<Contact> {
    let h = match box_body.shape {
        Shape::Box(w) => w * 0.5,
        _ => return Vec::new(),
    };
    let tri_extents = match triangle_body.shape {
        Shape::Triangle(w) => w,
        _ => return Vec::new(),
    };

    let tri_verts = triangle_vertices(triangle_body, tri_extents);
    // Box corners, axis-aligned; box rotation is not applied here either
    let box_verts = [
        box_body.position + Vec2::new(-h.x, -h.y),
        box_body.position + Vec2::new(h.x, -h.y),
        box_body.position + Vec2::new(h.x, h.y),
        box_body.position + Vec2::new(-h.x, h.y),
    ];

    let axes = [
        edge_normal(tri_verts[1] - tri_verts[0]),
        edge_normal(tri_verts[2] - tri_verts[1]),
        edge_normal(tri_verts[0] - tri_verts[2]),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
    ];

    let mut min_overlap = f64::INFINITY;
    let mut smallest_axis = Vec2::ZERO;

    for axis in axes {
        let (min_tri, max_tri) = project_onto_axis(&tri_verts, axis);
        let (min_box, max_box) = project_onto_axis(&box_verts, axis);

        if max_tri < min_box || max_box < min_tri {
            return Vec::new();
        }

        let overlap = max_tri.min(max_box) - min_tri.max(min_box);
        if overlap < min_overlap {
            min_overlap = overlap;
            smallest_axis = axis;
        }
    }

    if smallest_axis.dot(triangle_body.position - box_body.position) < 0.0 {
        smallest_axis = -smallest_axis;
    }

    let centroid = (tri_verts[0] + tri_verts[1] + tri_verts[2]) * (1.0 / 3.0);

    vec![Contact {
        position: centroid,
        normal: smallest_axis,
        separation: -min_overlap,
        ..Default::default()
    }]
}

/// Normal points from the circle toward the triangle.
fn collide_circle_triangle(circle_body: &Body, triangle_body: &Body) -> Vec<Contact> {
    let radius = match circle_body.shape {
        Shape::Circle(d) => 0.5 * d,
        _ => return Vec::new(),
    };
    let tri_extents = match triangle_body.shape {
        Shape::Triangle(w) => w,
        _ => return Vec::new(),
    };

    let verts = triangle_vertices(triangle_body, tri_extents);
    let center = circle_body.position;

    // Center-inside test via the three edge cross products
    let cross1 = (verts[1] - verts[0]).cross(center - verts[0]);
    let cross2 = (verts[2] - verts[1]).cross(center - verts[1]);
    let cross3 = (verts[0] - verts[2]).cross(center - verts[2]);
    let inside = (cross1 >= 0.0 && cross2 >= 0.0 && cross3 >= 0.0)
        || (cross1 <= 0.0 && cross2 <= 0.0 && cross3 <= 0.0);

    if inside {
        // Approximate: default up normal, full-radius penetration
        return vec![Contact {
            position: center,
            normal: Vec2::new(0.0, 1.0),
            separation: -radius,
            ..Default::default()
        }];
    }

    // Otherwise test the three edges, reporting against the first that
    // qualifies
    for i in 0..3 {
        let p1 = verts[i];
        let p2 = verts[(i + 1) % 3];
        let edge = p2 - p1;
        let length_squared = edge.dot(edge);
        let t = if length_squared > 1e-12 {
            ((center - p1).dot(edge) / length_squared).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest_point = p1 + edge * t;

        let d = center - closest_point;
        let dist_squared = d.dot(d);
        if dist_squared <= radius * radius {
            let dist = dist_squared.sqrt();
            let normal = if dist > 0.0 {
                -(d * (1.0 / dist))
            } else {
                Vec2::new(1.0, 0.0)
            };
            return vec![Contact {
                position: closest_point,
                normal,
                separation: dist - radius,
                ..Default::default()
            }];
        }
    }

    Vec::new()
}

//! Programmatic glTF scenes for integration tests.
//!
//! All scenes are authored in glTF space (Y-up). The exporter sees them in
//! host space (Z-up), where glTF (x, y, z) becomes (x, -z, y).

#![allow(dead_code)]

mod binary_packing;
mod glb_assembly;

use binary_packing::BufferBuilder;
use glb_assembly::assemble_glb;

/// Joints in [`generate_skinned_glb`]
pub const BONE_COUNT: usize = 2;

/// Sample rate that turns the one second clip into three frames
pub const SKINNED_FRAME_RATE: f32 = 2.0;

/// Right triangle in the host XY plane: (0,0,0), (1,0,0), (0,1,0)
const TRIANGLE_POSITIONS: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, -1.0];

/// Face normal of the triangle, up in both spaces
const TRIANGLE_NORMALS: [f32; 9] = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];

const TRIANGLE_UVS: [f32; 6] = [0.0, 1.0, 1.0, 1.0, 0.0, 0.0];

/// Empty node at host (2, 0, 3)
const SPAWN_NODE: &str = r#"{"name":"Spawn","translation":[2.0,3.0,0.0]}"#;

fn glb(builder: BufferBuilder, body: &str) -> Vec<u8> {
    let (json, data) = builder.finish(body);
    assemble_glb(&json, &data)
}

/// One textured triangle "Tri" plus the empty "Spawn"
pub fn generate_triangle_glb() -> Vec<u8> {
    let mut buffer = BufferBuilder::new();
    let positions = buffer.floats(&TRIANGLE_POSITIONS, 3);
    let normals = buffer.floats(&TRIANGLE_NORMALS, 3);
    let uvs = buffer.floats(&TRIANGLE_UVS, 2);
    let indices = buffer.shorts(&[0, 1, 2], 1);

    let body = format!(
        r#""scene":0,"scenes":[{{"nodes":[0,1]}}],
"nodes":[{{"name":"Tri","mesh":0}},{spawn}],
"meshes":[{{"name":"Tri","primitives":[{{"attributes":{{"POSITION":{positions},"NORMAL":{normals},"TEXCOORD_0":{uvs}}},"indices":{indices}}}]}}]"#,
        spawn = SPAWN_NODE,
    );
    glb(buffer, &body)
}

/// Line strip "Path" through host (0,0,0), (1,0,0), (1,0,2) plus the
/// empty "Spawn"
pub fn generate_polyline_glb() -> Vec<u8> {
    let mut buffer = BufferBuilder::new();
    let positions = buffer.floats(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 2.0, 0.0], 3);

    let body = format!(
        r#""scene":0,"scenes":[{{"nodes":[0,1]}}],
"nodes":[{{"name":"Path","mesh":0}},{spawn}],
"meshes":[{{"name":"Path","primitives":[{{"attributes":{{"POSITION":{positions}}},"mode":3}}]}}]"#,
        spawn = SPAWN_NODE,
    );
    glb(buffer, &body)
}

/// Skinned triangle "Body" on a two bone rig "Rig" (Root -> Tip, one unit
/// apart along host Z) with a one second clip "Turn" that rotates Root a
/// quarter turn about the up axis.
///
/// Vertices 0 and 2 follow Root, vertex 1 follows Tip.
pub fn generate_skinned_glb() -> Vec<u8> {
    let mut buffer = BufferBuilder::new();
    let positions = buffer.floats(&TRIANGLE_POSITIONS, 3);
    let normals = buffer.floats(&TRIANGLE_NORMALS, 3);
    let uvs = buffer.floats(&[0.5; 6], 2);
    let joints = buffer.bytes(&[0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0], 4);
    let weights = buffer.floats(
        &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        4,
    );
    let indices = buffer.shorts(&[0, 1, 2], 1);

    #[rustfmt::skip]
    let inverse_bind = buffer.floats(
        &[
            // Root at the origin
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
            // Tip one unit up
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 0.0, 1.0,
        ],
        16,
    );

    let half = std::f32::consts::FRAC_1_SQRT_2;
    let times = buffer.floats(&[0.0, 1.0], 1);
    let rotations = buffer.floats(&[0.0, 0.0, 0.0, 1.0, 0.0, half, 0.0, half], 4);

    let body = format!(
        r#""scene":0,"scenes":[{{"nodes":[0,1]}}],
"nodes":[{{"name":"Body","mesh":0,"skin":0}},{{"name":"Root","children":[2]}},{{"name":"Tip","translation":[0.0,1.0,0.0]}}],
"meshes":[{{"name":"Body","primitives":[{{"attributes":{{"POSITION":{positions},"NORMAL":{normals},"TEXCOORD_0":{uvs},"JOINTS_0":{joints},"WEIGHTS_0":{weights}}},"indices":{indices}}}]}}],
"skins":[{{"name":"Rig","joints":[1,2],"inverseBindMatrices":{inverse_bind}}}],
"animations":[{{"name":"Turn","samplers":[{{"input":{times},"output":{rotations},"interpolation":"LINEAR"}}],"channels":[{{"sampler":0,"target":{{"node":1,"path":"rotation"}}}}]}}]"#,
    );
    glb(buffer, &body)
}

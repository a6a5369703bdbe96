//! Fixture builders shared by the integration tests: binary glTF scenes assembled in
//! memory, small JPEG/PNG textures and per-test asset directories.

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};

/// Mesh with one indexed, textured triangle.
pub const SINGLE: usize = 0;
/// Mesh with two primitives.
pub const PAIR: usize = 1;
/// Mesh with one triangle that has neither indices, normals nor texture coordinates.
pub const UNINDEXED: usize = 2;

/// Base colour factor of the material used by [`SINGLE`].
pub const TINT: [f32; 4] = [1.0, 0.5, 0.25, 1.0];

/// A node of a fixture scene.
pub struct TestNode {
    pub name: &'static str,
    pub mesh: Option<usize>,
    pub translation: [f32; 3],
    pub children: Vec<TestNode>,
}

impl TestNode {
    pub fn mesh(name: &'static str, mesh: usize) -> Self {
        Self {
            name,
            mesh: Some(mesh),
            translation: [0.0; 3],
            children: Vec::new(),
        }
    }

    pub fn group(name: &'static str, children: Vec<TestNode>) -> Self {
        Self {
            name,
            mesh: None,
            translation: [0.0; 3],
            children,
        }
    }

    pub fn with_children(mut self, children: Vec<TestNode>) -> Self {
        self.children = children;
        self
    }

    pub fn at(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }
}

/// Three levels of nesting with four mesh nodes in total.
pub fn nested_scene() -> Vec<TestNode> {
    vec![
        TestNode::group(
            "room",
            vec![
                TestNode::mesh("floor", SINGLE),
                TestNode::group(
                    "desk",
                    vec![
                        TestNode::mesh("top", SINGLE).at([0.0, 1.0, 0.0]),
                        TestNode::group("drawer", vec![TestNode::mesh("handle", SINGLE)]),
                    ],
                ),
            ],
        ),
        TestNode::mesh("lamp", UNINDEXED).at([2.0, 0.0, 0.0]),
    ]
}

// One triangle in the z = 0 plane shared by every primitive.
const POSITIONS: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
const TEX_COORDS: [[f32; 2]; 3] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0]];
const INDICES: [u32; 3] = [0, 1, 2];

fn geometry_buffer() -> Vec<u8> {
    let mut bin = Vec::new();
    POSITIONS
        .iter()
        .flatten()
        .for_each(|v| bin.extend_from_slice(&v.to_le_bytes()));
    TEX_COORDS
        .iter()
        .flatten()
        .for_each(|v| bin.extend_from_slice(&v.to_le_bytes()));
    INDICES
        .iter()
        .for_each(|i| bin.extend_from_slice(&i.to_le_bytes()));
    bin
}

fn flatten(node: &TestNode, json: &mut Vec<String>) -> usize {
    let index = json.len();
    json.push(String::new());
    let children: Vec<String> = node
        .children
        .iter()
        .map(|child| flatten(child, json).to_string())
        .collect();
    let mut fields = vec![
        format!("\"name\":\"{}\"", node.name),
        format!(
            "\"translation\":[{},{},{}]",
            node.translation[0], node.translation[1], node.translation[2]
        ),
    ];
    if let Some(mesh) = node.mesh {
        fields.push(format!("\"mesh\":{mesh}"));
    }
    if !children.is_empty() {
        fields.push(format!("\"children\":[{}]", children.join(",")));
    }
    json[index] = format!("{{{}}}", fields.join(","));
    index
}

/// The glTF JSON document of a scene whose roots are `roots`.
pub fn gltf_json(roots: &[TestNode], buffer_uri: Option<&str>) -> String {
    let mut nodes = Vec::new();
    let root_indices: Vec<String> = roots
        .iter()
        .map(|root| flatten(root, &mut nodes).to_string())
        .collect();
    let textured = r#"{"attributes":{"POSITION":0,"TEXCOORD_0":1},"indices":2}"#;
    let uri = buffer_uri
        .map(|uri| format!(",\"uri\":\"{uri}\""))
        .unwrap_or_default();
    format!(
        r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[{roots}]}}],"nodes":[{nodes}],"meshes":[{{"name":"single","primitives":[{{"attributes":{{"POSITION":0,"TEXCOORD_0":1}},"indices":2,"material":0}}]}},{{"name":"pair","primitives":[{textured},{textured}]}},{{"name":"unindexed","primitives":[{{"attributes":{{"POSITION":0}}}}]}}],"materials":[{{"pbrMetallicRoughness":{{"baseColorFactor":[{r},{g},{b},{a}]}}}}],"accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0,0,0],"max":[1,1,0]}},{{"bufferView":1,"componentType":5126,"count":3,"type":"VEC2"}},{{"bufferView":2,"componentType":5125,"count":3,"type":"SCALAR"}}],"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36}},{{"buffer":0,"byteOffset":36,"byteLength":24}},{{"buffer":0,"byteOffset":60,"byteLength":12,"target":34963}}],"buffers":[{{"byteLength":72{uri}}}]}}"#,
        roots = root_indices.join(","),
        nodes = nodes.join(","),
        r = TINT[0],
        g = TINT[1],
        b = TINT[2],
        a = TINT[3],
    )
}

fn pad(mut chunk: Vec<u8>, fill: u8) -> Vec<u8> {
    while chunk.len() % 4 != 0 {
        chunk.push(fill);
    }
    chunk
}

/// A binary glTF file containing the scene and its geometry buffer.
pub fn glb(roots: &[TestNode]) -> Vec<u8> {
    let json = pad(gltf_json(roots, None).into_bytes(), b' ');
    let bin = pad(geometry_buffer(), 0);
    let length = 12 + 8 + json.len() + 8 + bin.len();

    let mut glb = Vec::with_capacity(length);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(length as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E_4942u32.to_le_bytes());
    glb.extend_from_slice(&bin);
    glb
}

/// Writes `name` (a `.gltf`) and its external buffer `<stem>.bin` into `dir`.
pub fn write_gltf(dir: &Path, name: &str, roots: &[TestNode]) {
    let stem = name.trim_end_matches(".gltf");
    let bin_name = format!("{stem}.bin");
    std::fs::write(dir.join(name), gltf_json(roots, Some(&bin_name))).expect("write gltf");
    std::fs::write(dir.join(bin_name), geometry_buffer()).expect("write bin");
}

/// A `width` x `height` image whose top row is red and every other row is blue.
pub fn striped_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |_, y| {
        if y == 0 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    })
}

pub fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).expect("encode image");
    bytes.into_inner()
}

/// A fresh asset directory below the cargo target dir.
pub fn asset_dir(test: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("assets").join(test);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create asset dir");
    dir
}

/// An asset directory holding the three files the viewer's variants reference.
pub fn variant_assets(test: &str) -> PathBuf {
    let dir = asset_dir(test);
    std::fs::write(dir.join("untitled.glb"), glb(&nested_scene())).expect("write untitled.glb");
    std::fs::write(
        dir.join("office1.glb"),
        glb(&[TestNode::mesh("office", PAIR).with_children(vec![TestNode::mesh("chair", SINGLE)])]),
    )
    .expect("write office1.glb");
    std::fs::write(
        dir.join("bake.jpg"),
        encode(&striped_image(8, 8), ImageFormat::Jpeg),
    )
    .expect("write bake.jpg");
    dir
}

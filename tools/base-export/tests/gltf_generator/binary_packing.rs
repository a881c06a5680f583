//! Accessor packing into a single binary buffer.

const FLOAT: u32 = 5126;
const UNSIGNED_SHORT: u32 = 5123;
const UNSIGNED_BYTE: u32 = 5121;

fn accessor_type(width: usize) -> &'static str {
    match width {
        1 => "SCALAR",
        2 => "VEC2",
        3 => "VEC3",
        4 => "VEC4",
        16 => "MAT4",
        _ => panic!("unsupported accessor width {}", width),
    }
}

fn json_floats(values: &[f32]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
    format!("[{}]", items.join(","))
}

/// Binary buffer plus the bufferViews and accessors that describe it
#[derive(Default)]
pub(crate) struct BufferBuilder {
    data: Vec<u8>,
    views: Vec<String>,
    accessors: Vec<String>,
}

impl BufferBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push_view(&mut self, bytes: &[u8]) -> usize {
        // Every view starts 4-byte aligned
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        self.views.push(format!(
            r#"{{"buffer":0,"byteOffset":{},"byteLength":{}}}"#,
            offset,
            bytes.len()
        ));
        self.views.len() - 1
    }

    fn push_accessor(
        &mut self,
        view: usize,
        component: u32,
        count: usize,
        width: usize,
        bounds: &str,
    ) -> usize {
        self.accessors.push(format!(
            r#"{{"bufferView":{},"componentType":{},"count":{},"type":"{}"{}}}"#,
            view,
            component,
            count,
            accessor_type(width),
            bounds
        ));
        self.accessors.len() - 1
    }

    /// Float accessor with per-component min/max
    pub(crate) fn floats(&mut self, values: &[f32], width: usize) -> usize {
        assert_eq!(values.len() % width, 0, "ragged accessor data");
        let count = values.len() / width;

        let mut min = vec![f32::MAX; width];
        let mut max = vec![f32::MIN; width];
        for element in values.chunks_exact(width) {
            for (i, &v) in element.iter().enumerate() {
                min[i] = min[i].min(v);
                max[i] = max[i].max(v);
            }
        }

        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes);
        let bounds = format!(r#","min":{},"max":{}"#, json_floats(&min), json_floats(&max));
        self.push_accessor(view, FLOAT, count, width, &bounds)
    }

    /// Unsigned short accessor (indices)
    pub(crate) fn shorts(&mut self, values: &[u16], width: usize) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes);
        self.push_accessor(view, UNSIGNED_SHORT, values.len() / width, width, "")
    }

    /// Unsigned byte accessor (joint indices)
    pub(crate) fn bytes(&mut self, values: &[u8], width: usize) -> usize {
        let view = self.push_view(values);
        self.push_accessor(view, UNSIGNED_BYTE, values.len() / width, width, "")
    }

    /// Complete JSON document around `body` (the scene level properties)
    /// and the BIN chunk data
    pub(crate) fn finish(self, body: &str) -> (String, Vec<u8>) {
        let json = format!(
            r#"{{"asset":{{"version":"2.0","generator":"base-export tests"}},{},"buffers":[{{"byteLength":{}}}],"bufferViews":[{}],"accessors":[{}]}}"#,
            body,
            self.data.len(),
            self.views.join(","),
            self.accessors.join(",")
        );
        (json, self.data)
    }
}

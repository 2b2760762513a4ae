use std::borrow::Cow;

/// Name of the function every sketch must define.
pub const SKETCH_ENTRY: &str = "sketch";

pub(crate) const VERTEX_ENTRY: &str = "vs_main";
pub(crate) const FRAGMENT_ENTRY: &str = "fs_main";

/// Compiles the quad vertex stage shared by every sketch.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sketch quad vertex"),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(format!("{FRAME_BLOCK}\n{VERTEX_SHADER}"))),
    })
}

/// Checks that `source` defines the sketch entry point before any GPU work
/// happens, so a missing function is reported in plain words.
pub fn check_sketch_source(source: &str) -> Result<(), String> {
    let defines_entry = source.lines().any(|line| {
        let line = line.trim_start();
        line.strip_prefix("fn ")
            .map(|rest| {
                let rest = rest.trim_start();
                rest.strip_prefix(SKETCH_ENTRY)
                    .is_some_and(|tail| tail.trim_start().starts_with('('))
            })
            .unwrap_or(false)
    });
    if defines_entry {
        Ok(())
    } else {
        Err(format!(
            "sketch source must define `fn {SKETCH_ENTRY}(uv: vec2<f32>) -> vec4<f32>`"
        ))
    }
}

/// Produces a self-contained WGSL fragment module from sketch source.
///
/// Layout of the result:
///
/// 1. [`FRAME_BLOCK`], the uniform block shared with the vertex stage.
/// 2. The `shaderlib` functions.
/// 3. The sketch itself.
/// 4. [`FRAGMENT_FOOTER`], which calls `sketch` with the quad UV.
pub fn wrap_sketch_source(source: &str) -> String {
    let mut wrapped = prelude();
    wrapped.reserve(source.len() + FRAGMENT_FOOTER.len() + 1);
    wrapped.push_str(source);
    if !source.ends_with('\n') {
        wrapped.push('\n');
    }
    wrapped.push_str(FRAGMENT_FOOTER);
    wrapped
}

/// Number of wrapped lines ahead of the sketch source.
pub fn sketch_line_offset() -> u32 {
    prelude().lines().count() as u32
}

fn prelude() -> String {
    format!(
        "{FRAME_BLOCK}\n{library}\n// ---- sketch ----\n",
        library = shaderlib::wgsl::LIBRARY
    )
}

/// Uniform block and varyings. Must match [`crate::SketchUniforms`].
pub const FRAME_BLOCK: &str = r"struct Frame {
    view_proj: mat4x4<f32>,
    resolution: vec2<f32>,
    time: f32,
    delta: f32,
    mouse: vec4<f32>,
    date: vec4<f32>,
    frame_index: u32,
    aspect: f32,
    pixel_ratio: f32,
    _padding: f32,
};

@group(0) @binding(0) var<uniform> frame: Frame;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};
";

const VERTEX_SHADER: &str = r"@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) uv: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = frame.view_proj * vec4<f32>(position, 0.0, 1.0);
    out.uv = uv;
    return out;
}
";

pub const FRAGMENT_FOOTER: &str = r"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return sketch(in.uv);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use wgpu::naga;

    fn validate(label: &str, source: &str) {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|err| panic!("{label}: {}", err.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .unwrap_or_else(|err| panic!("{label}: {err:?}"));
    }

    fn collect_wgsl(dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                collect_wgsl(&path, out);
            } else if path.extension().is_some_and(|ext| ext == "wgsl") {
                out.push(path);
            }
        }
    }

    const PLAIN: &str = r"
        fn sketch(uv: vec2<f32>) -> vec4<f32> {
            return vec4<f32>(uv, 0.5 + 0.5 * sin(frame.time), 1.0);
        }
    ";

    #[test]
    fn wrap_includes_prelude_library_and_footer() {
        let wrapped = wrap_sketch_source(PLAIN);
        assert!(wrapped.starts_with("struct Frame"));
        assert!(wrapped.contains("fn reinhard_tonemap"));
        assert!(wrapped.contains("return sketch(in.uv);"));
        let sketch_at = wrapped.find("fn sketch(").unwrap();
        let footer_at = wrapped.find("fn fs_main").unwrap();
        assert!(sketch_at < footer_at);
    }

    #[test]
    fn entry_point_check() {
        assert!(check_sketch_source(PLAIN).is_ok());
        assert!(check_sketch_source("fn  sketch (uv: vec2<f32>) -> vec4<f32> {}").is_ok());
        assert!(check_sketch_source("fn sketchy(uv: vec2<f32>) -> vec4<f32> {}").is_err());
        assert!(check_sketch_source("// fn sketch(uv)").is_err());
    }

    #[test]
    fn line_offset_points_at_sketch_source() {
        let wrapped = wrap_sketch_source("fn sketch(uv: vec2<f32>) -> vec4<f32> { return vec4<f32>(1.0); }");
        let line = wrapped
            .lines()
            .nth(sketch_line_offset() as usize)
            .unwrap();
        assert!(line.starts_with("fn sketch("), "got {line:?}");
    }

    #[test]
    fn vertex_stage_validates() {
        validate("vertex", &format!("{FRAME_BLOCK}\n{VERTEX_SHADER}"));
    }

    #[test]
    fn library_prelude_validates_with_a_plain_sketch() {
        validate("plain", &wrap_sketch_source(PLAIN));
    }

    #[test]
    fn bundled_sketches_validate() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../sketchbook/sketches");
        let mut sketches = Vec::new();
        collect_wgsl(&dir, &mut sketches);
        sketches.sort();
        assert_eq!(sketches.len(), 8, "{sketches:?}");

        for path in sketches {
            let source = fs::read_to_string(&path).unwrap();
            check_sketch_source(&source).unwrap();
            validate(&path.display().to_string(), &wrap_sketch_source(&source));
        }
    }
}

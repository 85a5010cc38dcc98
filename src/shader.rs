// src/shader.rs

pub const WGSL_SHADER_SOURCE: &str = r#"
struct Globals {
    outline_color: vec4<f32>,
    winres: vec2<f32>,
    outline_size: f32,
    transition_smoothness: f32,
}

@group(0) @binding(0)
var<uniform> globals: Globals;

// Low two bits of the attribute stream; must match the builder's encoding.
const POLYGON_BODY: u32 = 0u;
const OUTLINE_CORNER: u32 = 1u;
const OUTLINE_QUAD: u32 = 2u;

struct VertexInput {
    // Local template space; rotate/scale/translate happens here.
    @location(0) coord: vec2<f32>,
    @location(1) rotation: f32,
    @location(2) size: f32,
    @location(3) offset: vec2<f32>,
    @location(4) outline_direction: f32,
    @location(5) attr: u32,
    @location(6) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) @interpolate(flat) attr: u32,
    @location(1) color: vec4<f32>,
    // Corner cap center in framebuffer pixels; only set for OUTLINE_CORNER.
    @location(2) corner_center: vec2<f32>,
}

fn rotate_vec2(v: vec2<f32>, angle: f32) -> vec2<f32> {
    return vec2<f32>(
        v.x * cos(angle) - v.y * sin(angle),
        v.x * sin(angle) + v.y * cos(angle)
    );
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.attr = in.attr;
    out.color = in.color;
    out.corner_center = vec2<f32>(0.0);

    // World space is centered pixel space: [-winres/2, +winres/2], +y up.
    let half_winres = globals.winres / 2.0;
    var coord = rotate_vec2(in.coord, in.rotation) * in.size + in.offset;

    switch in.attr & 3u {
        case 1u: { // OUTLINE_CORNER
            // Framebuffer coordinates have the origin top-left with +y down,
            // so the y axis flips when recording the cap center.
            out.corner_center = vec2<f32>(coord.x + half_winres.x, half_winres.y - coord.y);

            // Selector bits 2..=3 pick the unit-square corner.
            let cx = f32((in.attr >> 2u) & 1u);
            let cy = f32((in.attr >> 3u) & 1u);
            let corner = 2.0 * vec2<f32>(cx, cy) - 1.0;
            coord += corner * globals.outline_size;
        }
        case 2u: { // OUTLINE_QUAD
            // The stored direction is the edge normal angle before the
            // instance rotation; geometry is degenerate until this push.
            let dir = in.outline_direction + in.rotation;
            coord += vec2<f32>(cos(dir), sin(dir)) * globals.outline_size;
        }
        default: {}
    }

    out.clip_position = vec4<f32>(coord / half_winres, 0.0, 1.0);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var color = in.color;

    if (in.attr & 3u) == OUTLINE_CORNER {
        // Round cap: fade out past outline_size pixels from the corner.
        let d = distance(in.corner_center, in.clip_position.xy);
        let s = smoothstep(
            globals.outline_size - globals.transition_smoothness,
            globals.outline_size,
            d
        );
        color = mix(color, vec4<f32>(0.0), s);
    }

    return color;
}
"#;

/// WGSL shader for lit meshes: Lambert diffuse plus Blinn-Phong specular.
///
/// Struct layouts must match `FrameUniforms` and `ObjectUniforms` in `gpu.rs`.
pub const LIT_SHADER: &str = r#"
struct DirectionalLight {
    direction: vec3<f32>,
    intensity: f32,
    color: vec3<f32>,
    _pad: f32,
};

struct PointLight {
    position: vec3<f32>,
    range: f32,
    color: vec3<f32>,
    intensity: f32,
};

struct Frame {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    camera_position: vec3<f32>,
    directional_count: u32,
    ambient: vec3<f32>,
    point_count: u32,
    directional: array<DirectionalLight, 4>,
    point: array<PointLight, 8>,
};

struct Object {
    world: mat4x4<f32>,
    world_inverse_transpose: mat4x4<f32>,
    color_tint: vec4<f32>,
    roughness: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var<uniform> object: Object;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = object.world * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.proj * frame.view * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = (object.world_inverse_transpose * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    return out;
}

fn shininess(roughness: f32) -> f32 {
    let smoothness = 1.0 - roughness;
    return mix(2.0, 256.0, smoothness * smoothness);
}

fn shade(n: vec3<f32>, v: vec3<f32>, l: vec3<f32>, radiance: vec3<f32>, albedo: vec3<f32>, roughness: f32) -> vec3<f32> {
    let n_dot_l = max(dot(n, l), 0.0);
    if (n_dot_l <= 0.0) {
        return vec3<f32>(0.0);
    }
    let h = normalize(l + v);
    let specular = pow(max(dot(n, h), 0.0), shininess(roughness)) * (1.0 - roughness);
    return radiance * (albedo * n_dot_l + vec3<f32>(specular));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(frame.camera_position - in.world_position);
    let albedo = object.color_tint.rgb;

    var color = frame.ambient * albedo;

    for (var i = 0u; i < frame.directional_count; i = i + 1u) {
        let light = frame.directional[i];
        let l = -normalize(light.direction);
        color += shade(n, v, l, light.color * light.intensity, albedo, object.roughness);
    }

    for (var i = 0u; i < frame.point_count; i = i + 1u) {
        let light = frame.point[i];
        let to_light = light.position - in.world_position;
        let dist = length(to_light);
        let l = to_light / max(dist, 0.0001);
        let falloff = clamp(1.0 - dist / max(light.range, 0.0001), 0.0, 1.0);
        let radiance = light.color * light.intensity * falloff * falloff;
        color += shade(n, v, l, radiance, albedo, object.roughness);
    }

    return vec4<f32>(color, object.color_tint.a);
}
"#;

/// WGSL shader for the sky cube. Depth is forced to the far plane.
pub const SKY_SHADER: &str = r#"
struct Sky {
    view_proj: mat4x4<f32>,
    zenith: vec4<f32>,
    horizon: vec4<f32>,
    ground: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> sky: Sky;

struct SkyInput {
    @location(0) position: vec3<f32>,
};

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(vertex: SkyInput) -> SkyOutput {
    let clip = sky.view_proj * vec4<f32>(vertex.position, 1.0);

    var out: SkyOutput;
    out.clip_position = clip.xyww;
    out.direction = vertex.position;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    let height = normalize(in.direction).y;
    if (height >= 0.0) {
        return mix(sky.horizon, sky.zenith, pow(height, 0.6));
    }
    return mix(sky.horizon, sky.ground, pow(-height, 0.4));
}
"#;
